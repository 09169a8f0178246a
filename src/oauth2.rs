use async_trait::async_trait;
use http::header::{HeaderValue, ACCEPT, CONTENT_TYPE};
use http::Method;
use log::debug;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::transport::{Transport, TransportRequest};
use crate::url_utils::join_path_components;
use crate::{Result, TokenReaderError};

/// Token endpoint path below the site root.
pub const DEFAULT_TOKEN_PATH: &str = "oauth/token";

/// Supplies the resource owner's username and password, e.g. by prompting.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn credentials(&self) -> Result<(String, String)>;
}

/// A username/password pair known up front.
#[derive(Clone, PartialEq, Eq)]
pub struct StaticCredentials {
    username: String,
    password: String,
}

impl StaticCredentials {
    pub fn new<U: Into<String>, P: Into<String>>(username: U, password: P) -> Self {
        StaticCredentials {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for StaticCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[async_trait]
impl CredentialProvider for StaticCredentials {
    async fn credentials(&self) -> Result<(String, String)> {
        Ok((self.username.clone(), self.password.clone()))
    }
}

/// Body of a successful token response.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct BearerToken {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

#[derive(Serialize)]
struct PasswordForm<'a> {
    grant_type: &'static str,
    client_id: &'a str,
    client_secret: &'a str,
    username: &'a str,
    password: &'a str,
}

/// Resource owner password grant against one token endpoint.
#[derive(Clone)]
pub struct PasswordGrant {
    token_url: Url,
    client_id: String,
    client_secret: String,
}

impl PasswordGrant {
    /// Targets `<site>/oauth/token`.
    pub fn new<I, S>(site: &str, client_id: I, client_secret: S) -> Result<Self>
    where
        I: Into<String>,
        S: Into<String>,
    {
        let token_url = Url::parse(&join_path_components(&[site, DEFAULT_TOKEN_PATH]))?;
        Ok(PasswordGrant {
            token_url,
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        })
    }

    pub fn token_url(self, token_url: Url) -> Self {
        PasswordGrant { token_url, ..self }
    }

    pub fn get_token_url(&self) -> &Url {
        &self.token_url
    }

    /// Exchange the provider's username and password for a bearer token.
    ///
    /// # Errors
    ///
    /// A non-2xx answer or a body without `access_token` is reported as a
    /// [`TokenReaderError`].
    pub async fn request_token<T, P>(&self, transport: &T, provider: &P) -> Result<BearerToken>
    where
        T: Transport + ?Sized,
        P: CredentialProvider + ?Sized,
    {
        let (username, password) = provider.credentials().await?;
        let form = serde_urlencoded::to_string(PasswordForm {
            grant_type: "password",
            client_id: &self.client_id,
            client_secret: &self.client_secret,
            username: &username,
            password: &password,
        })
        .map_err(|e| TokenReaderError::InvalidBody(e.to_string()))?;

        let mut request = TransportRequest::new(Method::POST, self.token_url.clone());
        let _ = request.headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded"),
        );
        let _ = request
            .headers
            .insert(ACCEPT, HeaderValue::from_static("application/json"));
        request.basic_auth = Some((self.client_id.clone(), self.client_secret.clone()));
        request.body = Some(form.into_bytes());

        debug!("requesting password grant token at {}", self.token_url);
        let resp = transport.execute(request).await?;
        if !resp.status.is_success() {
            return Err(TokenReaderError::Status {
                status: resp.status,
                body: resp.text().into_owned(),
            }
            .into());
        }
        resp.json::<BearerToken>()
            .map_err(|_| TokenReaderError::InvalidBody(resp.text().into_owned()).into())
    }
}

// client secret stays out of logs
impl std::fmt::Debug for PasswordGrant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordGrant")
            .field("token_url", &self.token_url.as_str())
            .field("client_id", &self.client_id)
            .finish()
    }
}
