use std::fmt;

use async_trait::async_trait;
use http::header::{HeaderValue, ACCEPT, CONTENT_TYPE};
use http::{Method, StatusCode};
use log::debug;
use serde::Serialize;
use tokio::sync::OnceCell;
use url::Url;

use crate::config::{OAuthVersion, Options};
use crate::oauth2::{CredentialProvider, PasswordGrant};
use crate::request::{AuthStrategy, RequestDecorator};
use crate::three_legged::{AccessToken, Authorizer, ThreeLeggedFlow};
use crate::token_reader::TokenResponse;
use crate::transport::{Requester, Response, Transport, TransportRequest};
use crate::{Credential, Error, Result};

/// `User-Agent` sent when [`Options::user_agent`] is unset.
pub const DEFAULT_USER_AGENT: &str = concat!("wordpress-api-rust/", env!("CARGO_PKG_VERSION"));

const JSON_CONTENT_TYPE: &str = "application/json;charset=utf-8";

/// WordPress REST API client.
///
/// Picks the authentication for every call from the site scheme and
/// [`Options`]: HTTP Basic or query credentials over TLS, an OAuth 1.0a
/// signature over plain HTTP, or a bearer token when one is held.
pub struct Client<T = reqwest::Client> {
    transport: T,
    requester: Requester,
    credential: Credential,
    options: Options,
    decorator: RequestDecorator,
    three_legged: Option<ThreeLeggedFlow>,
    authorizer: Option<Box<dyn Authorizer>>,
    credential_provider: Option<Box<dyn CredentialProvider>>,
    bearer: OnceCell<String>,
}

impl Client<reqwest::Client> {
    /// Constructs a new `Client` backed by a `reqwest::Client` configured
    /// from `options` (timeout, user agent, certificate verification).
    ///
    /// # Errors
    ///
    /// Fails on empty credentials, an unparsable site URL, a three-legged
    /// setup without callback, or when reqwest cannot build its client.
    pub fn new<K, S>(url: &str, consumer_key: K, consumer_secret: S, options: Options) -> Result<Self>
    where
        K: Into<String>,
        S: Into<String>,
    {
        let inner = build_reqwest(&options)?;
        Client::with_transport(inner, url, consumer_key, consumer_secret, options)
    }
}

impl<T> Client<T>
where
    T: Transport,
{
    /// Constructs a new `Client` over any [`Transport`].
    pub fn with_transport<K, S>(
        transport: T,
        url: &str,
        consumer_key: K,
        consumer_secret: S,
        options: Options,
    ) -> Result<Self>
    where
        K: Into<String>,
        S: Into<String>,
    {
        let credential = Credential::new(consumer_key, consumer_secret);
        if credential.consumer_key().is_empty() || credential.consumer_secret().is_empty() {
            return Err(Error::Configuration(
                "consumer key and consumer secret are required".to_string(),
            ));
        }

        let requester = Requester::new(url, options.api.as_str(), options.api_version.as_str());
        let api_url = requester.api_url()?;

        let mut parameters = options.oauth_parameters();
        let three_legged = if options.three_legged {
            let callback = options.callback.as_deref().ok_or_else(|| {
                Error::Configuration("three-legged OAuth requires a callback URL".to_string())
            })?;
            // every three-legged request carries the callback
            parameters = parameters.callback(callback);
            Some(
                ThreeLeggedFlow::new(api_url, callback)
                    .placement(options.oauth1_placement)
                    .parameters(parameters.clone()),
            )
        } else {
            None
        };

        let decorator = RequestDecorator::new(
            requester.is_ssl(),
            options.query_string_auth,
            options.oauth1_placement,
            parameters,
        );

        Ok(Client {
            transport,
            requester,
            credential,
            bearer: OnceCell::new_with(options.token.clone()),
            options,
            decorator,
            three_legged,
            authorizer: None,
            credential_provider: None,
        })
    }

    /// Collaborator that walks the user through the three-legged handshake.
    pub fn authorizer<A>(self, authorizer: A) -> Self
    where
        A: Authorizer + 'static,
    {
        Client {
            authorizer: Some(Box::new(authorizer)),
            ..self
        }
    }

    /// Source of the username and password for the OAuth2 password grant.
    pub fn credential_provider<P>(self, provider: P) -> Self
    where
        P: CredentialProvider + 'static,
    {
        Client {
            credential_provider: Some(Box::new(provider)),
            ..self
        }
    }

    /// Reuse a three-legged access token from an earlier session.
    pub fn access_token(self, token: AccessToken) -> Self {
        Client {
            three_legged: self.three_legged.map(|flow| flow.with_access_token(token)),
            ..self
        }
    }

    pub fn requester(&self) -> &Requester {
        &self.requester
    }

    pub fn config(&self) -> &Options {
        &self.options
    }

    pub fn is_ssl(&self) -> bool {
        self.requester.is_ssl()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn three_legged_flow(&self) -> Option<&ThreeLeggedFlow> {
        self.three_legged.as_ref()
    }

    /// Convenience method to make a `GET` request to an endpoint.
    pub async fn get(&self, endpoint: &str) -> Result<Response> {
        self.request::<()>(Method::GET, endpoint, None).await
    }

    /// Convenience method to make a `POST` request with a JSON body.
    pub async fn post<B>(&self, endpoint: &str, body: &B) -> Result<Response>
    where
        B: Serialize + ?Sized,
    {
        self.request(Method::POST, endpoint, Some(body)).await
    }

    /// Convenience method to make a `PUT` request with a JSON body.
    pub async fn put<B>(&self, endpoint: &str, body: &B) -> Result<Response>
    where
        B: Serialize + ?Sized,
    {
        self.request(Method::PUT, endpoint, Some(body)).await
    }

    /// Convenience method to make a `DELETE` request to an endpoint.
    pub async fn delete(&self, endpoint: &str) -> Result<Response> {
        self.request::<()>(Method::DELETE, endpoint, None).await
    }

    /// Convenience method to make an `OPTIONS` request to an endpoint.
    pub async fn options(&self, endpoint: &str) -> Result<Response> {
        self.request::<()>(Method::OPTIONS, endpoint, None).await
    }

    /// Authenticate and send one call below the versioned API root.
    ///
    /// # Errors
    ///
    /// Any status other than 200 or 201 becomes [`Error::Api`] carrying the
    /// URL, status, body and headers of the response.
    pub async fn request<B>(&self, method: Method, endpoint: &str, body: Option<&B>) -> Result<Response>
    where
        B: Serialize + ?Sized,
    {
        let mut request = TransportRequest::new(method, self.requester.endpoint_url(endpoint)?);
        let _ = request
            .headers
            .insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(body) = body {
            request.body = Some(serde_json::to_vec(body)?);
            let _ = request
                .headers
                .insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
        }

        let strategy = self.decorator.strategy(self.bearer_token().await?);
        let credential = self.signing_credential(&strategy).await?;
        let request = self.decorator.decorate(request, &credential, &strategy)?;

        let resp = self.transport.execute(request).await?;
        if resp.status != StatusCode::OK && resp.status != StatusCode::CREATED {
            debug!("{} {} returned {}", resp.method, resp.url, resp.status);
            return Err(Error::Api {
                url: resp.url.to_string(),
                status: resp.status,
                body: resp.text().into_owned(),
                headers: resp.headers,
            });
        }
        Ok(resp)
    }

    async fn bearer_token(&self) -> Result<Option<&str>> {
        if let Some(token) = self.bearer.get() {
            return Ok(Some(token.as_str()));
        }
        if self.options.oauth_version != OAuthVersion::V2 {
            return Ok(None);
        }
        let provider = self.credential_provider.as_deref().ok_or_else(|| {
            Error::Configuration("OAuth2 requires a credential provider".to_string())
        })?;
        let token = self
            .bearer
            .get_or_try_init(|| async {
                let grant = PasswordGrant::new(
                    self.requester.url(),
                    self.credential.consumer_key(),
                    self.credential.consumer_secret(),
                )?;
                let token = grant.request_token(&self.transport, provider).await?;
                Ok::<_, Error>(token.access_token)
            })
            .await?;
        Ok(Some(token.as_str()))
    }

    async fn signing_credential(&self, strategy: &AuthStrategy) -> Result<Credential> {
        match (&self.three_legged, strategy) {
            (Some(flow), AuthStrategy::OAuth1) => {
                let token = match self.authorizer.as_deref() {
                    Some(authorizer) => {
                        flow.access_token(&self.transport, &self.credential, authorizer)
                            .await?
                    }
                    None => {
                        flow.access_token(&self.transport, &self.credential, &MissingAuthorizer)
                            .await?
                    }
                };
                Ok(self
                    .credential
                    .clone()
                    .token(token.token.as_str(), token.token_secret.as_str()))
            }
            _ => Ok(self.credential.clone()),
        }
    }
}

impl<T> fmt::Debug for Client<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("requester", &self.requester)
            .field("credential", &self.credential)
            .field("oauth_version", &self.options.oauth_version)
            .field("three_legged", &self.three_legged.is_some())
            .finish()
    }
}

struct MissingAuthorizer;

#[async_trait]
impl Authorizer for MissingAuthorizer {
    async fn authorize(&self, authorize_url: &Url, _: &TokenResponse) -> Result<String> {
        Err(Error::Configuration(format!(
            "user authorization required at {} but no authorizer is set",
            authorize_url
        )))
    }
}

fn build_reqwest(options: &Options) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder().user_agent(
        options
            .user_agent
            .as_deref()
            .unwrap_or(DEFAULT_USER_AGENT),
    );
    if let Some(timeout) = options.timeout_duration() {
        builder = builder.timeout(timeout);
    }
    Ok(apply_verify_ssl(builder, options.verify_ssl).build()?)
}

#[cfg(any(feature = "default-tls", feature = "rustls-tls"))]
fn apply_verify_ssl(builder: reqwest::ClientBuilder, verify_ssl: bool) -> reqwest::ClientBuilder {
    builder.danger_accept_invalid_certs(!verify_ssl)
}

#[cfg(not(any(feature = "default-tls", feature = "rustls-tls")))]
fn apply_verify_ssl(builder: reqwest::ClientBuilder, verify_ssl: bool) -> reqwest::ClientBuilder {
    if !verify_ssl {
        log::warn!("verify_ssl = false has no effect without a TLS backend");
    }
    builder
}
