use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use http::header::{HeaderValue, AUTHORIZATION};
use http::Method;
use log::debug;
use serde::Deserialize;
use tokio::sync::OnceCell;
use url::Url;

use crate::params::ParameterSet;
use crate::signer::{OAuthParameters, Placement, Signer};
use crate::token_reader::{TokenReader, TokenResponse};
use crate::transport::{Transport, TransportRequest};
use crate::url_utils::add_query;
use crate::{Credential, Error, Result, SignError, OAUTH_CALLBACK_KEY, OAUTH_TOKEN_KEY};

const OAUTH1_POINTER: &str = "/authentication/oauth1";

/// OAuth 1.0a endpoints advertised by the API root document.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AuthenticationDescriptor {
    #[serde(rename = "request")]
    pub request_token_url: String,
    #[serde(rename = "authorize")]
    pub authorize_url: String,
    #[serde(rename = "access")]
    pub access_token_url: String,
    pub version: String,
}

/// Token pair issued at the end of the handshake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub token: String,
    pub token_secret: String,
}

impl From<TokenResponse> for AccessToken {
    fn from(resp: TokenResponse) -> Self {
        AccessToken {
            token: resp.oauth_token,
            token_secret: resp.oauth_token_secret,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    Undiscovered,
    Discovered,
    RequestTokenObtained,
    Authorized,
}

/// The user-facing half of the handshake: send the user to `authorize_url`
/// and hand back the `oauth_verifier` the provider issued.
#[async_trait]
pub trait Authorizer: Send + Sync {
    async fn authorize(&self, authorize_url: &Url, request_token: &TokenResponse)
        -> Result<String>;
}

/// Three-legged OAuth 1.0a handshake against one API root.
///
/// The descriptor and the access token are resolved at most once per
/// instance; concurrent callers of [`ThreeLeggedFlow::access_token`] wait
/// for the first one.
#[derive(Debug)]
pub struct ThreeLeggedFlow {
    api_url: Url,
    callback: String,
    placement: Placement,
    parameters: OAuthParameters,
    descriptor: OnceCell<AuthenticationDescriptor>,
    request_token: Mutex<Option<TokenResponse>>,
    access_token: OnceCell<AccessToken>,
}

impl ThreeLeggedFlow {
    pub fn new<T: Into<String>>(api_url: Url, callback: T) -> Self {
        ThreeLeggedFlow {
            api_url,
            callback: callback.into(),
            placement: Placement::Query,
            parameters: OAuthParameters::new(),
            descriptor: OnceCell::new(),
            request_token: Mutex::new(None),
            access_token: OnceCell::new(),
        }
    }

    pub fn placement(self, placement: Placement) -> Self {
        ThreeLeggedFlow { placement, ..self }
    }

    /// Base signing settings; the callback is signed on every step and the
    /// verifier on the exchange.
    pub fn parameters(self, parameters: OAuthParameters) -> Self {
        ThreeLeggedFlow { parameters, ..self }
    }

    /// Seed a token obtained earlier, skipping the handshake.
    pub fn with_access_token(self, token: AccessToken) -> Self {
        ThreeLeggedFlow {
            access_token: OnceCell::new_with(Some(token)),
            ..self
        }
    }

    pub fn api_url(&self) -> &Url {
        &self.api_url
    }

    pub fn callback(&self) -> &str {
        &self.callback
    }

    pub fn state(&self) -> FlowState {
        if self.access_token.initialized() {
            FlowState::Authorized
        } else if self.stored_request_token().is_some() {
            FlowState::RequestTokenObtained
        } else if self.descriptor.initialized() {
            FlowState::Discovered
        } else {
            FlowState::Undiscovered
        }
    }

    /// Fetch the API root once and keep its OAuth 1.0a block.
    pub async fn discover<T>(&self, transport: &T) -> Result<&AuthenticationDescriptor>
    where
        T: Transport + ?Sized,
    {
        self.descriptor
            .get_or_try_init(|| async {
                debug!("discovering authentication endpoints at {}", self.api_url);
                let resp = transport
                    .execute(TransportRequest::new(Method::GET, self.api_url.clone()))
                    .await?;
                if !resp.status.is_success() {
                    return Err(Error::Discovery(format!(
                        "{} returned {}",
                        self.api_url, resp.status
                    )));
                }
                let root = resp.json::<serde_json::Value>().map_err(|e| {
                    Error::Discovery(format!("{} is not a JSON document: {}", self.api_url, e))
                })?;
                let block = root.pointer(OAUTH1_POINTER).cloned().ok_or_else(|| {
                    Error::Discovery(format!(
                        "{} advertises no authentication.oauth1 block",
                        self.api_url
                    ))
                })?;
                serde_json::from_value(block).map_err(|e| {
                    Error::Discovery(format!("malformed authentication.oauth1 block: {}", e))
                })
            })
            .await
    }

    /// Ask for a temporary token, announcing the callback.
    pub async fn get_request_token<T>(
        &self,
        transport: &T,
        credential: &Credential,
    ) -> Result<TokenResponse>
    where
        T: Transport + ?Sized,
    {
        let descriptor = self.discover(transport).await?;
        let consumer = Credential::new(credential.consumer_key(), credential.consumer_secret());
        let parameters = self.parameters.clone().callback(self.callback.as_str());
        let request = self.signed_post(&consumer, parameters, &descriptor.request_token_url)?;

        let token = transport.execute(request).await?.parse_oauth_token()?;
        *self
            .request_token
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(token.clone());
        Ok(token)
    }

    /// Where the user grants access to `request_token`.
    pub fn authorize_url(&self, request_token: &TokenResponse) -> Result<Url> {
        let descriptor = self.descriptor.get().ok_or_else(|| {
            Error::Discovery("authentication endpoints have not been discovered".to_string())
        })?;
        let url = add_query(
            &descriptor.authorize_url,
            OAUTH_TOKEN_KEY,
            &request_token.oauth_token,
        );
        let url = add_query(&url, OAUTH_CALLBACK_KEY, &self.callback);
        Ok(Url::parse(&url)?)
    }

    /// Trade the verifier for the access token, signing with the request
    /// token secret.
    pub async fn exchange_verifier<T>(
        &self,
        transport: &T,
        credential: &Credential,
        verifier: &str,
    ) -> Result<AccessToken>
    where
        T: Transport + ?Sized,
    {
        let descriptor = self.discover(transport).await?;
        let request_token = self.stored_request_token().ok_or_else(|| {
            Error::Configuration("no request token to exchange".to_string())
        })?;
        let signing = Credential::new(credential.consumer_key(), credential.consumer_secret())
            .token(request_token.oauth_token, request_token.oauth_token_secret);
        let parameters = self
            .parameters
            .clone()
            .callback(self.callback.as_str())
            .verifier(verifier);
        let request = self.signed_post(&signing, parameters, &descriptor.access_token_url)?;

        let token = transport.execute(request).await?.parse_oauth_token()?;
        Ok(token.into())
    }

    /// The access token, running the whole handshake on first use.
    pub async fn access_token<T, A>(
        &self,
        transport: &T,
        credential: &Credential,
        authorizer: &A,
    ) -> Result<&AccessToken>
    where
        T: Transport + ?Sized,
        A: Authorizer + ?Sized,
    {
        self.access_token
            .get_or_try_init(|| async {
                let request_token = self.get_request_token(transport, credential).await?;
                let authorize_url = self.authorize_url(&request_token)?;
                let verifier = authorizer.authorize(&authorize_url, &request_token).await?;
                self.exchange_verifier(transport, credential, &verifier)
                    .await
            })
            .await
    }

    fn stored_request_token(&self) -> Option<TokenResponse> {
        self.request_token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn signed_post(
        &self,
        credential: &Credential,
        parameters: OAuthParameters,
        url: &str,
    ) -> Result<TransportRequest> {
        let signed = Signer::new(credential, parameters).attach_signature(
            &Method::POST,
            url,
            &ParameterSet::new(),
            self.placement,
        )?;
        let mut request = TransportRequest::new(Method::POST, signed.url);
        if let Some(authorization) = signed.authorization {
            let value = HeaderValue::from_str(&authorization)
                .map_err(|_| SignError::InvalidHeader("Authorization: OAuth"))?;
            let _ = request.headers.insert(AUTHORIZATION, value);
        }
        Ok(request)
    }
}
