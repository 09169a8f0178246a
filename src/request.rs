use http::header::{HeaderValue, AUTHORIZATION};
use log::debug;

use crate::params::ParameterSet;
use crate::signer::{OAuthParameters, Placement, Signer};
use crate::transport::TransportRequest;
use crate::{SecretsProvider, SignError, SignResult};

const CONSUMER_KEY_PARAM: &str = "consumer_key";
const CONSUMER_SECRET_PARAM: &str = "consumer_secret";

/// How one outgoing request is authenticated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthStrategy {
    /// `Authorization: Bearer <token>`; OAuth 1.0a is skipped entirely.
    Bearer(String),
    /// HTTP Basic with the consumer key pair, over TLS.
    Basic,
    /// `consumer_key`/`consumer_secret` query parameters, over TLS.
    QueryCredentials,
    /// Full OAuth 1.0a signature, for plain HTTP.
    OAuth1,
}

impl AuthStrategy {
    /// Pick the strategy from the transport security and the query-string
    /// auth flag. A bearer token always wins.
    pub fn select(is_ssl: bool, query_string_auth: bool, bearer: Option<&str>) -> Self {
        match (bearer, is_ssl, query_string_auth) {
            (Some(token), _, _) => AuthStrategy::Bearer(token.to_string()),
            (None, true, false) => AuthStrategy::Basic,
            (None, true, true) => AuthStrategy::QueryCredentials,
            (None, false, _) => AuthStrategy::OAuth1,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AuthStrategy::Bearer(_) => "bearer",
            AuthStrategy::Basic => "basic",
            AuthStrategy::QueryCredentials => "query credentials",
            AuthStrategy::OAuth1 => "oauth1",
        }
    }
}

/// Applies an [`AuthStrategy`] to a [`TransportRequest`].
#[derive(Debug, Clone)]
pub struct RequestDecorator {
    is_ssl: bool,
    query_string_auth: bool,
    placement: Placement,
    parameters: OAuthParameters,
}

impl RequestDecorator {
    pub fn new(
        is_ssl: bool,
        query_string_auth: bool,
        placement: Placement,
        parameters: OAuthParameters,
    ) -> Self {
        RequestDecorator {
            is_ssl,
            query_string_auth,
            placement,
            parameters,
        }
    }

    pub fn strategy(&self, bearer: Option<&str>) -> AuthStrategy {
        AuthStrategy::select(self.is_ssl, self.query_string_auth, bearer)
    }

    /// Authenticate `request` with `secrets`.
    ///
    /// # Errors
    ///
    /// Signing errors, see [`Signer::attach_signature`], and header values
    /// that cannot be sent.
    pub fn decorate<T>(
        &self,
        mut request: TransportRequest,
        secrets: &T,
        strategy: &AuthStrategy,
    ) -> SignResult<TransportRequest>
    where
        T: SecretsProvider,
    {
        debug!(
            "authenticating {} {} with {}",
            request.method,
            request.url,
            strategy.name()
        );
        match strategy {
            AuthStrategy::Bearer(token) => {
                let value = HeaderValue::from_str(&format!("Bearer {}", token))
                    .map_err(|_| SignError::InvalidHeader("Authorization: Bearer"))?;
                let _ = request.headers.insert(AUTHORIZATION, value);
            }
            AuthStrategy::Basic => {
                let (key, secret) = secrets.get_consumer_key_pair();
                request.basic_auth = Some((key.to_string(), secret.to_string()));
            }
            AuthStrategy::QueryCredentials => {
                let (key, secret) = secrets.get_consumer_key_pair();
                request
                    .query
                    .push((CONSUMER_KEY_PARAM.to_string(), key.to_string()));
                request
                    .query
                    .push((CONSUMER_SECRET_PARAM.to_string(), secret.to_string()));
            }
            AuthStrategy::OAuth1 => {
                let signed = Signer::new(secrets, self.parameters.clone()).attach_signature(
                    &request.method,
                    request.url.as_str(),
                    &ParameterSet::new(),
                    self.placement,
                )?;
                request.url = signed.url;
                if let Some(authorization) = signed.authorization {
                    let value = HeaderValue::from_str(&authorization)
                        .map_err(|_| SignError::InvalidHeader("Authorization: OAuth"))?;
                    let _ = request.headers.insert(AUTHORIZATION, value);
                }
            }
        }
        Ok(request)
    }
}
