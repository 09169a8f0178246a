use std::time::Duration;

use serde::Deserialize;

use crate::signer::{OAuthParameters, Placement, SignatureMethod};

/// Default REST namespace of a WordPress install.
pub const DEFAULT_API: &str = "wp-json";
/// Default API version below [`DEFAULT_API`].
pub const DEFAULT_API_VERSION: &str = "wp/v2";

/// Which OAuth flavour the client speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum OAuthVersion {
    #[serde(rename = "1")]
    V1,
    #[serde(rename = "2")]
    V2,
}

impl Default for OAuthVersion {
    fn default() -> Self {
        OAuthVersion::V1
    }
}

/// Client configuration.
///
/// Every field has a production default; `force_nonce` and
/// `force_timestamp` exist to reproduce known signatures in tests.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Options {
    pub api: String,
    pub api_version: String,
    /// Request timeout in seconds. `None` leaves it to the transport.
    pub timeout: Option<u64>,
    pub verify_ssl: bool,
    pub query_string_auth: bool,
    pub oauth_version: OAuthVersion,
    /// Pre-issued OAuth2 bearer token.
    pub token: Option<String>,
    pub three_legged: bool,
    pub callback: Option<String>,
    pub signature_method: SignatureMethod,
    /// Where OAuth 1.0a parameters go on plain-HTTP requests.
    pub oauth1_placement: Placement,
    pub user_agent: Option<String>,
    pub force_nonce: Option<String>,
    pub force_timestamp: Option<u64>,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            api: DEFAULT_API.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            timeout: None,
            verify_ssl: true,
            query_string_auth: false,
            oauth_version: OAuthVersion::V1,
            token: None,
            three_legged: false,
            callback: None,
            signature_method: SignatureMethod::HmacSha1,
            oauth1_placement: Placement::Query,
            user_agent: None,
            force_nonce: None,
            force_timestamp: None,
        }
    }
}

impl Options {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn api<T: Into<String>>(self, api: T) -> Self {
        Options {
            api: api.into(),
            ..self
        }
    }

    pub fn api_version<T: Into<String>>(self, api_version: T) -> Self {
        Options {
            api_version: api_version.into(),
            ..self
        }
    }

    pub fn timeout(self, seconds: u64) -> Self {
        Options {
            timeout: Some(seconds),
            ..self
        }
    }

    pub fn verify_ssl(self, verify_ssl: bool) -> Self {
        Options { verify_ssl, ..self }
    }

    pub fn query_string_auth(self, query_string_auth: bool) -> Self {
        Options {
            query_string_auth,
            ..self
        }
    }

    pub fn oauth_version(self, oauth_version: OAuthVersion) -> Self {
        Options {
            oauth_version,
            ..self
        }
    }

    pub fn token<T: Into<String>>(self, token: T) -> Self {
        Options {
            token: Some(token.into()),
            ..self
        }
    }

    /// Enable the three-legged handshake with the given callback URL.
    pub fn three_legged<T: Into<String>>(self, callback: T) -> Self {
        Options {
            three_legged: true,
            callback: Some(callback.into()),
            ..self
        }
    }

    pub fn signature_method(self, signature_method: SignatureMethod) -> Self {
        Options {
            signature_method,
            ..self
        }
    }

    pub fn oauth1_placement(self, oauth1_placement: Placement) -> Self {
        Options {
            oauth1_placement,
            ..self
        }
    }

    pub fn user_agent<T: Into<String>>(self, user_agent: T) -> Self {
        Options {
            user_agent: Some(user_agent.into()),
            ..self
        }
    }

    pub fn force_nonce<T: Into<String>>(self, nonce: T) -> Self {
        Options {
            force_nonce: Some(nonce.into()),
            ..self
        }
    }

    pub fn force_timestamp(self, timestamp: u64) -> Self {
        Options {
            force_timestamp: Some(timestamp),
            ..self
        }
    }

    pub fn timeout_duration(&self) -> Option<Duration> {
        self.timeout.map(Duration::from_secs)
    }

    /// Signing settings shared by every request of a client.
    pub fn oauth_parameters(&self) -> OAuthParameters {
        let mut params = OAuthParameters::new().signature_method(self.signature_method);
        if let Some(ref nonce) = self.force_nonce {
            params = params.nonce(nonce.as_str());
        }
        if let Some(timestamp) = self.force_timestamp {
            params = params.timestamp(timestamp);
        }
        params
    }
}
