use http::{HeaderMap, StatusCode};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;
pub type SignResult<T> = std::result::Result<T, SignError>;
pub type TokenReaderResult<T> = std::result::Result<T, TokenReaderError>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("configuration error : {0}")]
    Configuration(String),
    #[error("OAuth sign failed : {0}")]
    Signer(#[from] SignError),
    #[error("authentication discovery failed : {0}")]
    Discovery(String),
    #[error("token acquisition failed : {0}")]
    TokenReader(#[from] TokenReaderError),
    #[error("request failed : {0}")]
    Transport(#[from] reqwest::Error),
    #[error("API call to {url} returned {status}\n{body}\nheaders: {headers:?}")]
    Api {
        url: String,
        status: StatusCode,
        body: String,
        headers: HeaderMap,
    },
    #[error("key not found in query : {0}")]
    KeyNotFound(String),
    #[error("invalid url : {0}")]
    Url(#[from] url::ParseError),
    #[error("json error : {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignError {
    #[error("missing credential : {0}")]
    MissingCredential(&'static str),
    #[error("malformed url : {0}")]
    InvalidUrl(String),
    #[error("unsupported signature method : {0}")]
    UnsupportedAlgorithm(String),
    #[error("invalid signing key : {0}")]
    InvalidKey(String),
    #[error("value cannot be sent in the {0} header")]
    InvalidHeader(&'static str),
}

#[derive(Error, Debug, Clone)]
pub enum TokenReaderError {
    #[error("token endpoint returned {status} : {body}")]
    Status { status: StatusCode, body: String },
    #[error("response has malformed format: not found {0} in {1}")]
    TokenKeyNotFound(&'static str, String),
    #[error("token endpoint returned an unreadable body : {0}")]
    InvalidBody(String),
}

impl Error {
    /// Missing credentials or an unusable URL.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::Configuration(_)
                | Error::Url(_)
                | Error::Signer(SignError::MissingCredential(_))
                | Error::Signer(SignError::InvalidUrl(_))
                | Error::Signer(SignError::InvalidHeader(_))
        )
    }

    /// A token endpoint refused the exchange or answered with garbage.
    pub fn is_auth(&self) -> bool {
        matches!(self, Error::TokenReader(_))
    }
}
