use std::collections::HashMap;

use serde::Deserialize;

use crate::transport::Response;
use crate::{TokenReaderError, TokenReaderResult, OAUTH_TOKEN_KEY, OAUTH_TOKEN_SECRET_KEY};

/// Represents response of token acquisition.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TokenResponse {
    /// OAuth Token
    pub oauth_token: String,
    /// OAuth Token Secret
    pub oauth_token_secret: String,
    /// Other contents
    #[serde(flatten)]
    pub remain: HashMap<String, String>,
}

/// Add parse_oauth_token feature to a transport response.
// this trait is sealed
pub trait TokenReader: private::Sealed {
    fn parse_oauth_token(&self) -> TokenReaderResult<TokenResponse>;
}

impl TokenReader for Response {
    fn parse_oauth_token(&self) -> TokenReaderResult<TokenResponse> {
        let text = self.text().into_owned();
        if !self.status.is_success() {
            return Err(TokenReaderError::Status {
                status: self.status,
                body: text,
            });
        }
        read_oauth_token(text)
    }
}

fn read_oauth_token(text: String) -> TokenReaderResult<TokenResponse> {
    let mut destructured = url::form_urlencoded::parse(text.trim().as_bytes())
        .into_owned()
        .collect::<HashMap<String, String>>();
    let oauth_token = destructured.remove(OAUTH_TOKEN_KEY);
    let oauth_token_secret = destructured.remove(OAUTH_TOKEN_SECRET_KEY);
    match (oauth_token, oauth_token_secret) {
        (Some(t), Some(s)) => Ok(TokenResponse {
            oauth_token: t,
            oauth_token_secret: s,
            remain: destructured,
        }),
        (None, _) => Err(TokenReaderError::TokenKeyNotFound(OAUTH_TOKEN_KEY, text)),
        (_, _) => Err(TokenReaderError::TokenKeyNotFound(
            OAUTH_TOKEN_SECRET_KEY,
            text,
        )),
    }
}

mod private {
    use crate::transport::Response;

    pub trait Sealed {}
    impl Sealed for Response {}
}
