/*!
wordpress-api: a WordPress REST API client with OAuth 1.0a request signing.

# Overview

This library talks to the [WordPress REST API](https://developer.wordpress.org/rest-api/)
(and WooCommerce-style APIs that share its authentication scheme) over
[reqwest](https://crates.io/crates/reqwest).

Every call is authenticated according to the site scheme and the [`Options`]:

- `https://` sites get HTTP Basic auth with the consumer key pair, or
  `consumer_key`/`consumer_secret` query parameters when
  `query_string_auth` is set;
- `http://` sites get a full OAuth 1.0a signature (HMAC-SHA1 or PLAINTEXT),
  in the query string or an `Authorization: OAuth ...` header;
- a bearer token, preset or obtained with the OAuth2 password grant,
  overrides both.

# How to use

## Basic usecase 1 - listing posts

```ignore
use wordpress_api::{Client, Options};

let client = Client::new(
    "http://localhost:8888/wordpress",
    "[CONSUMER_KEY]",
    "[CONSUMER_SECRET]",
    Options::new(),
)?;

let resp = client.get("posts?page=2").await?;
println!("{}", resp.beautify());
```

## Basic usecase 2 - three-legged handshake

```ignore
use async_trait::async_trait;
use url::Url;
use wordpress_api::{Authorizer, Client, Options, TokenResponse};

struct Prompt;

#[async_trait]
impl Authorizer for Prompt {
    async fn authorize(&self, url: &Url, _: &TokenResponse) -> wordpress_api::Result<String> {
        println!("please access to: {}", url);
        // read the oauth_verifier from the user
        Ok(read_verifier())
    }
}

let client = Client::new(
    "http://localhost:8888/wordpress",
    "[CONSUMER_KEY]",
    "[CONSUMER_SECRET]",
    Options::new().three_legged("http://127.0.0.1/oauth1_callback"),
)?
.authorizer(Prompt);

let resp = client
    .post("posts", &serde_json::json!({ "title": "Hello, WordPress!" }))
    .await?;
```

## Signing without the client

```ignore
use http::Method;
use wordpress_api::{Credential, OAuthParameters, ParameterSet, Placement, Signer};

let secrets = Credential::new("[CONSUMER_KEY]", "[CONSUMER_SECRET]")
    .token("[ACCESS_TOKEN]", "[TOKEN_SECRET]");

let signed = Signer::new(&secrets, OAuthParameters::new()).attach_signature(
    &Method::GET,
    "http://localhost:8888/wordpress/wp-json/wp/v2/posts?page=2",
    &ParameterSet::new(),
    Placement::Header,
)?;
println!("Authorization: {}", signed.authorization.unwrap());
```
*/
mod client;
mod config;
mod credential;
mod error;
mod oauth2;
mod params;
mod request;
mod signer;
mod three_legged;
mod token_reader;
mod transport;
pub mod url_utils;

// exposed to external program
pub use client::{Client, DEFAULT_USER_AGENT};
pub use config::{OAuthVersion, Options, DEFAULT_API, DEFAULT_API_VERSION};
pub use credential::{Credential, SecretsProvider};
pub use error::{Error, Result, SignError, SignResult, TokenReaderError, TokenReaderResult};
pub use oauth2::{BearerToken, CredentialProvider, PasswordGrant, StaticCredentials};
pub use params::{flatten_params, sort_params, ParameterSet};
pub use request::{AuthStrategy, RequestDecorator};
pub use signer::{
    build_base_string, derive_signing_key, sign, OAuthParameters, Placement, SignatureMethod,
    SignedRequest, Signer,
};
pub use three_legged::{AccessToken, AuthenticationDescriptor, Authorizer, FlowState, ThreeLeggedFlow};
pub use token_reader::{TokenReader, TokenResponse};
pub use transport::{Requester, Response, Transport, TransportRequest};

// exposed constant variables
/// Represents `oauth_callback`.
pub const OAUTH_CALLBACK_KEY: &str = "oauth_callback";
/// Represents `oauth_nonce`.
pub const OAUTH_NONCE_KEY: &str = "oauth_nonce";
/// Represents `oauth_timestamp`.
pub const OAUTH_TIMESTAMP_KEY: &str = "oauth_timestamp";
/// Represents `oauth_verifier`.
pub const OAUTH_VERIFIER_KEY: &str = "oauth_verifier";
/// Represents `oauth_version`.
pub const OAUTH_VERSION_KEY: &str = "oauth_version";
/// Represents `oauth_signature`.
pub const OAUTH_SIGNATURE_KEY: &str = "oauth_signature";
/// Represents `oauth_token`.
pub const OAUTH_TOKEN_KEY: &str = "oauth_token";
/// Represents `realm`.
pub const REALM_KEY: &str = "realm";

// crate-private constant variables
pub(crate) const OAUTH_SIGNATURE_METHOD_KEY: &str = "oauth_signature_method";
pub(crate) const OAUTH_CONSUMER_KEY: &str = "oauth_consumer_key";
pub(crate) const OAUTH_TOKEN_SECRET_KEY: &str = "oauth_token_secret";
