use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use hmac::{Hmac, Mac};
use http::Method;
use log::{debug, warn};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::Deserialize;
use sha1::Sha1;
use url::Url;

use crate::params::{flatten_params, sort_params, ParameterSet};
use crate::url_utils::encode;
use crate::{
    SecretsProvider, SignError, SignResult, OAUTH_CALLBACK_KEY, OAUTH_CONSUMER_KEY,
    OAUTH_NONCE_KEY, OAUTH_SIGNATURE_KEY, OAUTH_SIGNATURE_METHOD_KEY, OAUTH_TIMESTAMP_KEY,
    OAUTH_TOKEN_KEY, OAUTH_VERIFIER_KEY, OAUTH_VERSION_KEY, REALM_KEY,
};

type HmacSha1 = Hmac<Sha1>;

const OAUTH_VERSION: &str = "1.0";
const NONCE_LENGTH: usize = 32;

/// `oauth_signature_method` values this crate can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum SignatureMethod {
    #[serde(rename = "HMAC-SHA1")]
    HmacSha1,
    #[serde(rename = "PLAINTEXT")]
    Plaintext,
}

impl SignatureMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignatureMethod::HmacSha1 => "HMAC-SHA1",
            SignatureMethod::Plaintext => "PLAINTEXT",
        }
    }
}

impl Default for SignatureMethod {
    fn default() -> Self {
        SignatureMethod::HmacSha1
    }
}

impl fmt::Display for SignatureMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignatureMethod {
    type Err = SignError;

    fn from_str(s: &str) -> SignResult<Self> {
        match s {
            "HMAC-SHA1" => Ok(SignatureMethod::HmacSha1),
            "PLAINTEXT" => Ok(SignatureMethod::Plaintext),
            other => Err(SignError::UnsupportedAlgorithm(other.to_string())),
        }
    }
}

/// Where the signed `oauth_*` parameters travel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Placement {
    /// Appended to the URL query string.
    Query,
    /// Rendered into an `Authorization: OAuth ...` header value.
    Header,
}

impl Default for Placement {
    fn default() -> Self {
        Placement::Query
    }
}

/// `METHOD&encoded_url&encoded_params`, as defined by RFC 5849 section 3.4.1.
///
/// The query and fragment of `url` are dropped; pass query parameters in
/// `params`. An `oauth_signature` entry is never part of the base string.
pub fn build_base_string(method: &Method, params: &ParameterSet, url: &Url) -> String {
    let mut base_url = url.clone();
    base_url.set_query(None);
    base_url.set_fragment(None);

    let signed = params
        .iter()
        .filter(|(k, _)| *k != OAUTH_SIGNATURE_KEY)
        .collect::<ParameterSet>();

    format!(
        "{}&{}&{}",
        method.as_str().to_uppercase(),
        encode(base_url.as_str()),
        encode(&flatten_params(&signed))
    )
}

/// `encode(consumer_secret)&encode(token_secret)`; the `&` is always present.
pub fn derive_signing_key(consumer_secret: &str, token_secret: &str) -> String {
    format!("{}&{}", encode(consumer_secret), encode(token_secret))
}

/// Compute `oauth_signature` for the request.
///
/// # Errors
///
/// Fails with [`SignError::InvalidKey`] when the MAC rejects the key.
pub fn sign(
    method: &Method,
    params: &ParameterSet,
    url: &Url,
    signing_key: &str,
    signature_method: SignatureMethod,
) -> SignResult<String> {
    match signature_method {
        SignatureMethod::HmacSha1 => {
            let base_string = build_base_string(method, params, url);
            debug!("signature base string: {}", base_string);
            let mut mac = HmacSha1::new_from_slice(signing_key.as_bytes())
                .map_err(|e| SignError::InvalidKey(e.to_string()))?;
            mac.update(base_string.as_bytes());
            Ok(BASE64_STANDARD.encode(mac.finalize().into_bytes()))
        }
        SignatureMethod::Plaintext => Ok(signing_key.to_string()),
    }
}

fn generate_nonce() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(NONCE_LENGTH)
        .map(char::from)
        .collect()
}

fn generate_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// Per-request OAuth settings.
///
/// `nonce` and `timestamp` are fresh for every request unless forced, which
/// is only meant for reproducing known signatures in tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthParameters {
    callback: Option<String>,
    nonce: Option<String>,
    realm: Option<String>,
    signature_method: SignatureMethod,
    timestamp: Option<u64>,
    verifier: Option<String>,
    version: bool,
}

impl Default for OAuthParameters {
    fn default() -> Self {
        OAuthParameters {
            callback: None,
            nonce: None,
            realm: None,
            signature_method: SignatureMethod::HmacSha1,
            timestamp: None,
            verifier: None,
            version: true,
        }
    }
}

impl OAuthParameters {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn callback<T>(self, callback: T) -> Self
    where
        T: Into<String>,
    {
        OAuthParameters {
            callback: Some(callback.into()),
            ..self
        }
    }

    /// Force the oauth_nonce value.
    pub fn nonce<T>(self, nonce: T) -> Self
    where
        T: Into<String>,
    {
        OAuthParameters {
            nonce: Some(nonce.into()),
            ..self
        }
    }

    /// Set the realm rendered in the Authorization header. It is never signed.
    pub fn realm<T>(self, realm: T) -> Self
    where
        T: Into<String>,
    {
        OAuthParameters {
            realm: Some(realm.into()),
            ..self
        }
    }

    pub fn signature_method(self, signature_method: SignatureMethod) -> Self {
        OAuthParameters {
            signature_method,
            ..self
        }
    }

    /// Force the oauth_timestamp value.
    pub fn timestamp<T>(self, timestamp: T) -> Self
    where
        T: Into<u64>,
    {
        OAuthParameters {
            timestamp: Some(timestamp.into()),
            ..self
        }
    }

    pub fn verifier<T>(self, verifier: T) -> Self
    where
        T: Into<String>,
    {
        OAuthParameters {
            verifier: Some(verifier.into()),
            ..self
        }
    }

    /// Whether `oauth_version=1.0` is sent. Defaults to `true`.
    pub fn version(self, version: bool) -> Self {
        OAuthParameters { version, ..self }
    }

    pub fn get_signature_method(&self) -> SignatureMethod {
        self.signature_method
    }
}

/// Outcome of [`Signer::attach_signature`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    /// Target URL. Carries the `oauth_*` parameters in query placement.
    pub url: Url,
    /// `OAuth ...` header value in header placement.
    pub authorization: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Signer<'a, TSecretsProvider>
where
    TSecretsProvider: SecretsProvider,
{
    secrets: &'a TSecretsProvider,
    parameters: OAuthParameters,
}

impl<'a, TSecretsProvider> Signer<'a, TSecretsProvider>
where
    TSecretsProvider: SecretsProvider,
{
    pub fn new(secrets: &'a TSecretsProvider, parameters: OAuthParameters) -> Self {
        Signer {
            secrets,
            parameters,
        }
    }

    /// Sign a request and place the result per `placement`.
    ///
    /// Query parameters already on `url` are signed and kept as they are.
    /// `params` holds additional signed parameters that travel elsewhere,
    /// typically a form body; they are not written into the URL.
    ///
    /// # Errors
    ///
    /// Fails when the consumer key or secret is empty or `url` is not an
    /// absolute URL.
    pub fn attach_signature(
        &self,
        method: &Method,
        url: &str,
        params: &ParameterSet,
        placement: Placement,
    ) -> SignResult<SignedRequest> {
        let (consumer_key, consumer_secret) = self.secrets.get_consumer_key_pair();
        if consumer_key.is_empty() {
            return Err(SignError::MissingCredential("consumer_key"));
        }
        if consumer_secret.is_empty() {
            return Err(SignError::MissingCredential("consumer_secret"));
        }
        let mut url = Url::parse(url).map_err(|_| SignError::InvalidUrl(url.to_string()))?;

        let oauth_params = self.oauth_params(consumer_key);

        let mut signed = url.query_pairs().into_owned().collect::<ParameterSet>();
        signed.extend(params.iter());
        if signed.remove(OAUTH_SIGNATURE_KEY) > 0 {
            warn!("dropping stale oauth_signature from {}", url);
        }
        for (key, value) in oauth_params.iter() {
            signed.set(key, value);
        }

        let (_, token_secret) = self.secrets.get_token_option_pair();
        let signing_key = derive_signing_key(consumer_secret, token_secret.unwrap_or_default());
        let signature = sign(
            method,
            &signed,
            &url,
            &signing_key,
            self.parameters.signature_method,
        )?;

        let mut query = retained_query(&url, &oauth_params);
        match placement {
            Placement::Query => {
                query.extend(
                    sort_params(&oauth_params)
                        .iter()
                        .chain(std::iter::once((OAUTH_SIGNATURE_KEY, signature.as_str())))
                        .map(|(k, v)| format!("{}={}", encode(k), encode(v))),
                );
                url.set_query(Some(&query.join("&")));
                Ok(SignedRequest {
                    url,
                    authorization: None,
                })
            }
            Placement::Header => {
                let joined = query.join("&");
                url.set_query(if joined.is_empty() {
                    None
                } else {
                    Some(&joined)
                });
                Ok(SignedRequest {
                    url,
                    authorization: Some(self.authorization_header(&oauth_params, &signature)),
                })
            }
        }
    }

    fn oauth_params(&self, consumer_key: &str) -> ParameterSet {
        let p = &self.parameters;
        let mut params = ParameterSet::new();
        params.push(OAUTH_CONSUMER_KEY, consumer_key);
        params.push(
            OAUTH_NONCE_KEY,
            p.nonce.clone().unwrap_or_else(generate_nonce),
        );
        params.push(OAUTH_SIGNATURE_METHOD_KEY, p.signature_method.as_str());
        params.push(
            OAUTH_TIMESTAMP_KEY,
            p.timestamp.unwrap_or_else(generate_timestamp).to_string(),
        );
        if p.version {
            params.push(OAUTH_VERSION_KEY, OAUTH_VERSION);
        }
        if let Some((token, _)) = self.secrets.get_token_pair_option() {
            params.push(OAUTH_TOKEN_KEY, token);
        }
        if let Some(ref callback) = p.callback {
            params.push(OAUTH_CALLBACK_KEY, callback.as_str());
        }
        if let Some(ref verifier) = p.verifier {
            params.push(OAUTH_VERIFIER_KEY, verifier.as_str());
        }
        params
    }

    fn authorization_header(&self, oauth_params: &ParameterSet, signature: &str) -> String {
        let realm = self
            .parameters
            .realm
            .as_ref()
            .map(|realm| format!("{}=\"{}\"", REALM_KEY, encode(realm)));
        let pairs = sort_params(oauth_params)
            .iter()
            .chain(std::iter::once((OAUTH_SIGNATURE_KEY, signature)))
            .map(|(k, v)| format!("{}=\"{}\"", encode(k), encode(v)))
            .collect::<Vec<_>>();
        let items = realm.into_iter().chain(pairs).collect::<Vec<_>>();
        format!("OAuth {}", items.join(", "))
    }
}

// raw `k=v` segments of the current query that the signer does not overwrite
fn retained_query(url: &Url, oauth_params: &ParameterSet) -> Vec<String> {
    url.query()
        .unwrap_or_default()
        .split('&')
        .filter(|segment| !segment.is_empty())
        .filter(|segment| {
            let key = url::form_urlencoded::parse(segment.as_bytes())
                .next()
                .map(|(k, _)| k.into_owned())
                .unwrap_or_default();
            key != OAUTH_SIGNATURE_KEY && !oauth_params.contains(&key)
        })
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::Credential;

    fn extract_signature(auth_header: &str) -> String {
        let content = auth_header.strip_prefix("OAuth ").unwrap();
        let sig_content = content
            .split(", ")
            .filter_map(|item| item.split_once('='))
            .find(|(k, _)| k == &OAUTH_SIGNATURE_KEY)
            .unwrap()
            .1;
        percent_encoding::percent_decode_str(sig_content.trim_matches('"'))
            .decode_utf8_lossy()
            .to_string()
    }

    fn pairs(items: &[(&str, &str)]) -> ParameterSet {
        items.iter().cloned().collect()
    }

    fn twitter_params() -> ParameterSet {
        pairs(&[
            ("status", "Hello Ladies + Gentlemen, a signed OAuth request!"),
            ("include_entities", "true"),
            ("oauth_consumer_key", "xvz1evFS4wEEPTGEFPHBog"),
            ("oauth_nonce", "kYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg"),
            ("oauth_signature_method", "HMAC-SHA1"),
            ("oauth_timestamp", "1318622958"),
            (
                "oauth_token",
                "370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb",
            ),
            ("oauth_version", "1.0"),
        ])
    }

    #[test]
    fn signing_key_keeps_separator() {
        assert_eq!(
            derive_signing_key("cs_b11f652c39a0afd3752fc7bb0c56d60d58da5877", ""),
            "cs_b11f652c39a0afd3752fc7bb0c56d60d58da5877&"
        );
        assert_eq!(
            derive_signing_key(
                "kAcSOqF21Fu85e7zjz7ZN2U4ZRhfV3WpwPAoE3Z7kBw",
                "LswwdoUaIvS8ltyTt5jkRh4J50vUPVVHtR2YPi5kE"
            ),
            "kAcSOqF21Fu85e7zjz7ZN2U4ZRhfV3WpwPAoE3Z7kBw&LswwdoUaIvS8ltyTt5jkRh4J50vUPVVHtR2YPi5kE"
        );
        assert_eq!(derive_signing_key("a b", "c&d"), "a%20b&c%26d");
    }

    #[test]
    fn base_string_twitter() {
        let url = Url::parse("https://api.twitter.com/1/statuses/update.json?include_entities=true")
            .unwrap();
        assert_eq!(
            build_base_string(&Method::POST, &twitter_params(), &url),
            "POST&https%3A%2F%2Fapi.twitter.com%2F1%2Fstatuses%2Fupdate.json&include_entities%3Dtrue%26oauth_consumer_key%3Dxvz1evFS4wEEPTGEFPHBog%26oauth_nonce%3DkYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg%26oauth_signature_method%3DHMAC-SHA1%26oauth_timestamp%3D1318622958%26oauth_token%3D370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb%26oauth_version%3D1.0%26status%3DHello%2520Ladies%2520%252B%2520Gentlemen%252C%2520a%2520signed%2520OAuth%2520request%2521"
        );
    }

    #[test]
    fn base_string_ignores_signature_param() {
        let url = Url::parse("http://woo.test/wp-json").unwrap();
        let mut params = pairs(&[("a", "1")]);
        let without = build_base_string(&Method::GET, &params, &url);
        params.push(OAUTH_SIGNATURE_KEY, "stale");
        assert_eq!(build_base_string(&Method::GET, &params, &url), without);
    }

    #[test]
    fn sign_twitter_vector() {
        let url = Url::parse("https://api.twitter.com/1/statuses/update.json?include_entities=true")
            .unwrap();
        let key = "kAcSOqF21Fu85e7zjz7ZN2U4ZRhfV3WpwPAoE3Z7kBw&LswwdoUaIvS8ltyTt5jkRh4J50vUPVVHtR2YPi5kE";
        assert_eq!(
            sign(&Method::POST, &twitter_params(), &url, key, SignatureMethod::HmacSha1).unwrap(),
            "tnnArxj06cWHq44gCs1OSKk/jLY="
        );
    }

    #[test]
    fn sign_rfc5849_initiate_vector() {
        // https://tools.ietf.org/html/rfc5849#section-1.2
        let url = Url::parse("https://photos.example.net/initiate").unwrap();
        let params = pairs(&[
            ("oauth_consumer_key", "dpf43f3p2l4k3l03"),
            ("oauth_signature_method", "HMAC-SHA1"),
            ("oauth_timestamp", "137131200"),
            ("oauth_nonce", "wIjqoS"),
            ("oauth_callback", "http://printer.example.com/ready"),
        ]);
        let key = derive_signing_key("kd94hf93k423kf44", "");
        assert_eq!(
            sign(&Method::POST, &params, &url, &key, SignatureMethod::HmacSha1).unwrap(),
            "74KNZJeDHnMBp0EMJ9ZHt/XKycU="
        );
    }

    #[test]
    fn sign_plaintext_is_key() {
        let url = Url::parse("https://photos.example.net/initiate").unwrap();
        let key = derive_signing_key("kd94hf93k423kf44", "pfkkdhi9sl3r4s00");
        assert_eq!(
            sign(&Method::GET, &ParameterSet::new(), &url, &key, SignatureMethod::Plaintext).unwrap(),
            "kd94hf93k423kf44&pfkkdhi9sl3r4s00"
        );
    }

    #[test]
    fn sign_accepts_any_key_length() {
        let url = Url::parse("http://woo.test/wp-json").unwrap();
        let long_key = "k".repeat(200);
        for key in &["", "&", long_key.as_str()] {
            let signature =
                sign(&Method::GET, &ParameterSet::new(), &url, key, SignatureMethod::HmacSha1)
                    .unwrap();
            assert_eq!(signature.len(), 28);
        }
    }

    #[test]
    fn signature_method_names() {
        assert_eq!(
            "HMAC-SHA1".parse::<SignatureMethod>(),
            Ok(SignatureMethod::HmacSha1)
        );
        assert_eq!(
            "PLAINTEXT".parse::<SignatureMethod>(),
            Ok(SignatureMethod::Plaintext)
        );
        assert_eq!(
            "RSA-SHA1".parse::<SignatureMethod>(),
            Err(SignError::UnsupportedAlgorithm("RSA-SHA1".to_string()))
        );
    }

    #[test]
    fn attach_header_rfc5849_initiate() {
        let secrets = Credential::new("dpf43f3p2l4k3l03", "kd94hf93k423kf44");
        let params = OAuthParameters::new()
            .nonce("wIjqoS")
            .timestamp(137_131_200u64)
            .callback("http://printer.example.com/ready")
            .realm("photos")
            .version(false);

        let signed = Signer::new(&secrets, params)
            .attach_signature(
                &Method::POST,
                "https://photos.example.net/initiate",
                &ParameterSet::new(),
                Placement::Header,
            )
            .unwrap();

        let header = signed.authorization.unwrap();
        assert!(header.starts_with("OAuth realm=\"photos\", oauth_callback="));
        assert_eq!(extract_signature(&header), "74KNZJeDHnMBp0EMJ9ZHt/XKycU=");
        assert_eq!(signed.url.as_str(), "https://photos.example.net/initiate");
    }

    #[test]
    fn attach_header_rfc5849_get_keeps_query() {
        let secrets = Credential::new("dpf43f3p2l4k3l03", "kd94hf93k423kf44")
            .token("nnch734d00sl2jdk", "pfkkdhi9sl3r4s00");
        let params = OAuthParameters::new()
            .nonce("chapoH")
            .timestamp(137_131_202u64)
            .realm("Photos")
            .version(false);

        let signed = Signer::new(&secrets, params)
            .attach_signature(
                &Method::GET,
                "http://photos.example.net/photos?file=vacation.jpg&size=original",
                &ParameterSet::new(),
                Placement::Header,
            )
            .unwrap();

        assert_eq!(
            extract_signature(signed.authorization.as_deref().unwrap()),
            "MdpQcU8iPSUjWoN/UDMsK2sui9I="
        );
        assert_eq!(signed.url.query(), Some("file=vacation.jpg&size=original"));
    }

    #[test]
    fn attach_header_twitter_body_params() {
        // https://developer.twitter.com/en/docs/authentication/oauth-1-0a/creating-a-signature
        let secrets = Credential::new(
            "xvz1evFS4wEEPTGEFPHBog",
            "kAcSOqF21Fu85e7zjz7ZN2U4ZRhfV3WpwPAoE3Z7kBw",
        )
        .token(
            "370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb",
            "LswwdoUaIvS8ltyTt5jkRh4J50vUPVVHtR2YPi5kE",
        );
        let params = OAuthParameters::new()
            .nonce("kYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg")
            .timestamp(1_318_622_958u64);
        let body = pairs(&[
            ("include_entities", "true"),
            ("status", "Hello Ladies + Gentlemen, a signed OAuth request!"),
        ]);

        let signed = Signer::new(&secrets, params)
            .attach_signature(
                &Method::POST,
                "https://api.twitter.com/1.1/statuses/update.json",
                &body,
                Placement::Header,
            )
            .unwrap();

        assert_eq!(
            extract_signature(signed.authorization.as_deref().unwrap()),
            "hCtSmYh+iHYCEqBWrE7C7hYmtUk="
        );
        assert_eq!(signed.url.query(), None);
    }

    #[test]
    fn attach_query_bitbucket_request_token() {
        let secrets = Credential::new("your_app_key", "your_app_secret");
        let params = OAuthParameters::new()
            .nonce("27718007815082439851427366369")
            .timestamp(1_427_366_369u64)
            .callback("http://127.0.0.1/oauth1_callback");

        let signed = Signer::new(&secrets, params)
            .attach_signature(
                &Method::POST,
                "https://bitbucket.org/api/1.0/oauth/request_token",
                &ParameterSet::new(),
                Placement::Query,
            )
            .unwrap();

        assert_eq!(signed.authorization, None);
        let query = signed.url.query().unwrap();
        assert!(query.ends_with("&oauth_signature=iPdHNIu4NGOjuXZ%2BYCdPWaRwvJY%3D"));
        assert!(query.starts_with(
            "oauth_callback=http%3A%2F%2F127.0.0.1%2Foauth1_callback&oauth_consumer_key=your_app_key"
        ));
    }

    #[test]
    fn attach_query_keeps_existing_params() {
        let secrets = Credential::new(
            "ck_681c2be361e415519dce4b65ee981682cda78bc6",
            "cs_b11f652c39a0afd3752fc7bb0c56d60d58da5877",
        );
        let params = OAuthParameters::new()
            .nonce("166182658461433445531477041328")
            .timestamp(1_477_041_328u64);

        let signed = Signer::new(&secrets, params)
            .attach_signature(
                &Method::GET,
                "http://localhost:8888/wordpress/wc-api/v3/products?page=2&filter%5Blimit%5D=2&oauth_signature=stale",
                &ParameterSet::new(),
                Placement::Query,
            )
            .unwrap();

        let query = signed.url.query().unwrap();
        assert!(query.starts_with("page=2&filter%5Blimit%5D=2&oauth_consumer_key="));
        assert!(!query.contains("stale"));
        assert_eq!(query.matches("oauth_signature=").count(), 1);
        assert!(query
            .rsplit('&')
            .next()
            .unwrap()
            .starts_with("oauth_signature="));
    }

    #[test]
    fn attach_query_signature_matches_recomputation() {
        let secrets = Credential::new("key", "secret").token("tok", "tok_secret");
        let signed = Signer::new(&secrets, OAuthParameters::new())
            .attach_signature(
                &Method::PUT,
                "http://woo.test/wp-json/wp/v2/posts/1?filter%5Bb%5D=2&filter%5Ba%5D=1",
                &ParameterSet::new(),
                Placement::Query,
            )
            .unwrap();

        let mut params = signed.url.query_pairs().into_owned().collect::<ParameterSet>();
        let signature = params.get(OAUTH_SIGNATURE_KEY).unwrap().to_string();
        let _ = params.remove(OAUTH_SIGNATURE_KEY);
        assert_eq!(params.get(OAUTH_TOKEN_KEY), Some("tok"));
        assert_eq!(params.get(OAUTH_VERSION_KEY), Some("1.0"));
        assert_eq!(params.get(OAUTH_NONCE_KEY).map(str::len), Some(NONCE_LENGTH));

        let expected = sign(
            &Method::PUT,
            &params,
            &signed.url,
            &derive_signing_key("secret", "tok_secret"),
            SignatureMethod::HmacSha1,
        )
        .unwrap();
        assert_eq!(signature, expected);
    }

    #[test]
    fn attach_fresh_nonce_per_request() {
        let secrets = Credential::new("key", "secret");
        let signer = Signer::new(&secrets, OAuthParameters::new());
        let nonce = |signer: &Signer<'_, Credential>| {
            let signed = signer
                .attach_signature(&Method::GET, "http://woo.test/", &ParameterSet::new(), Placement::Query)
                .unwrap();
            signed
                .url
                .query_pairs()
                .find(|(k, _)| k == OAUTH_NONCE_KEY)
                .map(|(_, v)| v.into_owned())
                .unwrap()
        };
        assert_ne!(nonce(&signer), nonce(&signer));
    }

    #[test]
    fn attach_rejects_missing_credentials() {
        let empty_key = Credential::new("", "secret");
        let err = Signer::new(&empty_key, OAuthParameters::new())
            .attach_signature(&Method::GET, "http://woo.test/", &ParameterSet::new(), Placement::Query)
            .unwrap_err();
        assert_eq!(err, SignError::MissingCredential("consumer_key"));

        let empty_secret = Credential::new("key", "");
        let err = Signer::new(&empty_secret, OAuthParameters::new())
            .attach_signature(&Method::GET, "http://woo.test/", &ParameterSet::new(), Placement::Query)
            .unwrap_err();
        assert_eq!(err, SignError::MissingCredential("consumer_secret"));
    }

    #[test]
    fn attach_rejects_relative_url() {
        let secrets = Credential::new("key", "secret");
        let err = Signer::new(&secrets, OAuthParameters::new())
            .attach_signature(&Method::GET, "/wp-json", &ParameterSet::new(), Placement::Query)
            .unwrap_err();
        assert_eq!(err, SignError::InvalidUrl("/wp-json".to_string()));
    }
}
