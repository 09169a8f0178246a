use std::borrow::Cow;

use async_trait::async_trait;
use http::{HeaderMap, Method, StatusCode};
use log::trace;
use serde::de::DeserializeOwned;
use url::Url;

use crate::url_utils::{is_secure, join_path_components};
use crate::Result;

/// Everything the transport needs to put one request on the wire.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    /// Extra query pairs appended to `url` by the transport.
    pub query: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
    /// HTTP Basic credentials for the transport to encode.
    pub basic_auth: Option<(String, String)>,
}

impl TransportRequest {
    pub fn new(method: Method, url: Url) -> Self {
        TransportRequest {
            method,
            url,
            headers: HeaderMap::new(),
            query: Vec::new(),
            body: None,
            basic_auth: None,
        }
    }
}

/// What came back, together with the request line that produced it.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
    pub url: Url,
    pub method: Method,
}

impl Response {
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// The body, pretty-printed when it is JSON.
    pub fn beautify(&self) -> String {
        serde_json::from_slice::<serde_json::Value>(&self.body)
            .ok()
            .and_then(|value| serde_json::to_string_pretty(&value).ok())
            .unwrap_or_else(|| self.text().into_owned())
    }
}

/// Executes HTTP requests on behalf of the client.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: TransportRequest) -> Result<Response>;
}

#[async_trait]
impl Transport for reqwest::Client {
    async fn execute(&self, request: TransportRequest) -> Result<Response> {
        trace!("{} {}", request.method, request.url);
        let mut builder = self
            .request(request.method.clone(), request.url)
            .headers(request.headers);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some((username, password)) = request.basic_auth {
            builder = builder.basic_auth(username, Some(password));
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let url = response.url().clone();
        let body = response.bytes().await?.to_vec();
        Ok(Response {
            status,
            headers,
            body,
            url,
            method: request.method,
        })
    }
}

/// Maps endpoint names onto URLs below the API root of one site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requester {
    url: String,
    api: String,
    api_version: String,
}

impl Requester {
    pub fn new<U, A, V>(url: U, api: A, api_version: V) -> Self
    where
        U: Into<String>,
        A: Into<String>,
        V: Into<String>,
    {
        Requester {
            url: url.into(),
            api: api.into(),
            api_version: api_version.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn is_ssl(&self) -> bool {
        is_secure(&self.url)
    }

    /// Root of the REST API, which also serves the discovery document.
    pub fn api_url(&self) -> Result<Url> {
        Ok(Url::parse(&join_path_components(&[
            self.url.as_str(),
            self.api.as_str(),
        ]))?)
    }

    /// `endpoint` may carry its own query, e.g. `products?page=2`.
    pub fn endpoint_url(&self, endpoint: &str) -> Result<Url> {
        Ok(Url::parse(&join_path_components(&[
            self.url.as_str(),
            self.api.as_str(),
            self.api_version.as_str(),
            endpoint,
        ]))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn requester() -> Requester {
        Requester::new("https://woo.test:8888/", "wp-json", "wp/v2")
    }

    #[test]
    fn api_url() {
        assert_eq!(
            requester().api_url().unwrap().as_str(),
            "https://woo.test:8888/wp-json"
        );
    }

    #[test]
    fn endpoint_url() {
        assert_eq!(
            requester().endpoint_url("posts").unwrap().as_str(),
            "https://woo.test:8888/wp-json/wp/v2/posts"
        );
        assert_eq!(
            requester().endpoint_url("products?page=2").unwrap().as_str(),
            "https://woo.test:8888/wp-json/wp/v2/products?page=2"
        );
    }

    #[test]
    fn endpoint_url_without_namespace() {
        let requester = Requester::new("https://photos.example.net/", "", "");
        assert_eq!(
            requester.endpoint_url("initiate").unwrap().as_str(),
            "https://photos.example.net/initiate"
        );
    }

    #[test]
    fn ssl_follows_scheme() {
        assert!(requester().is_ssl());
        assert!(!Requester::new("http://woo.test", "wp-json", "wp/v2").is_ssl());
    }

    #[test]
    fn invalid_base_url() {
        let requester = Requester::new("woo.test", "wp-json", "wp/v2");
        assert!(requester.endpoint_url("posts").is_err());
    }

    #[test]
    fn beautify_json_body() {
        let response = Response {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: br#"{"a":1}"#.to_vec(),
            url: Url::parse("http://woo.test/").unwrap(),
            method: Method::GET,
        };
        assert_eq!(response.beautify(), "{\n  \"a\": 1\n}");

        let response = Response {
            body: b"plain".to_vec(),
            ..response
        };
        assert_eq!(response.beautify(), "plain");
    }
}
