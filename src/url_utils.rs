use std::borrow::Cow;
use std::collections::BTreeMap;

use percent_encoding::{percent_encode, AsciiSet, NON_ALPHANUMERIC};
use url::Url;

use crate::{Error, Result};

/// Characters left untouched by the OAuth flavour of percent-encoding:
/// `A-Z a-z 0-9 - . _ ~` (RFC 3986 unreserved set).
const OAUTH_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Percent-encode per RFC 3986. A space becomes `%20`, never `+`.
pub fn encode(input: &str) -> Cow<'_, str> {
    percent_encode(input.as_bytes(), OAUTH_ENCODE_SET).into()
}

/// Returns `true` when the URL uses the TLS variant of HTTP.
pub fn is_secure(url: &str) -> bool {
    Url::parse(url)
        .map(|u| u.scheme().eq_ignore_ascii_case("https"))
        .unwrap_or(false)
}

/// Join URL path components with exactly one `/` between them.
///
/// Blank components are dropped; leading and trailing slashes on each
/// component are collapsed. The first component keeps its leading part
/// untouched so that `https://host/` stays a valid prefix.
pub fn join_path_components<I, S>(parts: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut joined = String::new();
    for part in parts {
        let part = part.as_ref().trim();
        let part = if joined.is_empty() {
            part.trim_end_matches('/')
        } else {
            part.trim_matches('/')
        };
        if part.is_empty() {
            continue;
        }
        if !joined.is_empty() {
            joined.push('/');
        }
        joined.push_str(part);
    }
    joined
}

/// Stringify a value the way PHP does when it lands in a query string.
pub fn php_like_stringify<V: Into<PhpValue>>(value: V) -> String {
    match value.into() {
        PhpValue::Bool(true) => "1".to_string(),
        PhpValue::Bool(false) => String::new(),
        PhpValue::Int(i) => i.to_string(),
        PhpValue::Float(f) if f.is_finite() && f.fract() == 0.0 => format!("{:.0}", f),
        PhpValue::Float(f) => f.to_string(),
        PhpValue::Str(s) => s,
    }
}

/// A scalar accepted by [`php_like_stringify`].
#[derive(Debug, Clone, PartialEq)]
pub enum PhpValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl From<bool> for PhpValue {
    fn from(v: bool) -> Self {
        PhpValue::Bool(v)
    }
}

impl From<i32> for PhpValue {
    fn from(v: i32) -> Self {
        PhpValue::Int(v.into())
    }
}

impl From<i64> for PhpValue {
    fn from(v: i64) -> Self {
        PhpValue::Int(v)
    }
}

impl From<u32> for PhpValue {
    fn from(v: u32) -> Self {
        PhpValue::Int(v.into())
    }
}

impl From<f64> for PhpValue {
    fn from(v: f64) -> Self {
        PhpValue::Float(v)
    }
}

impl From<&str> for PhpValue {
    fn from(v: &str) -> Self {
        PhpValue::Str(v.to_string())
    }
}

impl From<String> for PhpValue {
    fn from(v: String) -> Self {
        PhpValue::Str(v)
    }
}

// splits `url` into (before query, query, fragment suffix incl. '#')
fn split_url(url: &str) -> (&str, Option<&str>, &str) {
    let (rest, fragment) = match url.find('#') {
        Some(i) => (&url[..i], &url[i..]),
        None => (url, ""),
    };
    match rest.find('?') {
        Some(i) => (&rest[..i], Some(&rest[i + 1..]), fragment),
        None => (rest, None, fragment),
    }
}

/// The query of `url` decoded into a key/value mapping; the last value wins
/// when a key repeats.
pub fn query_dict_singular(url: &str) -> BTreeMap<String, String> {
    let (_, query, _) = split_url(url);
    url::form_urlencoded::parse(query.unwrap_or_default().as_bytes())
        .into_owned()
        .collect()
}

/// The value of `key` in the query of `url`.
///
/// # Errors
///
/// Fails with [`Error::KeyNotFound`] when the key is absent.
pub fn get_singular(url: &str, key: &str) -> Result<String> {
    query_dict_singular(url)
        .remove(key)
        .ok_or_else(|| Error::KeyNotFound(key.to_string()))
}

/// Set `key` to `value`, collapsing any repeats of `key` into one entry.
pub fn set_singular(url: &str, key: &str, value: &str) -> String {
    let mut dict = query_dict_singular(url);
    let _ = dict.insert(key.to_string(), value.to_string());
    substitute_query(url, Some(&serialize_singular(&dict)))
}

/// Remove every occurrence of `key`.
pub fn delete_singular(url: &str, key: &str) -> String {
    let mut dict = query_dict_singular(url);
    let _ = dict.remove(key);
    substitute_query(url, Some(&serialize_singular(&dict)))
}

/// Replace the query of `url`, or strip it when `query` is `None` or empty.
pub fn substitute_query(url: &str, query: Option<&str>) -> String {
    let (base, _, fragment) = split_url(url);
    match query {
        Some(q) if !q.is_empty() => format!("{}?{}{}", base, q, fragment),
        _ => format!("{}{}", base, fragment),
    }
}

/// Append one `key=value` pair, leaving the existing query as it is.
pub fn add_query(url: &str, key: &str, value: &str) -> String {
    let (_, query, _) = split_url(url);
    let pair = format!("{}={}", encode(key), encode(value));
    match query {
        Some(q) if !q.is_empty() => substitute_query(url, Some(&format!("{}&{}", q, pair))),
        _ => substitute_query(url, Some(&pair)),
    }
}

fn serialize_singular(dict: &BTreeMap<String, String>) -> String {
    dict.iter()
        .map(|(k, v)| format!("{}={}", encode(k), encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}
