use std::iter::FromIterator;

use crate::url_utils::encode;

/// Ordered `(name, value)` pairs sent with a request.
///
/// Names may repeat (`b[c]` can appear more than once), so this is a list
/// and not a map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterSet {
    pairs: Vec<(String, String)>,
}

impl ParameterSet {
    pub fn new() -> Self {
        Default::default()
    }

    /// Append a pair, keeping any existing pair with the same name.
    pub fn push<K, V>(&mut self, name: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.pairs.push((name.into(), value.into()));
    }

    /// Replace every pair named `name` with a single pair at the end.
    pub fn set<K, V>(&mut self, name: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        let name = name.into();
        let _ = self.remove(&name);
        self.pairs.push((name, value.into()));
    }

    /// The last value recorded for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .rev()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == name)
    }

    /// Remove every pair named `name`, returning how many were dropped.
    pub fn remove(&mut self, name: &str) -> usize {
        let before = self.pairs.len();
        self.pairs.retain(|(k, _)| k != name);
        before - self.pairs.len()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.pairs.iter().map(|(k, _)| k.as_str())
    }
}

impl<K, V> FromIterator<(K, V)> for ParameterSet
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        ParameterSet {
            pairs: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl<K, V> Extend<(K, V)> for ParameterSet
where
    K: Into<String>,
    V: Into<String>,
{
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        self.pairs
            .extend(iter.into_iter().map(|(k, v)| (k.into(), v.into())));
    }
}

impl IntoIterator for ParameterSet {
    type Item = (String, String);
    type IntoIter = std::vec::IntoIter<(String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.pairs.into_iter()
    }
}

// the part of a name before its first '[': `filter[limit]` -> `filter`
fn base_name(name: &str) -> &str {
    match name.find('[') {
        Some(i) => &name[..i],
        None => name,
    }
}

/// Order parameters for signing.
///
/// Pairs are grouped by the part of their name before the first `[` and the
/// groups are ordered lexicographically. Inside a group the insertion order
/// is kept, so `b[c]`, `b[a]`, `b[b]` sign in the order they were added.
/// WordPress and WooCommerce compute their signatures this way for array
/// parameters; flat names still come out in plain byte order.
pub fn sort_params(params: &ParameterSet) -> ParameterSet {
    let mut pairs = params.pairs.clone();
    // Vec::sort_by is stable, which keeps the in-group order
    pairs.sort_by(|(a, _), (b, _)| base_name(a).cmp(base_name(b)));
    ParameterSet { pairs }
}

/// `name=value&...` over [`sort_params`] order, both sides percent-encoded.
pub fn flatten_params(params: &ParameterSet) -> String {
    sort_params(params)
        .iter()
        .map(|(k, v)| format!("{}={}", encode(k), encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn sorted_names(keys: &[&str]) -> Vec<String> {
        let params = keys.iter().map(|k| (*k, "")).collect::<ParameterSet>();
        sort_params(&params).names().map(str::to_string).collect()
    }

    #[test]
    fn sort_flat_names() {
        assert_eq!(sorted_names(&["a", "b"]), vec!["a", "b"]);
        assert_eq!(sorted_names(&["b", "a"]), vec!["a", "b"]);
    }

    // Not RFC 5849 byte order: bracketed names keep their insertion order
    // inside the group instead of being sorted by suffix.
    #[test]
    fn sort_groups_bracketed_names() {
        assert_eq!(
            sorted_names(&["a", "b[a]", "b[b]", "b[c]", "c"]),
            vec!["a", "b[a]", "b[b]", "b[c]", "c"]
        );
        assert_eq!(
            sorted_names(&["a", "b[c]", "b[a]", "b[b]", "c"]),
            vec!["a", "b[c]", "b[a]", "b[b]", "c"]
        );
        assert_eq!(
            sorted_names(&["d", "b[c]", "b[a]", "b[b]", "c"]),
            vec!["b[c]", "b[a]", "b[b]", "c", "d"]
        );
        assert_eq!(
            sorted_names(&["a1", "b[c]", "b[a]", "b[b]", "a2"]),
            vec!["a1", "a2", "b[c]", "b[a]", "b[b]"]
        );
    }

    #[test]
    fn sort_is_idempotent() {
        let params = vec![
            ("d", "1"),
            ("b[c]", "2"),
            ("b[a]", "3"),
            ("c", "4"),
            ("b[c]", "5"),
            ("a", "6"),
        ]
        .into_iter()
        .collect::<ParameterSet>();
        let once = sort_params(&params);
        assert_eq!(sort_params(&once), once);
    }

    #[test]
    fn sort_keeps_duplicates() {
        let params = vec![("b[c]", "1"), ("a", "x"), ("b[c]", "2")]
            .into_iter()
            .collect::<ParameterSet>();
        let sorted = sort_params(&params);
        assert_eq!(
            sorted.iter().collect::<Vec<_>>(),
            vec![("a", "x"), ("b[c]", "1"), ("b[c]", "2")]
        );
    }

    // Repeated flat names are not ordered by value as RFC 5849 asks.
    #[test]
    fn duplicate_flat_names_keep_insertion_order() {
        let params = vec![("a3", "a"), ("a2", "r b"), ("a3", "2 q")]
            .into_iter()
            .collect::<ParameterSet>();
        assert_eq!(flatten_params(&params), "a2=r%20b&a3=a&a3=2%20q");
    }

    #[test]
    fn flatten_twitter_params() {
        let params = vec![
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
        ]
        .into_iter()
        .collect::<ParameterSet>();
        let flattened = flatten_params(&params);
        assert_eq!(
            flattened,
            "include_entities=true&oauth_consumer_key=xvz1evFS4wEEPTGEFPHBog&oauth_nonce=kYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg&oauth_signature_method=HMAC-SHA1&oauth_timestamp=1318622958&oauth_token=370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb&oauth_version=1.0&status=Hello%20Ladies%20%2B%20Gentlemen%2C%20a%20signed%20OAuth%20request%21"
        );
        assert!(!flattened.contains(' '));
        assert!(!flattened.contains('+'));
    }

    #[test]
    fn set_replaces_all_duplicates() {
        let mut params = vec![("a", "1"), ("b", "2"), ("a", "3")]
            .into_iter()
            .collect::<ParameterSet>();
        params.set("a", "4");
        assert_eq!(params.len(), 2);
        assert_eq!(params.get("a"), Some("4"));
        assert_eq!(params.remove("missing"), 0);
    }
}
