use std::fmt;

/// Source of the consumer key pair and, once a token has been issued, the
/// token pair used to sign requests.
pub trait SecretsProvider {
    fn get_consumer_key_pair(&self) -> (&str, &str);

    fn get_token_pair_option(&self) -> Option<(&str, &str)>;

    fn get_token_option_pair(&self) -> (Option<&str>, Option<&str>) {
        self.get_token_pair_option()
            .map(|s| (Some(s.0), Some(s.1)))
            .unwrap_or((None, None))
    }
}

/// Consumer key/secret plus an optional token/token-secret pair.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    consumer_key: String,
    consumer_secret: String,
    token: Option<(String, String)>,
}

impl Credential {
    pub fn new<TKey, TSecret>(consumer_key: TKey, consumer_secret: TSecret) -> Self
    where
        TKey: Into<String>,
        TSecret: Into<String>,
    {
        Credential {
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
            token: None,
        }
    }

    /// Attach a token pair, replacing any previous one.
    pub fn token<TKey, TSecret>(self, token: TKey, token_secret: TSecret) -> Self
    where
        TKey: Into<String>,
        TSecret: Into<String>,
    {
        Credential {
            token: Some((token.into(), token_secret.into())),
            ..self
        }
    }

    pub fn consumer_key(&self) -> &str {
        &self.consumer_key
    }

    pub fn consumer_secret(&self) -> &str {
        &self.consumer_secret
    }
}

impl SecretsProvider for Credential {
    fn get_consumer_key_pair(&self) -> (&str, &str) {
        (&self.consumer_key, &self.consumer_secret)
    }

    fn get_token_pair_option(&self) -> Option<(&str, &str)> {
        self.token.as_ref().map(|(t, s)| (t.as_str(), s.as_str()))
    }
}

impl<T: SecretsProvider + ?Sized> SecretsProvider for &T {
    fn get_consumer_key_pair(&self) -> (&str, &str) {
        (**self).get_consumer_key_pair()
    }

    fn get_token_pair_option(&self) -> Option<(&str, &str)> {
        (**self).get_token_pair_option()
    }
}

// secrets stay out of logs
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"<redacted>")
            .field("token", &self.token.as_ref().map(|(t, _)| t))
            .finish()
    }
}
