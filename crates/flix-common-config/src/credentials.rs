//! OAuth credential store.

use flix_common_secret::SecretString;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The OAuth 1.0a credential 4-tuple.
///
/// Each field is optional. A client only signs requests when all four are
/// present and non-empty; otherwise requests go out unauthenticated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Credentials {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consumer_key: Option<SecretString>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consumer_secret: Option<SecretString>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<SecretString>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_secret: Option<SecretString>,
}

impl Credentials {
    /// Build a complete credential set.
    pub fn new(
        consumer_key: impl Into<String>,
        consumer_secret: impl Into<String>,
        token: impl Into<String>,
        token_secret: impl Into<String>,
    ) -> Self {
        Self {
            consumer_key: Some(SecretString::new(consumer_key.into())),
            consumer_secret: Some(SecretString::new(consumer_secret.into())),
            token: Some(SecretString::new(token.into())),
            token_secret: Some(SecretString::new(token_secret.into())),
        }
    }

    /// True iff all four fields are set and non-empty.
    pub fn has_credentials(&self) -> bool {
        self.signing().is_some()
    }

    /// The raw 4-tuple: (consumer key, consumer secret, token, token secret).
    pub fn credentials(&self) -> (Option<&str>, Option<&str>, Option<&str>, Option<&str>) {
        (
            exposed(&self.consumer_key),
            exposed(&self.consumer_secret),
            exposed(&self.token),
            exposed(&self.token_secret),
        )
    }

    /// Borrow the credentials for signing, if the set is complete.
    pub fn signing(&self) -> Option<SigningCredentials<'_>> {
        Some(SigningCredentials {
            consumer_key: non_empty(&self.consumer_key)?,
            consumer_secret: non_empty(&self.consumer_secret)?,
            token: non_empty(&self.token)?,
            token_secret: non_empty(&self.token_secret)?,
        })
    }

    /// Field-by-field fallback: fields set here win.
    pub fn or(self, fallback: Credentials) -> Credentials {
        Credentials {
            consumer_key: self.consumer_key.or(fallback.consumer_key),
            consumer_secret: self.consumer_secret.or(fallback.consumer_secret),
            token: self.token.or(fallback.token),
            token_secret: self.token_secret.or(fallback.token_secret),
        }
    }
}

fn exposed(field: &Option<SecretString>) -> Option<&str> {
    field.as_ref().map(|s| s.expose().as_str())
}

fn non_empty(field: &Option<SecretString>) -> Option<&str> {
    exposed(field).filter(|v| !v.is_empty())
}

/// A complete, borrowed credential set ready for signing.
#[derive(Clone, Copy)]
pub struct SigningCredentials<'a> {
    pub consumer_key: &'a str,
    pub consumer_secret: &'a str,
    pub token: &'a str,
    pub token_secret: &'a str,
}

impl fmt::Debug for SigningCredentials<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningCredentials")
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"[REDACTED]")
            .field("token", &"[REDACTED]")
            .field("token_secret", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_complete_credentials() {
        let creds = Credentials::new("ck", "cs", "t", "ts");
        assert!(creds.has_credentials());
        assert_eq!(creds.credentials(), (Some("ck"), Some("cs"), Some("t"), Some("ts")));

        let signing = creds.signing().unwrap();
        assert_eq!(signing.consumer_key, "ck");
        assert_eq!(signing.consumer_secret, "cs");
        assert_eq!(signing.token, "t");
        assert_eq!(signing.token_secret, "ts");
    }

    #[test]
    fn test_default_has_no_credentials() {
        let creds = Credentials::default();
        assert!(!creds.has_credentials());
        assert_eq!(creds.credentials(), (None, None, None, None));
    }

    #[test]
    fn test_empty_field_means_no_credentials() {
        let creds = Credentials::new("ck", "", "t", "ts");
        assert!(!creds.has_credentials());
        assert!(creds.signing().is_none());
    }

    #[test]
    fn test_or_prefers_self() {
        let partial = Credentials {
            token: Some("override".into()),
            ..Credentials::default()
        };
        let merged = partial.or(Credentials::new("ck", "cs", "t", "ts"));

        assert_eq!(merged.credentials(), (Some("ck"), Some("cs"), Some("override"), Some("ts")));
    }

    #[test]
    fn test_debug_output_is_redacted() {
        let creds = Credentials::new("ck", "super-secret", "tok", "tok-secret");
        let debug = format!("{:?} {:?}", creds, creds.signing().unwrap());
        assert!(!debug.contains("super-secret"));
        assert!(!debug.contains("tok-secret"));
    }

    fn field() -> impl Strategy<Value = Option<String>> {
        prop_oneof![Just(None), Just(Some(String::new())), "[a-zA-Z0-9]{1,12}".prop_map(Some)]
    }

    proptest! {
        #[test]
        fn has_credentials_iff_all_four_non_empty(
            ck in field(), cs in field(), t in field(), ts in field()
        ) {
            let expected = [&ck, &cs, &t, &ts]
                .iter()
                .all(|f| f.as_deref().map_or(false, |v| !v.is_empty()));

            let creds = Credentials {
                consumer_key: ck.map(SecretString::new),
                consumer_secret: cs.map(SecretString::new),
                token: t.map(SecretString::new),
                token_secret: ts.map(SecretString::new),
            };

            prop_assert_eq!(creds.has_credentials(), expected);
        }
    }
}
