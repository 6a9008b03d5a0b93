//! OAuth 1.0a HMAC-SHA1 request signing (RFC 5849).

use crate::auth::Signer;
use crate::error::HttpError;
use crate::request::Method;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use flix_common_config::SigningCredentials;
use hmac::{Hmac, Mac};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use rand::{distributions::Alphanumeric, Rng};
use sha1::Sha1;
use url::Url;

type HmacSha1 = Hmac<Sha1>;

/// RFC 3986 unreserved characters stay as they are; everything else is
/// percent-encoded.
const OAUTH_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

const SIGNATURE_METHOD: &str = "HMAC-SHA1";
const OAUTH_VERSION: &str = "1.0";
const NONCE_LEN: usize = 32;

/// Percent-encode a string the way OAuth 1.0a requires.
pub fn encode(s: &str) -> String {
    utf8_percent_encode(s, OAUTH_ENCODE_SET).to_string()
}

/// Signs requests with OAuth 1.0a HMAC-SHA1, generating a fresh nonce and
/// timestamp per request.
#[derive(Debug, Clone, Copy, Default)]
pub struct HmacSha1Signer;

impl HmacSha1Signer {
    /// Create a signer.
    pub fn new() -> Self {
        Self
    }

    /// Build the header with an explicit nonce and timestamp.
    pub fn sign_with(
        &self,
        method: Method,
        uri: &Url,
        params: &[(String, String)],
        credentials: &SigningCredentials<'_>,
        nonce: &str,
        timestamp: i64,
    ) -> Result<String, HttpError> {
        let mut oauth_params = vec![
            ("oauth_consumer_key".to_string(), credentials.consumer_key.to_string()),
            ("oauth_nonce".to_string(), nonce.to_string()),
            ("oauth_signature_method".to_string(), SIGNATURE_METHOD.to_string()),
            ("oauth_timestamp".to_string(), timestamp.to_string()),
            ("oauth_token".to_string(), credentials.token.to_string()),
            ("oauth_version".to_string(), OAUTH_VERSION.to_string()),
        ];

        let mut all_params = oauth_params.clone();
        all_params.extend(params.iter().cloned());
        all_params.extend(uri.query_pairs().into_owned());

        let base = signature_base(method, uri, &all_params);
        let signature = sign(&base, credentials.consumer_secret, credentials.token_secret)?;
        oauth_params.push(("oauth_signature".to_string(), signature));

        Ok(header_value(oauth_params))
    }
}

impl Signer for HmacSha1Signer {
    fn authorization(
        &self,
        method: Method,
        uri: &Url,
        params: &[(String, String)],
        credentials: &SigningCredentials<'_>,
    ) -> Result<String, HttpError> {
        let timestamp = chrono::Utc::now().timestamp();
        self.sign_with(method, uri, params, credentials, &nonce(), timestamp)
    }
}

fn nonce() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(NONCE_LEN)
        .map(char::from)
        .collect()
}

/// Scheme, host, non-default port and path; no query or fragment.
fn base_uri(uri: &Url) -> String {
    let host = uri.host_str().unwrap_or_default();
    match uri.port() {
        Some(port) => format!("{}://{}:{}{}", uri.scheme(), host, port, uri.path()),
        None => format!("{}://{}{}", uri.scheme(), host, uri.path()),
    }
}

/// The signature base string over every parameter that is signed.
pub fn signature_base(method: Method, uri: &Url, params: &[(String, String)]) -> String {
    let mut encoded: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (encode(k), encode(v)))
        .collect();
    encoded.sort();

    let normalized = encoded
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    format!(
        "{}&{}&{}",
        method.as_str(),
        encode(&base_uri(uri)),
        encode(&normalized)
    )
}

fn sign(base: &str, consumer_secret: &str, token_secret: &str) -> Result<String, HttpError> {
    let key = format!("{}&{}", encode(consumer_secret), encode(token_secret));
    let mut mac = HmacSha1::new_from_slice(key.as_bytes())
        .map_err(|e| HttpError::transport(format!("invalid signing key: {e}")))?;
    mac.update(base.as_bytes());
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

fn header_value(mut oauth_params: Vec<(String, String)>) -> String {
    oauth_params.sort();
    let fields = oauth_params
        .iter()
        .map(|(k, v)| format!("{}=\"{}\"", encode(k), encode(v)))
        .collect::<Vec<_>>()
        .join(", ");
    format!("OAuth {fields}")
}
