//! HTTP response envelope.

use crate::error::HttpError;
use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::borrow::Cow;

/// The response envelope: status, headers and body as the transport
/// returned them.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
    /// Decoded JSON document, filled in by the `ParseJson` middleware.
    pub json: Option<serde_json::Value>,
}

impl Response {
    /// Wrap a received status, headers and body.
    pub fn new(status: StatusCode, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
            json: None,
        }
    }

    /// The body as text, replacing invalid UTF-8.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Deserialize the body into `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, HttpError> {
        parse_json(self.status, &self.body)
    }
}

/// Decode a JSON body, mapping failures to [`HttpError::Decode`].
pub fn parse_json<T: DeserializeOwned>(status: StatusCode, body: &[u8]) -> Result<T, HttpError> {
    serde_json::from_slice(body).map_err(|e| HttpError::Decode {
        status: status.as_u16(),
        body: String::from_utf8_lossy(body).to_string(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Title {
        id: u64,
        name: String,
    }

    #[test]
    fn test_json_decodes_into_type() {
        let response = Response::new(
            StatusCode::OK,
            HeaderMap::new(),
            r#"{"id": 7, "name": "Heat"}"#,
        );

        let title: Title = response.json().unwrap();
        assert_eq!(title, Title { id: 7, name: "Heat".to_string() });
    }

    #[test]
    fn test_malformed_body_is_decode_error() {
        let response = Response::new(StatusCode::OK, HeaderMap::new(), "<html>oops</html>");

        match response.json::<Title>().unwrap_err() {
            HttpError::Decode { status, body, .. } => {
                assert_eq!(status, 200);
                assert_eq!(body, "<html>oops</html>");
            }
            other => panic!("Expected Decode error, got {other:?}"),
        }
    }

    #[test]
    fn test_text_is_lossy() {
        let response = Response::new(StatusCode::OK, HeaderMap::new(), vec![b'o', b'k', 0xff]);
        assert_eq!(response.text(), "ok\u{fffd}");
    }
}
