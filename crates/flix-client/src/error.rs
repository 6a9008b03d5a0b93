//! Client errors.

use flix_common_config::ConfigError;

/// Boxed underlying cause of a transport failure.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors produced by [`Client`](crate::Client).
///
/// Dispatching a request yields only two kinds: [`HttpError::Transport`]
/// when the request could not complete, and [`HttpError::Decode`] when
/// the response body could not be decoded. The remaining variants come
/// from client construction.
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    #[error("invalid client configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    #[error("request failed{}: {source}", status.map(|s| format!(" with status {s}")).unwrap_or_default())]
    Transport {
        status: Option<u16>,
        #[source]
        source: BoxError,
    },

    #[error("failed to decode response body (status {status}): {source}")]
    Decode {
        status: u16,
        body: String,
        #[source]
        source: serde_json::Error,
    },
}

impl HttpError {
    /// A transport failure with no HTTP status.
    pub fn transport(source: impl Into<BoxError>) -> Self {
        HttpError::Transport {
            status: None,
            source: source.into(),
        }
    }

    /// The HTTP status attached to the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            HttpError::Transport { status, .. } => *status,
            HttpError::Decode { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True if the request could not complete.
    pub fn is_transport(&self) -> bool {
        matches!(self, HttpError::Transport { .. })
    }

    /// True if the response body could not be decoded.
    pub fn is_decode(&self) -> bool {
        matches!(self, HttpError::Decode { .. })
    }

    /// True when the underlying transport reported a timeout.
    pub fn is_timeout(&self) -> bool {
        match self {
            HttpError::Transport { source, .. } => source
                .downcast_ref::<reqwest::Error>()
                .map_or(false, reqwest::Error::is_timeout),
            _ => false,
        }
    }
}

impl From<reqwest::Error> for HttpError {
    fn from(e: reqwest::Error) -> Self {
        HttpError::Transport {
            status: e.status().map(|s| s.as_u16()),
            source: Box::new(e),
        }
    }
}

/// Error carried inside [`HttpError::Transport`] for 4xx/5xx responses.
#[derive(Debug, thiserror::Error)]
#[error("{status} {reason}")]
pub struct StatusError {
    pub status: u16,
    pub reason: String,
    pub body: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_transport_error_display() {
        let err = HttpError::transport(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "connection refused",
        ));

        assert!(err.is_transport());
        assert_eq!(err.status(), None);
        assert_eq!(err.to_string(), "request failed: connection refused");
        assert!(err.source().is_some());
    }

    #[test]
    fn test_transport_error_keeps_status() {
        let err = HttpError::Transport {
            status: Some(503),
            source: Box::new(StatusError {
                status: 503,
                reason: "Service Unavailable".to_string(),
                body: String::new(),
            }),
        };

        assert_eq!(err.status(), Some(503));
        assert!(err.to_string().contains("with status 503"));
        assert!(err.to_string().contains("Service Unavailable"));
    }

    #[test]
    fn test_decode_error_display() {
        let source = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err = HttpError::Decode {
            status: 200,
            body: "{not json".to_string(),
            source,
        };

        assert!(err.is_decode());
        assert!(!err.is_transport());
        assert_eq!(err.status(), Some(200));
        assert!(err.to_string().contains("failed to decode response body"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_non_reqwest_source_is_not_timeout() {
        let err = HttpError::transport("boom");
        assert!(!err.is_timeout());
    }
}
