//! Configuration types.

use crate::credentials::Credentials;
use crate::loader::{validate, ConfigError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use url::Url;

/// Endpoint used when neither the caller, the config file nor the
/// environment names one.
pub const DEFAULT_ENDPOINT: &str = "http://api-public.netflix.com";

/// Fully resolved client configuration.
///
/// Built once per client from [`ClientOptions`] layered over the
/// process-wide defaults, and never mutated afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct ClientConfig {
    /// Base URL every request path is joined onto.
    pub endpoint: Url,
    /// Options for the underlying HTTP connection.
    pub connection: ConnectionOptions,
    /// Ordered middleware stack.
    pub middleware: Vec<MiddlewareKind>,
    /// OAuth key material.
    pub credentials: Credentials,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: Url::parse(DEFAULT_ENDPOINT).expect("default endpoint is a valid URL"),
            connection: ConnectionOptions::default(),
            middleware: MiddlewareKind::default_stack(),
            credentials: Credentials::default(),
        }
    }
}

/// HTTP connection options handed to the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionOptions {
    /// Connection timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Whole-request timeout in seconds.
    pub request_timeout_secs: u64,
    /// User agent string.
    pub user_agent: String,
    /// Headers sent with every request.
    pub headers: BTreeMap<String, String>,
    /// Maximum idle connections kept per host.
    pub pool_max_idle_per_host: usize,
    /// Enable gzip decompression.
    pub gzip: bool,
}

impl ConnectionOptions {
    /// Connection timeout as a [`Duration`].
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Request timeout as a [`Duration`].
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for ConnectionOptions {
    fn default() -> Self {
        let mut headers = BTreeMap::new();
        headers.insert("accept".to_string(), "application/json".to_string());

        Self {
            connect_timeout_secs: 5,
            request_timeout_secs: 10,
            user_agent: format!("flix/{}", env!("CARGO_PKG_VERSION")),
            headers,
            pool_max_idle_per_host: 10,
            gzip: true,
        }
    }
}

/// Named middleware that can be listed in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MiddlewareKind {
    /// Turn 4xx/5xx responses into transport errors.
    RaiseError,
    /// Decode JSON response bodies.
    ParseJson,
}

impl MiddlewareKind {
    /// The stack used when nothing else is configured.
    pub fn default_stack() -> Vec<Self> {
        vec![Self::RaiseError, Self::ParseJson]
    }
}

/// Client construction options.
///
/// Every field is optional; an unset field falls back to the process-wide
/// default when the options are resolved into a [`ClientConfig`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientOptions {
    pub endpoint: Option<String>,
    pub connection: Option<ConnectionOptions>,
    pub middleware: Option<Vec<MiddlewareKind>>,
    pub credentials: Credentials,
}

impl ClientOptions {
    /// Options with nothing set; every field falls back on resolve.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn connection(mut self, connection: ConnectionOptions) -> Self {
        self.connection = Some(connection);
        self
    }

    pub fn middleware(mut self, middleware: Vec<MiddlewareKind>) -> Self {
        self.middleware = Some(middleware);
        self
    }

    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    /// Layer these options over `fallback`: fields set here win.
    pub fn or(self, fallback: ClientOptions) -> ClientOptions {
        ClientOptions {
            endpoint: self.endpoint.or(fallback.endpoint),
            connection: self.connection.or(fallback.connection),
            middleware: self.middleware.or(fallback.middleware),
            credentials: self.credentials.or(fallback.credentials),
        }
    }

    /// Resolve against `base`, parsing and validating the result.
    pub fn resolve(self, base: &ClientConfig) -> Result<ClientConfig, ConfigError> {
        let endpoint = match self.endpoint {
            Some(raw) => Url::parse(&raw).map_err(|e| ConfigError::ValidationError {
                message: format!("invalid endpoint {raw:?}: {e}"),
            })?,
            None => base.endpoint.clone(),
        };

        let config = ClientConfig {
            endpoint,
            connection: self.connection.unwrap_or_else(|| base.connection.clone()),
            middleware: self.middleware.unwrap_or_else(|| base.middleware.clone()),
            credentials: self.credentials.or(base.credentials.clone()),
        };

        validate(&config)?;
        Ok(config)
    }
}
