//! HTTP request types.

use crate::error::HttpError;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use std::fmt;
use url::Url;

/// HTTP methods the client dispatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    /// The method name as sent on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }

    /// POST and PUT carry parameters in the body; everything else in the
    /// query string.
    pub fn has_body(&self) -> bool {
        matches!(self, Method::Post | Method::Put)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// One part of a multipart body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormPart {
    Text {
        name: String,
        value: String,
    },
    File {
        name: String,
        data: Vec<u8>,
        file_name: Option<String>,
        content_type: Option<String>,
    },
}

impl FormPart {
    /// The form field name.
    pub fn name(&self) -> &str {
        match self {
            FormPart::Text { name, .. } | FormPart::File { name, .. } => name,
        }
    }
}

/// An outgoing request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestBody {
    /// `application/x-www-form-urlencoded` pairs.
    Form(Vec<(String, String)>),
    /// `multipart/form-data` parts.
    Multipart(Vec<FormPart>),
    /// Raw bytes, usually set from a request customizer.
    Bytes {
        content: Vec<u8>,
        content_type: Option<String>,
    },
}

/// A fully built request, handed to middleware and the transport.
///
/// Request customizers receive it mutably just before dispatch.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<RequestBody>,
}

impl Request {
    /// Create a request with no headers and no body.
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// Add a header. Invalid names or values are ignored.
    pub fn header(&mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> &mut Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::try_from(name.as_ref()),
            HeaderValue::try_from(value.as_ref()),
        ) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Set the `authorization` header, marked sensitive.
    pub fn set_authorization(&mut self, value: &str) -> Result<(), HttpError> {
        let mut value = HeaderValue::from_str(value).map_err(HttpError::transport)?;
        value.set_sensitive(true);
        self.headers.insert(AUTHORIZATION, value);
        Ok(())
    }

    /// Append pairs to the query string, keeping any pairs already there.
    pub fn extend_query<I, K, V>(&mut self, pairs: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.url.query_pairs_mut().extend_pairs(pairs);
    }

    /// Decoded query pairs.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.url.query_pairs().into_owned().collect()
    }
}

/// Where a request should be sent instead of the client's endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    Url(Url),
    /// Parsed when the request is dispatched.
    Raw(String),
}

impl Endpoint {
    /// Parse into a URL; a bad string is a transport error.
    pub fn resolve(self) -> Result<Url, HttpError> {
        match self {
            Endpoint::Url(url) => Ok(url),
            Endpoint::Raw(raw) => Url::parse(&raw).map_err(HttpError::transport),
        }
    }
}

impl From<Url> for Endpoint {
    fn from(url: Url) -> Self {
        Endpoint::Url(url)
    }
}

impl From<&str> for Endpoint {
    fn from(raw: &str) -> Self {
        Endpoint::Raw(raw.to_string())
    }
}

impl From<String> for Endpoint {
    fn from(raw: String) -> Self {
        Endpoint::Raw(raw)
    }
}

/// Per-call options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    /// Overrides the client's endpoint for this call only.
    pub endpoint: Option<Endpoint>,
}

impl RequestOptions {
    /// Options with nothing overridden.
    pub fn new() -> Self {
        Self::default()
    }

    /// Send this call to `endpoint` instead of the client's.
    pub fn endpoint(mut self, endpoint: impl Into<Endpoint>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }
}
