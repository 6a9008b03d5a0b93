//! HTTP transport.

use crate::error::HttpError;
use crate::request::{FormPart, Request, RequestBody};
use crate::response::Response;
use flix_common_config::ConnectionOptions;
use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::{Client, ClientBuilder};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};

/// Performs the HTTP exchange for a fully built request.
///
/// Calls block until the response body has been read.
pub trait Transport: Send + Sync {
    /// Send the request and read the whole response.
    fn execute(&self, request: Request) -> Result<Response, HttpError>;
}

/// Build a blocking reqwest client from connection options.
pub fn build_client(options: &ConnectionOptions) -> Result<Client, HttpError> {
    let mut default_headers = HeaderMap::new();
    for (name, value) in &options.headers {
        let name = HeaderName::try_from(name.as_str()).map_err(HttpError::transport)?;
        let value = HeaderValue::try_from(value.as_str()).map_err(HttpError::transport)?;
        default_headers.insert(name, value);
    }

    let mut builder = ClientBuilder::new()
        .connect_timeout(options.connect_timeout())
        .timeout(options.request_timeout())
        .user_agent(&options.user_agent)
        .default_headers(default_headers)
        .pool_max_idle_per_host(options.pool_max_idle_per_host);

    if options.gzip {
        builder = builder.gzip(true);
    }

    builder.build().map_err(HttpError::ClientBuild)
}

/// The reqwest-backed transport.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    inner: Client,
}

impl ReqwestTransport {
    /// Create a transport with a freshly built client.
    pub fn new(options: &ConnectionOptions) -> Result<Self, HttpError> {
        Ok(Self {
            inner: build_client(options)?,
        })
    }

    /// Get the inner reqwest client.
    pub fn inner(&self) -> &Client {
        &self.inner
    }
}

fn multipart_form(parts: Vec<FormPart>) -> Result<Form, HttpError> {
    let mut form = Form::new();

    for part in parts {
        form = match part {
            FormPart::Text { name, value } => form.text(name, value),
            FormPart::File {
                name,
                data,
                file_name,
                content_type,
            } => {
                let mut file_part = Part::bytes(data);
                if let Some(file_name) = file_name {
                    file_part = file_part.file_name(file_name);
                }
                if let Some(content_type) = content_type {
                    file_part = file_part.mime_str(&content_type)?;
                }
                form.part(name, file_part)
            }
        };
    }

    Ok(form)
}

impl Transport for ReqwestTransport {
    fn execute(&self, request: Request) -> Result<Response, HttpError> {
        let mut builder = self
            .inner
            .request(request.method.into(), request.url)
            .headers(request.headers);

        builder = match request.body {
            None => builder,
            Some(RequestBody::Form(pairs)) => builder.form(&pairs),
            Some(RequestBody::Multipart(parts)) => builder.multipart(multipart_form(parts)?),
            Some(RequestBody::Bytes { content, content_type }) => {
                let builder = match content_type {
                    Some(content_type) => builder.header(CONTENT_TYPE, content_type),
                    None => builder,
                };
                builder.body(content)
            }
        };

        let response = builder.send()?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes()?;

        Ok(Response::new(status, headers, body))
    }
}
