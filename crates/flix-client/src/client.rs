//! The request dispatcher.

use crate::auth::{self, Signer};
use crate::error::HttpError;
use crate::middleware::{self, Middleware};
use crate::oauth::HmacSha1Signer;
use crate::params::{ParamValue, Params};
use crate::request::{FormPart, Method, Request, RequestBody, RequestOptions};
use crate::response::Response;
use crate::transport::{ReqwestTransport, Transport};
use flix_common_config::{defaults, ClientConfig, ClientOptions, Credentials};
use flix_common_log::spans::{record_status, request_span, Timer};
use once_cell::sync::OnceCell;
use std::fmt;
use std::sync::Arc;
use url::Url;

/// An OAuth-signed HTTP API client.
///
/// Configuration is fixed at construction. Every call resolves its target
/// endpoint on its own, so one client can be shared between threads.
pub struct Client {
    config: ClientConfig,
    middleware: Vec<Arc<dyn Middleware>>,
    signer: Arc<dyn Signer>,
    connection: OnceCell<Arc<dyn Transport>>,
}

impl Client {
    /// Create a client from per-client options layered over the
    /// process-wide defaults.
    pub fn new(options: ClientOptions) -> Result<Self, HttpError> {
        let config = defaults::resolve(options)?;
        Ok(Self::builder(config).build())
    }

    /// Create a client from the process-wide defaults alone.
    pub fn from_defaults() -> Result<Self, HttpError> {
        Self::new(ClientOptions::default())
    }

    /// Start building a client from a resolved configuration.
    pub fn builder(config: ClientConfig) -> ClientBuilder {
        ClientBuilder::new(config)
    }

    /// The configuration this client was built with.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The client's base endpoint.
    pub fn endpoint(&self) -> &Url {
        &self.config.endpoint
    }

    /// True if all four OAuth values are present and non-empty.
    pub fn has_credentials(&self) -> bool {
        self.config.credentials.has_credentials()
    }

    /// The stored OAuth values, in the order consumer key, consumer secret,
    /// token, token secret.
    pub fn credentials(&self) -> (Option<&str>, Option<&str>, Option<&str>, Option<&str>) {
        self.config.credentials.credentials()
    }

    /// Make a GET request.
    pub fn get(
        &self,
        path: &str,
        params: Params<'_>,
        options: RequestOptions,
    ) -> Result<Response, HttpError> {
        self.request(Method::Get, path, params, options)
    }

    /// Make a POST request.
    pub fn post(
        &self,
        path: &str,
        params: Params<'_>,
        options: RequestOptions,
    ) -> Result<Response, HttpError> {
        self.request(Method::Post, path, params, options)
    }

    /// Make a PUT request.
    pub fn put(
        &self,
        path: &str,
        params: Params<'_>,
        options: RequestOptions,
    ) -> Result<Response, HttpError> {
        self.request(Method::Put, path, params, options)
    }

    /// Make a DELETE request.
    pub fn delete(
        &self,
        path: &str,
        params: Params<'_>,
        options: RequestOptions,
    ) -> Result<Response, HttpError> {
        self.request(Method::Delete, path, params, options)
    }

    /// Make a request with any supported method.
    pub fn request(
        &self,
        method: Method,
        path: &str,
        params: Params<'_>,
        options: RequestOptions,
    ) -> Result<Response, HttpError> {
        self.dispatch(method, path, params, options, |_| {})
    }

    /// Like [`Client::request`], handing the fully built request to
    /// `customizer` right before it enters the middleware stack.
    pub fn request_with(
        &self,
        method: Method,
        path: &str,
        params: Params<'_>,
        options: RequestOptions,
        customizer: impl FnOnce(&mut Request),
    ) -> Result<Response, HttpError> {
        self.dispatch(method, path, params, options, customizer)
    }

    fn connection(&self) -> Result<&Arc<dyn Transport>, HttpError> {
        self.connection.get_or_try_init(|| {
            tracing::debug!(endpoint = %self.config.endpoint, "Opening HTTP connection");
            let transport = ReqwestTransport::new(&self.config.connection)?;
            Ok(Arc::new(transport) as Arc<dyn Transport>)
        })
    }

    fn dispatch(
        &self,
        method: Method,
        path: &str,
        params: Params<'_>,
        options: RequestOptions,
        customizer: impl FnOnce(&mut Request),
    ) -> Result<Response, HttpError> {
        let base = match options.endpoint {
            Some(endpoint) => endpoint.resolve()?,
            None => self.config.endpoint.clone(),
        };
        let url = base.join(path).map_err(HttpError::transport)?;

        let span = request_span(method.as_str(), url.as_str());
        let _guard = span.enter();
        let timer = Timer::start();

        let mut request = Request::new(method, url);

        if let Some(credentials) = self.config.credentials.signing() {
            let header = auth::build_header(
                self.signer.as_ref(),
                method,
                &request.url,
                &params,
                &credentials,
            )?;
            request.set_authorization(&header)?;
        }

        place_params(&mut request, params)?;
        customizer(&mut request);

        tracing::debug!(method = %method, url = %request.url, "Sending request");
        let result = self.send(request);
        timer.finish();

        match &result {
            Ok(response) => {
                record_status(response.status.as_u16());
                tracing::debug!(status = response.status.as_u16(), "Request completed");
            }
            Err(e) => tracing::warn!(error = %e, "Request failed"),
        }

        result
    }

    fn send(&self, mut request: Request) -> Result<Response, HttpError> {
        for middleware in &self.middleware {
            middleware.on_request(&mut request)?;
        }

        let mut response = self.connection()?.execute(request)?;

        for middleware in self.middleware.iter().rev() {
            middleware.on_response(&mut response)?;
        }

        Ok(response)
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let middleware: Vec<_> = self.middleware.iter().map(|m| m.name()).collect();
        f.debug_struct("Client")
            .field("config", &self.config)
            .field("middleware", &middleware)
            .field("connected", &self.connection.get().is_some())
            .finish()
    }
}

/// Put parameters where the method wants them: the body for POST and PUT,
/// the query string otherwise.
fn place_params(request: &mut Request, params: Params<'_>) -> Result<(), HttpError> {
    if params.is_empty() {
        return Ok(());
    }

    if !request.method.has_body() {
        for (name, value) in params.iter().filter(|(_, v)| v.is_upload()) {
            tracing::warn!(param = name, ?value, "Upload dropped from query string");
        }
        let pairs = params.text_pairs();
        if !pairs.is_empty() {
            request.extend_query(pairs);
        }
        return Ok(());
    }

    if !params.has_upload() {
        request.body = Some(RequestBody::Form(params.text_pairs()));
        return Ok(());
    }

    let mut parts = Vec::with_capacity(params.len());
    for (name, value) in params.into_entries() {
        let part = match value {
            ParamValue::Text(value) => FormPart::Text { name, value },
            ParamValue::Numeric(n) => FormPart::Text {
                name,
                value: n.to_string(),
            },
            ParamValue::File(upload) => {
                let data = upload.read_all().map_err(HttpError::transport)?;
                FormPart::File {
                    file_name: upload.file_name.or_else(|| Some(name.clone())),
                    content_type: upload.content_type,
                    name,
                    data,
                }
            }
            ParamValue::Stream(mut upload) => {
                let data = upload.read_all().map_err(HttpError::transport)?;
                FormPart::File {
                    file_name: upload.file_name.or_else(|| Some(name.clone())),
                    content_type: upload.content_type,
                    name,
                    data,
                }
            }
        };
        parts.push(part);
    }
    request.body = Some(RequestBody::Multipart(parts));

    Ok(())
}

/// Builder for [`Client`].
pub struct ClientBuilder {
    config: ClientConfig,
    signer: Option<Arc<dyn Signer>>,
    transport: Option<Arc<dyn Transport>>,
    middleware: Option<Vec<Arc<dyn Middleware>>>,
}

impl ClientBuilder {
    /// Start from a configuration, with the HMAC-SHA1 signer and the
    /// configured middleware.
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            signer: None,
            transport: None,
            middleware: None,
        }
    }

    /// Replace the OAuth credentials.
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.config.credentials = credentials;
        self
    }

    /// Sign requests with something other than HMAC-SHA1.
    pub fn signer(mut self, signer: Arc<dyn Signer>) -> Self {
        self.signer = Some(signer);
        self
    }

    /// Use a prepared transport instead of connecting lazily.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Replace the configured middleware stack.
    pub fn middleware(mut self, middleware: Vec<Arc<dyn Middleware>>) -> Self {
        self.middleware = Some(middleware);
        self
    }

    /// Build the client. The connection is opened on first use unless a
    /// transport was supplied.
    pub fn build(self) -> Client {
        let middleware = self
            .middleware
            .unwrap_or_else(|| middleware::from_kinds(&self.config.middleware));

        let connection = match self.transport {
            Some(transport) => OnceCell::with_value(transport),
            None => OnceCell::new(),
        };

        Client {
            config: self.config,
            middleware,
            signer: self.signer.unwrap_or_else(|| Arc::new(HmacSha1Signer::new())),
            connection,
        }
    }
}
