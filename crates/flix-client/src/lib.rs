//! OAuth-signed HTTP API client for Flix.
//!
//! ```no_run
//! use flix_client::{Client, ClientOptions, Credentials, Params, RequestOptions};
//!
//! let client = Client::new(
//!     ClientOptions::new().credentials(Credentials::new("key", "secret", "token", "token-secret")),
//! )?;
//! let response = client.get("/catalog/titles", Params::new().with("term", "heat"), RequestOptions::default())?;
//! println!("{}", response.status);
//! # Ok::<(), flix_client::HttpError>(())
//! ```

pub mod auth;
pub mod client;
pub mod error;
pub mod middleware;
pub mod oauth;
pub mod params;
pub mod request;
pub mod response;
pub mod transport;

pub use auth::Signer;
pub use client::{Client, ClientBuilder};
pub use error::{HttpError, StatusError};
pub use middleware::{Middleware, ParseJson, RaiseError};
pub use oauth::HmacSha1Signer;
pub use params::{FileUpload, ParamValue, Params, StreamUpload};
pub use request::{Endpoint, FormPart, Method, Request, RequestBody, RequestOptions};
pub use response::Response;
pub use transport::{ReqwestTransport, Transport};

pub use flix_common_config::{
    defaults, ClientConfig, ClientOptions, ConnectionOptions, Credentials, MiddlewareKind,
};
