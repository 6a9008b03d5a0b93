//! Request/response middleware.
//!
//! The stack is ordered. Requests pass through it front to back before
//! reaching the transport; responses pass back to front.

use crate::error::{HttpError, StatusError};
use crate::request::Request;
use crate::response::{parse_json, Response};
use flix_common_config::MiddlewareKind;
use std::sync::Arc;

/// A transport extension.
pub trait Middleware: Send + Sync {
    /// Name used in debug output.
    fn name(&self) -> &'static str;

    /// Inspect or rewrite the outgoing request.
    fn on_request(&self, _request: &mut Request) -> Result<(), HttpError> {
        Ok(())
    }

    /// Inspect or rewrite the response.
    fn on_response(&self, _response: &mut Response) -> Result<(), HttpError> {
        Ok(())
    }
}

/// Turns 4xx and 5xx responses into [`HttpError::Transport`] carrying the
/// status.
#[derive(Debug, Clone, Copy, Default)]
pub struct RaiseError;

impl Middleware for RaiseError {
    fn name(&self) -> &'static str {
        "raise_error"
    }

    fn on_response(&self, response: &mut Response) -> Result<(), HttpError> {
        let status = response.status;
        if !(status.is_client_error() || status.is_server_error()) {
            return Ok(());
        }

        Err(HttpError::Transport {
            status: Some(status.as_u16()),
            source: Box::new(StatusError {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
                body: response.text().into_owned(),
            }),
        })
    }
}

/// Decodes successful, non-blank response bodies as JSON into
/// [`Response::json`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseJson;

impl Middleware for ParseJson {
    fn name(&self) -> &'static str {
        "parse_json"
    }

    fn on_response(&self, response: &mut Response) -> Result<(), HttpError> {
        if !response.status.is_success() || response.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(());
        }

        response.json = Some(parse_json(response.status, &response.body)?);
        Ok(())
    }
}

/// Instantiate configured middleware, preserving order.
pub fn from_kinds(kinds: &[MiddlewareKind]) -> Vec<Arc<dyn Middleware>> {
    kinds
        .iter()
        .map(|kind| -> Arc<dyn Middleware> {
            match kind {
                MiddlewareKind::RaiseError => Arc::new(RaiseError),
                MiddlewareKind::ParseJson => Arc::new(ParseJson),
            }
        })
        .collect()
}
