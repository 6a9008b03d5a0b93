//! Authorization header construction.

use crate::error::HttpError;
use crate::params::Params;
use crate::request::Method;
use flix_common_config::SigningCredentials;
use url::Url;

/// Computes an `authorization` header value for a request.
///
/// Implementations own the signature algorithm (timestamp, nonce, base
/// string, digest). The client only decides which parameters are handed
/// over.
pub trait Signer: Send + Sync {
    /// The header value for one request. `params` are exactly the
    /// parameters to sign.
    fn authorization(
        &self,
        method: Method,
        uri: &Url,
        params: &[(String, String)],
        credentials: &SigningCredentials<'_>,
    ) -> Result<String, HttpError>;
}

/// Parameters that take part in the signature.
///
/// POST and PUT requests carrying a file or stream upload are signed over
/// an empty parameter set. Otherwise every text and numeric parameter is
/// signed.
pub fn signature_params(method: Method, params: &Params<'_>) -> Vec<(String, String)> {
    if method.has_body() && params.has_upload() {
        Vec::new()
    } else {
        params.text_pairs()
    }
}

/// Build the `authorization` header value for a request.
pub fn build_header(
    signer: &dyn Signer,
    method: Method,
    uri: &Url,
    params: &Params<'_>,
    credentials: &SigningCredentials<'_>,
) -> Result<String, HttpError> {
    let signed = signature_params(method, params);
    signer.authorization(method, uri, &signed, credentials)
}
