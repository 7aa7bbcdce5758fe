use axum::response::{IntoResponse, Response};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use http::header::{self, HeaderMap, HeaderName};
use http::{Method, Request, Uri};

use crate::error::HandshakeError;

const WEBSOCKET_VERSION: &str = "13";
const CHALLENGE_KEY_LEN: usize = 16;

/// Checks run before the request is handed to axum's upgrade extractor. The
/// extractor builds the `101` reply; these cover what it does not check
/// (same-origin policy and the challenge key format) and fix the order and
/// status codes of rejections.
pub fn check<B>(req: &Request<B>) -> Result<(), HandshakeError> {
    let headers = req.headers();
    if !header_has_token(headers, header::CONNECTION, "upgrade") {
        return Err(HandshakeError::MissingConnectionUpgrade);
    }
    if !header_has_token(headers, header::UPGRADE, "websocket") {
        return Err(HandshakeError::MissingUpgradeWebsocket);
    }
    if req.method() != Method::GET {
        return Err(HandshakeError::MethodNotGet);
    }
    if !header_has_token(headers, header::SEC_WEBSOCKET_VERSION, WEBSOCKET_VERSION) {
        return Err(HandshakeError::UnsupportedVersion);
    }
    if !same_origin(req) {
        return Err(HandshakeError::OriginNotAllowed);
    }

    let key = headers
        .get(header::SEC_WEBSOCKET_KEY)
        .map(|v| v.as_bytes().trim_ascii())
        .unwrap_or_default();
    if !is_valid_challenge_key(key) {
        return Err(HandshakeError::InvalidKey);
    }
    Ok(())
}

/// Every rejection carries the supported version; the body is the bare
/// status text.
pub fn reject(err: &HandshakeError) -> Response {
    let status = err.status();
    let body = format!("{}\n", status.canonical_reason().unwrap_or_default());
    (
        status,
        [(header::SEC_WEBSOCKET_VERSION, WEBSOCKET_VERSION)],
        body,
    )
        .into_response()
}

/// Requests without an `Origin` header pass; otherwise its host must match
/// the `Host` the request was sent to.
fn same_origin<B>(req: &Request<B>) -> bool {
    let Some(origin) = req.headers().get(header::ORIGIN) else {
        return true;
    };
    let Some(origin_host) = origin
        .to_str()
        .ok()
        .and_then(|o| o.parse::<Uri>().ok())
        .filter(|uri| uri.scheme().is_some())
        .and_then(|uri| uri.authority().map(host_and_port))
    else {
        return false;
    };

    let request_host = req
        .headers()
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .map(str::to_string)
        .or_else(|| req.uri().authority().map(host_and_port));

    request_host.is_some_and(|host| host.eq_ignore_ascii_case(&origin_host))
}

fn host_and_port(authority: &http::uri::Authority) -> String {
    match authority.port() {
        Some(port) => format!("{}:{}", authority.host(), port),
        None => authority.host().to_string(),
    }
}

fn is_valid_challenge_key(key: &[u8]) -> bool {
    STANDARD
        .decode(key)
        .is_ok_and(|decoded| decoded.len() == CHALLENGE_KEY_LEN)
}

fn header_has_token(headers: &HeaderMap, name: HeaderName, token: &str) -> bool {
    headers
        .get_all(name)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .any(|t| t.trim().eq_ignore_ascii_case(token))
}
