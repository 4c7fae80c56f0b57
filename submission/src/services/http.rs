//! Response handling shared by the HTTP transports

use reqwest::{Response, StatusCode};

use crate::error::TransportError;

pub(crate) const USER_AGENT: &str = concat!("trust-game-survey/", env!("CARGO_PKG_VERSION"));

pub(crate) fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

pub(crate) fn network_error(err: reqwest::Error) -> TransportError {
    TransportError::Network { message: err.to_string() }
}

pub(crate) fn status_error(status: StatusCode) -> TransportError {
    match status.as_u16() {
        401 | 403 => TransportError::Unauthorized { status: status.as_u16() },
        404 => TransportError::NotFound,
        429 => TransportError::RateLimited,
        code => TransportError::Status { status: code },
    }
}

/// Pass 2xx responses through, map everything else
pub(crate) fn ensure_success(response: Response) -> Result<Response, TransportError> {
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(status_error(response.status()))
    }
}

pub(crate) async fn json_body(response: Response) -> Result<serde_json::Value, TransportError> {
    response
        .json()
        .await
        .map_err(|e| TransportError::MalformedResponse { message: format!("Failed to parse response: {e}") })
}

/// First present field rendered as a string; numbers are accepted too
pub(crate) fn string_field(value: &serde_json::Value, names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| match value.get(name) {
        Some(serde_json::Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
