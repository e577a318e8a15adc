//! GraphQL proxy endpoint.
//!
//! Relays POSTed GraphQL bodies to the commerce backend so browser-side code
//! can query it without the backend origin or credentials ever reaching the
//! client. The `woocommerce-session` header is carried through in both
//! directions and exposed to scripts, because losing it would silently
//! detach the shopper from their cart.

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, HeaderMap, Response, StatusCode};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::state::AppState;
use crate::woo::SESSION_HEADER;

/// Pull the session token from an incoming request, tolerating both the
/// bare token and the `Session <token>` form.
fn request_session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.strip_prefix("Session ").unwrap_or(v).to_string())
        .filter(|v| !v.is_empty())
}

/// Forward a GraphQL request body to the backend and relay the response.
#[instrument(skip(state, headers, body))]
pub async fn proxy(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Result<Response<Body>> {
    let token = request_session_token(&headers);
    let raw = state.woo().forward_raw(body, token.as_deref()).await?;

    let status =
        StatusCode::from_u16(raw.status).unwrap_or(StatusCode::BAD_GATEWAY);

    let mut response = Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::ACCESS_CONTROL_EXPOSE_HEADERS, SESSION_HEADER);

    if let Some(session_token) = raw.session_token {
        response = response.header(SESSION_HEADER, session_token);
    }

    response
        .body(Body::from(raw.body))
        .map_err(|e| AppError::Internal(format!("Failed to build proxy response: {e}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_request_session_token_strips_prefix() {
        let mut headers = HeaderMap::new();
        headers.insert(SESSION_HEADER, "Session abc123".parse().unwrap());
        assert_eq!(request_session_token(&headers), Some("abc123".to_string()));
    }

    #[test]
    fn test_request_session_token_accepts_bare_token() {
        let mut headers = HeaderMap::new();
        headers.insert(SESSION_HEADER, "abc123".parse().unwrap());
        assert_eq!(request_session_token(&headers), Some("abc123".to_string()));
    }

    #[test]
    fn test_request_session_token_missing_or_empty() {
        assert_eq!(request_session_token(&HeaderMap::new()), None);

        let mut headers = HeaderMap::new();
        headers.insert(SESSION_HEADER, "".parse().unwrap());
        assert_eq!(request_session_token(&headers), None);
    }
}
