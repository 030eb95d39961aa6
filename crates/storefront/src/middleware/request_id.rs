//! Request ID middleware for correlating logs, Sentry events and responses.

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use tracing::Span;
use uuid::Uuid;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest upstream request ID accepted as-is.
const MAX_REQUEST_ID_LENGTH: usize = 64;

/// Reuse an upstream ID if it is short and printable, otherwise mint a UUID v4.
fn resolve_request_id(upstream: Option<&HeaderValue>) -> String {
    upstream
        .and_then(|h| h.to_str().ok())
        .filter(|id| {
            !id.is_empty()
                && id.len() <= MAX_REQUEST_ID_LENGTH
                && id.bytes().all(|b| b.is_ascii_graphic())
        })
        .map_or_else(|| Uuid::new_v4().to_string(), String::from)
}

/// Ensure every request carries an ID.
///
/// The ID is recorded on the current span, tagged on the Sentry scope and
/// echoed in the `x-request-id` response header.
pub async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id = resolve_request_id(request.headers().get(REQUEST_ID_HEADER));

    Span::current().record("request_id", &request_id);
    sentry::configure_scope(|scope| {
        scope.set_tag("request_id", &request_id);
    });

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_id_is_kept() {
        let header = HeaderValue::from_static("cf-7d2a9b");
        assert_eq!(resolve_request_id(Some(&header)), "cf-7d2a9b");
    }

    #[test]
    fn test_missing_or_unusable_id_is_replaced() {
        let generated = resolve_request_id(None);
        assert!(Uuid::parse_str(&generated).is_ok());

        let too_long = HeaderValue::from_str(&"a".repeat(MAX_REQUEST_ID_LENGTH + 1)).unwrap();
        assert_ne!(resolve_request_id(Some(&too_long)).len(), MAX_REQUEST_ID_LENGTH + 1);

        let spaced = HeaderValue::from_static("two words");
        assert_ne!(resolve_request_id(Some(&spaced)), "two words");
    }
}
