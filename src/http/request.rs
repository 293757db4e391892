//! Request identification.
//!
//! # Responsibilities
//! - Reuse the client's `x-request-id` or generate a UUID v4
//! - Expose the id to handlers as a request extension
//! - Echo the id back on the response
//!
//! # Design Decisions
//! - Request ID added as early as possible so every log line can carry it
//! - Generation and propagation are tower-http's `request_id` layers; this
//!   module only adds the textual view the logger needs

use axum::http::{HeaderName, Request};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};

pub use tower_http::request_id::RequestId;

/// Header carrying the request id in both directions.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Assigns an id to requests that arrive without one.
pub fn set_request_id_layer() -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::new(HeaderName::from_static(X_REQUEST_ID), MakeRequestUuid)
}

/// Copies the request id onto the response.
pub fn propagate_request_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::new(HeaderName::from_static(X_REQUEST_ID))
}

/// Text of a request id. Ids that are not visible ASCII read as empty.
pub fn request_id_str(id: &RequestId) -> &str {
    id.header_value().to_str().unwrap_or_default()
}

/// Access to the id stored by [`set_request_id_layer`].
pub trait RequestIdExt {
    fn request_id(&self) -> Option<&RequestId>;
}

impl<B> RequestIdExt for Request<B> {
    fn request_id(&self) -> Option<&RequestId> {
        self.extensions().get::<RequestId>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::HeaderValue;

    #[test]
    fn test_extension_lookup() {
        let mut request = Request::builder().body(Body::empty()).unwrap();
        assert!(request.request_id().is_none());

        request
            .extensions_mut()
            .insert(RequestId::new(HeaderValue::from_static("abc-123")));
        assert_eq!(request.request_id().map(request_id_str), Some("abc-123"));
    }

    #[test]
    fn test_opaque_id_reads_empty() {
        let id = RequestId::new(HeaderValue::from_bytes(b"caf\xe9").unwrap());
        assert_eq!(request_id_str(&id), "");
    }
}
