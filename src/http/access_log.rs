//! Per-request logger derivation and access logging.
//!
//! Each request gets its own [`Logger`] snapshot derived from the root one,
//! carrying `request_id`, `method` and `path`, with the tower-http
//! [`RequestId`] as its context handle. Handlers pick it up with `Extension<Logger>`.

use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};

use crate::fields;
use crate::http::request::{request_id_str, RequestId, RequestIdExt};
use crate::logger::{Context, Logger};

/// Derive the request logger, run the request, then log its outcome.
pub async fn access_log_middleware(
    State(root): State<Logger>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let mut logger = root.with_fields(fields! {
        "method" => request.method().to_string(),
        "path" => request.uri().path().to_string(),
    });
    if let Some(id) = request.request_id().cloned() {
        logger = logger
            .with_field("request_id", request_id_str(&id).to_owned())
            .with_context(Context::new(id));
    }
    request.extensions_mut().insert(logger.clone());

    let start = Instant::now();
    let response = next.run(request).await;
    let status = response.status();

    let logger = logger.with_fields(fields! {
        "status" => status.as_u16(),
        "latency_us" => u64::try_from(start.elapsed().as_micros()).unwrap_or(u64::MAX),
    });
    if status.is_server_error() {
        logger.error("request failed");
    } else {
        logger.info("request completed");
    }

    response
}

/// Recover the request id a request logger was derived for.
pub fn request_id_of(logger: &Logger) -> Option<&str> {
    logger
        .context()
        .and_then(|ctx| ctx.downcast_ref::<RequestId>())
        .map(request_id_str)
}
