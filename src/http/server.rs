//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with all handlers
//! - Wire up middleware (tracing, read/write timeouts, request ID, access log)
//! - Bind server to listener
//! - Stop on the shutdown broadcast

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::{StatusCode, Uri},
    middleware,
    response::IntoResponse,
    routing::get,
    Extension, Json, Router,
};
use serde::Serialize;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    timeout::{ResponseBodyTimeoutLayer, TimeoutLayer},
    trace::TraceLayer,
};

use crate::config::Settings;
use crate::http::access_log::{access_log_middleware, request_id_of};
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::logger::Logger;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
}

/// HTTP server for the blog service.
pub struct HttpServer {
    router: Router,
    logger: Logger,
}

impl HttpServer {
    /// Create a new HTTP server; `logger` is the root every request derives from.
    pub fn new(settings: Arc<Settings>, logger: Logger) -> Self {
        let router = Self::build_router(settings, logger.clone());
        Self { router, logger }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(settings: Arc<Settings>, logger: Logger) -> Router {
        let read_timeout = settings.server.read_timeout();
        let write_timeout = settings.server.write_timeout();
        let state = AppState { settings };

        let router = Router::new()
            .route("/ping", get(ping))
            .route("/api/v1/paging", get(paging))
            .fallback(not_found)
            .with_state(state)
            .layer(middleware::from_fn_with_state(logger, access_log_middleware))
            .layer(propagate_request_id_layer())
            .layer(set_request_id_layer());

        with_timeouts(router, read_timeout, write_timeout).layer(TraceLayer::new_for_http())
    }

    /// A handle to the router, for driving requests without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        self.logger
            .with_field("address", addr.to_string())
            .info("HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        self.logger.info("HTTP server stopped");
        Ok(())
    }
}

/// `read` bounds the time until response headers are ready, `write` bounds
/// each wait for the next chunk of the response body.
#[allow(deprecated)]
fn with_timeouts(router: Router, read: Duration, write: Duration) -> Router {
    router
        .layer(ResponseBodyTimeoutLayer::new(write))
        .layer(TimeoutLayer::new(read))
}

async fn ping(Extension(logger): Extension<Logger>) -> &'static str {
    if let Some(id) = request_id_of(&logger) {
        logger.debugf(format_args!("ping {}", id));
    }
    "pong"
}

#[derive(Debug, Serialize)]
struct Paging {
    default_page_size: u32,
    max_page_size: u32,
}

/// Paging limits clients should respect.
async fn paging(State(state): State<AppState>) -> Json<Paging> {
    Json(Paging {
        default_page_size: state.settings.app.default_page_size,
        max_page_size: state.settings.app.max_page_size,
    })
}

async fn not_found(Extension(logger): Extension<Logger>, uri: Uri) -> impl IntoResponse {
    logger.with_field("uri", uri.to_string()).warn("no route matched");
    (StatusCode::NOT_FOUND, "No matching route found")
}
