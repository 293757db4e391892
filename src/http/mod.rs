//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, trace + timeout layers)
//!     → request.rs (tower-http reuses or assigns x-request-id)
//!     → access_log.rs (derive per-request Logger, log outcome)
//!     → handlers
//! ```

pub mod access_log;
pub mod request;
pub mod server;

pub use access_log::{access_log_middleware, request_id_of};
pub use request::{
    propagate_request_id_layer, request_id_str, set_request_id_layer, RequestId, RequestIdExt,
    X_REQUEST_ID,
};
pub use server::{AppState, HttpServer};
