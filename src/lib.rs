//! Blog backend service library

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod logger;
pub mod model;

pub use config::Settings;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use logger::{Fields, Level, Logger};
