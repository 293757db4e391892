//! Startup orchestration.
//!
//! # Responsibilities
//! - Load and validate configuration
//! - Build the database engine
//! - Build the root logger over a rolling file sink
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Ordered: settings, then database, then logger
//! - The root logger lives in [`App`] and is passed down explicitly

use std::path::Path;
use std::sync::Arc;

use tracing_appender::rolling::InitError;

use crate::config::{load_settings, AppSettings, ConfigError, Settings};
use crate::logger::{sink, Logger};
use crate::model::{new_db_engine, DatabaseError, DbEngine};

/// Error raised while bringing the service up.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("setup settings: {0}")]
    Settings(#[from] ConfigError),

    #[error("setup database engine: {0}")]
    Database(#[from] DatabaseError),

    #[error("setup logger: {0}")]
    Logger(#[from] InitError),
}

/// Composition root: everything the service needs, built once.
#[derive(Debug, Clone)]
pub struct App {
    pub settings: Arc<Settings>,
    pub db: DbEngine,
    pub logger: Logger,
}

pub fn setup_settings(path: &Path) -> Result<Settings, ConfigError> {
    load_settings(path)
}

/// Must run inside a Tokio runtime.
pub fn setup_db_engine(settings: &Settings) -> Result<DbEngine, DatabaseError> {
    new_db_engine(&settings.database, settings.server.run_mode)
}

/// Root logger writing JSON lines to `LogSavePath/LogFileName.<date>LogFileExt`.
pub fn setup_logger(app: &AppSettings) -> Result<Logger, InitError> {
    let sink = sink::rolling_file(
        &app.log_save_path,
        &app.log_file_name,
        &app.log_file_ext,
        app.log_max_files,
    )?;
    Ok(Logger::new(sink))
}

/// Run every setup step in order.
pub fn bootstrap(config_path: &Path) -> Result<App, StartupError> {
    let settings = setup_settings(config_path)?;
    let db = setup_db_engine(&settings)?;
    let logger = setup_logger(&settings.app)?;

    tracing::info!(
        config = %config_path.display(),
        run_mode = ?settings.server.run_mode,
        http_port = settings.server.http_port,
        log_file = %settings.app.log_file_path().display(),
        "Configuration loaded"
    );

    Ok(App {
        settings: Arc::new(settings),
        db,
        logger,
    })
}
