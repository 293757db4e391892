//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (port and timeouts non-zero, page sizes ordered)
//! - Check the database section is usable before a pool is built
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Pure function: &Settings → Result<(), Vec<ValidationError>>

use crate::config::schema::Settings;

/// A single semantic problem in a loaded configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Server.HttpPort must be non-zero")]
    ZeroPort,

    #[error("Server.{0} must be at least one second")]
    ZeroTimeout(&'static str),

    #[error("App.DefaultPageSize ({default}) exceeds App.MaxPageSize ({max})")]
    PageSize { default: u32, max: u32 },

    #[error("App.LogFileName must not be empty")]
    EmptyLogFileName,

    #[error("Database.DBType {0:?} is not supported, expected \"mysql\"")]
    UnsupportedDatabase(String),

    #[error("Database.Host {0:?} is not a valid host:port")]
    InvalidHost(String),

    #[error("Database.MaxIdleConns ({idle}) exceeds Database.MaxOpenConns ({open})")]
    IdleExceedsOpen { idle: u32, open: u32 },
}

/// Check a parsed configuration, collecting every problem found.
pub fn validate_settings(settings: &Settings) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let server = &settings.server;
    let app = &settings.app;
    let db = &settings.database;

    if server.http_port == 0 {
        errors.push(ValidationError::ZeroPort);
    }
    if server.read_timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("ReadTimeout"));
    }
    if server.write_timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("WriteTimeout"));
    }

    if app.default_page_size > app.max_page_size {
        errors.push(ValidationError::PageSize {
            default: app.default_page_size,
            max: app.max_page_size,
        });
    }
    if app.log_file_name.trim().is_empty() {
        errors.push(ValidationError::EmptyLogFileName);
    }

    if !db.db_type.eq_ignore_ascii_case("mysql") {
        errors.push(ValidationError::UnsupportedDatabase(db.db_type.clone()));
    }
    if db.host_and_port().is_none() {
        errors.push(ValidationError::InvalidHost(db.host.clone()));
    }
    if db.max_open_conns > 0 && db.max_idle_conns > db.max_open_conns {
        errors.push(ValidationError::IdleExceedsOpen {
            idle: db.max_idle_conns,
            open: db.max_open_conns,
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
