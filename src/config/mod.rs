//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! configs/config.yaml (YAML or TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → Settings (validated, immutable)
//!     → shared via Arc with the HTTP layer
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_settings, read_section, ConfigError, ConfigFormat, DEFAULT_CONFIG_PATH};
pub use schema::{AppSettings, DatabaseSettings, RunMode, ServerSettings, Settings};
pub use validation::ValidationError;
