//! Configuration loading from disk.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

use crate::config::schema::Settings;
use crate::config::validation::{validate_settings, ValidationError};

/// Default location of the configuration file, relative to the working dir.
pub const DEFAULT_CONFIG_PATH: &str = "configs/config.yaml";

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("unsupported config format for {0}, expected .yaml, .yml or .toml")]
    UnsupportedFormat(PathBuf),

    #[error("section {0:?} not found")]
    MissingSection(String),

    #[error("validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Serialization format of a configuration document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Toml,
}

impl ConfigFormat {
    /// Pick the format from the file extension.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => Ok(ConfigFormat::Yaml),
            Some("toml") => Ok(ConfigFormat::Toml),
            _ => Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

/// Load and validate configuration from a YAML or TOML file.
pub fn load_settings(path: &Path) -> Result<Settings, ConfigError> {
    let format = ConfigFormat::from_path(path)?;
    let content = read(path)?;
    let settings = parse_settings(&content, format)?;

    validate_settings(&settings).map_err(ConfigError::Validation)?;

    Ok(settings)
}

/// Parse a whole configuration document without validating it.
pub fn parse_settings(content: &str, format: ConfigFormat) -> Result<Settings, ConfigError> {
    let settings = match format {
        ConfigFormat::Yaml => serde_yaml::from_str(content)?,
        ConfigFormat::Toml => toml::from_str(content)?,
    };
    Ok(settings)
}

/// Deserialize one top-level section (e.g. `"Database"`) of a document.
pub fn read_section<T: DeserializeOwned>(
    content: &str,
    format: ConfigFormat,
    name: &str,
) -> Result<T, ConfigError> {
    let missing = || ConfigError::MissingSection(name.to_string());
    match format {
        ConfigFormat::Yaml => {
            let document: serde_yaml::Value = serde_yaml::from_str(content)?;
            let section = document.get(name).cloned().ok_or_else(missing)?;
            Ok(serde_yaml::from_value(section)?)
        }
        ConfigFormat::Toml => {
            let document: toml::Table = toml::from_str(content)?;
            let section = document.get(name).cloned().ok_or_else(missing)?;
            Ok(section.try_into()?)
        }
    }
}

fn read(path: &Path) -> Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{DatabaseSettings, RunMode, ServerSettings};

    const YAML: &str = r#"
Server:
  RunMode: release
  HttpPort: 8080
  ReadTimeout: 30
  WriteTimeout: 45
App:
  DefaultPageSize: 20
  LogSavePath: /var/log/blog
Database:
  DBType: mysql
  Username: blog
  Password: secret
  Host: db:3306
  DBName: blog_service
  MaxOpenConns: 40
"#;

    const TOML: &str = r#"
[Server]
HttpPort = 9000

[Database]
Host = "10.0.0.5:3307"
DBName = "blog"
"#;

    #[test]
    fn test_parse_yaml() {
        let settings = parse_settings(YAML, ConfigFormat::Yaml).unwrap();
        assert_eq!(settings.server.run_mode, RunMode::Release);
        assert_eq!(settings.server.http_port, 8080);
        assert_eq!(settings.server.write_timeout_secs, 45);
        assert_eq!(settings.app.default_page_size, 20);
        assert_eq!(settings.app.max_page_size, 100);
        assert_eq!(settings.app.log_save_path, PathBuf::from("/var/log/blog"));
        assert_eq!(settings.database.username, "blog");
        assert_eq!(settings.database.max_open_conns, 40);
        assert_eq!(settings.database.max_idle_conns, 10);
    }

    #[test]
    fn test_parse_toml() {
        let settings = parse_settings(TOML, ConfigFormat::Toml).unwrap();
        assert_eq!(settings.server.http_port, 9000);
        assert_eq!(settings.database.host, "10.0.0.5:3307");
        assert_eq!(settings.database.db_name, "blog");
        assert_eq!(settings.app, Default::default());
    }

    #[test]
    fn test_read_section() {
        let db: DatabaseSettings = read_section(YAML, ConfigFormat::Yaml, "Database").unwrap();
        assert_eq!(db.host, "db:3306");

        let server: ServerSettings = read_section(TOML, ConfigFormat::Toml, "Server").unwrap();
        assert_eq!(server.http_port, 9000);

        let err = read_section::<ServerSettings>(TOML, ConfigFormat::Toml, "App").unwrap_err();
        assert!(matches!(err, ConfigError::MissingSection(ref name) if name == "App"));
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(ConfigFormat::from_path(Path::new("a/config.yml")).unwrap(), ConfigFormat::Yaml);
        assert_eq!(ConfigFormat::from_path(Path::new("config.toml")).unwrap(), ConfigFormat::Toml);
        assert!(matches!(
            ConfigFormat::from_path(Path::new("config.ini")),
            Err(ConfigError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_load_reports_validation_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "Server:\n  HttpPort: 0\n").unwrap();

        let err = load_settings(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref errors) if errors == &[ValidationError::ZeroPort]));
        assert_eq!(err.to_string(), "validation failed: Server.HttpPort must be non-zero");
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_settings(Path::new("does/not/exist.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
