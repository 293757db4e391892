//! Configuration schema definitions.
//!
//! Section and key names follow `configs/config.yaml` (`Server`, `App`,
//! `Database`, PascalCase keys). Every field has a default so partial files
//! load.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the blog service.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct Settings {
    #[serde(rename = "Server")]
    pub server: ServerSettings,

    #[serde(rename = "App")]
    pub app: AppSettings,

    #[serde(rename = "Database")]
    pub database: DatabaseSettings,
}

/// Run mode; `debug` turns on verbose database logging.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    #[default]
    Debug,
    Release,
    Test,
}

impl RunMode {
    pub fn is_debug(&self) -> bool {
        matches!(self, RunMode::Debug)
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, rename_all = "PascalCase")]
pub struct ServerSettings {
    pub run_mode: RunMode,

    pub http_port: u16,

    /// Seconds until a handler must have produced response headers.
    #[serde(rename = "ReadTimeout")]
    pub read_timeout_secs: u64,

    /// Seconds the server waits for each chunk of a response body.
    #[serde(rename = "WriteTimeout")]
    pub write_timeout_secs: u64,
}

impl ServerSettings {
    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_secs(self.write_timeout_secs)
    }

    /// Address the HTTP listener binds to.
    pub fn bind_address(&self) -> String {
        format!("0.0.0.0:{}", self.http_port)
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            run_mode: RunMode::Debug,
            http_port: 8000,
            read_timeout_secs: 60,
            write_timeout_secs: 60,
        }
    }
}

/// Application-level settings: paging and log file placement.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, rename_all = "PascalCase")]
pub struct AppSettings {
    pub default_page_size: u32,

    pub max_page_size: u32,

    /// Directory holding log files.
    pub log_save_path: PathBuf,

    pub log_file_name: String,

    /// Extension including the dot, e.g. `.log`.
    pub log_file_ext: String,

    /// Rotated files kept by the rolling sink (one per day).
    pub log_max_files: usize,
}

impl AppSettings {
    /// `LogSavePath/LogFileName + LogFileExt`, the undated log file name.
    pub fn log_file_path(&self) -> PathBuf {
        self.log_save_path
            .join(format!("{}{}", self.log_file_name, self.log_file_ext))
    }
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            default_page_size: 10,
            max_page_size: 100,
            log_save_path: PathBuf::from("storage/logs"),
            log_file_name: "app".to_string(),
            log_file_ext: ".log".to_string(),
            log_max_files: 10,
        }
    }
}

/// MySQL connection settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, rename_all = "PascalCase")]
pub struct DatabaseSettings {
    #[serde(rename = "DBType")]
    pub db_type: String,

    pub username: String,

    pub password: String,

    /// `host:port`.
    pub host: String,

    #[serde(rename = "DBName")]
    pub db_name: String,

    pub table_prefix: String,

    pub charset: String,

    pub parse_time: bool,

    pub max_idle_conns: u32,

    pub max_open_conns: u32,
}

impl DatabaseSettings {
    /// Split `host` into host name and port; the port defaults to 3306.
    pub fn host_and_port(&self) -> Option<(&str, u16)> {
        match self.host.rsplit_once(':') {
            Some((host, port)) if !host.is_empty() => port.parse().ok().map(|port| (host, port)),
            Some(_) => None,
            None if !self.host.is_empty() => Some((self.host.as_str(), 3306)),
            None => None,
        }
    }
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            db_type: "mysql".to_string(),
            username: "root".to_string(),
            password: String::new(),
            host: "127.0.0.1:3306".to_string(),
            db_name: "blog_service".to_string(),
            table_prefix: "blog_".to_string(),
            charset: "utf8mb4".to_string(),
            parse_time: true,
            max_idle_conns: 10,
            max_open_conns: 30,
        }
    }
}
