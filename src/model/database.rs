//! MySQL connection pool built from [`DatabaseSettings`].

use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions};
use sqlx::ConnectOptions;

use crate::config::{DatabaseSettings, RunMode};
use crate::model::Table;

/// Error type for database setup and probing.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("unsupported database type {0:?}")]
    UnsupportedDriver(String),

    #[error("invalid database host {0:?}")]
    InvalidHost(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Shared handle to the connection pool. Cloning shares the pool.
#[derive(Debug, Clone)]
pub struct DbEngine {
    pool: MySqlPool,
    table_prefix: String,
}

/// Build the pool. Connections are opened lazily on first use, so this
/// succeeds even while the server is unreachable.
///
/// Must be called inside a Tokio runtime.
pub fn new_db_engine(settings: &DatabaseSettings, run_mode: RunMode) -> Result<DbEngine, DatabaseError> {
    if !settings.db_type.eq_ignore_ascii_case("mysql") {
        return Err(DatabaseError::UnsupportedDriver(settings.db_type.clone()));
    }
    let (host, port) = settings
        .host_and_port()
        .ok_or_else(|| DatabaseError::InvalidHost(settings.host.clone()))?;

    let mut options = MySqlConnectOptions::new()
        .host(host)
        .port(port)
        .username(&settings.username)
        .password(&settings.password)
        .database(&settings.db_name)
        .charset(&settings.charset);
    if !run_mode.is_debug() {
        options = options.disable_statement_logging();
    }

    let (min, max) = pool_bounds(settings);
    let mut pool_options = MySqlPoolOptions::new().min_connections(min);
    if let Some(max) = max {
        pool_options = pool_options.max_connections(max);
    }

    Ok(DbEngine {
        pool: pool_options.connect_lazy_with(options),
        table_prefix: settings.table_prefix.clone(),
    })
}

/// `(min idle, max open)`; a zero `MaxOpenConns` leaves the pool default.
fn pool_bounds(settings: &DatabaseSettings) -> (u32, Option<u32>) {
    match settings.max_open_conns {
        0 => (settings.max_idle_conns, None),
        open => (settings.max_idle_conns.min(open), Some(open)),
    }
}

impl DbEngine {
    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }

    /// Prefixed, singular table name for `T`, e.g. `blog_tag`.
    pub fn table_name<T: Table>(&self) -> String {
        format!("{}{}", self.table_prefix, T::NAME)
    }

    /// Round-trip a trivial query to check connectivity.
    pub async fn ping(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Tag;

    #[test]
    fn test_pool_bounds() {
        let mut settings = DatabaseSettings::default();
        assert_eq!(pool_bounds(&settings), (10, Some(30)));

        settings.max_idle_conns = 50;
        assert_eq!(pool_bounds(&settings), (30, Some(30)));

        settings.max_open_conns = 0;
        assert_eq!(pool_bounds(&settings), (50, None));
    }

    #[test]
    fn test_rejects_bad_settings() {
        let mut settings = DatabaseSettings::default();
        settings.host = "db:not-a-port".into();
        assert!(matches!(
            new_db_engine(&settings, RunMode::Release),
            Err(DatabaseError::InvalidHost(_))
        ));

        settings.db_type = "sqlite".into();
        assert!(matches!(
            new_db_engine(&settings, RunMode::Release),
            Err(DatabaseError::UnsupportedDriver(_))
        ));
    }

    #[tokio::test]
    async fn test_lazy_pool_from_settings() {
        let settings = DatabaseSettings {
            max_idle_conns: 0,
            max_open_conns: 5,
            ..DatabaseSettings::default()
        };
        let engine = new_db_engine(&settings, RunMode::Debug).unwrap();

        assert_eq!(engine.pool().options().get_max_connections(), 5);
        assert_eq!(engine.pool().size(), 0);
        assert_eq!(engine.table_name::<Tag>(), "blog_tag");
        engine.close().await;
    }
}
