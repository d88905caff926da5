//! # Database Handle
//!
//! Opens the SQLite ledger file behind a connection pool and applies the
//! embedded schema before the server accepts requests.
//!
//! ```text
//!   [database] in margin.toml ──► DbConfig ──► Database::new
//!                                                  │
//!                              pragmas + pool ◄────┤
//!                              migrations     ◄────┘
//!                                                  │
//!                          platforms() / sales() ──► repositories per request
//! ```
//!
//! The file runs in WAL mode: list and summary queries read a snapshot while
//! a sale update commits.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::platform::PlatformRepository;
use crate::repository::sale::SaleRepository;

const IN_MEMORY: &str = ":memory:";

/// Where the ledger lives and how many connections may reach it.
///
/// ```rust
/// use std::time::Duration;
/// use margin_db::DbConfig;
///
/// let config = DbConfig::new("/var/lib/margin/margin.db")
///     .max_connections(8)
///     .connect_timeout(Duration::from_secs(5));
/// assert_eq!(config.max_connections, 8);
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Ledger file, or `:memory:`.
    pub database_path: PathBuf,

    pub max_connections: u32,

    /// How long a request waits for a free connection.
    pub connect_timeout: Duration,
}

impl DbConfig {
    /// A file-backed ledger; the file is created on first open.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            connect_timeout: Duration::from_secs(30),
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// A private in-memory ledger. Every call yields a separate database,
    /// held on a single connection so it outlives individual queries.
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(IN_MEMORY),
            max_connections: 1,
            connect_timeout: Duration::from_secs(5),
        }
    }

    pub fn is_in_memory(&self) -> bool {
        self.database_path.as_os_str() == IN_MEMORY
    }

    fn connect_url(&self) -> String {
        if self.is_in_memory() {
            "sqlite::memory:".to_string()
        } else {
            format!("sqlite://{}?mode=rwc", self.database_path.display())
        }
    }
}

/// Pooled access to the ledger. Clones share the pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens the ledger and brings its schema up to date.
    ///
    /// Fails with [`DbError::ConnectionFailed`] when the file cannot be
    /// opened and [`DbError::MigrationFailed`] when the schema cannot be
    /// applied.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        let connect_options = SqliteConnectOptions::from_str(&config.connect_url())
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.connect_timeout)
            .connect_with(connect_options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        migrations::run_migrations(&pool).await?;

        info!(
            path = %config.database_path.display(),
            max_connections = config.max_connections,
            timeout_secs = config.connect_timeout.as_secs(),
            "Ledger database ready"
        );

        Ok(Database { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn platforms(&self) -> PlatformRepository {
        PlatformRepository::new(self.pool.clone())
    }

    pub fn sales(&self) -> SaleRepository {
        SaleRepository::new(self.pool.clone())
    }

    /// Closes the pool. Queries issued afterwards fail, which `/health`
    /// reports as degraded.
    pub async fn close(&self) {
        info!("Closing ledger database");
        self.pool.close().await;
    }

    /// True when a trivial query succeeds.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}
