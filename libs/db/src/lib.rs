#![cfg_attr(
    not(any(feature = "mysql", feature = "sqlite")),
    allow(unused_imports, unused_variables, dead_code, unreachable_code)
)]

//! Database abstraction crate providing a database-agnostic `DbHandle`.
//!
//! The handle wraps a single sqlx `Any` pool so callers write one set of
//! statements with positional `?` placeholders and run them against SQLite
//! or MySQL. The concrete engine is detected from the DSN scheme and is
//! available through [`DbHandle::engine`] for the rare engine-specific
//! statement (DDL mostly).
//!
//! # Features
//! - `sqlite`, `mysql`: install the matching sqlx driver into the `Any` pool
//!
//! # Example
//! ```rust,no_run
//! #[tokio::main]
//! async fn main() -> db::Result<()> {
//!     use db::{ConnectOpts, DbHandle};
//!
//!     let db = DbHandle::connect("sqlite::memory:", ConnectOpts::default()).await?;
//!
//!     let mut tx = db.begin().await?;
//!     sqlx::query("select 1").execute(&mut *tx).await?;
//!     tx.commit().await?;
//!
//!     db.close().await;
//!     Ok(())
//! }
//! ```

use std::time::Duration;

use sqlx::any::AnyPoolOptions;
use sqlx::{Any, AnyPool, Transaction};
use thiserror::Error;

/// Library-local result type.
pub type Result<T> = std::result::Result<T, DbError>;

/// A transaction on the shared pool.
///
/// Dropping it without calling `commit` rolls it back, so any early return
/// from a transactional body leaves the database untouched.
pub type DbTransaction = Transaction<'static, Any>;

/// Typed error for the DB handle and helpers.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("Unknown DSN: {0}")]
    UnknownDsn(String),

    #[error("Feature not enabled: {0}")]
    FeatureDisabled(&'static str),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Supported engines.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DbEngine {
    MySql,
    Sqlite,
}

/// Connection options.
/// Covers the common sqlx pool knobs plus a couple of SQLite specifics.
#[derive(Clone, Debug)]
pub struct ConnectOpts {
    /// Maximum number of connections in the pool.
    pub max_conns: Option<u32>,
    /// Minimum number of connections in the pool.
    pub min_conns: Option<u32>,
    /// Timeout to acquire a connection from the pool.
    pub acquire_timeout: Option<Duration>,
    /// Idle timeout before a connection is closed.
    pub idle_timeout: Option<Duration>,
    /// Maximum lifetime for a connection.
    pub max_lifetime: Option<Duration>,
    /// Test connection health before acquire.
    pub test_before_acquire: bool,
    /// SQLite `busy_timeout` applied on every new connection.
    pub sqlite_busy_timeout: Option<Duration>,
    /// For SQLite file DSNs, create parent directories if missing.
    pub create_sqlite_dirs: bool,
}

impl Default for ConnectOpts {
    fn default() -> Self {
        Self {
            max_conns: Some(10),
            min_conns: None,
            acquire_timeout: Some(Duration::from_secs(30)),
            idle_timeout: None,
            max_lifetime: None,
            test_before_acquire: false,
            sqlite_busy_timeout: Some(Duration::from_millis(DEFAULT_SQLITE_BUSY_TIMEOUT_MS)),
            create_sqlite_dirs: true,
        }
    }
}

const DEFAULT_SQLITE_BUSY_TIMEOUT_MS: u64 = 5000;

/// Main handle.
#[derive(Debug, Clone)]
pub struct DbHandle {
    engine: DbEngine,
    pool: AnyPool,
}

impl DbHandle {
    /// Detect engine by DSN.
    ///
    /// Note: we only check scheme prefixes and don't mutate the tail (credentials etc.).
    pub fn detect(dsn: &str) -> Result<DbEngine> {
        // Trim only leading spaces/newlines to be forgiving with env files.
        let s = dsn.trim_start();

        if s.starts_with("mysql://") || s.starts_with("mariadb://") {
            Ok(DbEngine::MySql)
        } else if s.starts_with("sqlite:") {
            Ok(DbEngine::Sqlite)
        } else {
            Err(DbError::UnknownDsn(dsn.to_string()))
        }
    }

    /// Connect and build handle.
    pub async fn connect(dsn: &str, opts: ConnectOpts) -> Result<Self> {
        let engine = Self::detect(dsn)?;
        ensure_engine_enabled(engine)?;

        // Idempotent; registers every driver compiled into sqlx.
        sqlx::any::install_default_drivers();

        let dsn = match engine {
            DbEngine::Sqlite => prepare_sqlite_path(dsn, opts.create_sqlite_dirs)?,
            DbEngine::MySql => dsn.to_string(),
        };
        let in_memory = engine == DbEngine::Sqlite && is_sqlite_memory(&dsn);

        let mut o = AnyPoolOptions::new();
        if let Some(n) = opts.max_conns {
            o = o.max_connections(n);
        }
        if let Some(n) = opts.min_conns {
            o = o.min_connections(n);
        }
        if let Some(t) = opts.acquire_timeout {
            o = o.acquire_timeout(t);
        }
        if let Some(t) = opts.idle_timeout {
            o = o.idle_timeout(t);
        }
        if let Some(t) = opts.max_lifetime {
            o = o.max_lifetime(t);
        }
        if opts.test_before_acquire {
            o = o.test_before_acquire(true);
        }

        // Every pooled connection to ":memory:" is its own database; pin the
        // pool to one long-lived connection so all callers see the same data.
        if in_memory {
            o = o
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }

        if engine == DbEngine::Sqlite {
            if let Some(busy) = opts.sqlite_busy_timeout {
                let ms = i64::try_from(busy.as_millis()).unwrap_or(i64::MAX);
                o = o.after_connect(move |conn, _meta| {
                    Box::pin(async move {
                        let stmt = format!("PRAGMA busy_timeout = {ms}");
                        sqlx::query(&stmt).execute(&mut *conn).await?;
                        Ok(())
                    })
                });
            }
        }

        let pool = o.connect(&dsn).await?;
        tracing::debug!(?engine, in_memory, "database pool connected");

        Ok(Self { engine, pool })
    }

    /// Graceful pool close. (Dropping the pool also closes it; this just makes it explicit.)
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Get the backend.
    pub fn engine(&self) -> DbEngine {
        self.engine
    }

    /// Direct pool access for statements that run outside a transaction.
    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }

    /// Begin a transaction on a pooled connection.
    pub async fn begin(&self) -> Result<DbTransaction> {
        Ok(self.pool.begin().await?)
    }
}

// ===================== helpers =====================

fn ensure_engine_enabled(engine: DbEngine) -> Result<()> {
    match engine {
        #[cfg(feature = "sqlite")]
        DbEngine::Sqlite => Ok(()),
        #[cfg(feature = "mysql")]
        DbEngine::MySql => Ok(()),
        #[allow(unreachable_patterns)]
        DbEngine::Sqlite => Err(DbError::FeatureDisabled("sqlite")),
        #[allow(unreachable_patterns)]
        DbEngine::MySql => Err(DbError::FeatureDisabled("mysql")),
    }
}

fn is_sqlite_memory(dsn: &str) -> bool {
    dsn.contains(":memory:") || dsn.contains("mode=memory")
}

fn prepare_sqlite_path(dsn: &str, create_dirs: bool) -> Result<String> {
    // Only try to create directories for plain file paths; ignore :memory: cases.
    if !create_dirs || is_sqlite_memory(dsn) {
        return Ok(dsn.to_string());
    }

    // Handles "sqlite:/path" and "sqlite://path".
    // For URI forms like "sqlite:file:memdb?..." there is no filesystem dir to create.
    let raw = if let Some(rest) = dsn.strip_prefix("sqlite://") {
        rest
    } else if let Some(rest) = dsn.strip_prefix("sqlite:") {
        rest
    } else {
        dsn
    };
    let path = raw.split_once('?').map(|(p, _)| p).unwrap_or(raw);

    if !path.starts_with("file:") {
        if let Some(parent) = std::path::Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                // One-time blocking call during startup; acceptable for setup paths.
                std::fs::create_dir_all(parent)?;
            }
        }
    }

    Ok(dsn.to_string())
}

// ===================== tests =====================
