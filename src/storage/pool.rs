//! Connection pool construction from a DSN-style database URL.
//!
//! One pool is built per process and handed to the [`QueryExecutor`]. Every
//! new connection gets foreign keys enabled; file-backed stores also switch
//! to WAL so readers do not block the single writer.
//!
//! [`QueryExecutor`]: crate::storage::QueryExecutor

use crate::error::{BoostError, Result};
use r2d2_sqlite::SqliteConnectionManager;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

pub type DbPool = r2d2::Pool<SqliteConnectionManager>;

/// Default DSN, relative to the working directory.
pub const DEFAULT_DATABASE_URL: &str = "sqlite:///boostme.db";

const SQLITE_SCHEME: &str = "sqlite://";
const MEMORY_MARKER: &str = ":memory:";

/// Connections to file stores are recycled after this long.
pub const DEFAULT_RECYCLE: Duration = Duration::from_secs(3600);

/// Where the relational store lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseUrl {
    Memory,
    File(PathBuf),
}

impl DatabaseUrl {
    #[must_use]
    pub const fn is_memory(&self) -> bool {
        matches!(self, Self::Memory)
    }
}

impl FromStr for DatabaseUrl {
    type Err = BoostError;

    /// Accepts `sqlite:///relative.db`, `sqlite:////abs/path.db`,
    /// `sqlite:///:memory:`, `sqlite://` and bare filesystem paths.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(BoostError::Config("database URL is empty".to_string()));
        }

        let Some(rest) = s.strip_prefix(SQLITE_SCHEME) else {
            if let Some((scheme, _)) = s.split_once("://") {
                return Err(BoostError::Config(format!(
                    "unsupported database backend: {scheme}"
                )));
            }
            if s == MEMORY_MARKER {
                return Ok(Self::Memory);
            }
            return Ok(Self::File(PathBuf::from(s)));
        };

        // The authority part is always empty for SQLite; what follows the
        // third slash is the path (a fourth slash makes it absolute).
        let path = rest.strip_prefix('/').unwrap_or(rest);
        if path.is_empty() || path == MEMORY_MARKER {
            return Ok(Self::Memory);
        }
        Ok(Self::File(PathBuf::from(path)))
    }
}

impl fmt::Display for DatabaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Memory => write!(f, "{SQLITE_SCHEME}/{MEMORY_MARKER}"),
            Self::File(path) => write!(f, "{SQLITE_SCHEME}/{}", path.display()),
        }
    }
}

/// Pool tuning knobs resolved from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolOptions {
    pub max_size: u32,
    pub recycle: Option<Duration>,
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self {
            max_size: 4,
            recycle: Some(DEFAULT_RECYCLE),
        }
    }
}

/// Build the process-wide connection pool.
///
/// An in-memory store lives only as long as its connection, so it gets a
/// single connection that is never recycled.
///
/// # Errors
///
/// Returns an error if the parent directory cannot be created or the first
/// connection cannot be opened.
pub fn create_pool(url: &DatabaseUrl, options: &PoolOptions) -> Result<DbPool> {
    let pool = match url {
        DatabaseUrl::Memory => {
            let manager = SqliteConnectionManager::memory().with_init(|conn| {
                conn.pragma_update(None, "foreign_keys", "ON")
            });
            r2d2::Pool::builder()
                .max_size(1)
                .min_idle(Some(1))
                .idle_timeout(None)
                .max_lifetime(None)
                .build(manager)?
        }
        DatabaseUrl::File(path) => {
            ensure_parent_dir(path)?;
            let manager = SqliteConnectionManager::file(path).with_init(|conn| {
                conn.pragma_update(None, "journal_mode", "WAL")?;
                conn.pragma_update(None, "foreign_keys", "ON")?;
                conn.pragma_update(None, "synchronous", "NORMAL")
            });
            r2d2::Pool::builder()
                .max_size(options.max_size.max(1))
                .max_lifetime(options.recycle)
                .build(manager)?
        }
    };

    debug!(url = %url, max_size = pool.max_size(), "Connection pool ready");
    Ok(pool)
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn parses_relative_file_url() {
        let url: DatabaseUrl = "sqlite:///boostme.db".parse().unwrap();
        assert_eq!(url, DatabaseUrl::File(PathBuf::from("boostme.db")));
    }

    #[test]
    fn parses_absolute_file_url() {
        let url: DatabaseUrl = "sqlite:////var/lib/boostme.db".parse().unwrap();
        assert_eq!(url, DatabaseUrl::File(PathBuf::from("/var/lib/boostme.db")));
    }

    #[test]
    fn parses_memory_urls() {
        for raw in ["sqlite:///:memory:", "sqlite://", "sqlite:///", ":memory:"] {
            let url: DatabaseUrl = raw.parse().unwrap();
            assert!(url.is_memory(), "{raw} should be in-memory");
        }
    }

    #[test]
    fn bare_path_is_a_file() {
        let url: DatabaseUrl = "data/challenges.db".parse().unwrap();
        assert_eq!(url, DatabaseUrl::File(PathBuf::from("data/challenges.db")));
    }

    #[test]
    fn rejects_other_backends() {
        let err = "postgresql://localhost/boostme"
            .parse::<DatabaseUrl>()
            .unwrap_err();
        assert!(matches!(err, BoostError::Config(_)));
        assert!(err.to_string().contains("postgresql"));
        assert!("   ".parse::<DatabaseUrl>().is_err());
    }

    #[test]
    fn display_round_trips_default() {
        let url: DatabaseUrl = DEFAULT_DATABASE_URL.parse().unwrap();
        assert_eq!(url.to_string(), DEFAULT_DATABASE_URL);
    }

    #[test]
    fn file_pool_creates_parent_directory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("boostme.db");
        let pool = create_pool(&DatabaseUrl::File(path.clone()), &PoolOptions::default()).unwrap();
        let conn = pool.get().unwrap();
        let fk: i64 = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(fk, 1);
        assert!(path.exists());
    }

    #[test]
    fn memory_pool_keeps_one_connection() {
        let pool = create_pool(&DatabaseUrl::Memory, &PoolOptions::default()).unwrap();
        assert_eq!(pool.max_size(), 1);
        {
            let conn = pool.get().unwrap();
            conn.execute_batch("CREATE TABLE t (x INTEGER)").unwrap();
        }
        let conn = pool.get().unwrap();
        let n: i64 = conn
            .query_row("SELECT COUNT(*) FROM t", [], |row| row.get(0))
            .unwrap();
        assert_eq!(n, 0);
    }
}
