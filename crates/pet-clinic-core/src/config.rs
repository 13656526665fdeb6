//! Store configuration.

use std::env;
use std::path::PathBuf;

use crate::db::{Database, DbError, DbResult};

/// Environment variable holding the connection string.
pub const DATABASE_URL_VAR: &str = "CLINIC_DATABASE_URL";
/// Environment variable overriding the database name.
pub const DATABASE_NAME_VAR: &str = "CLINIC_DATABASE_NAME";
/// Database name used when no override is set.
pub const DEFAULT_DATABASE_NAME: &str = "pet-clinic";

const MEMORY_URL: &str = "sqlite::memory:";
const SQLITE_SCHEME: &str = "sqlite://";

/// Where the store keeps its data.
///
/// The connection string is `sqlite::memory:`, `sqlite://<directory>`, or a
/// bare directory path. The database file is `<directory>/<name>.sqlite3`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub database_url: Option<String>,
    pub database_name: String,
}

/// Resolved database location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseLocation {
    Memory,
    File(PathBuf),
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            database_name: DEFAULT_DATABASE_NAME.to_string(),
        }
    }
}

impl StoreConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Self {
        let database_url = env::var(DATABASE_URL_VAR)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());
        let database_name = env::var(DATABASE_NAME_VAR)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_DATABASE_NAME.to_string());
        Self {
            database_url,
            database_name,
        }
    }

    /// In-memory store (for testing).
    pub fn in_memory() -> Self {
        Self {
            database_url: Some(MEMORY_URL.to_string()),
            ..Self::default()
        }
    }

    /// Store rooted in a directory.
    pub fn directory(path: impl Into<PathBuf>) -> Self {
        Self {
            database_url: Some(path.into().display().to_string()),
            ..Self::default()
        }
    }

    /// Resolve the connection string. Fails if it is missing.
    pub fn location(&self) -> DbResult<DatabaseLocation> {
        let url = self.database_url.as_deref().ok_or_else(|| {
            DbError::Config(format!("missing {DATABASE_URL_VAR} environment variable"))
        })?;

        if url == MEMORY_URL {
            return Ok(DatabaseLocation::Memory);
        }

        let dir = url.strip_prefix(SQLITE_SCHEME).unwrap_or(url);
        if dir.is_empty() {
            return Err(DbError::Config(format!("empty directory in {DATABASE_URL_VAR}")));
        }
        if self.database_name.contains(|c: char| c == '/' || c == '\\') {
            return Err(DbError::Config(format!(
                "invalid database name: {}",
                self.database_name
            )));
        }

        Ok(DatabaseLocation::File(
            PathBuf::from(dir).join(format!("{}.sqlite3", self.database_name)),
        ))
    }

    /// Open the configured database, creating its directory if needed.
    pub fn open(&self) -> DbResult<Database> {
        match self.location()? {
            DatabaseLocation::Memory => Database::open_in_memory(),
            DatabaseLocation::File(path) => {
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                Database::open(path)
            }
        }
    }
}
