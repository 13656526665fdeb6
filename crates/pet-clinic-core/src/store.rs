//! Client record repository.
//!
//! [`ClientStore`] is the only component that touches persistent storage.
//! The database is opened lazily on first use; callers that arrive while the
//! connection is being established wait for that same attempt. SQLite work
//! runs on the blocking thread pool behind a mutex.

use std::sync::{Arc, Mutex};

use chrono::Utc;
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::config::StoreConfig;
use crate::db::{Database, DbError, DbResult};
use crate::models::{ClientFilters, ClientInput, ClientOrder, ClientPatch, ClientRecord};
use crate::query::build_filter;

/// Repository errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The id is not a well-formed client id. Nothing was looked up.
    #[error("invalid client id: {0}")]
    InvalidId(String),

    /// The underlying store failed or returned unusable data.
    #[error("failed to {operation}: {source}")]
    Storage {
        operation: &'static str,
        #[source]
        source: DbError,
    },
}

impl StoreError {
    pub fn is_invalid_id(&self) -> bool {
        matches!(self, StoreError::InvalidId(_))
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Async repository over a lazily opened, shared database.
pub struct ClientStore {
    config: StoreConfig,
    db: OnceCell<Arc<Mutex<Database>>>,
}

impl ClientStore {
    /// Create a store. Nothing is opened until the first operation.
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Create a store over an already opened database.
    pub fn from_database(db: Database) -> Self {
        Self {
            config: StoreConfig::default(),
            db: OnceCell::new_with(Some(Arc::new(Mutex::new(db)))),
        }
    }

    /// Whether the database has been opened yet.
    pub fn is_connected(&self) -> bool {
        self.db.initialized()
    }

    /// List clients matching the filters, newest first.
    pub async fn list(&self, filters: &ClientFilters) -> StoreResult<Vec<ClientRecord>> {
        self.list_ordered(filters, ClientOrder::Newest).await
    }

    /// List clients matching the filters in the given order.
    pub async fn list_ordered(
        &self,
        filters: &ClientFilters,
        order: ClientOrder,
    ) -> StoreResult<Vec<ClientRecord>> {
        let predicate = build_filter(filters);
        debug!(?predicate, ?order, "listing clients");
        self.with_db("list clients", move |db| db.list_clients(&predicate, order))
            .await
    }

    /// Get a client by ID. `Ok(None)` if the ID is well formed but unknown.
    pub async fn get_by_id(&self, id: &str) -> StoreResult<Option<ClientRecord>> {
        let id = parse_client_id(id)?;
        self.with_db("get client by id", move |db| db.get_client(&id))
            .await
    }

    /// Insert a new client and return it as stored.
    pub async fn add(&self, input: ClientInput) -> StoreResult<ClientRecord> {
        self.with_db("add client", move |db| {
            let client = ClientRecord::new(input, Utc::now());
            db.insert_client(&client)?;
            db.get_client(&client.id)?.ok_or_else(|| DbError::Corrupt {
                id: client.id.clone(),
                reason: "created client could not be read back".to_string(),
            })
        })
        .await
    }

    /// Apply a partial update. `Ok(None)` if the ID is well formed but unknown.
    pub async fn update(&self, id: &str, patch: ClientPatch) -> StoreResult<Option<ClientRecord>> {
        let id = parse_client_id(id)?;
        self.with_db("update client", move |db| {
            db.update_client(&id, patch, Utc::now())
        })
        .await
    }

    /// Delete a client. `Ok(false)` if nothing matched.
    pub async fn remove(&self, id: &str) -> StoreResult<bool> {
        let id = parse_client_id(id)?;
        self.with_db("remove client", move |db| db.delete_client(&id))
            .await
    }

    /// Open the database once; concurrent callers share the attempt.
    /// A failed attempt is not cached.
    async fn connection(&self) -> DbResult<Arc<Mutex<Database>>> {
        self.db
            .get_or_try_init(|| async {
                let config = self.config.clone();
                let location = config.location()?;
                let db = tokio::task::spawn_blocking(move || config.open())
                    .await
                    .map_err(|e| DbError::Task(e.to_string()))??;
                info!(?location, "database connection established");
                Ok::<_, DbError>(Arc::new(Mutex::new(db)))
            })
            .await
            .cloned()
    }

    async fn with_db<T, F>(&self, operation: &'static str, f: F) -> StoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Database) -> DbResult<T> + Send + 'static,
    {
        let result = match self.connection().await {
            Ok(db) => tokio::task::spawn_blocking(move || {
                let mut guard = db.lock()?;
                f(&mut guard)
            })
            .await
            .unwrap_or_else(|e| Err(DbError::Task(e.to_string()))),
            Err(e) => Err(e),
        };

        result.map_err(|source| {
            error!(operation, error = %source, "storage operation failed");
            StoreError::Storage { operation, source }
        })
    }
}

/// Validate and canonicalise a client id (hyphenated lowercase UUID).
pub fn parse_client_id(id: &str) -> StoreResult<String> {
    Uuid::parse_str(id)
        .map(|uuid| uuid.hyphenated().to_string())
        .map_err(|_| StoreError::InvalidId(id.to_string()))
}
