//! Storage implementations.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::advice::{Deadline, Instrumented};
use crate::config::{StorageConfig, StorageType};
#[cfg(feature = "mongodb")]
use crate::utils::retry::connection_backoff;

pub mod helpers;
pub mod mock;
mod record;
mod seq_user_store;

#[cfg(feature = "sqlite")]
pub mod schema;
#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "mongodb")]
pub mod mongodb;

pub use mock::MockSeqUserStore;
pub use record::{SeqField, SeqUser, SEQ_USER_COLLECTION};
pub use seq_user_store::SeqUserStore;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteSeqUserStore;

#[cfg(feature = "mongodb")]
pub use mongodb::MongoSeqUserStore;

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur during storage operations.
///
/// A point lookup that matches nothing is not an error: it reads as the
/// zero record.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Failed to create index on '{collection}': {reason}")]
    IndexCreation { collection: String, reason: String },

    #[error("Operation '{operation}' exceeded deadline of {timeout:?}")]
    DeadlineExceeded {
        operation: &'static str,
        timeout: Duration,
    },

    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Storage configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "sqlite")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[cfg(feature = "mongodb")]
    #[error("MongoDB error: {0}")]
    Mongo(#[from] ::mongodb::error::Error),
}

impl StorageError {
    /// True for the cancellation-kind error raised when a deadline expires.
    pub fn is_deadline_exceeded(&self) -> bool {
        matches!(self, StorageError::DeadlineExceeded { .. })
    }
}

/// Initialize storage based on configuration.
///
/// The selected backend is wrapped in [`Deadline`] when `timeout_ms` is set,
/// then in [`Instrumented`].
pub async fn init_storage(config: &StorageConfig) -> Result<Arc<dyn SeqUserStore>> {
    let label = config.storage_type.as_str();

    let store: Arc<dyn SeqUserStore> = match config.storage_type {
        StorageType::Memory => {
            info!("Storage: memory");
            Arc::new(MockSeqUserStore::new())
        }
        #[cfg(feature = "sqlite")]
        StorageType::Sqlite => {
            let path = &config.sqlite.path;
            info!("Storage: sqlite at {}", path);

            if let Some(parent) = std::path::Path::new(path).parent() {
                std::fs::create_dir_all(parent)?;
            }

            let pool = sqlx::SqlitePool::connect(&format!("sqlite:{}?mode=rwc", path)).await?;

            Arc::new(SqliteSeqUserStore::new(pool).await?)
        }
        #[cfg(not(feature = "sqlite"))]
        StorageType::Sqlite => {
            tracing::error!("SQLite storage requested but 'sqlite' feature is not enabled");
            return Err(StorageError::Config("SQLite feature not enabled".into()));
        }
        #[cfg(feature = "mongodb")]
        StorageType::Mongodb => {
            use backon::Retryable;

            let uri = config.mongodb.uri.as_str();
            let database = config.mongodb.database.as_str();
            info!("Storage: mongodb at {} (database: {})", uri, database);

            let store = (|| async move {
                let client = ::mongodb::Client::with_uri_str(uri).await?;
                MongoSeqUserStore::new(&client, database).await
            })
            .retry(connection_backoff(config.mongodb.connect_retries))
            .notify(|err: &StorageError, dur: Duration| {
                tracing::warn!(error = %err, delay = ?dur, "MongoDB connection failed, retrying");
            })
            .await?;

            Arc::new(store)
        }
        #[cfg(not(feature = "mongodb"))]
        StorageType::Mongodb => {
            tracing::error!("MongoDB storage requested but 'mongodb' feature is not enabled");
            return Err(StorageError::Config("MongoDB feature not enabled".into()));
        }
    };

    let store: Arc<dyn SeqUserStore> = match config.timeout_ms {
        Some(ms) => Arc::new(Deadline::new(store, Duration::from_millis(ms))),
        None => store,
    };

    Ok(Arc::new(Instrumented::new(store, label)))
}
