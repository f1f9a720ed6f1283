//! Storage configuration types.

use serde::Deserialize;

/// Storage type discriminator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageType {
    #[default]
    Mongodb,
    Sqlite,
    Memory,
}

impl StorageType {
    /// Label used in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            StorageType::Mongodb => "mongodb",
            StorageType::Sqlite => "sqlite",
            StorageType::Memory => "memory",
        }
    }
}

/// Storage configuration (discriminated union).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Storage type discriminator.
    #[serde(rename = "type")]
    pub storage_type: StorageType,
    /// MongoDB-specific configuration.
    pub mongodb: MongodbConfig,
    /// SQLite-specific configuration.
    pub sqlite: SqliteConfig,
    /// Upper bound for every store operation, in milliseconds.
    /// Expired operations fail with a deadline error. Unset: no bound.
    pub timeout_ms: Option<u64>,
}

/// MongoDB-specific configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MongodbConfig {
    /// MongoDB connection URI.
    pub uri: String,
    /// Database name.
    pub database: String,
    /// Connection attempts before giving up at startup.
    pub connect_retries: usize,
}

impl Default for MongodbConfig {
    fn default() -> Self {
        Self {
            uri: "mongodb://localhost:27017".to_string(),
            database: "seqstore".to_string(),
            connect_retries: 5,
        }
    }
}

/// SQLite-specific configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SqliteConfig {
    /// Path to database file.
    pub path: String,
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self {
            path: "./data/seq_user.db".to_string(),
        }
    }
}
