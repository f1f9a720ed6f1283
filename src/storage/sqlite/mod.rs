//! SQLite implementations of storage interfaces.

mod seq_user_store;

pub use seq_user_store::SqliteSeqUserStore;
