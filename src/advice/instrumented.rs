//! Tracing instrumentation advice.
//!
//! Wraps a sequence store to emit one structured event per operation
//! without modifying core implementations.

use std::collections::HashMap;
use std::time::Instant;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::storage::{Result, SeqField, SeqUserStore};

/// Wrapper that adds tracing to any sequence store implementation.
///
/// Every call logs at `debug` with `operation`, `storage` and `elapsed_ms`;
/// failures log at `warn` with the error.
///
/// # Example
///
/// ```ignore
/// let store = SqliteSeqUserStore::new(pool).await?;
/// let store = Instrumented::new(store, "sqlite");
/// ```
pub struct Instrumented<T> {
    inner: T,
    storage_type: &'static str,
}

impl<T> Instrumented<T> {
    /// Wrap a storage implementation with tracing.
    ///
    /// # Arguments
    /// * `inner` - The storage implementation to wrap
    /// * `storage_type` - Label for log events (e.g., "sqlite", "mongodb")
    pub fn new(inner: T, storage_type: &'static str) -> Self {
        Self {
            inner,
            storage_type,
        }
    }

    /// Get a reference to the inner storage.
    pub fn inner(&self) -> &T {
        &self.inner
    }

    /// Consume the wrapper and return the inner storage.
    pub fn into_inner(self) -> T {
        self.inner
    }

    fn record<R>(&self, operation: &'static str, start: Instant, result: &Result<R>) {
        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
        match result {
            Ok(_) => debug!(
                operation,
                storage = self.storage_type,
                elapsed_ms,
                "seq user store call"
            ),
            Err(e) => warn!(
                operation,
                storage = self.storage_type,
                elapsed_ms,
                error = %e,
                "seq user store call failed"
            ),
        }
    }
}

#[async_trait]
impl<T: SeqUserStore> SeqUserStore for Instrumented<T> {
    async fn get_seq(
        &self,
        conversation_id: &str,
        user_id: &str,
        field: SeqField,
    ) -> Result<i64> {
        let start = Instant::now();
        let result = self.inner.get_seq(conversation_id, user_id, field).await;
        self.record("get_seq", start, &result);
        result
    }

    async fn set_seq(
        &self,
        conversation_id: &str,
        user_id: &str,
        field: SeqField,
        seq: i64,
    ) -> Result<()> {
        let start = Instant::now();
        let result = self
            .inner
            .set_seq(conversation_id, user_id, field, seq)
            .await;
        self.record("set_seq", start, &result);
        result
    }

    async fn raise_seq(
        &self,
        conversation_id: &str,
        user_id: &str,
        field: SeqField,
        seq: i64,
    ) -> Result<()> {
        let start = Instant::now();
        let result = self
            .inner
            .raise_seq(conversation_id, user_id, field, seq)
            .await;
        self.record("raise_seq", start, &result);
        result
    }

    async fn get_read_seqs(
        &self,
        user_id: &str,
        conversation_ids: &[String],
    ) -> Result<HashMap<String, i64>> {
        let start = Instant::now();
        let result = self.inner.get_read_seqs(user_id, conversation_ids).await;
        self.record("get_read_seqs", start, &result);
        result
    }

    async fn get_conversations_read_seqs(
        &self,
        conversation_user_ids: &HashMap<String, Vec<String>>,
    ) -> Result<HashMap<String, HashMap<String, i64>>> {
        let start = Instant::now();
        let result = self
            .inner
            .get_conversations_read_seqs(conversation_user_ids)
            .await;
        self.record("get_conversations_read_seqs", start, &result);
        result
    }
}
