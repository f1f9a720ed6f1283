//! Deadline advice.
//!
//! Bounds every store operation with a timeout. An expired operation is
//! dropped and reported as [`StorageError::DeadlineExceeded`]; whether its
//! write reached the backend is unknown.

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use crate::storage::{Result, SeqField, SeqUserStore, StorageError};

/// Wrapper that fails any operation running longer than `timeout`.
pub struct Deadline<T> {
    inner: T,
    timeout: Duration,
}

impl<T> Deadline<T> {
    pub fn new(inner: T, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn bounded<R, F>(&self, operation: &'static str, fut: F) -> Result<R>
    where
        F: Future<Output = Result<R>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                warn!(operation, timeout = ?self.timeout, "Deadline exceeded");
                Err(StorageError::DeadlineExceeded {
                    operation,
                    timeout: self.timeout,
                })
            }
        }
    }
}

#[async_trait]
impl<T: SeqUserStore> SeqUserStore for Deadline<T> {
    async fn get_seq(
        &self,
        conversation_id: &str,
        user_id: &str,
        field: SeqField,
    ) -> Result<i64> {
        self.bounded(
            "get_seq",
            self.inner.get_seq(conversation_id, user_id, field),
        )
        .await
    }

    async fn set_seq(
        &self,
        conversation_id: &str,
        user_id: &str,
        field: SeqField,
        seq: i64,
    ) -> Result<()> {
        self.bounded(
            "set_seq",
            self.inner.set_seq(conversation_id, user_id, field, seq),
        )
        .await
    }

    async fn raise_seq(
        &self,
        conversation_id: &str,
        user_id: &str,
        field: SeqField,
        seq: i64,
    ) -> Result<()> {
        self.bounded(
            "raise_seq",
            self.inner.raise_seq(conversation_id, user_id, field, seq),
        )
        .await
    }

    async fn get_read_seqs(
        &self,
        user_id: &str,
        conversation_ids: &[String],
    ) -> Result<HashMap<String, i64>> {
        self.bounded(
            "get_read_seqs",
            self.inner.get_read_seqs(user_id, conversation_ids),
        )
        .await
    }

    async fn get_conversations_read_seqs(
        &self,
        conversation_user_ids: &HashMap<String, Vec<String>>,
    ) -> Result<HashMap<String, HashMap<String, i64>>> {
        self.bounded(
            "get_conversations_read_seqs",
            self.inner.get_conversations_read_seqs(conversation_user_ids),
        )
        .await
    }
}
