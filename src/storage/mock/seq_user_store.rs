//! Mock SeqUserStore implementation for testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::storage::helpers::{backfill_missing, group_requested_read_seqs};
use crate::storage::{Result, SeqField, SeqUser, SeqUserStore, StorageError};

/// Key type: (user_id, conversation_id).
type SeqUserKey = (String, String);

/// Mock sequence store that keeps records in memory.
///
/// Every method that reaches the record map counts as one backend query, so
/// tests can assert that short-circuit paths never touch storage.
#[derive(Default)]
pub struct MockSeqUserStore {
    records: RwLock<HashMap<SeqUserKey, SeqUser>>,
    fail_on_read: RwLock<bool>,
    fail_on_write: RwLock<bool>,
    latency: RwLock<Option<Duration>>,
    queries: AtomicUsize,
}

impl MockSeqUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_fail_on_read(&self, fail: bool) {
        *self.fail_on_read.write().await = fail;
    }

    pub async fn set_fail_on_write(&self, fail: bool) {
        *self.fail_on_write.write().await = fail;
    }

    /// Delay every backend call by `latency`.
    pub async fn set_latency(&self, latency: Option<Duration>) {
        *self.latency.write().await = latency;
    }

    /// Number of backend queries issued so far.
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    /// Snapshot of the stored record for a key, if it was ever written.
    pub async fn record(&self, conversation_id: &str, user_id: &str) -> Option<SeqUser> {
        self.records
            .read()
            .await
            .get(&key(conversation_id, user_id))
            .cloned()
    }

    async fn begin_read(&self) -> Result<()> {
        self.begin().await;
        if *self.fail_on_read.read().await {
            return Err(StorageError::Unavailable("mock read failure".to_string()));
        }
        Ok(())
    }

    async fn begin_write(&self) -> Result<()> {
        self.begin().await;
        if *self.fail_on_write.read().await {
            return Err(StorageError::Unavailable("mock write failure".to_string()));
        }
        Ok(())
    }

    async fn begin(&self) {
        self.queries.fetch_add(1, Ordering::SeqCst);
        let latency = *self.latency.read().await;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }
}

fn key(conversation_id: &str, user_id: &str) -> SeqUserKey {
    (user_id.to_string(), conversation_id.to_string())
}

#[async_trait]
impl SeqUserStore for MockSeqUserStore {
    async fn get_seq(
        &self,
        conversation_id: &str,
        user_id: &str,
        field: SeqField,
    ) -> Result<i64> {
        self.begin_read().await?;
        let records = self.records.read().await;
        let seq = match records.get(&key(conversation_id, user_id)) {
            Some(record) => record.seq(field),
            None => SeqUser::absent(conversation_id, user_id).seq(field),
        };
        Ok(seq)
    }

    async fn set_seq(
        &self,
        conversation_id: &str,
        user_id: &str,
        field: SeqField,
        seq: i64,
    ) -> Result<()> {
        self.begin_write().await?;
        self.records
            .write()
            .await
            .entry(key(conversation_id, user_id))
            .or_insert_with(|| SeqUser::absent(conversation_id, user_id))
            .set_seq(field, seq);
        Ok(())
    }

    async fn raise_seq(
        &self,
        conversation_id: &str,
        user_id: &str,
        field: SeqField,
        seq: i64,
    ) -> Result<()> {
        self.begin_write().await?;
        let mut records = self.records.write().await;
        match records.get_mut(&key(conversation_id, user_id)) {
            Some(record) => {
                if record.seq(field) < seq {
                    record.set_seq(field, seq);
                }
            }
            None => {
                let mut record = SeqUser::absent(conversation_id, user_id);
                record.set_seq(field, seq);
                records.insert(key(conversation_id, user_id), record);
            }
        }
        Ok(())
    }

    async fn get_read_seqs(
        &self,
        user_id: &str,
        conversation_ids: &[String],
    ) -> Result<HashMap<String, i64>> {
        if conversation_ids.is_empty() {
            return Ok(HashMap::new());
        }
        self.begin_read().await?;

        let records = self.records.read().await;
        let mut read_seqs: HashMap<String, i64> = conversation_ids
            .iter()
            .filter_map(|conversation_id| {
                records
                    .get(&key(conversation_id, user_id))
                    .map(|record| (conversation_id.clone(), record.read_seq))
            })
            .collect();
        backfill_missing(&mut read_seqs, conversation_ids);
        Ok(read_seqs)
    }

    async fn get_conversations_read_seqs(
        &self,
        conversation_user_ids: &HashMap<String, Vec<String>>,
    ) -> Result<HashMap<String, HashMap<String, i64>>> {
        if conversation_user_ids.is_empty() {
            return Ok(HashMap::new());
        }
        self.begin_read().await?;

        // Every user of the requested conversations, like the database backends.
        let fetched: Vec<SeqUser> = self
            .records
            .read()
            .await
            .values()
            .filter(|record| conversation_user_ids.contains_key(&record.conversation_id))
            .cloned()
            .collect();
        Ok(group_requested_read_seqs(conversation_user_ids, fetched))
    }
}
