//! SeqUserStore trait definition.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use super::{Result, SeqField};

/// Interface for per-user, per-conversation sequence tracking.
///
/// Tracks three counters per `(user_id, conversation_id)`: `min_seq`,
/// `max_seq` and `read_seq`. A key that was never written reads as all
/// zeros; the record is persisted by the first setter call.
///
/// # Implementations
///
/// - `MongoSeqUserStore`: MongoDB storage
/// - `SqliteSeqUserStore`: SQLite storage
/// - `MockSeqUserStore`: In-memory storage for testing
///
/// Backends implement the field-generic primitives; the named getters and
/// setters are provided on top of them.
#[async_trait]
pub trait SeqUserStore: Send + Sync {
    /// Read one counter, returning 0 when no record exists.
    async fn get_seq(
        &self,
        conversation_id: &str,
        user_id: &str,
        field: SeqField,
    ) -> Result<i64>;

    /// Upsert one counter unconditionally.
    ///
    /// When the record does not exist yet, the other two counters are
    /// initialized to 0 in the same write. They are never overwritten on an
    /// existing record.
    async fn set_seq(
        &self,
        conversation_id: &str,
        user_id: &str,
        field: SeqField,
        seq: i64,
    ) -> Result<()>;

    /// Atomically raise one counter to `max(stored, seq)`.
    ///
    /// A missing record is inserted with `field = seq` and the other two
    /// counters at 0. Must be a single atomic operation against the backend.
    async fn raise_seq(
        &self,
        conversation_id: &str,
        user_id: &str,
        field: SeqField,
        seq: i64,
    ) -> Result<()>;

    /// Read positions of one user across many conversations.
    ///
    /// The result has exactly one entry per requested conversation;
    /// conversations without a record map to 0. Empty input returns an empty
    /// map without touching the backend.
    async fn get_read_seqs(
        &self,
        user_id: &str,
        conversation_ids: &[String],
    ) -> Result<HashMap<String, i64>>;

    /// Read positions of selected users across many conversations.
    ///
    /// Only `(conversation, user)` pairs that have a record and were
    /// requested appear in the result. Unlike [`get_read_seqs`], missing
    /// pairs are NOT filled with 0; callers apply their own default.
    ///
    /// [`get_read_seqs`]: SeqUserStore::get_read_seqs
    async fn get_conversations_read_seqs(
        &self,
        conversation_user_ids: &HashMap<String, Vec<String>>,
    ) -> Result<HashMap<String, HashMap<String, i64>>>;

    /// Stored `max_seq`, or 0.
    async fn get_max_seq(&self, conversation_id: &str, user_id: &str) -> Result<i64> {
        self.get_seq(conversation_id, user_id, SeqField::MaxSeq).await
    }

    /// Set `max_seq` unconditionally.
    async fn set_max_seq(&self, conversation_id: &str, user_id: &str, seq: i64) -> Result<()> {
        self.set_seq(conversation_id, user_id, SeqField::MaxSeq, seq).await
    }

    /// Stored `min_seq`, or 0.
    async fn get_min_seq(&self, conversation_id: &str, user_id: &str) -> Result<i64> {
        self.get_seq(conversation_id, user_id, SeqField::MinSeq).await
    }

    /// Set `min_seq` unconditionally.
    async fn set_min_seq(&self, conversation_id: &str, user_id: &str, seq: i64) -> Result<()> {
        self.set_seq(conversation_id, user_id, SeqField::MinSeq, seq).await
    }

    /// Stored `read_seq`, or 0.
    async fn get_read_seq(&self, conversation_id: &str, user_id: &str) -> Result<i64> {
        self.get_seq(conversation_id, user_id, SeqField::ReadSeq).await
    }

    /// Advance the read position; never moves it backward.
    ///
    /// If the current value (0 when absent) is strictly greater than `seq`
    /// this succeeds without writing. Otherwise `read_seq` becomes `seq`.
    async fn set_read_seq(&self, conversation_id: &str, user_id: &str, seq: i64) -> Result<()> {
        if seq >= 0 {
            return self
                .raise_seq(conversation_id, user_id, SeqField::ReadSeq, seq)
                .await;
        }

        // A negative target only wins over a stored negative value, and an
        // absent record must stay absent, so `raise_seq` cannot express it.
        let current = self.get_read_seq(conversation_id, user_id).await?;
        if current > seq {
            return Ok(());
        }
        self.set_seq(conversation_id, user_id, SeqField::ReadSeq, seq).await
    }
}

#[async_trait]
impl<T: SeqUserStore + ?Sized> SeqUserStore for Arc<T> {
    async fn get_seq(
        &self,
        conversation_id: &str,
        user_id: &str,
        field: SeqField,
    ) -> Result<i64> {
        (**self).get_seq(conversation_id, user_id, field).await
    }

    async fn set_seq(
        &self,
        conversation_id: &str,
        user_id: &str,
        field: SeqField,
        seq: i64,
    ) -> Result<()> {
        (**self).set_seq(conversation_id, user_id, field, seq).await
    }

    async fn raise_seq(
        &self,
        conversation_id: &str,
        user_id: &str,
        field: SeqField,
        seq: i64,
    ) -> Result<()> {
        (**self).raise_seq(conversation_id, user_id, field, seq).await
    }

    async fn get_read_seqs(
        &self,
        user_id: &str,
        conversation_ids: &[String],
    ) -> Result<HashMap<String, i64>> {
        (**self).get_read_seqs(user_id, conversation_ids).await
    }

    async fn get_conversations_read_seqs(
        &self,
        conversation_user_ids: &HashMap<String, Vec<String>>,
    ) -> Result<HashMap<String, HashMap<String, i64>>> {
        (**self)
            .get_conversations_read_seqs(conversation_user_ids)
            .await
    }
}
