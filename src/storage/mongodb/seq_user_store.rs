//! MongoDB SeqUserStore implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{doc, Document};
use mongodb::error::ErrorKind;
use mongodb::options::{FindOneOptions, FindOptions, UpdateOptions};
use mongodb::{Client, Collection, IndexModel};
use tracing::{debug, info, warn};

use crate::storage::helpers::{
    backfill_missing, group_requested_read_seqs, requested_conversations,
};
use crate::storage::{Result, SeqField, SeqUser, SeqUserStore, StorageError, SEQ_USER_COLLECTION};

use super::INDEX_EXISTS_CODES;

/// MongoDB implementation of SeqUserStore.
///
/// One document per (user_id, conversation_id). Writes always upsert by
/// that key, so the lookup index does not need to be unique.
pub struct MongoSeqUserStore {
    seq_users: Collection<SeqUser>,
}

impl MongoSeqUserStore {
    /// Create a new MongoDB sequence store.
    pub async fn new(client: &Client, database_name: &str) -> Result<Self> {
        let database = client.database(database_name);
        Self::with_collection(database.collection(SEQ_USER_COLLECTION)).await
    }

    /// Create a store over an existing collection handle.
    pub async fn with_collection(seq_users: Collection<SeqUser>) -> Result<Self> {
        let store = Self { seq_users };
        store.init().await?;
        info!(
            collection = store.seq_users.name(),
            "MongoDB seq user store ready"
        );
        Ok(store)
    }

    /// Initialize indexes.
    async fn init(&self) -> Result<()> {
        // Compound lookup index on (user_id, conversation_id)
        let index = IndexModel::builder()
            .keys(doc! { "user_id": 1, "conversation_id": 1 })
            .build();

        match self.seq_users.create_index(index).await {
            Ok(_) => Ok(()),
            Err(e) if index_already_exists(&e) => {
                warn!(
                    collection = self.seq_users.name(),
                    error = %e,
                    "Equivalent index already exists"
                );
                Ok(())
            }
            Err(e) => Err(StorageError::IndexCreation {
                collection: self.seq_users.name().to_string(),
                reason: e.to_string(),
            }),
        }
    }

    /// Upsert by key, inserting every counter not named in `update` as 0.
    async fn upsert(
        &self,
        conversation_id: &str,
        user_id: &str,
        field: SeqField,
        mut update: Document,
    ) -> Result<()> {
        let mut on_insert = Document::new();
        for other in SeqField::ALL.into_iter().filter(|f| *f != field) {
            on_insert.insert(other.as_str(), 0_i64);
        }
        update.insert("$setOnInsert", on_insert);

        let options = UpdateOptions::builder().upsert(true).build();

        self.seq_users
            .update_one(key_filter(conversation_id, user_id), update)
            .with_options(options)
            .await?;

        Ok(())
    }
}

fn key_filter(conversation_id: &str, user_id: &str) -> Document {
    doc! {
        "user_id": user_id,
        "conversation_id": conversation_id,
    }
}

fn index_already_exists(error: &mongodb::error::Error) -> bool {
    match error.kind.as_ref() {
        ErrorKind::Command(command) => INDEX_EXISTS_CODES.contains(&command.code),
        _ => false,
    }
}

#[async_trait]
impl SeqUserStore for MongoSeqUserStore {
    async fn get_seq(
        &self,
        conversation_id: &str,
        user_id: &str,
        field: SeqField,
    ) -> Result<i64> {
        let name = field.as_str();
        let options = FindOneOptions::builder()
            .projection(doc! { "_id": 0, name: 1 })
            .build();

        let record = self
            .seq_users
            .find_one(key_filter(conversation_id, user_id))
            .with_options(options)
            .await?
            .unwrap_or_else(|| SeqUser::absent(conversation_id, user_id));

        Ok(record.seq(field))
    }

    async fn set_seq(
        &self,
        conversation_id: &str,
        user_id: &str,
        field: SeqField,
        seq: i64,
    ) -> Result<()> {
        let name = field.as_str();
        self.upsert(conversation_id, user_id, field, doc! { "$set": { name: seq } })
            .await?;
        debug!(%conversation_id, %user_id, %field, seq, "Set sequence");
        Ok(())
    }

    async fn raise_seq(
        &self,
        conversation_id: &str,
        user_id: &str,
        field: SeqField,
        seq: i64,
    ) -> Result<()> {
        // `$max` on an inserted document sets the field to `seq`.
        let name = field.as_str();
        self.upsert(conversation_id, user_id, field, doc! { "$max": { name: seq } })
            .await?;
        debug!(%conversation_id, %user_id, %field, seq, "Raised sequence");
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

        let filter = doc! {
            "user_id": user_id,
            "conversation_id": { "$in": conversation_ids.to_vec() },
        };
        let options = FindOptions::builder()
            .projection(doc! { "_id": 0, "conversation_id": 1, "read_seq": 1 })
            .build();

        let records: Vec<SeqUser> = self
            .seq_users
            .find(filter)
            .with_options(options)
            .await?
            .try_collect()
            .await?;

        let mut read_seqs: HashMap<String, i64> = records
            .into_iter()
            .map(|record| (record.conversation_id, record.read_seq))
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

        // Fetches every user of these conversations; filtered in process.
        let filter = doc! {
            "conversation_id": { "$in": requested_conversations(conversation_user_ids) },
        };
        let options = FindOptions::builder()
            .projection(doc! { "_id": 0, "conversation_id": 1, "user_id": 1, "read_seq": 1 })
            .build();

        let records: Vec<SeqUser> = self
            .seq_users
            .find(filter)
            .with_options(options)
            .await?
            .try_collect()
            .await?;

        Ok(group_requested_read_seqs(conversation_user_ids, records))
    }
}
