//! SQLite SeqUserStore implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use sea_query::{Expr, OnConflict, Query, SqliteQueryBuilder};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::{debug, info};

use crate::storage::helpers::{
    backfill_missing, group_requested_read_seqs, requested_conversations,
};
use crate::storage::schema::{
    SeqUsers, CREATE_SEQ_USER_CONVERSATION_INDEX, CREATE_SEQ_USER_TABLE,
};
use crate::storage::{Result, SeqField, SeqUser, SeqUserStore, StorageError, SEQ_USER_COLLECTION};

/// SQLite implementation of SeqUserStore.
pub struct SqliteSeqUserStore {
    pool: SqlitePool,
}

impl SqliteSeqUserStore {
    /// Create a new SQLite sequence store, creating the table and index.
    pub async fn new(pool: SqlitePool) -> Result<Self> {
        let store = Self { pool };
        store.init().await?;
        info!(table = SEQ_USER_COLLECTION, "SQLite seq user store ready");
        Ok(store)
    }

    /// Initialize the database schema.
    async fn init(&self) -> Result<()> {
        for statement in [CREATE_SEQ_USER_TABLE, CREATE_SEQ_USER_CONVERSATION_INDEX] {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| StorageError::IndexCreation {
                    collection: SEQ_USER_COLLECTION.to_string(),
                    reason: e.to_string(),
                })?;
        }
        Ok(())
    }

    async fn execute(&self, query: &str) -> Result<()> {
        sqlx::query(query).execute(&self.pool).await?;
        Ok(())
    }
}

/// SQL inserting `record`, or applying `on_conflict` to the existing row.
///
/// sea-query values are not `Send`; only the rendered string may cross an await.
fn upsert_sql(record: SeqUser, on_conflict: OnConflict) -> String {
    Query::insert()
        .into_table(SeqUsers::Table)
        .columns([
            SeqUsers::UserId,
            SeqUsers::ConversationId,
            SeqUsers::MinSeq,
            SeqUsers::MaxSeq,
            SeqUsers::ReadSeq,
        ])
        .values_panic([
            record.user_id.into(),
            record.conversation_id.into(),
            record.min_seq.into(),
            record.max_seq.into(),
            record.read_seq.into(),
        ])
        .on_conflict(on_conflict)
        .to_string(SqliteQueryBuilder)
}

fn key_columns() -> [SeqUsers; 2] {
    [SeqUsers::UserId, SeqUsers::ConversationId]
}

fn read_seq_from_row(row: &SqliteRow) -> Result<SeqUser> {
    Ok(SeqUser {
        user_id: row.try_get("user_id")?,
        conversation_id: row.try_get("conversation_id")?,
        read_seq: row.try_get("read_seq")?,
        ..SeqUser::default()
    })
}

#[async_trait]
impl SeqUserStore for SqliteSeqUserStore {
    async fn get_seq(
        &self,
        conversation_id: &str,
        user_id: &str,
        field: SeqField,
    ) -> Result<i64> {
        let query = Query::select()
            .columns([SeqUsers::MinSeq, SeqUsers::MaxSeq, SeqUsers::ReadSeq])
            .from(SeqUsers::Table)
            .and_where(Expr::col(SeqUsers::UserId).eq(user_id))
            .and_where(Expr::col(SeqUsers::ConversationId).eq(conversation_id))
            .to_string(SqliteQueryBuilder);

        let row = sqlx::query(&query).fetch_optional(&self.pool).await?;

        let record = match row {
            Some(row) => SeqUser {
                min_seq: row.try_get("min_seq")?,
                max_seq: row.try_get("max_seq")?,
                read_seq: row.try_get("read_seq")?,
                ..SeqUser::absent(conversation_id, user_id)
            },
            None => SeqUser::absent(conversation_id, user_id),
        };
        Ok(record.seq(field))
    }

    async fn set_seq(
        &self,
        conversation_id: &str,
        user_id: &str,
        field: SeqField,
        seq: i64,
    ) -> Result<()> {
        let mut record = SeqUser::absent(conversation_id, user_id);
        record.set_seq(field, seq);

        let query = upsert_sql(
            record,
            OnConflict::columns(key_columns())
                .update_column(SeqUsers::from(field))
                .to_owned(),
        );

        self.execute(&query).await?;
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
        let mut record = SeqUser::absent(conversation_id, user_id);
        record.set_seq(field, seq);

        let column = field.as_str();
        let query = upsert_sql(
            record,
            OnConflict::columns(key_columns())
                .value(
                    SeqUsers::from(field),
                    Expr::cust(format!("MAX({column}, excluded.{column})")),
                )
                .to_owned(),
        );

        self.execute(&query).await?;
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

        let query = Query::select()
            .columns([SeqUsers::UserId, SeqUsers::ConversationId, SeqUsers::ReadSeq])
            .from(SeqUsers::Table)
            .and_where(Expr::col(SeqUsers::UserId).eq(user_id))
            .and_where(
                Expr::col(SeqUsers::ConversationId).is_in(conversation_ids.iter().cloned()),
            )
            .to_string(SqliteQueryBuilder);

        let rows = sqlx::query(&query).fetch_all(&self.pool).await?;

        let mut read_seqs = HashMap::with_capacity(conversation_ids.len());
        for row in &rows {
            let record = read_seq_from_row(row)?;
            read_seqs.insert(record.conversation_id, record.read_seq);
        }
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

        let query = Query::select()
            .columns([SeqUsers::UserId, SeqUsers::ConversationId, SeqUsers::ReadSeq])
            .from(SeqUsers::Table)
            .and_where(
                Expr::col(SeqUsers::ConversationId)
                    .is_in(requested_conversations(conversation_user_ids)),
            )
            .to_string(SqliteQueryBuilder);

        let rows = sqlx::query(&query).fetch_all(&self.pool).await?;
        let records = rows
            .iter()
            .map(read_seq_from_row)
            .collect::<Result<Vec<_>>>()?;

        Ok(group_requested_read_seqs(conversation_user_ids, records))
    }
}
