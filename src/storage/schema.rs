//! Database schema definitions using sea-query.
//!
//! These define the table and column identifiers for type-safe query building.

use sea_query::Iden;

use super::SeqField;

/// Sequence record table schema.
#[derive(Iden, Clone, Copy)]
pub enum SeqUsers {
    #[iden = "seq_user"]
    Table,
    #[iden = "user_id"]
    UserId,
    #[iden = "conversation_id"]
    ConversationId,
    #[iden = "min_seq"]
    MinSeq,
    #[iden = "max_seq"]
    MaxSeq,
    #[iden = "read_seq"]
    ReadSeq,
}

impl From<SeqField> for SeqUsers {
    fn from(field: SeqField) -> Self {
        match field {
            SeqField::MinSeq => SeqUsers::MinSeq,
            SeqField::MaxSeq => SeqUsers::MaxSeq,
            SeqField::ReadSeq => SeqUsers::ReadSeq,
        }
    }
}

/// SQL for creating the sequence record table.
///
/// The (user_id, conversation_id) key doubles as the lookup index.
pub const CREATE_SEQ_USER_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS seq_user (
    user_id TEXT NOT NULL,
    conversation_id TEXT NOT NULL,
    min_seq INTEGER NOT NULL DEFAULT 0,
    max_seq INTEGER NOT NULL DEFAULT 0,
    read_seq INTEGER NOT NULL DEFAULT 0,
    PRIMARY KEY (user_id, conversation_id)
)
"#;

/// SQL for the index backing conversation-wide batch reads.
pub const CREATE_SEQ_USER_CONVERSATION_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_seq_user_conversation ON seq_user(conversation_id)";
