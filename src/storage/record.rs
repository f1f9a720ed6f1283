//! Sequence record model.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Collection (MongoDB) and table (SQLite) name for sequence records.
pub const SEQ_USER_COLLECTION: &str = "seq_user";

/// One of the three counters tracked per (user, conversation).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeqField {
    /// Lowest message sequence still retained for the user.
    MinSeq,
    /// Highest message sequence delivered to the user.
    MaxSeq,
    /// Highest message sequence the user acknowledged reading.
    ReadSeq,
}

impl SeqField {
    /// Every counter, in persisted column order.
    pub const ALL: [SeqField; 3] = [SeqField::MinSeq, SeqField::MaxSeq, SeqField::ReadSeq];

    /// Persisted field name.
    pub fn as_str(self) -> &'static str {
        match self {
            SeqField::MinSeq => "min_seq",
            SeqField::MaxSeq => "max_seq",
            SeqField::ReadSeq => "read_seq",
        }
    }
}

impl fmt::Display for SeqField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sequence counters for one (user, conversation) pair.
///
/// Fields missing from a stored or projected document deserialize as their
/// defaults, so a partially projected record carries zeros for the counters
/// that were not requested.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeqUser {
    pub user_id: String,
    pub conversation_id: String,
    pub min_seq: i64,
    pub max_seq: i64,
    pub read_seq: i64,
}

impl SeqUser {
    /// The record every never-written key reads as: all counters zero.
    pub fn absent(conversation_id: &str, user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            conversation_id: conversation_id.to_string(),
            ..Self::default()
        }
    }

    /// Value of a single counter.
    pub fn seq(&self, field: SeqField) -> i64 {
        match field {
            SeqField::MinSeq => self.min_seq,
            SeqField::MaxSeq => self.max_seq,
            SeqField::ReadSeq => self.read_seq,
        }
    }

    /// Overwrite a single counter.
    pub fn set_seq(&mut self, field: SeqField, seq: i64) {
        match field {
            SeqField::MinSeq => self.min_seq = seq,
            SeqField::MaxSeq => self.max_seq = seq,
            SeqField::ReadSeq => self.read_seq = seq,
        }
    }
}
