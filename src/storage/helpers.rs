//! Shared storage helper functions.
//!
//! Merge logic for the batch read-position queries, common to every backend
//! so the default-filling rules live in one place.

use std::collections::{HashMap, HashSet};

use super::SeqUser;

/// Fill in 0 for every requested conversation missing from `read_seqs`.
pub fn backfill_missing(read_seqs: &mut HashMap<String, i64>, conversation_ids: &[String]) {
    for conversation_id in conversation_ids {
        read_seqs.entry(conversation_id.clone()).or_insert(0);
    }
}

/// Conversation ids to query for a multi-conversation batch.
pub fn requested_conversations(
    conversation_user_ids: &HashMap<String, Vec<String>>,
) -> Vec<String> {
    conversation_user_ids.keys().cloned().collect()
}

/// Group fetched records by conversation, keeping only requested users.
///
/// The backing query selects every user of the requested conversations, so
/// records for users that were not asked about are dropped here. Requested
/// pairs with no record are left out; no zero entries are added.
pub fn group_requested_read_seqs<I>(
    conversation_user_ids: &HashMap<String, Vec<String>>,
    records: I,
) -> HashMap<String, HashMap<String, i64>>
where
    I: IntoIterator<Item = SeqUser>,
{
    let requested: HashMap<&str, HashSet<&str>> = conversation_user_ids
        .iter()
        .map(|(conversation_id, user_ids)| {
            (
                conversation_id.as_str(),
                user_ids.iter().map(String::as_str).collect(),
            )
        })
        .collect();

    let mut grouped: HashMap<String, HashMap<String, i64>> = HashMap::new();
    for record in records {
        let wanted = requested
            .get(record.conversation_id.as_str())
            .is_some_and(|users| users.contains(record.user_id.as_str()));
        if !wanted {
            continue;
        }
        grouped
            .entry(record.conversation_id)
            .or_default()
            .insert(record.user_id, record.read_seq);
    }
    grouped
}
