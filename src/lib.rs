//! seqstore - per-user, per-conversation sequence tracking
//!
//! Records, for every (user, conversation) pair, the three counters that
//! drive message delivery and read state: `min_seq`, `max_seq` and the
//! monotonic `read_seq`.

pub mod advice;
pub mod config;
pub mod storage;
pub mod utils;
