//! Mock storage implementation for testing.
//!
//! Also serves the `memory` storage type for local development.

mod seq_user_store;

pub use seq_user_store::MockSeqUserStore;
