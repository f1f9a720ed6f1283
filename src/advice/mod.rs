//! Aspect-oriented advice for cross-cutting concerns.
//!
//! This module provides wrapper types that add orthogonal behavior
//! (tracing, deadlines) without polluting storage implementations.
//!
//! # Architecture
//!
//! Advice is applied at service composition time, not in implementations:
//!
//! ```ignore
//! // Core implementation - pure storage logic
//! let store = SqliteSeqUserStore::new(pool).await?;
//!
//! // Apply advice layers
//! let store = Deadline::new(store, Duration::from_secs(2));
//! let store = Instrumented::new(store, "sqlite");
//!
//! // Use as normal - advice is transparent
//! store.set_read_seq(conversation_id, user_id, seq).await?;
//! ```
//!
//! # Available Advice
//!
//! - [`Instrumented`] - Structured tracing events with latency for all operations
//! - [`Deadline`] - Bounds every operation with a timeout

mod deadline;
mod instrumented;

pub use deadline::Deadline;
pub use instrumented::Instrumented;
