//! MongoDB implementations of storage interfaces.

mod seq_user_store;

pub use seq_user_store::MongoSeqUserStore;

/// Server error codes meaning an index on the same keys is already in place.
///
/// IndexKeySpecsConflict (86) is not listed: it reports a same-named index
/// over different keys, so the lookup index would be missing.
pub(crate) const INDEX_EXISTS_CODES: [i32; 2] = [
    68, // IndexAlreadyExists
    85, // IndexOptionsConflict
];
