//! "What is active at time t" queries.

/// Incremental forward cursor.
pub mod cursor;
/// Immutable interval index.
pub mod timeline;
