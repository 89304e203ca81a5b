//! Session loading from the external storage service.

/// Bounded retry and batch decoding.
pub mod retry;
/// Storage collaborators.
pub mod source;
