//! Typed session and annotation records.

/// Markers, overlay segments, and commentary segments.
pub mod annotation;
/// Raw wire batches and per-record decoding.
pub mod batch;
/// Video session descriptor.
pub mod session;
