//! Overlay authoring while paused.

/// Pointer-gesture capture.
pub mod capture;
