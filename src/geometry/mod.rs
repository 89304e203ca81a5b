//! Normalized overlay geometry to surface-pixel draw commands.

/// Draw command IR.
pub mod draw;
/// Pure geometry resolver.
pub mod resolver;
