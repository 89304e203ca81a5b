//! Per-tick synchronization of overlays, commentary, and markers.

/// Latest-tick-wins orchestration.
pub mod orchestrator;
/// Consumers of synchronized updates.
pub mod sink;
