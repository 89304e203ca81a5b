//! Media clock state machine.

/// Play/pause/seek/rate controller and coalesced ticks.
pub mod controller;
