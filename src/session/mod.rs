//! Session-oriented review API.

/// Review configuration.
pub mod opts;
/// The `ReviewSession` facade.
pub mod review_session;
