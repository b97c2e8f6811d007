//! Command arbiter module
//!
//! Translates the planner's requested control mode into the mode of the
//! outgoing motor command, stores the most recent demands, and assembles
//! motor commands on request.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use state::*;
