//! # Communications interface crate.
//!
//! Provides all common communications interfaces for the software.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Planner (MPC) control command definitions
pub mod ctrl;

/// Command and response definitions for equipment (mocap system, VESC driver)
pub mod eqpt;

/// Network module
pub mod net;
