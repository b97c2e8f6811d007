//! Speed control module
//!
//! Regulates the estimated vehicle speed towards the planner's target using
//! a PID controller whose output is a motor current demand.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod pid;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use params::*;
pub use pid::*;
pub use state::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during SpeedCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum SpeedCtrlError {
    #[error(transparent)]
    ParamLoadError(#[from] util::params::LoadError),

    #[error(transparent)]
    ArchiveError(#[from] util::archive::ArchiveError),

    #[error("Recieved a non-finite speed measurement")]
    NonFiniteMeasurement,
}
