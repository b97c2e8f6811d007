//! Velocity estimation module
//!
//! Derives a signed longitudinal speed from the mocap pose stream by finite
//! differencing consecutive samples, projecting the displacement onto the
//! vehicle's heading axis and median-smoothing the result.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod smoother;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use params::*;
pub use smoother::*;
pub use state::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during VelEst operation.
#[derive(Debug, thiserror::Error)]
pub enum VelEstError {
    #[error(transparent)]
    ParamLoadError(#[from] util::params::LoadError),

    #[error("The smoothing window length must be at least 1, found {0}")]
    InvalidWindowLen(usize),

    #[error(transparent)]
    ArchiveError(#[from] util::archive::ArchiveError),

    #[error("Recieved a pose with non-finite fields")]
    NonFinitePose,
}
