//! Parameters structure for VelEst

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for velocity estimation.
#[derive(Debug, Deserialize)]
pub struct Params {
    /// Number of raw speed samples held by the median smoothing window.
    #[serde(default = "default_window_len")]
    pub window_len: usize,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            window_len: default_window_len(),
        }
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn default_window_len() -> usize {
    10
}
