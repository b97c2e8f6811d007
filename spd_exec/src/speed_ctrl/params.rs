//! Parameters structure for SpeedCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for speed control.
///
/// The gains are fixed for the lifetime of the exec. There is deliberately
/// no windup or output clamp here, see the module documentation.
#[derive(Debug, Deserialize)]
pub struct Params {
    /// Proportional gain
    #[serde(default = "default_k_p")]
    pub k_p: f64,

    /// Integral gain
    #[serde(default = "default_k_i")]
    pub k_i: f64,

    /// Derivative gain
    #[serde(default = "default_k_d")]
    pub k_d: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            k_p: default_k_p(),
            k_i: default_k_i(),
            k_d: default_k_d(),
        }
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn default_k_p() -> f64 {
    40.0
}

fn default_k_i() -> f64 {
    0.0
}

fn default_k_d() -> f64 {
    0.0
}
