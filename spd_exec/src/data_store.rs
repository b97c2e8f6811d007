//! # Data Store

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use comms_if::eqpt::vesc::MotorCmd;
use log::warn;

use crate::{cmd_arbiter, speed_ctrl, vel_est};
use util::archive::Archived;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Global data store for the executable.
#[derive(Default)]
pub struct DataStore {
    // Cycle management
    /// Number of cycles already executed
    pub num_cycles: u128,

    /// True if this cycle falls on a 1Hz boundary
    pub is_1_hz_cycle: bool,

    /// Session elapsed time
    pub elapsed_s: f64,

    // VelEst
    pub vel_est: vel_est::VelEst,

    /// Latest smoothed speed estimate. `None` until the estimator has enough
    /// history.
    pub vel_est_output: Option<f64>,
    pub vel_est_rpt: vel_est::StatusReport,

    // SpeedCtrl
    pub speed_ctrl: speed_ctrl::SpeedCtrl,

    /// Latest current demand from the speed controller.
    ///
    /// This value deliberately persists between cycles rather than being
    /// cleared: motor commands are assembled whenever a planner command
    /// arrives, using whatever output the controller last produced, however
    /// stale that is relative to the newest pose. Zero until the first
    /// pose-driven update.
    pub control_output_a: f64,
    pub speed_ctrl_rpt: speed_ctrl::StatusReport,

    // CmdArbiter
    pub cmd_arbiter: cmd_arbiter::CmdArbiter,

    /// The motor command most recently sent to the VESC driver.
    pub last_motor_cmd: Option<MotorCmd>,

    // Monitoring Counters
    /// Number of consecutive cycle overruns
    pub num_consec_cycle_overruns: u64,

    /// Number of consecutive VESC client send errors
    pub num_consec_vesc_errors: u64,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl DataStore {
    /// Perform actions required at the start of a cycle.
    ///
    /// Sets the 1Hz cycle flag and updates the elapsed time. The latest
    /// control output and estimate are left untouched, they persist until
    /// overwritten by newer data.
    pub fn cycle_start(&mut self, cycle_frequency_hz: f64) {
        self.is_1_hz_cycle = self.num_cycles % (cycle_frequency_hz as u128) == 0;

        self.elapsed_s = util::session::get_elapsed_seconds();
    }

    /// Write the archives of all modules.
    ///
    /// Archive failures are warnings, not errors - losing a CSV row must not
    /// take down the control loop.
    pub fn write_archives(&mut self) {
        if let Err(e) = self.vel_est.write() {
            warn!("Could not write VelEst archive: {}", e);
        }
        if let Err(e) = self.speed_ctrl.write() {
            warn!("Could not write SpeedCtrl archive: {}", e);
        }
        if let Err(e) = self.cmd_arbiter.write() {
            warn!("Could not write CmdArbiter archive: {}", e);
        }
    }
}
