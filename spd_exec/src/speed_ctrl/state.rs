//! Implementations for the SpeedCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;
use serde::Serialize;

// Internal
use super::{Params, PidController, SpeedCtrlError};
use util::{
    archive::{ArchiveError, Archived, Archiver},
    module::State,
    params,
    session::Session,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Speed control module state
pub struct SpeedCtrl {
    pub(crate) params: Params,

    pid: PidController,

    pub(crate) report: StatusReport,
    arch_report: Archiver,
}

/// Status report for SpeedCtrl processing.
#[derive(Clone, Copy, Default, Serialize, Debug)]
pub struct StatusReport {
    /// The setpoint the controller regulated towards this cycle.
    pub setpoint_ms: f64,

    /// The speed measurement passed in this cycle.
    pub measured_speed_ms: f64,

    /// The current demand produced this cycle.
    pub output_a: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for SpeedCtrl {
    fn default() -> Self {
        Self::new(Params::default())
    }
}

impl State for SpeedCtrl {
    type InitData = &'static str;
    type InitError = SpeedCtrlError;

    type InputData = f64;
    type OutputData = f64;
    type StatusReport = StatusReport;
    type ProcError = SpeedCtrlError;

    /// Initialise the SpeedCtrl module.
    ///
    /// Expected init data is the path to the parameter file
    fn init(&mut self, init_data: Self::InitData, session: &Session) -> Result<(), SpeedCtrlError> {
        // Load the parameters
        self.params = params::load(init_data)?;

        // Build the controller from the configured gains. The setpoint is
        // carried over so a command arriving before init isn't lost.
        let setpoint_ms = self.pid.setpoint();
        self.pid = PidController::new(self.params.k_p, self.params.k_i, self.params.k_d);
        self.pid.set_setpoint(setpoint_ms);

        // Initialise the archiver
        self.arch_report = Archiver::from_path(session, "speed_ctrl/status_report.csv")?;

        Ok(())
    }

    /// Regulate towards the current setpoint given a new speed measurement.
    fn proc(
        &mut self,
        measured_speed_ms: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), SpeedCtrlError> {
        if !measured_speed_ms.is_finite() {
            return Err(SpeedCtrlError::NonFiniteMeasurement);
        }

        let output_a = self.pid.update(*measured_speed_ms);

        self.report = StatusReport {
            setpoint_ms: self.pid.setpoint(),
            measured_speed_ms: *measured_speed_ms,
            output_a,
        };

        trace!("SpeedCtrl output: {} A", output_a);

        Ok((output_a, self.report))
    }
}

impl Archived for SpeedCtrl {
    fn write(&mut self) -> Result<(), ArchiveError> {
        self.arch_report.serialise(self.report)
    }
}

impl SpeedCtrl {
    /// Create a new speed controller from the given parameters.
    pub fn new(params: Params) -> Self {
        let pid = PidController::new(params.k_p, params.k_i, params.k_d);

        Self {
            params,
            pid,
            report: StatusReport::default(),
            arch_report: Archiver::default(),
        }
    }

    /// Set the target speed the controller regulates towards.
    ///
    /// Called by the command processor when a new planner command arrives,
    /// independently of the cyclic processing.
    pub fn set_setpoint(&mut self, setpoint_ms: f64) {
        self.pid.set_setpoint(setpoint_ms);
    }

    /// Get the current target speed.
    pub fn setpoint_ms(&self) -> f64 {
        self.pid.setpoint()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_proportional_regulation() {
        let mut ctrl = SpeedCtrl::new(Params {
            k_p: 40.0,
            k_i: 0.0,
            k_d: 0.0,
        });
        ctrl.set_setpoint(1.0);

        // Measurement on target gives no current demand
        let (out, rpt) = ctrl.proc(&1.0).unwrap();
        assert!(out.abs() < 1e-12);
        assert!((rpt.setpoint_ms - 1.0).abs() < 1e-12);

        // Half a meter per second slow demands 20 A
        let (out, _) = ctrl.proc(&0.5).unwrap();
        assert!((out - 20.0).abs() < 1e-12);
    }

    #[test]
    fn test_non_finite_measurement_rejected() {
        let mut ctrl = SpeedCtrl::default();

        assert!(matches!(
            ctrl.proc(&std::f64::NAN),
            Err(SpeedCtrlError::NonFiniteMeasurement)
        ));
    }
}
