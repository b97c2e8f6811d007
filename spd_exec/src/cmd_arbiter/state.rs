//! Implementations for the CmdArbiter state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::warn;
use serde::Serialize;

// Internal
use comms_if::{
    ctrl::{CtrlCmd, CtrlMode},
    eqpt::vesc::{MotorCmd, MotorCmdMode},
};
use util::{
    archive::{ArchiveError, Archived, Archiver},
    session::Session,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Command arbiter state.
///
/// Holds the demands of the most recent planner command. The whole state is
/// replaced on each command, with the exception of the mode, which is only
/// replaced when the requested mode is recognised.
#[derive(Default)]
pub struct CmdArbiter {
    /// Target speed demanded by the planner.
    target_speed_ms: f64,

    /// Steering angle demanded by the planner, stored verbatim.
    steering_angle_rad: f64,

    /// Brake value demanded by the planner, stored verbatim.
    brake: f64,

    /// Mode of outgoing motor commands. `None` until the first recognised
    /// mode request arrives.
    mode: Option<MotorCmdMode>,

    pub(crate) report: StatusReport,
    arch_state: Archiver,
}

/// Status report for CmdArbiter processing.
#[derive(Clone, Copy, Default, Serialize, Debug)]
pub struct StatusReport {
    /// Raised when the last command carried an unrecognised mode and the
    /// previously stored mode was retained.
    pub unknown_mode_retained: bool,

    /// Raised when no recognised mode has been requested yet, meaning
    /// assembled commands carry no mode.
    pub mode_unset: bool,
}

/// Flat record of the arbiter state for archiving.
#[derive(Serialize)]
struct StateRecord {
    target_speed_ms: f64,
    steering_angle_rad: f64,
    brake: f64,
    mode: Option<MotorCmdMode>,
    unknown_mode_retained: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl CmdArbiter {
    /// Initialise the arbiter's archiver.
    pub fn init(&mut self, session: &Session) -> Result<(), ArchiveError> {
        self.arch_state = Archiver::from_path(session, "cmd_arbiter/state.csv")?;

        Ok(())
    }

    /// Apply a new planner command, replacing the stored demands.
    ///
    /// Speed requests store [`MotorCmdMode::CurrentCommand`] since the VESC
    /// regulates current, not commanded speed, when holding a target speed.
    /// Brake requests pass through. An unrecognised mode leaves the stored
    /// mode untouched while the other demands still apply.
    pub fn on_command(&mut self, cmd: &CtrlCmd) {
        self.report = StatusReport::default();

        self.target_speed_ms = cmd.set_speed_ms;
        self.steering_angle_rad = cmd.steering_angle_rad;
        self.brake = cmd.set_brake;

        match cmd.control_mode {
            CtrlMode::SpeedRequest => self.mode = Some(MotorCmdMode::CurrentCommand),
            CtrlMode::BrakeRequest => self.mode = Some(MotorCmdMode::BrakeRequest),
            CtrlMode::Unknown => {
                warn!(
                    "Planner command carried an unrecognised mode, keeping {:?}",
                    self.mode
                );
                self.report.unknown_mode_retained = true;
            }
        }

        self.report.mode_unset = self.mode.is_none();
    }

    /// Assemble a motor command from the stored demands and the given
    /// controller output.
    ///
    /// The caller passes whatever current demand the speed controller last
    /// produced. The pose and command streams are unsynchronised, so this
    /// value may be stale relative to the newest pose - command emission is
    /// driven by command arrival, not estimator freshness.
    pub fn assemble(&self, latest_control_output_a: f64) -> MotorCmd {
        MotorCmd {
            set_current_a: latest_control_output_a,
            set_brake: self.brake,
            steering_angle_rad: self.steering_angle_rad,
            control_mode: self.mode,
        }
    }

    /// Get the stored motor command mode.
    pub fn mode(&self) -> Option<MotorCmdMode> {
        self.mode
    }

    /// Get the stored target speed.
    pub fn target_speed_ms(&self) -> f64 {
        self.target_speed_ms
    }
}

impl Archived for CmdArbiter {
    fn write(&mut self) -> Result<(), ArchiveError> {
        self.arch_state.serialise(StateRecord {
            target_speed_ms: self.target_speed_ms,
            steering_angle_rad: self.steering_angle_rad,
            brake: self.brake,
            mode: self.mode,
            unknown_mode_retained: self.report.unknown_mode_retained,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn cmd(mode: CtrlMode, speed_ms: f64) -> CtrlCmd {
        CtrlCmd {
            control_mode: mode,
            set_speed_ms: speed_ms,
            steering_angle_rad: 0.1,
            set_brake: 0.5,
        }
    }

    #[test]
    fn test_speed_request_becomes_current_command() {
        let mut arb = CmdArbiter::default();

        arb.on_command(&cmd(CtrlMode::SpeedRequest, 1.5));
        assert_eq!(arb.mode(), Some(MotorCmdMode::CurrentCommand));

        // Regardless of prior state
        arb.on_command(&cmd(CtrlMode::BrakeRequest, 0.0));
        assert_eq!(arb.mode(), Some(MotorCmdMode::BrakeRequest));

        arb.on_command(&cmd(CtrlMode::SpeedRequest, 2.0));
        assert_eq!(arb.mode(), Some(MotorCmdMode::CurrentCommand));
    }

    #[test]
    fn test_unknown_mode_retains_previous() {
        let mut arb = CmdArbiter::default();

        arb.on_command(&cmd(CtrlMode::SpeedRequest, 1.0));
        arb.on_command(&cmd(CtrlMode::Unknown, 2.0));

        // Mode held, but the other demands were replaced
        assert_eq!(arb.mode(), Some(MotorCmdMode::CurrentCommand));
        assert!((arb.target_speed_ms() - 2.0).abs() < std::f64::EPSILON);
        assert!(arb.report.unknown_mode_retained);
    }

    #[test]
    fn test_unknown_mode_before_any_known_mode() {
        let mut arb = CmdArbiter::default();

        arb.on_command(&cmd(CtrlMode::Unknown, 1.0));

        // Still no mode, and the report says so
        assert_eq!(arb.mode(), None);
        assert!(arb.report.mode_unset);

        let motor_cmd = arb.assemble(0.0);
        assert_eq!(motor_cmd.control_mode, None);
    }

    #[test]
    fn test_assemble_passes_fields_through() {
        let mut arb = CmdArbiter::default();

        arb.on_command(&cmd(CtrlMode::SpeedRequest, 1.5));
        let motor_cmd = arb.assemble(12.5);

        assert!((motor_cmd.set_current_a - 12.5).abs() < std::f64::EPSILON);
        assert!((motor_cmd.steering_angle_rad - 0.1).abs() < std::f64::EPSILON);
        assert!((motor_cmd.set_brake - 0.5).abs() < std::f64::EPSILON);
        assert_eq!(motor_cmd.control_mode, Some(MotorCmdMode::CurrentCommand));
    }
}
