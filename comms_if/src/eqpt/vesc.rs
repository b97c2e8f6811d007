//! # VESC Equipment Commands
//!
//! Commands sent from the exec to the VESC driver, and the driver's
//! responses.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A motor command sent from the exec to the VESC driver.
///
/// One command is emitted per planner command received, combining the latest
/// controller output with the demands stored by the command arbiter.
#[derive(Debug, Copy, Clone, Serialize, Deserialize)]
pub struct MotorCmd {
    /// The demanded motor current in amps.
    ///
    /// Meaningful when `control_mode` is [`MotorCmdMode::CurrentCommand`].
    pub set_current_a: f64,

    /// The demanded brake value, passed through from the planner unchanged.
    pub set_brake: f64,

    /// The demanded steering angle in radians, passed through from the
    /// planner unchanged.
    pub steering_angle_rad: f64,

    /// The mode of this command.
    ///
    /// `None` means no recognised mode has been requested yet this session.
    /// The driver rejects mode-less commands as invalid.
    pub control_mode: Option<MotorCmdMode>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// The mode of an outgoing motor command.
///
/// Speed requests from the planner are issued to the driver as current-mode
/// commands, since the VESC regulates winding current rather than commanded
/// speed directly.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MotorCmdMode {
    /// Drive the motor at the given current.
    CurrentCommand,

    /// Apply the given brake value.
    BrakeRequest,
}

/// Response from the VESC driver to a motor command.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MotorCmdResponse {
    /// Command was valid and will be executed
    CmdOk,

    /// Command was invalid and has been rejected
    CmdInvalid,

    /// Equipment is invalid so the command cannot be actuated
    EqptInvalid,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_motor_cmd_wire_format() {
        let cmd = MotorCmd {
            set_current_a: 2.5,
            set_brake: 0.0,
            steering_angle_rad: -0.1,
            control_mode: Some(MotorCmdMode::CurrentCommand),
        };

        let json = serde_json::to_string(&cmd).unwrap();
        assert!(json.contains("\"CURRENT_COMMAND\""));

        let back: MotorCmd = serde_json::from_str(&json).unwrap();
        assert_eq!(back.control_mode, Some(MotorCmdMode::CurrentCommand));

        // A mode-less command serialises the mode as null
        let cmd = MotorCmd {
            control_mode: None,
            ..cmd
        };
        let json = serde_json::to_string(&cmd).unwrap();
        assert!(json.contains("\"control_mode\":null"));
    }
}
