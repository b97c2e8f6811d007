//! # Planner control commands
//!
//! The planner (normally an MPC running on a ground machine) commands the
//! exec with target speed, steering and brake demands. The exec answers each
//! command with exactly one motor command, see the `eqpt::vesc` module.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;
use structopt::StructOpt;
use thiserror::Error;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A control command issued by the planner.
///
/// No range checking is applied to the demands, the planner is trusted to
/// issue values the vehicle can achieve.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize, StructOpt)]
pub struct CtrlCmd {
    /// The requested control mode.
    ///
    /// One of `speed`, `brake`. Modes this version of the software doesn't
    /// know are carried as [`CtrlMode::Unknown`] rather than rejected, so
    /// that the speed/steering/brake demands of the command still apply.
    pub control_mode: CtrlMode,

    /// The target speed of the vehicle in meters/second.
    ///
    /// Positive speeds are "forwards", negative speeds are "backwards"
    #[structopt(short = "t", long, default_value = "0.0")]
    pub set_speed_ms: f64,

    /// The steering angle demand in radians, passed through to the motor
    /// command unchanged.
    #[structopt(short = "s", long, default_value = "0.0")]
    pub steering_angle_rad: f64,

    /// The brake demand, passed through to the motor command unchanged.
    #[structopt(short = "b", long, default_value = "0.0")]
    pub set_brake: f64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// The control mode requested by the planner.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CtrlMode {
    /// Hold the given target speed.
    SpeedRequest,

    /// Apply the given brake value.
    BrakeRequest,

    /// A mode this version of the software does not recognise.
    Unknown,
}

/// Possible command parsing errors.
#[derive(Debug, Error)]
pub enum CmdParseError {
    #[error("Command contains invalid JSON: {0}")]
    InvalidJson(serde_json::Error),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl CtrlCmd {
    /// Parse a new command from a JSON packet
    pub fn from_json(json_str: &str) -> Result<Self, CmdParseError> {
        serde_json::from_str(json_str).map_err(CmdParseError::InvalidJson)
    }
}

// Deserialised by hand rather than derived so that an unrecognised mode
// string maps onto `Unknown` instead of failing the whole command.
impl<'de> Deserialize<'de> for CtrlMode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;

        Ok(match s.as_str() {
            "SPEED_REQUEST" => CtrlMode::SpeedRequest,
            "BRAKE_REQUEST" => CtrlMode::BrakeRequest,
            _ => CtrlMode::Unknown,
        })
    }
}

impl FromStr for CtrlMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "speed" | "speed_request" => Ok(CtrlMode::SpeedRequest),
            "brake" | "brake_request" => Ok(CtrlMode::BrakeRequest),
            // "unknown" is accepted on purpose, it lets the command line
            // exercise the exec's unknown-mode handling
            "unknown" => Ok(CtrlMode::Unknown),
            _ => Err(format!("{:?} is not a recognised control mode", s)),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_cmd_from_json() {
        let cmd = CtrlCmd::from_json(
            r#"{
                "set_speed_ms": 1.5,
                "steering_angle_rad": 0.1,
                "set_brake": 0.0,
                "control_mode": "SPEED_REQUEST"
            }"#,
        )
        .unwrap();

        assert_eq!(cmd.control_mode, CtrlMode::SpeedRequest);
        assert!((cmd.set_speed_ms - 1.5).abs() < std::f64::EPSILON);
    }

    #[test]
    fn test_unknown_mode_survives_deserialisation() {
        let cmd = CtrlCmd::from_json(
            r#"{
                "set_speed_ms": 0.5,
                "steering_angle_rad": 0.0,
                "set_brake": 0.0,
                "control_mode": "TORQUE_REQUEST"
            }"#,
        )
        .unwrap();

        // The unrecognised mode must not reject the command, the remaining
        // fields still apply
        assert_eq!(cmd.control_mode, CtrlMode::Unknown);
        assert!((cmd.set_speed_ms - 0.5).abs() < std::f64::EPSILON);
    }

    #[test]
    fn test_mode_serialises_as_wire_name() {
        let json = serde_json::to_string(&CtrlMode::BrakeRequest).unwrap();
        assert_eq!(json, "\"BRAKE_REQUEST\"");
    }

    #[test]
    fn test_cmd_from_args() {
        let cmd =
            CtrlCmd::from_iter_safe(vec!["cmd", "speed", "-t", "1.5", "-s", "0.1"]).unwrap();

        assert_eq!(cmd.control_mode, CtrlMode::SpeedRequest);
        assert!((cmd.set_speed_ms - 1.5).abs() < std::f64::EPSILON);
        assert!((cmd.steering_angle_rad - 0.1).abs() < std::f64::EPSILON);
        assert!((cmd.set_brake - 0.0).abs() < std::f64::EPSILON);
    }
}
