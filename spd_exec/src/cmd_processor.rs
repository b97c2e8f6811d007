//! # Command processor module
//!
//! The command processor handles planner commands coming from any source
//! (live MPC link or command script). Each command produces exactly one
//! motor command.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::debug;

// Internal
use crate::data_store::DataStore;
use comms_if::{ctrl::CtrlCmd, eqpt::vesc::MotorCmd};

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Execute a planner command.
///
/// Forwards the target speed to the speed controller's setpoint, updates the
/// arbiter's stored demands, and assembles the outgoing motor command from
/// the latest control output.
pub fn exec(ds: &mut DataStore, cmd: &CtrlCmd) -> MotorCmd {
    debug!("Recieved planner command: {:?}", cmd);

    ds.speed_ctrl.set_setpoint(cmd.set_speed_ms);
    ds.cmd_arbiter.on_command(cmd);

    let motor_cmd = ds.cmd_arbiter.assemble(ds.control_output_a);
    ds.last_motor_cmd = Some(motor_cmd);

    motor_cmd
}
