//! # Command script interpreter module
//!
//! This module provides an interpreter for timed command scripts, allowing
//! planner commands to be executed from a file rather than a live MPC link.
//!
//! Scripts are plain text files in which each line has the format
//! `<exec_time_s>: <command_json>;`, for example:
//!
//! ```text
//! 1.0: {"set_speed_ms": 1.5, "steering_angle_rad": 0.0, "set_brake": 0.0,
//!       "control_mode": "SPEED_REQUEST"};
//! ```

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use regex::RegexBuilder;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

// Internal
use crate::session::get_elapsed_seconds;
use comms_if::ctrl::{CmdParseError, CtrlCmd};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A command which is scripted to occur at a specific time.
pub struct Command {
    /// The time the command is supposed to execute at
    exec_time_s: f64,

    /// The planner command to run
    cmd: CtrlCmd,
}

/// A script interpreter.
///
/// After initialising with the path to the script to run use
/// `.get_pending_cmds` to acquire a list of commands that need executing.
pub struct ScriptInterpreter {
    _script_path: PathBuf,
    cmds: VecDeque<Command>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Could not find the script at {0}")]
    ScriptNotFound(String),

    #[error("Could not load the script: {0}")]
    ScriptLoadError(std::io::Error),

    #[error("The script is empty (or is so bad it can't be read)")]
    ScriptEmpty,

    #[error(
        "Script contains an invalid timestamp: {0}. \
        Should be a float (like 1.0)"
    )]
    InvalidTimestamp(String),

    #[error("Script contains an invalid command at {0} s: {1}")]
    InvalidCmd(f64, CmdParseError),
}

pub enum PendingCmds {
    None,
    Some(Vec<CtrlCmd>),
    EndOfScript,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ScriptInterpreter {
    /// Create a new interpreter from the given script path.
    pub fn new<P: AsRef<Path>>(script_path: P) -> Result<Self, ScriptError> {
        // Get the path in a buffer
        let path = PathBuf::from(script_path.as_ref());

        // Check that the script file exists.
        if !path.exists() {
            return Err(ScriptError::ScriptNotFound(
                path.to_string_lossy().to_string(),
            ));
        }

        // Load the script into a string
        let script = match fs::read_to_string(script_path) {
            Ok(s) => s,
            Err(e) => return Err(ScriptError::ScriptLoadError(e)),
        };

        // Empty queue of commands
        let mut cmd_queue: VecDeque<Command> = VecDeque::new();

        // Go through the script executing __the magic regex__.
        let re = RegexBuilder::new(r"^\s*(\d+(\.\d+)?)\s*:\s*([^;]*);")
            .multi_line(true)
            .build()
            .unwrap();

        let mut num_caps = 0;

        for cap in re.captures_iter(&script) {
            // Parse the exec time
            let exec_time_s: f64 = match cap.get(1).unwrap().as_str().parse() {
                Ok(t) => t,
                Err(e) => return Err(ScriptError::InvalidTimestamp(format!("{}", e))),
            };

            // Parse the command from the payload. The scripts contain JSON
            // only.
            let cmd = match CtrlCmd::from_json(cap.get(3).unwrap().as_str()) {
                Ok(c) => c,
                Err(e) => return Err(ScriptError::InvalidCmd(exec_time_s, e)),
            };

            // Build command from the match
            cmd_queue.push_back(Command { exec_time_s, cmd });

            num_caps += 1;
        }

        if num_caps == 0 {
            return Err(ScriptError::ScriptEmpty);
        }

        Ok(ScriptInterpreter {
            _script_path: path,
            cmds: cmd_queue,
        })
    }

    /// Return a vector of pending commands, or `None` if no commands need
    /// executing now.
    pub fn get_pending_cmds(&mut self) -> PendingCmds {
        // If the queue is empty the script is over and we return the end of
        // script variant
        if self.cmds.is_empty() {
            return PendingCmds::EndOfScript;
        }

        let mut cmd_vec: Vec<CtrlCmd> = vec![];

        let current_time_s = get_elapsed_seconds();

        // Peek items from the queue, if the head's exec time is lower than
        // the current time add it to the vector, and keep adding commands
        // until the exec times are larger than the current time.
        while self
            .cmds
            .front()
            .map(|c| c.exec_time_s < current_time_s)
            .unwrap_or(false)
        {
            cmd_vec.push(self.cmds.pop_front().unwrap().cmd);
        }

        // If the vector is longer than 0 return Some, otherwise None
        if !cmd_vec.is_empty() {
            PendingCmds::Some(cmd_vec)
        } else {
            PendingCmds::None
        }
    }

    /// Get the number of commands in the script
    pub fn get_num_cmds(&self) -> usize {
        self.cmds.len()
    }

    /// Get the length of the script in seconds
    pub fn get_duration(&self) -> f64 {
        match self.cmds.back() {
            Some(c) => c.exec_time_s,
            None => 0f64,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use comms_if::ctrl::CtrlMode;
    use std::io::Write;

    #[test]
    fn test_parse_script() {
        let script = "\
            0.5: {\"set_speed_ms\": 0.0, \"steering_angle_rad\": 0.0, \
                \"set_brake\": 0.0, \"control_mode\": \"SPEED_REQUEST\"};\n\
            2.0: {\"set_speed_ms\": 1.5, \"steering_angle_rad\": 0.1, \
                \"set_brake\": 0.0, \"control_mode\": \"SPEED_REQUEST\"};\n\
            8.0: {\"set_speed_ms\": 0.0, \"steering_angle_rad\": 0.0, \
                \"set_brake\": 1.0, \"control_mode\": \"BRAKE_REQUEST\"};\n";

        // Write the script to a temporary file
        let mut path = std::env::temp_dir();
        path.push("spd_exec_script_interpreter_test.vcs");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(script.as_bytes()).unwrap();

        let si = ScriptInterpreter::new(&path).unwrap();

        assert_eq!(si.get_num_cmds(), 3);
        assert!((si.get_duration() - 8.0).abs() < std::f64::EPSILON);
        assert_eq!(si.cmds[1].cmd.control_mode, CtrlMode::SpeedRequest);
        assert_eq!(si.cmds[2].cmd.control_mode, CtrlMode::BrakeRequest);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_empty_script_rejected() {
        let mut path = std::env::temp_dir();
        path.push("spd_exec_script_interpreter_empty_test.vcs");
        std::fs::File::create(&path).unwrap();

        assert!(matches!(
            ScriptInterpreter::new(&path),
            Err(ScriptError::ScriptEmpty)
        ));

        std::fs::remove_file(&path).ok();
    }
}
