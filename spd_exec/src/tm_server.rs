//! # TM Server
//!
//! Publishes a telemetry packet each cycle so ground tooling can watch the
//! estimated speed, the controller output and the last emitted motor
//! command.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use chrono::{DateTime, Utc};
use serde::Serialize;

use comms_if::{
    eqpt::vesc::MotorCmd,
    net::{zmq, MonitoredSocket, MonitoredSocketError, NetParams, SocketOptions},
};

use crate::data_store::DataStore;
use crate::{cmd_arbiter, speed_ctrl, vel_est};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Telemetry server
pub struct TmServer {
    socket: MonitoredSocket,
}

/// Telemetry packet that is output by the server.
#[derive(Debug, Serialize)]
pub struct TmPacket {
    /// Time at which this packet was generated
    pub gen_time: DateTime<Utc>,

    /// Session elapsed time in seconds
    pub elapsed_s: f64,

    /// Latest smoothed speed estimate
    pub estimated_speed_ms: Option<f64>,

    /// Latest current demand from the speed controller
    pub control_output_a: f64,

    pub vel_est_rpt: vel_est::StatusReport,

    pub speed_ctrl_rpt: speed_ctrl::StatusReport,

    pub cmd_arbiter_rpt: cmd_arbiter::StatusReport,

    /// The motor command most recently sent to the driver
    pub last_motor_cmd: Option<MotorCmd>,

    /// Number of cycles executed so far
    pub num_cycles: u64,

    /// Number of consecutive VESC send failures
    pub num_consec_vesc_errors: u64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum TmServerError {
    #[error("Socket error: {0}")]
    SocketError(MonitoredSocketError),

    #[error("Could not send telemetry: {0}")]
    SendError(zmq::Error),

    #[error("Could not serialize the telemetry: {0}")]
    SerializationError(serde_json::Error),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl TmServer {
    /// Create a new instance of the TM Server.
    ///
    /// This function will not block until a subscriber connects.
    pub fn new(ctx: &zmq::Context, params: &NetParams) -> Result<Self, TmServerError> {
        // Create the socket options
        let socket_options = SocketOptions {
            block_on_first_connect: false,
            bind: true,
            connect_timeout: 1000,
            linger: 1,
            recv_timeout: 10,
            send_timeout: 10,
            ..Default::default()
        };

        // Bind the socket
        let socket = MonitoredSocket::new(ctx, zmq::PUB, socket_options, &params.tm_endpoint)
            .map_err(TmServerError::SocketError)?;

        // Create self
        Ok(Self { socket })
    }

    /// Publish the state of the given datastore.
    pub fn send(&mut self, ds: &DataStore) -> Result<(), TmServerError> {
        // Build packet
        let packet = TmPacket::from_datastore(ds);

        // Serialize packet
        let packet_string =
            serde_json::to_string(&packet).map_err(TmServerError::SerializationError)?;

        // Send the packet
        self.socket
            .send(packet_string.as_str(), 0)
            .map_err(TmServerError::SendError)
    }
}

impl TmPacket {
    pub fn from_datastore(ds: &DataStore) -> Self {
        Self {
            gen_time: Utc::now(),
            elapsed_s: ds.elapsed_s,
            estimated_speed_ms: ds.vel_est_output,
            control_output_a: ds.control_output_a,
            vel_est_rpt: ds.vel_est_rpt,
            speed_ctrl_rpt: ds.speed_ctrl_rpt,
            cmd_arbiter_rpt: ds.cmd_arbiter.report,
            last_motor_cmd: ds.last_motor_cmd,
            num_cycles: ds.num_cycles as u64,
            num_consec_vesc_errors: ds.num_consec_vesc_errors,
        }
    }
}
