//! # VESC Client
//!
//! This module provides networking abstractions to connect to the VESC
//! driver, which actuates the motor, brake and steering servo.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::{
    eqpt::vesc::{MotorCmd, MotorCmdResponse},
    net::{zmq, MonitoredSocket, MonitoredSocketError, NetParams, SocketOptions},
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

pub struct VescClient {
    cmd_socket: MonitoredSocket,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(thiserror::Error, Debug)]
pub enum VescClientError {
    #[error("Socket error: {0}")]
    SocketError(MonitoredSocketError),

    #[error("The client is not connected to the driver")]
    NotConnected,

    #[error("Could not send the command to the driver: {0}")]
    SendError(zmq::Error),

    #[error("Could not recieve a message from the driver: {0}")]
    RecvError(zmq::Error),

    #[error("Could not serialize the command: {0}")]
    SerializationError(serde_json::Error),

    #[error("Could not deserialize the response from the driver: {0}")]
    DeserializeError(serde_json::Error),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl VescClient {
    /// Create a new instance of the VESC client.
    pub fn new(ctx: &zmq::Context, params: &NetParams) -> Result<Self, VescClientError> {
        // Create the socket options
        let socket_options = SocketOptions {
            connect_timeout: 1000,
            heartbeat_ivl: 500,
            heartbeat_ttl: 1000,
            heartbeat_timeout: 1000,
            linger: 1,
            recv_timeout: 10,
            send_timeout: 10,
            req_correlate: true,
            req_relaxed: true,
            ..Default::default()
        };

        // Create the socket
        let cmd_socket = MonitoredSocket::new(
            ctx,
            zmq::REQ,
            socket_options,
            &params.vesc_cmd_endpoint,
        )
        .map_err(VescClientError::SocketError)?;

        // Create self
        Ok(Self { cmd_socket })
    }

    /// Check if the client is connected to the driver
    pub fn is_connected(&self) -> bool {
        self.cmd_socket.connected()
    }

    /// Send a motor command to the driver.
    ///
    /// Sends the given command to the driver. If the driver acknowledges the
    /// command within the configured timeout then the response is returned,
    /// otherwise an `Err()` is returned.
    pub fn send_cmd(&mut self, cmd: &MotorCmd) -> Result<MotorCmdResponse, VescClientError> {
        // If not connected return now
        if !self.cmd_socket.connected() {
            return Err(VescClientError::NotConnected);
        }

        // Serialize the command
        let cmd_str = serde_json::to_string(cmd).map_err(VescClientError::SerializationError)?;

        // Send the command to the driver
        self.cmd_socket
            .send(cmd_str.as_str(), 0)
            .map_err(VescClientError::SendError)?;

        // Recieve response back from the driver
        let msg = self.cmd_socket.recv_msg(0);

        match msg {
            Ok(m) => serde_json::from_str(m.as_str().unwrap_or(""))
                .map_err(VescClientError::DeserializeError),
            Err(e) => Err(VescClientError::RecvError(e)),
        }
    }
}
