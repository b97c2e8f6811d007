//! # MPC Client
//!
//! The MpcClient subscribes to the control command stream published by the
//! planner. Every command is surfaced to the caller in arrival order, since
//! each one must be answered with exactly one motor command.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::warn;

use comms_if::{
    ctrl::CtrlCmd,
    net::{zmq, MonitoredSocket, MonitoredSocketError, NetParams, SocketOptions},
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Planner command stream client
pub struct MpcClient {
    socket: MonitoredSocket,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum MpcClientError {
    #[error("Socket error: {0}")]
    SocketError(MonitoredSocketError),

    #[error("Could not recieve a message from the planner: {0}")]
    RecvError(zmq::Error),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl MpcClient {
    /// Create a new instance of the MPC client.
    ///
    /// This function will not block until the planner connects.
    pub fn new(ctx: &zmq::Context, params: &NetParams) -> Result<Self, MpcClientError> {
        // Create the socket options
        let socket_options = SocketOptions {
            block_on_first_connect: false,
            subscribe: Some(String::new()),
            connect_timeout: 1000,
            linger: 1,
            recv_timeout: 0,
            ..Default::default()
        };

        // Connect the socket
        let socket =
            MonitoredSocket::new(ctx, zmq::SUB, socket_options, &params.mpc_cmd_endpoint)
                .map_err(MpcClientError::SocketError)?;

        // Create self
        Ok(Self { socket })
    }

    /// Check if the client is connected to the planner
    pub fn is_connected(&self) -> bool {
        self.socket.connected()
    }

    /// Recieve a single command from the planner.
    ///
    /// Call in a loop until `Ok(None)` is returned, indicating that there
    /// are no more pending commands right now. Malformed messages are logged
    /// and skipped.
    pub fn recv_cmd(&self) -> Result<Option<CtrlCmd>, MpcClientError> {
        loop {
            // Attempt to read a string from the socket
            let msg = match self.socket.recv_string(0) {
                // Valid message
                Ok(Ok(s)) => s,
                // Non UTF-8 message
                Ok(Err(_)) => {
                    warn!("Non UTF-8 message from the planner");
                    continue;
                }
                // No message pending
                Err(zmq::Error::EAGAIN) => return Ok(None),
                // Recieve error
                Err(e) => return Err(MpcClientError::RecvError(e)),
            };

            // Parse the command
            match CtrlCmd::from_json(&msg) {
                Ok(cmd) => return Ok(Some(cmd)),
                Err(e) => {
                    warn!("Could not parse recieved command: {}", e);
                    continue;
                }
            }
        }
    }
}
