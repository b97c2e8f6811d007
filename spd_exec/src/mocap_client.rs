//! # Mocap Client
//!
//! The MocapClient subscribes to the pose stream published by the motion
//! capture bridge. Unlike a plain latest-value subscriber every message is
//! surfaced to the caller, since the estimator differences consecutive
//! samples and must not skip any.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::warn;

use comms_if::{
    eqpt::mocap::PoseMsg,
    net::{zmq, MonitoredSocket, MonitoredSocketError, NetParams, SocketOptions},
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Mocap pose stream client
pub struct MocapClient {
    socket: MonitoredSocket,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum MocapClientError {
    #[error("Socket error: {0}")]
    SocketError(MonitoredSocketError),

    #[error("Could not recieve a message from the stream: {0}")]
    RecvError(zmq::Error),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl MocapClient {
    /// Create a new instance of the mocap client.
    ///
    /// This function will not block until the stream connects.
    pub fn new(ctx: &zmq::Context, params: &NetParams) -> Result<Self, MocapClientError> {
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
        let socket = MonitoredSocket::new(
            ctx,
            zmq::SUB,
            socket_options,
            &params.mocap_pose_endpoint,
        )
        .map_err(MocapClientError::SocketError)?;

        // Create self
        Ok(Self { socket })
    }

    /// Check if the client is connected to the stream
    pub fn is_connected(&self) -> bool {
        self.socket.connected()
    }

    /// Recieve a single pose from the stream.
    ///
    /// The protocol here is to call recv_pose in a loop until `Ok(None)` is
    /// returned, indicating that there are no more pending poses right now.
    /// Malformed messages are logged and skipped rather than surfaced, a
    /// single bad frame must not interrupt the drain.
    pub fn recv_pose(&self) -> Result<Option<PoseMsg>, MocapClientError> {
        loop {
            // Attempt to read a string from the socket
            let msg = match self.socket.recv_string(0) {
                // Valid message
                Ok(Ok(s)) => s,
                // Non UTF-8 message
                Ok(Err(_)) => {
                    warn!("Non UTF-8 message from the mocap stream");
                    continue;
                }
                // No message pending
                Err(zmq::Error::EAGAIN) => return Ok(None),
                // Recieve error
                Err(e) => return Err(MocapClientError::RecvError(e)),
            };

            // Parse the pose
            match serde_json::from_str(&msg) {
                Ok(pose) => return Ok(Some(pose)),
                Err(e) => {
                    warn!("Could not parse recieved pose: {}", e);
                    continue;
                }
            }
        }
    }
}
