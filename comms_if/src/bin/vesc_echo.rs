//! Simple VESC driver stand-in
//!
//! Binds the driver's command socket, prints every motor command it recieves
//! and acknowledges it the way the real driver would. Mode-less commands are
//! rejected as invalid.

use comms_if::eqpt::vesc::{MotorCmd, MotorCmdResponse};
use comms_if::net::{MonitoredSocket, SocketOptions};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Create zmq context
    let ctx = zmq::Context::new();

    // Create socket options
    let socket_options = SocketOptions {
        bind: true,
        block_on_first_connect: false,
        ..Default::default()
    };

    // Endpoint may be given as the only argument
    let endpoint = std::env::args()
        .nth(1)
        .unwrap_or_else(|| String::from("tcp://*:5563"));

    // Create the socket
    let socket = MonitoredSocket::new(&ctx, zmq::REP, socket_options, &endpoint)?;

    println!("VESC echo server open on {}", endpoint);

    loop {
        let msg = socket.recv_msg(0)?;

        let response = match msg.as_str().map(serde_json::from_str::<MotorCmd>) {
            Some(Ok(cmd)) => {
                println!("Got command: {:?}", cmd);

                match cmd.control_mode {
                    Some(_) => MotorCmdResponse::CmdOk,
                    None => MotorCmdResponse::CmdInvalid,
                }
            }
            Some(Err(e)) => {
                println!("Could not parse command: {}", e);
                MotorCmdResponse::CmdInvalid
            }
            None => {
                println!("Non UTF-8 message recieved");
                MotorCmdResponse::CmdInvalid
            }
        };

        socket.send(serde_json::to_string(&response)?.as_str(), 0)?;
    }
}
