//! Interactive planner command sender.
//!
//! A readline loop which parses each line into a control command and
//! publishes it on the planner endpoint, standing in for the real MPC.
//!
//! Examples:
//!
//! ```text
//! MPC $ speed -t 1.5
//! MPC $ speed -t 1.0 -s 0.2
//! MPC $ brake -b 1.0
//! MPC $ quit
//! ```

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use color_eyre::{eyre::WrapErr, Report};
use rustyline::error::ReadlineError;
use rustyline::Editor;
use structopt::StructOpt;

use comms_if::{
    ctrl::CtrlCmd,
    net::{zmq, MonitoredSocket, NetParams, SocketOptions},
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

const PROMPT: &str = "MPC $ ";
const HISTORY_PATH: &str = "data/mpc_cli_history.txt";

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

fn main() -> Result<(), Report> {
    // Load the endpoints
    let net_params: NetParams =
        util::params::load("net.toml").wrap_err("Could not load net params")?;

    // Bind the command publication socket
    let ctx = zmq::Context::new();

    let socket_options = SocketOptions {
        bind: true,
        block_on_first_connect: false,
        ..Default::default()
    };

    let socket = MonitoredSocket::new(
        &ctx,
        zmq::PUB,
        socket_options,
        &net_params.mpc_cmd_bind_endpoint,
    )
    .wrap_err("Could not bind the command socket")?;

    println!(
        "Publishing planner commands on {}",
        net_params.mpc_cmd_bind_endpoint
    );

    // Setup the readline editor
    let mut rl = Editor::<()>::new();
    if rl.load_history(HISTORY_PATH).is_err() {
        println!("No history detected");
    }

    loop {
        let readline = rl.readline(PROMPT);
        match readline {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if line == "quit" || line == "exit" {
                    break;
                }

                rl.add_history_entry(line);

                match parse(line) {
                    Some(cmd) => send(&socket, &cmd),
                    None => continue,
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(err) => {
                println!("Unhandled Error: {:?}", err);
                break;
            }
        }
    }

    if let Some(parent) = std::path::Path::new(HISTORY_PATH).parent() {
        std::fs::create_dir_all(parent).ok();
    }
    rl.save_history(HISTORY_PATH).ok();

    Ok(())
}

/// Parse a line into a control command, printing the problem if it doesn't
/// parse.
fn parse(line: &str) -> Option<CtrlCmd> {
    // The first "argument" is the app name as far as structopt is concerned
    let args = std::iter::once("cmd").chain(line.split_whitespace());

    match CtrlCmd::from_iter_safe(args) {
        Ok(cmd) => Some(cmd),
        Err(e) => {
            println!("{}", e.message);
            None
        }
    }
}

/// Publish a command on the socket.
fn send(socket: &MonitoredSocket, cmd: &CtrlCmd) {
    match serde_json::to_string(cmd) {
        Ok(s) => match socket.send(s.as_str(), 0) {
            Ok(_) => println!("Sent {:?}", cmd),
            Err(e) => println!("Could not send the command: {}", e),
        },
        Err(e) => println!("Could not serialise the command: {}", e),
    }
}
