//! Main speed-control executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise all modules
//!     - Main loop:
//!         - Pose stream draining:
//!             - Velocity estimation
//!             - Speed control processing
//!         - Planner command processing and handling:
//!             - Command arbitration
//!             - Motor command emission
//!         - Archiving and telemetry
//!
//! Both input streams (poses and planner commands) are drained by this
//! single sequential loop, which is what makes the module states safe to
//! mutate without locking.
//!
//! # Modules
//!
//! All modules (e.g. `vel_est`) shall meet the following requirements:
//!     1. Provide a public struct implementing the `util::module::State` trait.

// ---------------------------------------------------------------------------
// USE MODULES FROM LIBRARY
// ---------------------------------------------------------------------------

use spd_lib::{
    cmd_processor,
    data_store::DataStore,
    mocap_client::MocapClient,
    mpc_client::{MpcClient, MpcClientError},
    tm_server::TmServer,
    vesc_client::{VescClient, VescClientError},
};

use comms_if::{eqpt::vesc::MotorCmdResponse, net::NetParams};

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::{debug, error, info, warn};
use std::env;
use std::thread;
use std::time::{Duration, Instant};

// Internal
use util::{
    logger::{logger_init, LevelFilter},
    module::State,
    raise_error,
    script_interpreter::{PendingCmds, ScriptInterpreter},
    session::Session,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Target period of one cycle.
const CYCLE_PERIOD_S: f64 = 0.01;

/// Number of cycles per second
const CYCLE_FREQUENCY_HZ: f64 = 1.0 / CYCLE_PERIOD_S;

/// Limit of the number of consecutive VESC send errors before an error is
/// raised in the log.
const MAX_VESC_SEND_ERROR_LIMIT: u64 = 5;

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("spd_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Trace, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("VESC Speed Control Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let net_params: NetParams =
        util::params::load("net.toml").wrap_err("Could not load net params")?;

    info!("Exec parameters loaded");

    // ---- INITIALISE COMMAND SOURCE ----

    // The command source determines whether planner commands come from a
    // script or from the live MPC link.
    let mut cmd_source = CmdSource::None;
    let mut use_mpc_client = false;

    // Collect all arguments
    let args: Vec<String> = env::args().collect();

    debug!("CLI arguments: {:?}", args);

    // If we have a single argument use it as the script path
    if args.len() == 2 {
        info!("Loading script from \"{}\"", &args[1]);

        // Load the script interpreter
        let si = ScriptInterpreter::new(&args[1]).wrap_err("Failed to load script")?;

        // Display some info
        info!(
            "Loaded script lasts {:.02} s and contains {} commands\n",
            si.get_duration(),
            si.get_num_cmds()
        );

        // Set the interpreter in the source
        cmd_source = CmdSource::Script(si);
    }
    // If no arguments then setup the mpc client
    else if args.len() == 1 {
        info!("No script provided, the live planner link will be used\n");
        use_mpc_client = true;
    } else {
        return Err(eyre!(
            "Expected either zero or one argument, found {}",
            args.len() - 1
        ));
    }

    // ---- INITIALISE DATASTORE ----

    info!("Initialising modules...");

    let mut ds = DataStore::default();

    // ---- INITIALISE MODULES ----

    ds.vel_est
        .init("vel_est.toml", &session)
        .wrap_err("Failed to initialise VelEst")?;
    info!("VelEst init complete");

    ds.speed_ctrl
        .init("speed_ctrl.toml", &session)
        .wrap_err("Failed to initialise SpeedCtrl")?;
    info!("SpeedCtrl init complete");

    ds.cmd_arbiter
        .init(&session)
        .wrap_err("Failed to initialise CmdArbiter")?;
    info!("CmdArbiter init complete");

    info!("Module initialisation complete\n");

    // ---- INITIALISE NETWORK ----

    info!("Initialising network");

    let zmq_ctx = comms_if::net::zmq::Context::new();

    if use_mpc_client {
        cmd_source = CmdSource::Remote(
            MpcClient::new(&zmq_ctx, &net_params)
                .wrap_err("Failed to initialise the MpcClient")?,
        );
        info!("MpcClient initialised");
    }

    let mocap_client = {
        let c = MocapClient::new(&zmq_ctx, &net_params)
            .wrap_err("Failed to initialise MocapClient")?;
        info!("MocapClient initialised");
        c
    };

    let mut vesc_client = {
        let c =
            VescClient::new(&zmq_ctx, &net_params).wrap_err("Failed to initialise VescClient")?;
        info!("VescClient initialised");
        c
    };

    let mut tm_server = {
        let s = TmServer::new(&zmq_ctx, &net_params).wrap_err("Failed to initialise TmServer")?;
        info!("TmServer initialised");
        s
    };

    info!("Network initialisation complete");

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    'main_loop: loop {
        // Get cycle start time
        let cycle_start_instant = Instant::now();

        // Cycle bookkeeping. Note that the latest control output is not
        // cleared here, motor commands are assembled from it however stale
        // it is.
        ds.cycle_start(CYCLE_FREQUENCY_HZ);

        // ---- POSE PROCESSING ----

        // Drain every pending pose in arrival order. Each accepted sample
        // updates the speed estimate, and each estimate updates the control
        // output.
        loop {
            let pose = match mocap_client.recv_pose() {
                Ok(Some(p)) => p,
                Ok(None) => break,
                Err(e) => {
                    warn!("Error recieving from the mocap stream: {}", e);
                    break;
                }
            };

            match ds.vel_est.proc(&pose) {
                Ok((estimate, rpt)) => {
                    ds.vel_est_rpt = rpt;

                    if let Some(speed_ms) = estimate {
                        ds.vel_est_output = Some(speed_ms);

                        match ds.speed_ctrl.proc(&speed_ms) {
                            Ok((output_a, rpt)) => {
                                ds.control_output_a = output_a;
                                ds.speed_ctrl_rpt = rpt;
                            }
                            Err(e) => warn!("Error during SpeedCtrl processing: {}", e),
                        }
                    }
                }
                // VelEst errors mean a malformed sample, warn and move on
                Err(e) => warn!("Error during VelEst processing: {}", e),
            }
        }

        // ---- COMMAND PROCESSING ----

        // Collect the commands pending on this cycle from the active source
        let mut pending_cmds = vec![];

        match cmd_source {
            // If no source no point in continuing so break
            CmdSource::None => raise_error!("No command source present"),

            CmdSource::Remote(ref client) => loop {
                match client.recv_cmd() {
                    Ok(Some(cmd)) => pending_cmds.push(cmd),
                    Ok(None) => break,
                    Err(MpcClientError::RecvError(e)) => {
                        warn!("Error recieving from the planner: {}", e);
                        break;
                    }
                    Err(e) => {
                        return Err(e)
                            .wrap_err("An error occured while recieving planner commands")
                    }
                }
            },

            CmdSource::Script(ref mut si) => match si.get_pending_cmds() {
                PendingCmds::None => (),
                PendingCmds::Some(cmd_vec) => pending_cmds = cmd_vec,
                // Exit if end of script reached
                PendingCmds::EndOfScript => {
                    info!("End of command script reached, stopping");
                    break 'main_loop;
                }
            },
        };

        // Each command is answered with exactly one motor command
        for cmd in pending_cmds.iter() {
            let motor_cmd = cmd_processor::exec(&mut ds, cmd);

            match vesc_client.send_cmd(&motor_cmd) {
                Ok(MotorCmdResponse::CmdOk) => {
                    ds.num_consec_vesc_errors = 0;
                }
                Ok(r) => warn!("Recieved non-nominal response from the VESC driver: {:?}", r),
                Err(VescClientError::NotConnected) => {
                    ds.num_consec_vesc_errors += 1;

                    if ds.num_consec_vesc_errors == 1 {
                        error!("Connection to the VESC driver lost");
                    }
                }
                Err(e) => {
                    ds.num_consec_vesc_errors += 1;

                    if ds.num_consec_vesc_errors > MAX_VESC_SEND_ERROR_LIMIT {
                        error!(
                            "Maximum number of VESC send errors ({}) has been exceeded: {}",
                            MAX_VESC_SEND_ERROR_LIMIT, e
                        );
                    } else {
                        warn!("VescClient processing error: {}", e);
                    }
                }
            }
        }

        // ---- WRITE ARCHIVES ----

        ds.write_archives();

        // ---- TELEMETRY ----

        match tm_server.send(&ds) {
            Ok(_) => (),
            Err(e) => warn!("TmServer error: {}", e),
        };

        // 1Hz status line
        if ds.is_1_hz_cycle {
            if !mocap_client.is_connected() {
                warn!("Mocap stream is not connected");
            }

            info!(
                "est speed: {}, control output: {:.3} A, setpoint: {:.3} m/s",
                match ds.vel_est_output {
                    Some(s) => format!("{:.3} m/s", s),
                    None => String::from("none"),
                },
                ds.control_output_a,
                ds.speed_ctrl.setpoint_ms()
            );
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        // Get sleep duration
        match Duration::from_secs_f64(CYCLE_PERIOD_S).checked_sub(cycle_dur) {
            Some(d) => {
                ds.num_consec_cycle_overruns = 0;
                thread::sleep(d);
            }
            None => {
                warn!(
                    "Cycle overran by {:.06} s",
                    cycle_dur.as_secs_f64() - CYCLE_PERIOD_S
                );
                ds.num_consec_cycle_overruns += 1;
            }
        }

        // Increment cycle counter
        ds.num_cycles += 1;
    }

    // ---- SHUTDOWN ----

    // Save the final state of the exec into the session for post-run
    // analysis
    session.save(
        "final_tm.json",
        spd_lib::tm_server::TmPacket::from_datastore(&ds),
    );
    session.exit();

    info!("End of execution");

    Ok(())
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Various sources for the planner commands incoming to the exec.
enum CmdSource {
    None,
    Remote(MpcClient),
    Script(ScriptInterpreter),
}
