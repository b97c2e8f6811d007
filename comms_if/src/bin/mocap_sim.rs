//! Simple mocap stream simulator
//!
//! Publishes synthetic vehicle poses in the same wire format as the real
//! mocap bridge, driving the rigid body around a circle at constant speed.
//! Useful for exercising the exec without a mocap system on the network.

use chrono::Utc;
use comms_if::eqpt::mocap::PoseMsg;
use comms_if::net::{MonitoredSocket, SocketOptions};

/// Publication period of the synthetic stream
const PERIOD_S: f64 = 0.01;

/// Radius of the driven circle in meters
const RADIUS_M: f64 = 2.0;

/// Speed of the rigid body along the circle in meters/second
const SPEED_MS: f64 = 1.5;

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
        .unwrap_or_else(|| String::from("tcp://*:5561"));

    // Create the socket
    let socket = MonitoredSocket::new(&ctx, zmq::PUB, socket_options, &endpoint)?;

    println!("Mocap simulator publishing on {}", endpoint);

    let angular_rate_rads = SPEED_MS / RADIUS_M;
    let mut angle_rad = 0f64;

    loop {
        // Timestamp from the wall clock, seconds with fractional part
        let now = Utc::now();
        let timestamp_s = now.timestamp() as f64 + f64::from(now.timestamp_subsec_nanos()) / 1e9;

        // The body moves along the circle, with the heading tangential to it
        let yaw_rad = angle_rad + std::f64::consts::FRAC_PI_2;
        let half_yaw = yaw_rad / 2.0;

        let pose = PoseMsg {
            timestamp_s,
            position_m: [RADIUS_M * angle_rad.cos(), RADIUS_M * angle_rad.sin(), 0.0],
            attitude_q: [0.0, 0.0, half_yaw.sin(), half_yaw.cos()],
        };

        match serde_json::to_string(&pose) {
            Ok(s) => {
                if let Err(e) = socket.send(s.as_str(), 0) {
                    println!("Failed to send pose: {}", e);
                }
            }
            Err(e) => println!("Failed to serialise pose: {}", e),
        }

        angle_rad += angular_rate_rads * PERIOD_S;

        std::thread::sleep(std::time::Duration::from_secs_f64(PERIOD_S));
    }
}
