//! Closed-loop tests of the estimation and regulation pipeline.
//!
//! These drive the modules through the data store exactly the way the main
//! loop does, without the network or a session.

use comms_if::{
    ctrl::{CtrlCmd, CtrlMode},
    eqpt::{mocap::PoseMsg, vesc::MotorCmdMode},
};
use spd_lib::{cmd_processor, data_store::DataStore};
use util::module::State;

/// Build a pose at the given time, planar position and yaw
fn pose(timestamp_s: f64, x_m: f64, y_m: f64, yaw_rad: f64) -> PoseMsg {
    let half_yaw = yaw_rad / 2.0;

    PoseMsg {
        timestamp_s,
        position_m: [x_m, y_m, 0.0],
        attitude_q: [0.0, 0.0, half_yaw.sin(), half_yaw.cos()],
    }
}

/// Run one pose through the estimator and controller, the way the main loop
/// does
fn proc_pose(ds: &mut DataStore, p: &PoseMsg) {
    let (estimate, rpt) = ds.vel_est.proc(p).unwrap();
    ds.vel_est_rpt = rpt;

    if let Some(speed_ms) = estimate {
        ds.vel_est_output = Some(speed_ms);

        let (output_a, rpt) = ds.speed_ctrl.proc(&speed_ms).unwrap();
        ds.control_output_a = output_a;
        ds.speed_ctrl_rpt = rpt;
    }
}

#[test]
fn command_before_any_pose_demands_zero_current() {
    let mut ds = DataStore::default();

    // No pose has ever been recieved, so the controller has never run and
    // the assembled command carries zero current
    let cmd = CtrlCmd {
        control_mode: CtrlMode::SpeedRequest,
        set_speed_ms: 3.0,
        steering_angle_rad: 0.2,
        set_brake: 0.0,
    };

    let motor_cmd = cmd_processor::exec(&mut ds, &cmd);

    assert!(motor_cmd.set_current_a.abs() < 1e-12);
    assert_eq!(motor_cmd.control_mode, Some(MotorCmdMode::CurrentCommand));
    assert!((motor_cmd.steering_angle_rad - 0.2).abs() < 1e-12);
}

#[test]
fn on_target_speed_gives_zero_output() {
    let mut ds = DataStore::default();

    // Target 1 m/s with the default gains (kp = 40, ki = kd = 0)
    let cmd = CtrlCmd {
        control_mode: CtrlMode::SpeedRequest,
        set_speed_ms: 1.0,
        steering_angle_rad: 0.0,
        set_brake: 0.0,
    };
    cmd_processor::exec(&mut ds, &cmd);

    // The vehicle covers 1 m in 1 s pointing along +x, estimated speed is
    // exactly the target so the proportional-only output is zero
    proc_pose(&mut ds, &pose(0.0, 0.0, 0.0, 0.0));
    proc_pose(&mut ds, &pose(1.0, 1.0, 0.0, 0.0));

    assert!((ds.vel_est_output.unwrap() - 1.0).abs() < 1e-12);
    assert!(ds.control_output_a.abs() < 1e-12);

    // The next command picks up that (zero) output
    let motor_cmd = cmd_processor::exec(&mut ds, &cmd);
    assert!(motor_cmd.set_current_a.abs() < 1e-12);
}

#[test]
fn command_uses_latest_output_however_stale() {
    let mut ds = DataStore::default();

    // Ask for 2 m/s while the vehicle does 1 m/s, kp = 40 so the error of
    // 1 m/s demands 40 A
    let cmd = CtrlCmd {
        control_mode: CtrlMode::SpeedRequest,
        set_speed_ms: 2.0,
        steering_angle_rad: 0.0,
        set_brake: 0.0,
    };
    cmd_processor::exec(&mut ds, &cmd);

    proc_pose(&mut ds, &pose(0.0, 0.0, 0.0, 0.0));
    proc_pose(&mut ds, &pose(1.0, 1.0, 0.0, 0.0));

    let first = ds.control_output_a;
    assert!((first - 40.0).abs() < 1e-9);

    // No further poses arrive. Every subsequent command is assembled from
    // the same stale output
    for _ in 0..3 {
        let motor_cmd = cmd_processor::exec(&mut ds, &cmd);
        assert!((motor_cmd.set_current_a - first).abs() < 1e-12);
    }
}

#[test]
fn brake_command_passes_through() {
    let mut ds = DataStore::default();

    let cmd = CtrlCmd {
        control_mode: CtrlMode::BrakeRequest,
        set_speed_ms: 0.0,
        steering_angle_rad: -0.1,
        set_brake: 0.8,
    };

    let motor_cmd = cmd_processor::exec(&mut ds, &cmd);

    assert_eq!(motor_cmd.control_mode, Some(MotorCmdMode::BrakeRequest));
    assert!((motor_cmd.set_brake - 0.8).abs() < 1e-12);
    assert!((motor_cmd.steering_angle_rad + 0.1).abs() < 1e-12);
}

#[test]
fn rejected_samples_do_not_disturb_the_loop() {
    let mut ds = DataStore::default();

    let cmd = CtrlCmd {
        control_mode: CtrlMode::SpeedRequest,
        set_speed_ms: 1.0,
        steering_angle_rad: 0.0,
        set_brake: 0.0,
    };
    cmd_processor::exec(&mut ds, &cmd);

    proc_pose(&mut ds, &pose(0.0, 0.0, 0.0, 0.0));
    proc_pose(&mut ds, &pose(1.0, 1.0, 0.0, 0.0));

    let before = ds.control_output_a;

    // A duplicate-stamp sample produces no estimate and leaves the control
    // output untouched
    proc_pose(&mut ds, &pose(1.0, 1.5, 0.0, 0.0));
    assert!(ds.vel_est_rpt.nonpositive_dt);
    assert!((ds.control_output_a - before).abs() < 1e-12);
}
