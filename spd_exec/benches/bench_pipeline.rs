//! Benchmarks of the estimation and regulation hot path.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use comms_if::eqpt::mocap::PoseMsg;
use spd_lib::{speed_ctrl, vel_est};
use util::module::State;

/// Build a synthetic pose stream along a straight line at 1 m/s, sampled at
/// 100 Hz
fn pose_stream(len: usize) -> Vec<PoseMsg> {
    (0..len)
        .map(|i| {
            let t = i as f64 * 0.01;
            PoseMsg {
                timestamp_s: t,
                position_m: [t, 0.0, 0.0],
                attitude_q: [0.0, 0.0, 0.0, 1.0],
            }
        })
        .collect()
}

fn bench_vel_est(c: &mut Criterion) {
    let poses = pose_stream(1000);

    c.bench_function("vel_est_1000_poses", |b| {
        b.iter(|| {
            let mut est = vel_est::VelEst::default();

            for pose in poses.iter() {
                black_box(est.proc(black_box(pose)).unwrap());
            }
        })
    });
}

fn bench_full_pipeline(c: &mut Criterion) {
    let poses = pose_stream(1000);

    c.bench_function("estimate_and_regulate_1000_poses", |b| {
        b.iter(|| {
            let mut est = vel_est::VelEst::default();
            let mut ctrl = speed_ctrl::SpeedCtrl::default();
            ctrl.set_setpoint(1.5);

            for pose in poses.iter() {
                let (estimate, _) = est.proc(black_box(pose)).unwrap();

                if let Some(speed_ms) = estimate {
                    black_box(ctrl.proc(&speed_ms).unwrap());
                }
            }
        })
    });
}

criterion_group!(benches, bench_vel_est, bench_full_pipeline);
criterion_main!(benches);
