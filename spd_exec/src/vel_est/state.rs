//! Implementations for the VelEst state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;
use nalgebra::Vector2;
use serde::Serialize;

// Internal
use super::{MedianSmoother, Params, VelEstError};
use comms_if::eqpt::mocap::PoseMsg;
use util::{
    archive::{ArchiveError, Archived, Archiver},
    module::State,
    params,
    session::Session,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Velocity estimation module state
pub struct VelEst {
    pub(crate) params: Params,

    /// Position of the previous accepted pose sample.
    last_position_m: Option<Vector2<f64>>,

    /// Timestamp of the previous accepted pose sample.
    last_timestamp_s: Option<f64>,

    smoother: MedianSmoother,

    pub(crate) report: StatusReport,
    arch_report: Archiver,
}

/// Status report for VelEst processing.
#[derive(Clone, Copy, Default, Serialize, Debug)]
pub struct StatusReport {
    /// The unsmoothed signed speed computed this cycle, if any.
    pub raw_speed_ms: Option<f64>,

    /// The smoothed signed speed computed this cycle, if any.
    pub smoothed_speed_ms: Option<f64>,

    /// Number of samples in the smoothing window after this cycle.
    pub window_len: usize,

    /// Raised when a sample was rejected for a non-positive time delta.
    pub nonpositive_dt: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for VelEst {
    fn default() -> Self {
        Self::new(Params::default())
    }
}

impl State for VelEst {
    type InitData = &'static str;
    type InitError = VelEstError;

    type InputData = PoseMsg;
    type OutputData = Option<f64>;
    type StatusReport = StatusReport;
    type ProcError = VelEstError;

    /// Initialise the VelEst module.
    ///
    /// Expected init data is the path to the parameter file
    fn init(&mut self, init_data: Self::InitData, session: &Session) -> Result<(), VelEstError> {
        // Load the parameters
        self.params = params::load(init_data)?;

        if self.params.window_len == 0 {
            return Err(VelEstError::InvalidWindowLen(self.params.window_len));
        }

        // Rebuild the smoother with the configured window
        self.smoother = MedianSmoother::new(self.params.window_len);

        // Initialise the archiver
        self.arch_report = Archiver::from_path(session, "vel_est/status_report.csv")?;

        Ok(())
    }

    /// Process a single pose sample.
    ///
    /// Returns the smoothed signed speed estimate, or `None` when there is
    /// not enough history yet (first sample, or a sample rejected for a
    /// non-positive time delta).
    fn proc(
        &mut self,
        pose: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), VelEstError> {
        // Clear the status report
        self.report = StatusReport::default();
        self.report.window_len = self.smoother.len();

        if !pose.is_valid() {
            return Err(VelEstError::NonFinitePose);
        }

        let position_m = Vector2::new(pose.position_m[0], pose.position_m[1]);

        let estimate = match (self.last_position_m, self.last_timestamp_s) {
            (Some(last_position_m), Some(last_timestamp_s)) => {
                let dt_s = pose.timestamp_s - last_timestamp_s;

                if dt_s <= 0.0 {
                    // Duplicate or out-of-order timestamp. Differencing over
                    // it would divide by zero or run time backwards, so the
                    // sample produces no estimate. It still replaces the
                    // stored history below so a single bad stamp can't wedge
                    // the estimator.
                    self.report.nonpositive_dt = true;

                    None
                } else {
                    let displacement_m = position_m - last_position_m;

                    // Angle of the displacement in the mocap frame
                    let movement_heading_rad = displacement_m[1].atan2(displacement_m[0]);

                    // Magnitude of the velocity regardless of direction
                    let absolute_speed_ms = displacement_m.norm() / dt_s;

                    // Project onto the vehicle's heading axis. Driving
                    // backwards gives a heading opposite to the yaw and
                    // therefore a negative speed.
                    let signed_speed_ms =
                        absolute_speed_ms * (movement_heading_rad - pose.yaw_rad()).cos();

                    let smoothed_speed_ms = self.smoother.push(signed_speed_ms);

                    self.report.raw_speed_ms = Some(signed_speed_ms);
                    self.report.smoothed_speed_ms = Some(smoothed_speed_ms);
                    self.report.window_len = self.smoother.len();

                    Some(smoothed_speed_ms)
                }
            }
            _ => None,
        };

        // The current sample always becomes the new history
        self.last_position_m = Some(position_m);
        self.last_timestamp_s = Some(pose.timestamp_s);

        trace!("VelEst output: {:?}", estimate);

        Ok((estimate, self.report))
    }
}

impl Archived for VelEst {
    fn write(&mut self) -> Result<(), ArchiveError> {
        self.arch_report.serialise(self.report)
    }
}

impl VelEst {
    /// Create a new estimator from the given parameters.
    pub fn new(params: Params) -> Self {
        let smoother = MedianSmoother::new(params.window_len.max(1));

        Self {
            params,
            last_position_m: None,
            last_timestamp_s: None,
            smoother,
            report: StatusReport::default(),
            arch_report: Archiver::default(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    /// Build a pose at the given time, planar position and yaw
    fn pose(timestamp_s: f64, x_m: f64, y_m: f64, yaw_rad: f64) -> PoseMsg {
        let half_yaw = yaw_rad / 2.0;

        PoseMsg {
            timestamp_s,
            position_m: [x_m, y_m, 0.0],
            attitude_q: [0.0, 0.0, half_yaw.sin(), half_yaw.cos()],
        }
    }

    #[test]
    fn test_first_sample_produces_nothing() {
        let mut est = VelEst::default();

        let (out, rpt) = est.proc(&pose(0.0, 0.0, 0.0, 0.0)).unwrap();
        assert!(out.is_none());
        assert!(!rpt.nonpositive_dt);
    }

    #[test]
    fn test_forward_motion() {
        let mut est = VelEst::default();

        est.proc(&pose(0.0, 0.0, 0.0, 0.0)).unwrap();
        let (out, _) = est.proc(&pose(1.0, 1.0, 0.0, 0.0)).unwrap();

        // 1 m in 1 s along the heading axis
        assert!((out.unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_reverse_motion_is_negative() {
        let mut est = VelEst::default();

        // The vehicle points along +x but moves along -x
        est.proc(&pose(0.0, 0.0, 0.0, 0.0)).unwrap();
        let (out, _) = est.proc(&pose(0.5, -1.0, 0.0, 0.0)).unwrap();

        assert!((out.unwrap() + 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_projection_formula() {
        let mut est = VelEst::default();

        // Move diagonally while yawed, check against the closed form
        let (t0, x0, y0) = (10.0, 0.3, -0.2);
        let (t1, x1, y1) = (10.1, 0.5, 0.1);
        let yaw_rad = 0.4;

        est.proc(&pose(t0, x0, y0, yaw_rad)).unwrap();
        let (out, _) = est.proc(&pose(t1, x1, y1, yaw_rad)).unwrap();

        let (dx, dy, dt) = (x1 - x0, y1 - y0, t1 - t0);
        let expected = (dx * dx + dy * dy).sqrt() / dt * (dy.atan2(dx) - yaw_rad).cos();

        assert!((out.unwrap() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_nonpositive_dt_rejected() {
        let mut est = VelEst::default();

        est.proc(&pose(1.0, 0.0, 0.0, 0.0)).unwrap();

        // Duplicate timestamp
        let (out, rpt) = est.proc(&pose(1.0, 0.5, 0.0, 0.0)).unwrap();
        assert!(out.is_none());
        assert!(rpt.nonpositive_dt);

        // Out-of-order timestamp
        let (out, rpt) = est.proc(&pose(0.5, 0.7, 0.0, 0.0)).unwrap();
        assert!(out.is_none());
        assert!(rpt.nonpositive_dt);

        // The rejected sample replaced the history, so the next good sample
        // differences against it
        let (out, rpt) = est.proc(&pose(1.5, 1.7, 0.0, 0.0)).unwrap();
        assert!(!rpt.nonpositive_dt);
        assert!((out.unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_non_finite_pose_rejected() {
        let mut est = VelEst::default();

        let mut bad = pose(0.0, 0.0, 0.0, 0.0);
        bad.position_m[0] = std::f64::NAN;

        assert!(matches!(est.proc(&bad), Err(VelEstError::NonFinitePose)));
    }

    #[test]
    fn test_estimates_are_smoothed() {
        let mut est = VelEst::default();

        // Constant 1 m/s with a single spike, the median suppresses it
        est.proc(&pose(0.0, 0.0, 0.0, 0.0)).unwrap();
        est.proc(&pose(1.0, 1.0, 0.0, 0.0)).unwrap();
        est.proc(&pose(2.0, 2.0, 0.0, 0.0)).unwrap();

        // Spike: 5 m in 1 s
        est.proc(&pose(3.0, 7.0, 0.0, 0.0)).unwrap();
        let (out, rpt) = est.proc(&pose(4.0, 8.0, 0.0, 0.0)).unwrap();

        // Window is [1, 1, 5, 1], sorted index 2 is 1
        assert!((out.unwrap() - 1.0).abs() < 1e-12);
        assert!((rpt.raw_speed_ms.unwrap() - 1.0).abs() < 1e-12);
        assert_eq!(rpt.window_len, 4);
    }
}
