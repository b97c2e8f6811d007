//! # PID controller
//!
//! This module provides the PID controller used for SpeedCtrl.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;
use std::time::Instant;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A setpoint-tracking PID controller
#[derive(Debug, Serialize, Clone)]
pub struct PidController {
    /// Previous instant that a measurement was passed in
    #[serde(skip)]
    prev_time: Option<Instant>,

    /// Proportional gain
    k_p: f64,

    /// Integral gain
    k_i: f64,

    /// Dervative gain
    k_d: f64,

    /// The target value for the measured quantity
    setpoint: f64,

    /// Previous error
    prev_error: Option<f64>,

    /// The integral accumulation
    integral: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PidController {
    /// Create a new controller with the given gains.
    ///
    /// The setpoint starts at zero, use [`PidController::set_setpoint`] to
    /// change it.
    pub fn new(k_p: f64, k_i: f64, k_d: f64) -> Self {
        Self {
            k_p,
            k_i,
            k_d,
            setpoint: 0f64,
            integral: 0f64,
            prev_time: None,
            prev_error: None,
        }
    }

    /// Set the target value the controller regulates towards.
    pub fn set_setpoint(&mut self, setpoint: f64) {
        self.setpoint = setpoint;
    }

    /// Get the current setpoint.
    pub fn setpoint(&self) -> f64 {
        self.setpoint
    }

    /// Get the value of the controller for the given measurement.
    ///
    /// This function is time-aware so there is no need to pass in a
    /// delta-time value.
    pub fn update(&mut self, measurement: f64) -> f64 {
        self.update_at(Instant::now(), measurement)
    }

    /// Time-explicit form of [`PidController::update`].
    fn update_at(&mut self, curr_time: Instant, measurement: f64) -> f64 {
        let error = self.setpoint - measurement;

        // Calculate dt
        let dt_s = self.prev_time.map(|t0| (curr_time - t0).as_secs_f64());

        // Accumulate the integral term.
        //
        // If there's no time difference then we don't accumulate the integral.
        // The other option is to add on the error and that will produce a
        // large spike in integral compared to normal operation, so we don't do
        // this.
        self.integral += match dt_s {
            Some(dt) => error * dt,
            None => 0f64,
        };

        // Calculate the derivative.
        //
        // If there's no previous error or no (positive) time difference we
        // assume no derivative, for the same reasons as for integral.
        let deriv = match (self.prev_error, dt_s) {
            (Some(e0), Some(dt)) if dt > 0.0 => (error - e0) / dt,
            _ => 0f64,
        };

        // Calculate the output
        let out = self.k_p * error + self.k_i * self.integral + self.k_d * deriv;

        // Remember the previous error and time
        self.prev_error = Some(error);
        self.prev_time = Some(curr_time);

        // Return
        out
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_first_update_is_proportional_only() {
        let mut pid = PidController::new(1.0, 100.0, 100.0);
        pid.set_setpoint(10.0);

        // No previous call means no time base, so the integral and
        // derivative terms contribute nothing
        let out = pid.update_at(Instant::now(), 4.0);
        assert!((out - 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_error_zero_output() {
        let mut pid = PidController::new(40.0, 0.0, 0.0);
        pid.set_setpoint(1.0);

        let out = pid.update_at(Instant::now(), 1.0);
        assert!(out.abs() < 1e-12);
    }

    #[test]
    fn test_integral_accumulation() {
        let mut pid = PidController::new(0.0, 1.0, 0.0);
        pid.set_setpoint(2.0);

        let t0 = Instant::now();
        assert!(pid.update_at(t0, 1.0).abs() < 1e-12);

        // One second at a constant error of 1 accumulates an integral of 1
        let out = pid.update_at(t0 + Duration::from_secs(1), 1.0);
        assert!((out - 1.0).abs() < 1e-12);

        // Another two seconds accumulates a further 2
        let out = pid.update_at(t0 + Duration::from_secs(3), 1.0);
        assert!((out - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_derivative_of_error_ramp() {
        let mut pid = PidController::new(0.0, 0.0, 1.0);
        pid.set_setpoint(0.0);

        let t0 = Instant::now();
        pid.update_at(t0, 0.0);

        // Error falls from 0 to -1 over one second
        let out = pid.update_at(t0 + Duration::from_secs(1), 1.0);
        assert!((out + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_setpoint_change_applies_immediately() {
        let mut pid = PidController::new(2.0, 0.0, 0.0);
        pid.set_setpoint(1.0);

        let t0 = Instant::now();
        pid.update_at(t0, 0.0);

        pid.set_setpoint(-1.0);
        let out = pid.update_at(t0 + Duration::from_millis(10), 0.0);
        assert!((out + 2.0).abs() < 1e-12);
    }
}
