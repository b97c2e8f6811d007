//! # Mocap Equipment Communications Module
//!
//! The motion capture system publishes timestamped rigid body poses for the
//! vehicle. Only planar position and yaw are consumed by the exec, but the
//! full pose is carried on the wire so other tools can use the same stream.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use nalgebra::{Quaternion, UnitQuaternion};
use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A single timestamped pose observation of the vehicle rigid body.
#[derive(Debug, Copy, Clone, Serialize, Deserialize)]
pub struct PoseMsg {
    /// Acquisition time of the observation in seconds (with fractional part)
    /// in the mocap system's clock.
    pub timestamp_s: f64,

    /// The position of the rigid body in the mocap frame.
    ///
    /// Units: meters
    pub position_m: [f64; 3],

    /// The attitude of the rigid body in the mocap frame, as a quaternion in
    /// (x, y, z, w) order.
    pub attitude_q: [f64; 4],
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl PoseMsg {
    /// Return the yaw (rotation about the vertical axis) of the rigid body in
    /// radians.
    ///
    /// The yaw is the z component of the roll-pitch-yaw Euler decomposition
    /// of the attitude quaternion.
    pub fn yaw_rad(&self) -> f64 {
        let q = UnitQuaternion::from_quaternion(Quaternion::new(
            self.attitude_q[3],
            self.attitude_q[0],
            self.attitude_q[1],
            self.attitude_q[2],
        ));

        let (_roll, _pitch, yaw) = q.euler_angles();

        yaw
    }

    /// Check the message for validity.
    ///
    /// A pose is valid if all of its fields are finite.
    pub fn is_valid(&self) -> bool {
        self.timestamp_s.is_finite()
            && self.position_m.iter().all(|p| p.is_finite())
            && self.attitude_q.iter().all(|q| q.is_finite())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_yaw_from_quaternion() {
        // A pure rotation of 90 degrees about z
        let half = std::f64::consts::FRAC_PI_4;
        let pose = PoseMsg {
            timestamp_s: 0.0,
            position_m: [0.0; 3],
            attitude_q: [0.0, 0.0, half.sin(), half.cos()],
        };

        assert!((pose.yaw_rad() - std::f64::consts::FRAC_PI_2).abs() < 1e-9);

        // Identity quaternion has zero yaw
        let pose = PoseMsg {
            timestamp_s: 0.0,
            position_m: [0.0; 3],
            attitude_q: [0.0, 0.0, 0.0, 1.0],
        };

        assert!(pose.yaw_rad().abs() < 1e-12);
    }

    #[test]
    fn test_validity() {
        let mut pose = PoseMsg {
            timestamp_s: 1.0,
            position_m: [1.0, 2.0, 0.0],
            attitude_q: [0.0, 0.0, 0.0, 1.0],
        };
        assert!(pose.is_valid());

        pose.position_m[1] = std::f64::NAN;
        assert!(!pose.is_valid());
    }
}
