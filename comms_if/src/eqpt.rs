//! # Equipment Communications Module

/// Motion capture (mocap) pose stream definitions
pub mod mocap;

/// VESC motor controller command definitions
pub mod vesc;
