//! Human body pose estimation.
//!
//! A body is first found with [`detection::PoseNetwork`], then followed with
//! [`landmark::PoseLandmarkNetwork`]. [`tracking::PoseTracker`] handles one body at a time.

pub mod detection;
pub mod landmark;
pub mod tracking;
