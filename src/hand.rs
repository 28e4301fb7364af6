//! Hand detection, landmark estimation and tracking.
//!
//! Hands are found by a palm detector ([`detection::PalmNetwork`]), then followed from frame to
//! frame by running [`landmark::HandLandmarkNetwork`] on a rotated crop around each hand. The
//! [`tracking::HandTracker`] ties both together.

pub mod detection;
pub mod landmark;
pub mod tracking;
