//! Face detection.
//!
//! Uses the short-range "BlazeFace" network, which works best for faces within about 2 meters of
//! the camera.

pub mod detection;
