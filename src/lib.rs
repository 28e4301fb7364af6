//! Live webcam vision demos: hand, face and pose tracking, gesture-driven media keys and a
//! finger painter, viewed and controlled from the browser.
//!
//! Every demo runs pre-trained ONNX networks in-process (see [`models`] for the files that are
//! needed). Frames are captured from a V4L2 [`webcam`], mirrored, processed by the selected
//! [`project::Pipeline`], and streamed to the browser by the [`ui`] server.
//!
//! # Environment Variables
//!
//! * `VISIONDECK_MODEL_DIR`: Directory to load the ONNX models from, unless `--models` is given.
//!   Defaults to `3rdparty/onnx` in the source tree.
//! * `VISIONDECK_WEBCAM_NAME`: Forces the webcam to use, unless `--device` is given. If unset,
//!   the first device that supports a compatible image format will be used.
//! * `VISIONDECK_JPEG_BACKEND`: Configures the JPEG decoder for webcam frames. Allowed values are:
//!   * `mozjpeg` (the default): uses the [mozjpeg] library.
//!   * `image`: uses the decoder of the [image] crate.
//!
//! [mozjpeg]: https://github.com/mozilla/mozjpeg
//! [image]: https://github.com/image-rs/image

use log::LevelFilter;

pub mod body;
pub mod config;
pub mod detection;
pub mod face;
pub mod gesture;
pub mod hand;
pub mod image;
pub mod iter;
pub mod landmark;
pub mod media;
pub mod models;
pub mod nn;
pub mod num;
pub mod painter;
pub mod project;
pub mod resolution;
pub mod settings;
pub mod timer;
pub mod ui;
pub mod webcam;
pub mod worker;

/// macro-use only, not part of public API.
#[doc(hidden)]
pub fn init_logger(calling_crate: &'static str, verbose: bool) {
    let log_level = if verbose {
        LevelFilter::Trace
    } else {
        LevelFilter::Debug
    };
    env_logger::Builder::new()
        .filter(Some(calling_crate), log_level)
        .filter(Some(env!("CARGO_CRATE_NAME")), log_level)
        .parse_default_env()
        .try_init()
        .ok();
}

/// Initializes logging to *stderr*.
///
/// The calling crate and visiondeck log at *debug* level, or at *trace* level when invoked as
/// `init_logger!(true)`. `RUST_LOG` takes precedence over both.
///
/// If a global logger is already registered, this macro will do nothing.
#[macro_export]
macro_rules! init_logger {
    () => {
        $crate::init_logger(env!("CARGO_CRATE_NAME"), false)
    };
    ($verbose:expr) => {
        $crate::init_logger(env!("CARGO_CRATE_NAME"), $verbose)
    };
}
