//! Locating the ONNX model files.

use std::{
    env,
    path::{Path, PathBuf},
};

use anyhow::bail;
use once_cell::sync::Lazy;

use crate::nn::{Loader, NeuralNetwork};

pub const PALM_DETECTION: &str = "palm_detection_lite.onnx";
pub const HAND_LANDMARK: &str = "hand_landmark_lite.onnx";
pub const FACE_DETECTION: &str = "face_detection_short_range.onnx";
pub const POSE_DETECTION: &str = "pose_detection.onnx";
pub const POSE_LANDMARK: &str = "pose_landmark_lite.onnx";

/// Every model file the crate loads.
pub const MODEL_FILES: &[&str] = &[
    PALM_DETECTION,
    HAND_LANDMARK,
    FACE_DETECTION,
    POSE_DETECTION,
    POSE_LANDMARK,
];

const MODEL_DIR_VAR: &str = "VISIONDECK_MODEL_DIR";

static DEFAULT_DIR: Lazy<PathBuf> = Lazy::new(|| match env::var_os(MODEL_DIR_VAR) {
    Some(dir) => PathBuf::from(dir),
    None => Path::new(env!("CARGO_MANIFEST_DIR")).join("3rdparty/onnx"),
});

/// The directory the networks are loaded from.
#[derive(Debug, Clone)]
pub struct ModelDir {
    path: PathBuf,
}

impl ModelDir {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    /// Uses `cli` if given, then `VISIONDECK_MODEL_DIR`, then `3rdparty/onnx` in the source tree.
    pub fn resolve(cli: Option<PathBuf>) -> Self {
        Self::new(cli.unwrap_or_else(|| DEFAULT_DIR.clone()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the path of model `name`, failing if the file doesn't exist.
    pub fn file(&self, name: &str) -> anyhow::Result<PathBuf> {
        let path = self.path.join(name);
        if !path.is_file() {
            bail!("model file '{}' not found", path.display());
        }
        Ok(path)
    }

    /// Fails with the first missing file, so a broken setup is reported before the camera opens.
    pub fn check(&self) -> anyhow::Result<()> {
        for name in MODEL_FILES {
            self.file(name)?;
        }
        Ok(())
    }

    pub fn loader(&self, name: &str) -> anyhow::Result<Loader> {
        log::debug!("loading {name} from {}", self.path.display());
        NeuralNetwork::from_path(self.file(name)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_reports_full_path() {
        let dir = ModelDir::new("/nonexistent/models");
        let err = dir.check().unwrap_err().to_string();
        assert!(
            err.contains("/nonexistent/models/palm_detection_lite.onnx"),
            "{err}"
        );
    }

    #[test]
    fn cli_path_wins() {
        let dir = ModelDir::resolve(Some("/opt/models".into()));
        assert_eq!(dir.path(), Path::new("/opt/models"));
    }

    #[test]
    fn model_names_are_onnx() {
        assert!(MODEL_FILES.iter().all(|f| f.ends_with(".onnx")));
    }
}
