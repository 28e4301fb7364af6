//! Human body detection.

use once_cell::sync::Lazy;

use crate::{
    detection::{
        ssd::{extract_boxes, Anchors, LayerInfo},
        Detection, Network,
    },
    models::{ModelDir, POSE_DETECTION},
    nn::{Cnn, CnnInputShape, ColorMapper, Outputs},
};

/// The keypoints of a body [`Detection`], by index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keypoint {
    /// Midpoint between the hips.
    Hips = 0,
    /// A point whose distance from [`Keypoint::Hips`] is the radius of a circle around the body.
    FullBodyScale = 1,
    /// Midpoint between the shoulders.
    Shoulders = 2,
    /// Like [`Keypoint::FullBodyScale`], but for the upper body only.
    UpperBodyScale = 3,
}

const NUM_KEYPOINTS: usize = 4;

static ANCHORS: Lazy<Anchors> = Lazy::new(|| {
    Anchors::new(&[
        LayerInfo::new(2, 28, 28),
        LayerInfo::new(2, 14, 14),
        LayerInfo::new(6, 7, 7),
    ])
});

/// Body detection network.
///
/// The bounding box only covers the face; use the [`Keypoint`]s to find the rest of the body.
#[derive(Clone)]
pub struct PoseNetwork {
    cnn: Cnn,
}

impl PoseNetwork {
    pub fn load(models: &ModelDir) -> anyhow::Result<Self> {
        let cnn = Cnn::new(
            models.loader(POSE_DETECTION)?.load()?,
            CnnInputShape::NCHW,
            ColorMapper::linear(-1.0..=1.0),
        )?;
        Ok(Self { cnn })
    }
}

impl Network for PoseNetwork {
    fn cnn(&self) -> &Cnn {
        &self.cnn
    }

    fn extract(
        &self,
        outputs: &Outputs,
        threshold: f32,
        detections: &mut Vec<Detection>,
    ) -> anyhow::Result<()> {
        extract_boxes(
            &ANCHORS,
            self.cnn.input_resolution(),
            NUM_KEYPOINTS,
            outputs,
            threshold,
            detections,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchor_count() {
        assert_eq!(ANCHORS.len(), 2254);
    }
}
