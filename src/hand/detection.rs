//! Palm detection.

use nalgebra::{Rotation2, Vector2};
use once_cell::sync::Lazy;

use crate::{
    detection::{
        ssd::{extract_boxes, Anchors, LayerInfo},
        Detection, Network,
    },
    models::{ModelDir, PALM_DETECTION},
    nn::{Cnn, CnnInputShape, ColorMapper, Outputs},
};

/// The keypoints of a palm [`Detection`], by index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keypoint {
    Wrist = 0,
    IndexFingerMcp = 1,
    MiddleFingerMcp = 2,
    RingFingerMcp = 3,
    PinkyMcp = 4,
    ThumbCmc = 5,
    ThumbMcp = 6,
}

const NUM_KEYPOINTS: usize = 7;

static ANCHORS: Lazy<Anchors> =
    Lazy::new(|| Anchors::new(&[LayerInfo::new(2, 24, 24), LayerInfo::new(6, 12, 12)]));

/// The "lite" palm detection network.
///
/// This is by far the slowest network of the hand pipeline, so [`HandTracker`] only runs it
/// while it is looking for more hands.
///
/// [`HandTracker`]: super::tracking::HandTracker
#[derive(Clone)]
pub struct PalmNetwork {
    cnn: Cnn,
}

impl PalmNetwork {
    pub fn load(models: &ModelDir) -> anyhow::Result<Self> {
        let cnn = Cnn::new(
            models.loader(PALM_DETECTION)?.load()?,
            CnnInputShape::NCHW,
            ColorMapper::linear(0.0..=1.0),
        )?;
        Ok(Self { cnn })
    }
}

impl Network for PalmNetwork {
    fn cnn(&self) -> &Cnn {
        &self.cnn
    }

    fn extract(
        &self,
        outputs: &Outputs,
        threshold: f32,
        detections: &mut Vec<Detection>,
    ) -> anyhow::Result<()> {
        let start = detections.len();
        extract_boxes(
            &ANCHORS,
            self.cnn.input_resolution(),
            NUM_KEYPOINTS,
            outputs,
            threshold,
            detections,
        )?;
        for det in &mut detections[start..] {
            let angle = palm_angle(det);
            det.set_angle(angle);
        }
        Ok(())
    }
}

/// Clockwise rotation of the palm; 0 when the fingers point straight up.
fn palm_angle(det: &Detection) -> f32 {
    let wrist = det.keypoints()[Keypoint::Wrist as usize].pos();
    let finger = det.keypoints()[Keypoint::MiddleFingerMcp as usize].pos();
    Rotation2::rotation_between(&Vector2::y(), &(wrist - finger)).angle()
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_2;

    use approx::assert_relative_eq;

    use crate::{detection::Keypoint as Kp, image::Rect};

    use super::*;

    fn palm(wrist: (f32, f32), finger: (f32, f32)) -> Detection {
        let mut det = Detection::new(1.0, Rect::from_center(0.0, 0.0, 10.0, 10.0));
        det.push_keypoint(Kp::new(wrist.0, wrist.1));
        det.push_keypoint(Kp::new(0.0, 0.0));
        det.push_keypoint(Kp::new(finger.0, finger.1));
        det
    }

    #[test]
    fn anchor_count() {
        assert_eq!(ANCHORS.len(), 2016);
    }

    #[test]
    fn upright_palm_has_no_rotation() {
        assert_relative_eq!(palm_angle(&palm((0.0, 10.0), (0.0, 0.0))), 0.0);
    }

    #[test]
    fn palm_rotation_is_clockwise() {
        // Fingers pointing right, wrist on the left.
        assert_relative_eq!(
            palm_angle(&palm((0.0, 0.0), (10.0, 0.0))),
            FRAC_PI_2,
            epsilon = 1e-5
        );
        assert_relative_eq!(
            palm_angle(&palm((10.0, 0.0), (0.0, 0.0))),
            -FRAC_PI_2,
            epsilon = 1e-5
        );
    }
}
