use nalgebra::{Rotation2, Vector2};
use once_cell::sync::Lazy;

use crate::{
    detection::{
        ssd::{extract_boxes, Anchors, LayerInfo},
        Detection, Detector, Network,
    },
    image::{draw, AsImageView, AsImageViewMut, Color, ImageViewMut},
    models::{ModelDir, FACE_DETECTION},
    nn::{Cnn, CnnInputShape, ColorMapper, Outputs},
    timer::Timer,
};

/// The keypoints of a face [`Detection`], by index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keypoint {
    LeftEye = 0,
    RightEye = 1,
    NoseTip = 2,
    Mouth = 3,
    LeftEarTragion = 4,
    RightEarTragion = 5,
}

const NUM_KEYPOINTS: usize = 6;

static ANCHORS: Lazy<Anchors> =
    Lazy::new(|| Anchors::new(&[LayerInfo::new(2, 16, 16), LayerInfo::new(6, 8, 8)]));

/// The short-range face detection network.
#[derive(Clone)]
pub struct FaceNetwork {
    cnn: Cnn,
}

impl FaceNetwork {
    pub fn load(models: &ModelDir) -> anyhow::Result<Self> {
        let cnn = Cnn::new(
            models.loader(FACE_DETECTION)?.load()?,
            CnnInputShape::NCHW,
            ColorMapper::linear(-1.0..=1.0),
        )?;
        Ok(Self { cnn })
    }
}

impl Network for FaceNetwork {
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
            let angle = eye_line_angle(det);
            det.set_angle(angle);
        }
        Ok(())
    }
}

/// Clockwise rotation of the line from the left to the right eye.
fn eye_line_angle(det: &Detection) -> f32 {
    let left = det.keypoints()[Keypoint::LeftEye as usize].pos();
    let right = det.keypoints()[Keypoint::RightEye as usize].pos();
    Rotation2::rotation_between(&Vector2::x(), &(right - left)).angle()
}

/// Finds faces in whole frames.
pub struct FaceDetector {
    detector: Detector,
}

impl FaceDetector {
    pub const MIN_DETECTION_CONFIDENCE: f32 = 0.6;

    pub fn load(models: &ModelDir) -> anyhow::Result<Self> {
        let mut detector = Detector::new(FaceNetwork::load(models)?);
        detector.set_threshold(Self::MIN_DETECTION_CONFIDENCE);
        Ok(Self { detector })
    }

    pub fn detect<V: AsImageView>(&mut self, image: &V) -> anyhow::Result<&[Detection]> {
        self.detector.detect(image)
    }

    pub fn timers(&self) -> [&Timer; 3] {
        self.detector.timers()
    }
}

/// Draws the axis-aligned bounding box of a face and its keypoints.
pub fn draw_face<I: AsImageViewMut>(image: &mut I, face: &Detection) {
    draw_face_impl(&mut image.as_view_mut(), face);
}

fn draw_face_impl(image: &mut ImageViewMut<'_>, face: &Detection) {
    let rect = face.bounding_rect();
    draw::rect(image, rect).color(Color::GREEN).stroke_width(2);
    for kp in face.keypoints() {
        draw::circle(image, kp.x(), kp.y()).radius(2).color(Color::RED);
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_4;

    use approx::assert_relative_eq;

    use crate::{
        detection::Keypoint as Kp,
        image::{Image, Rect},
    };

    use super::*;

    fn face(left_eye: (f32, f32), right_eye: (f32, f32)) -> Detection {
        let mut det = Detection::new(0.75, Rect::from_center(32.0, 32.0, 20.0, 20.0));
        det.push_keypoint(Kp::new(left_eye.0, left_eye.1));
        det.push_keypoint(Kp::new(right_eye.0, right_eye.1));
        det
    }

    #[test]
    fn anchor_count() {
        assert_eq!(ANCHORS.len(), 896);
    }

    #[test]
    fn level_eyes_have_no_rotation() {
        assert_relative_eq!(eye_line_angle(&face((20.0, 30.0), (40.0, 30.0))), 0.0);
    }

    #[test]
    fn tilted_head_is_clockwise() {
        // Right eye lower than the left one: head tilted clockwise.
        let angle = eye_line_angle(&face((0.0, 0.0), (10.0, 10.0)));
        assert_relative_eq!(angle, FRAC_PI_4, epsilon = 1e-5);
    }

    #[test]
    fn draws_box_and_keypoints() {
        let mut image = Image::new(64, 64);
        draw_face(&mut image, &face((26.0, 28.0), (38.0, 28.0)));
        assert_eq!(image.get(26, 28), Color::RED);
        assert_eq!(image.get(38, 28), Color::RED);
        let left_edge = (20..=24).any(|x| image.get(x, 32) == Color::GREEN);
        assert!(left_edge);
        assert_eq!(image.get(32, 32), Color::NULL);
        // Nothing is drawn above the box.
        assert!((0..18).all(|y| (0..64).all(|x| image.get(x, y) == Color::NULL)));
    }
}
