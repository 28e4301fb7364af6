//! Body pose landmark estimation.

use crate::{
    image::{draw, AsImageViewMut, Color, ImageViewMut, Vec2f},
    landmark::{Confidence, Estimate, Landmark, Landmarks, Network},
    models::{ModelDir, POSE_LANDMARK},
    nn::{Cnn, CnnInputShape, ColorMapper, Outputs},
    num::sigmoid,
};

pub const NUM_POSE_LANDMARKS: usize = 33;
pub const NUM_AUX_LANDMARKS: usize = 6;
const NUM_LANDMARKS: usize = NUM_POSE_LANDMARKS + NUM_AUX_LANDMARKS;

/// Landmarks below this visibility are not drawn.
const MIN_VISIBILITY: f32 = 0.5;

/// Landmarks estimated by [`PoseLandmarkNetwork`].
///
/// The first 33 landmarks are named by [`LandmarkIdx`]. The remaining 6 auxiliary landmarks
/// are used by the network for ROI tracking.
#[derive(Debug, Clone)]
pub struct LandmarkResult {
    pose_presence: f32,
    landmarks: Landmarks,
}

impl Default for LandmarkResult {
    fn default() -> Self {
        Self {
            pose_presence: 0.0,
            landmarks: Landmarks::new(NUM_LANDMARKS),
        }
    }
}

impl Estimate for LandmarkResult {
    fn landmarks(&self) -> &Landmarks {
        &self.landmarks
    }

    fn landmarks_mut(&mut self) -> &mut Landmarks {
        &mut self.landmarks
    }
}

impl Confidence for LandmarkResult {
    #[inline]
    fn confidence(&self) -> f32 {
        self.pose_presence
    }
}

impl LandmarkResult {
    pub fn pose_landmarks(&self) -> impl Iterator<Item = &Landmark> + '_ {
        self.landmarks.iter().take(NUM_POSE_LANDMARKS)
    }

    pub fn aux_landmarks(&self) -> impl Iterator<Item = &Landmark> + '_ {
        self.landmarks.iter().skip(NUM_POSE_LANDMARKS)
    }

    #[inline]
    pub fn get(&self, idx: LandmarkIdx) -> &Landmark {
        self.landmarks.get(idx as usize)
    }

    #[inline]
    pub fn presence(&self) -> f32 {
        self.pose_presence
    }

    /// Draws the skeleton of the visible parts of the body.
    pub fn draw<I: AsImageViewMut>(&self, target: &mut I) {
        self.draw_impl(&mut target.as_view_mut());
    }

    fn draw_impl(&self, target: &mut ImageViewMut<'_>) {
        let visible = |lm: &Landmark| lm.visibility().unwrap_or(1.0) >= MIN_VISIBILITY;

        for &(a, b) in POSE_CONNECTIONS {
            let (a, b) = (self.get(a), self.get(b));
            if visible(a) && visible(b) {
                draw::line(target, a.x(), a.y(), b.x(), b.y())
                    .color(Color::WHITE)
                    .stroke_width(2);
            }
        }
        for lm in self.pose_landmarks().filter(|lm| visible(lm)) {
            draw::circle(target, lm.x(), lm.y()).radius(3).color(Color::RED);
        }
    }

    /// Midpoint between the hips.
    pub fn hip_center(&self) -> Vec2f {
        (self.get(LandmarkIdx::LeftHip).pos() + self.get(LandmarkIdx::RightHip).pos()) * 0.5
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LandmarkIdx {
    Nose = 0,
    LeftEyeInner = 1,
    LeftEye = 2,
    LeftEyeOuter = 3,
    RightEyeInner = 4,
    RightEye = 5,
    RightEyeOuter = 6,
    LeftEar = 7,
    RightEar = 8,
    MouthLeft = 9,
    MouthRight = 10,
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftElbow = 13,
    RightElbow = 14,
    LeftWrist = 15,
    RightWrist = 16,
    LeftPinky = 17,
    RightPinky = 18,
    LeftIndex = 19,
    RightIndex = 20,
    LeftThumb = 21,
    RightThumb = 22,
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
    LeftAnkle = 27,
    RightAnkle = 28,
    LeftHeel = 29,
    RightHeel = 30,
    LeftFootIndex = 31,
    RightFootIndex = 32,
}

/// The skeleton connecting the pose landmarks.
pub const POSE_CONNECTIONS: &[(LandmarkIdx, LandmarkIdx)] = {
    use LandmarkIdx::*;
    &[
        // Face
        (Nose, RightEyeInner),
        (RightEyeInner, RightEye),
        (RightEye, RightEyeOuter),
        (RightEyeOuter, RightEar),
        (Nose, LeftEyeInner),
        (LeftEyeInner, LeftEye),
        (LeftEye, LeftEyeOuter),
        (LeftEyeOuter, LeftEar),
        (MouthRight, MouthLeft),
        // Torso
        (RightShoulder, LeftShoulder),
        (RightShoulder, RightHip),
        (LeftShoulder, LeftHip),
        (RightHip, LeftHip),
        // Arms
        (RightShoulder, RightElbow),
        (RightElbow, RightWrist),
        (RightWrist, RightPinky),
        (RightWrist, RightIndex),
        (RightWrist, RightThumb),
        (RightPinky, RightIndex),
        (LeftShoulder, LeftElbow),
        (LeftElbow, LeftWrist),
        (LeftWrist, LeftPinky),
        (LeftWrist, LeftIndex),
        (LeftWrist, LeftThumb),
        (LeftPinky, LeftIndex),
        // Legs
        (RightHip, RightKnee),
        (RightKnee, RightAnkle),
        (RightAnkle, RightHeel),
        (RightHeel, RightFootIndex),
        (RightAnkle, RightFootIndex),
        (LeftHip, LeftKnee),
        (LeftKnee, LeftAnkle),
        (LeftAnkle, LeftHeel),
        (LeftHeel, LeftFootIndex),
        (LeftAnkle, LeftFootIndex),
    ]
};

/// The "lite" pose landmark network.
#[derive(Clone)]
pub struct PoseLandmarkNetwork {
    cnn: Cnn,
}

impl PoseLandmarkNetwork {
    pub fn load(models: &ModelDir) -> anyhow::Result<Self> {
        // Segmentation, heatmap and world landmarks are never used.
        let nn = models
            .loader(POSE_LANDMARK)?
            .with_output_selection([0, 1])
            .load()?;
        let cnn = Cnn::new(nn, CnnInputShape::NCHW, ColorMapper::linear(0.0..=1.0))?;
        Ok(Self { cnn })
    }
}

impl Network for PoseLandmarkNetwork {
    type Output = LandmarkResult;

    fn cnn(&self) -> &Cnn {
        &self.cnn
    }

    fn extract(&self, outputs: &Outputs, estimate: &mut LandmarkResult) -> anyhow::Result<()> {
        extract(outputs, estimate)
    }
}

/// Output 0 holds `x, y, z, visibility, presence` for every landmark, output 1 the pose flag.
fn extract(outputs: &Outputs, estimate: &mut LandmarkResult) -> anyhow::Result<()> {
    let screen = outputs.checked(0, &[1, NUM_LANDMARKS * 5])?;
    let pose_flag = outputs.checked(1, &[1, 1])?;

    estimate.pose_presence = pose_flag.index([0, 0]).as_singular();
    for (i, v) in screen.index([0]).as_slice().chunks_exact(5).enumerate() {
        estimate.landmarks.set(
            i,
            Landmark::new(v[0], v[1], v[2])
                .with_visibility(sigmoid(v[3]))
                .with_presence(sigmoid(v[4])),
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use crate::{image::Image, nn::tensor::Tensor};

    use super::*;

    fn outputs(visibility_logit: f32) -> Outputs {
        let screen = Tensor::from_array_shape_fn([1, NUM_LANDMARKS * 5], |[_, i]| {
            let (lm, field) = (i / 5, i % 5);
            match field {
                0 => 10.0 + lm as f32,
                1 => 20.0 + lm as f32,
                2 => 0.0,
                _ => visibility_logit,
            }
        });
        [screen, Tensor::from_iter(&[1, 1], [0.95])]
            .into_iter()
            .collect()
    }

    #[test]
    fn extracts_scores_through_sigmoid() {
        let mut result = LandmarkResult::default();
        extract(&outputs(0.0), &mut result).unwrap();
        assert_relative_eq!(result.confidence(), 0.95);

        let hip = result.get(LandmarkIdx::LeftHip);
        assert_relative_eq!(hip.x(), 33.0);
        assert_relative_eq!(hip.y(), 43.0);
        assert_relative_eq!(hip.visibility().unwrap(), 0.5);
        assert_relative_eq!(hip.presence().unwrap(), 0.5);

        assert_eq!(result.pose_landmarks().count(), 33);
        assert_eq!(result.aux_landmarks().count(), 6);
        assert_relative_eq!(result.hip_center().x, 33.5);
    }

    #[test]
    fn invisible_landmarks_are_not_drawn() {
        let mut result = LandmarkResult::default();
        extract(&outputs(-10.0), &mut result).unwrap();
        let mut image = Image::new(64, 64);
        result.draw(&mut image);
        assert!(image.as_rgba8().pixels().all(|p| p.0 == [0; 4]));

        extract(&outputs(10.0), &mut result).unwrap();
        result.draw(&mut image);
        assert_eq!(image.get(10, 20), Color::RED);
    }

    #[test]
    fn connections_reference_pose_landmarks() {
        assert_eq!(POSE_CONNECTIONS.len(), 35);
        for &(a, b) in POSE_CONNECTIONS {
            assert!((a as usize) < NUM_POSE_LANDMARKS);
            assert!((b as usize) < NUM_POSE_LANDMARKS);
        }
    }
}
