//! Hand landmark estimation.

use nalgebra::{Rotation2, Vector2};

use crate::{
    image::{draw, AsImageViewMut, Color, ImageViewMut, Vec2f},
    landmark::{Confidence, Estimate, Landmark, Landmarks, Network},
    models::{ModelDir, HAND_LANDMARK},
    nn::{Cnn, CnnInputShape, ColorMapper, Outputs},
    resolution::Resolution,
};

/// Number of landmarks estimated per hand.
pub const NUM_LANDMARKS: usize = 21;

/// Landmarks of one hand, estimated by [`HandLandmarkNetwork`].
#[derive(Debug, Clone)]
pub struct LandmarkResult {
    landmarks: Landmarks,
    presence: f32,
    raw_handedness: f32,
}

impl Default for LandmarkResult {
    fn default() -> Self {
        Self {
            landmarks: Landmarks::new(NUM_LANDMARKS),
            presence: 0.0,
            raw_handedness: 0.0,
        }
    }
}

impl LandmarkResult {
    #[inline]
    pub fn position(&self, index: LandmarkIdx) -> Vec2f {
        self.landmarks.get(index as usize).pos()
    }

    pub fn positions(&self) -> impl Iterator<Item = Vec2f> + '_ {
        self.landmarks.iter().map(|lm| lm.pos())
    }

    /// Returns the landmark positions divided by the size of the image they were estimated in,
    /// so that `(0, 0)` is the top left and `(1, 1)` the bottom right corner of the image.
    pub fn normalized_positions(&self, res: Resolution) -> [Vec2f; NUM_LANDMARKS] {
        let (w, h) = (res.width() as f32, res.height() as f32);
        std::array::from_fn(|i| {
            let p = self.landmarks.get(i).pos();
            Vec2f::new(p.x / w, p.y / h)
        })
    }

    /// Clockwise rotation of the hand compared to an upright position (fingers pointing up).
    pub fn rotation_radians(&self) -> f32 {
        let finger = self.position(LandmarkIdx::MiddleFingerMcp);
        let wrist = self.position(LandmarkIdx::Wrist);
        Rotation2::rotation_between(&Vector2::y(), &(wrist - finger)).angle()
    }

    /// Which hand this is, assuming a mirrored (selfie) image.
    ///
    /// Only meaningful while the presence is high.
    pub fn handedness(&self) -> Handedness {
        if self.raw_handedness > 0.5 {
            Handedness::Right
        } else {
            Handedness::Left
        }
    }

    /// Draws the hand skeleton: the connections and a dot on every landmark.
    pub fn draw<I: AsImageViewMut>(&self, target: &mut I) {
        self.draw_impl(&mut target.as_view_mut());
    }

    fn draw_impl(&self, target: &mut ImageViewMut<'_>) {
        for &(a, b) in CONNECTIVITY {
            let (a, b) = (self.position(a), self.position(b));
            draw::line(target, a.x, a.y, b.x, b.y)
                .color(Color::WHITE)
                .stroke_width(2);
        }
        for p in self.positions() {
            draw::circle(target, p.x, p.y).radius(3).color(Color::RED);
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

    fn angle_radians(&self) -> Option<f32> {
        Some(self.rotation_radians())
    }
}

impl Confidence for LandmarkResult {
    fn confidence(&self) -> f32 {
        self.presence
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handedness {
    Left,
    Right,
}

/// Names of the hand landmarks, in network output order.
///
/// - **CMC**: carpometacarpal joint, the lowest joint of the thumb.
/// - **MCP**: metacarpophalangeal joint, the knuckles.
/// - **PIP**: proximal interphalangeal joint, above the MCP.
/// - **DIP**: distal interphalangeal joint, the highest joint of a finger.
/// - **Tip**: the tip of the finger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LandmarkIdx {
    Wrist,
    ThumbCmc,
    ThumbMcp,
    ThumbIp,
    ThumbTip,
    IndexFingerMcp,
    IndexFingerPip,
    IndexFingerDip,
    IndexFingerTip,
    MiddleFingerMcp,
    MiddleFingerPip,
    MiddleFingerDip,
    MiddleFingerTip,
    RingFingerMcp,
    RingFingerPip,
    RingFingerDip,
    RingFingerTip,
    PinkyMcp,
    PinkyPip,
    PinkyDip,
    PinkyTip,
}

/// Pairs of landmarks that are connected by a bone (or by the palm outline).
pub const CONNECTIVITY: &[(LandmarkIdx, LandmarkIdx)] = {
    use LandmarkIdx::*;
    &[
        // Palm
        (Wrist, ThumbCmc),
        (Wrist, IndexFingerMcp),
        (IndexFingerMcp, MiddleFingerMcp),
        (MiddleFingerMcp, RingFingerMcp),
        (RingFingerMcp, PinkyMcp),
        (Wrist, PinkyMcp),
        // Thumb
        (ThumbCmc, ThumbMcp),
        (ThumbMcp, ThumbIp),
        (ThumbIp, ThumbTip),
        // Index
        (IndexFingerMcp, IndexFingerPip),
        (IndexFingerPip, IndexFingerDip),
        (IndexFingerDip, IndexFingerTip),
        // Middle
        (MiddleFingerMcp, MiddleFingerPip),
        (MiddleFingerPip, MiddleFingerDip),
        (MiddleFingerDip, MiddleFingerTip),
        // Ring
        (RingFingerMcp, RingFingerPip),
        (RingFingerPip, RingFingerDip),
        (RingFingerDip, RingFingerTip),
        // Pinky
        (PinkyMcp, PinkyPip),
        (PinkyPip, PinkyDip),
        (PinkyDip, PinkyTip),
    ]
};

/// The "lite" hand landmark network.
///
/// Cloning is cheap and shares the loaded model.
#[derive(Clone)]
pub struct HandLandmarkNetwork {
    cnn: Cnn,
}

impl HandLandmarkNetwork {
    pub fn load(models: &ModelDir) -> anyhow::Result<Self> {
        let cnn = Cnn::new(
            models.loader(HAND_LANDMARK)?.load()?,
            CnnInputShape::NCHW,
            ColorMapper::linear(0.0..=1.0),
        )?;
        Ok(Self { cnn })
    }
}

impl Network for HandLandmarkNetwork {
    type Output = LandmarkResult;

    fn cnn(&self) -> &Cnn {
        &self.cnn
    }

    fn extract(&self, outputs: &Outputs, estimate: &mut LandmarkResult) -> anyhow::Result<()> {
        extract(outputs, estimate)
    }
}

/// Outputs: screen landmarks `[1, 63]`, presence `[1, 1]`, handedness `[1, 1]` and metric
/// (world) landmarks `[1, 63]`, which are unused.
fn extract(outputs: &Outputs, estimate: &mut LandmarkResult) -> anyhow::Result<()> {
    let screen = outputs.checked(0, &[1, NUM_LANDMARKS * 3])?;
    let presence = outputs.checked(1, &[1, 1])?;
    let handedness = outputs.checked(2, &[1, 1])?;

    estimate.presence = presence.index([0, 0]).as_singular();
    estimate.raw_handedness = handedness.index([0, 0]).as_singular();
    for (i, xyz) in screen.index([0]).as_slice().chunks_exact(3).enumerate() {
        estimate
            .landmarks
            .set(i, Landmark::new(xyz[0], xyz[1], xyz[2]));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use crate::{image::Image, nn::tensor::Tensor};

    use super::*;

    fn outputs(presence: f32, handedness: f32) -> Outputs {
        let screen = Tensor::from_array_shape_fn([1, 63], |[_, i]| i as f32);
        [
            screen,
            Tensor::from_iter(&[1, 1], [presence]),
            Tensor::from_iter(&[1, 1], [handedness]),
            Tensor::from_array_shape_fn([1, 63], |_| 0.0),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn extracts_landmarks_and_scores() {
        let mut result = LandmarkResult::default();
        extract(&outputs(0.9, 0.8), &mut result).unwrap();
        assert_relative_eq!(result.confidence(), 0.9);
        assert_eq!(result.handedness(), Handedness::Right);

        let tip = result.landmarks().get(LandmarkIdx::PinkyTip as usize);
        assert_relative_eq!(tip.x(), 60.0);
        assert_relative_eq!(tip.y(), 61.0);
        assert_relative_eq!(tip.z(), 62.0);

        extract(&outputs(0.1, 0.2), &mut result).unwrap();
        assert_eq!(result.handedness(), Handedness::Left);
    }

    #[test]
    fn rejects_wrong_output_shape() {
        let bad: Outputs = [Tensor::from_array_shape_fn([1, 42], |_| 0.0)]
            .into_iter()
            .collect();
        assert!(extract(&bad, &mut LandmarkResult::default()).is_err());
    }

    #[test]
    fn normalized_positions_divide_by_resolution() {
        let mut result = LandmarkResult::default();
        result
            .landmarks_mut()
            .set(8, Landmark::new(320.0, 120.0, 0.0));
        let norm = result.normalized_positions(Resolution::new(640, 480));
        assert_relative_eq!(norm[8].x, 0.5);
        assert_relative_eq!(norm[8].y, 0.25);
        assert_relative_eq!(norm[0].x, 0.0);
    }

    #[test]
    fn connectivity_covers_all_landmarks() {
        let mut seen = [false; NUM_LANDMARKS];
        for &(a, b) in CONNECTIVITY {
            seen[a as usize] = true;
            seen[b as usize] = true;
        }
        assert!(seen.iter().all(|&s| s));
        assert_eq!(CONNECTIVITY.len(), 21);
    }

    #[test]
    fn draws_onto_image() {
        let mut result = LandmarkResult::default();
        for i in 0..NUM_LANDMARKS {
            let (x, y) = (10.0 + i as f32 * 2.0, 40.0 - i as f32);
            result.landmarks_mut().set(i, Landmark::new(x, y, 0.0));
        }
        let mut image = Image::new(64, 64);
        result.draw(&mut image);
        assert_eq!(image.get(10, 40), Color::RED);
        // Only the skeleton is drawn.
        let colors = (0..64).flat_map(|y| (0..64).map(move |x| (x, y)));
        for (x, y) in colors {
            let c = image.get(x, y);
            assert!([Color::NULL, Color::WHITE, Color::RED].contains(&c), "{x},{y}: {c:?}");
        }
    }
}
