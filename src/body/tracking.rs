//! Single-body pose tracking.

use crate::{
    detection::{Detection, Detector},
    image::{AsImageView, ImageView, Rect},
    landmark::{Estimator, LandmarkTracker},
    models::ModelDir,
    num::TotalF32,
    timer::Timer,
};

use super::{
    detection::{Keypoint, PoseNetwork},
    landmark::{LandmarkResult, PoseLandmarkNetwork},
};

/// Follows the pose of one body.
///
/// While no body is tracked, every frame runs the pose detector and seeds the landmark tracker
/// with the most confident detection.
pub struct PoseTracker {
    detector: Detector,
    tracker: LandmarkTracker<LandmarkResult>,
}

impl PoseTracker {
    pub const MIN_DETECTION_CONFIDENCE: f32 = 0.6;
    pub const MIN_TRACKING_CONFIDENCE: f32 = 0.6;
    pub const ROI_PADDING: f32 = 0.15;

    pub fn load(models: &ModelDir) -> anyhow::Result<Self> {
        Ok(Self::new(
            PoseNetwork::load(models)?,
            PoseLandmarkNetwork::load(models)?,
        ))
    }

    pub fn new(detector: PoseNetwork, landmarks: PoseLandmarkNetwork) -> Self {
        let mut detector = Detector::new(detector);
        detector.set_threshold(Self::MIN_DETECTION_CONFIDENCE);
        let mut tracker = LandmarkTracker::new(Estimator::new(landmarks));
        tracker.set_roi_padding(Self::ROI_PADDING);
        tracker.set_loss_threshold(Self::MIN_TRACKING_CONFIDENCE);
        Self { detector, tracker }
    }

    pub fn timers(&self) -> impl Iterator<Item = &Timer> + '_ {
        self.detector
            .timers()
            .into_iter()
            .chain(self.tracker.timers())
    }

    /// Estimates the pose in `image`.
    ///
    /// Returns `None` if there is no body in the image. The landmarks are in `image` coordinates.
    pub fn track<V: AsImageView>(&mut self, image: &V) -> anyhow::Result<Option<&LandmarkResult>> {
        self.track_impl(image.as_view())
    }

    fn track_impl(&mut self, image: ImageView<'_>) -> anyhow::Result<Option<&LandmarkResult>> {
        if self.tracker.roi().is_none() {
            let detections = self.detector.detect(&image)?;
            let Some(best) = detections
                .iter()
                .max_by_key(|det| TotalF32(det.confidence()))
            else {
                return Ok(None);
            };
            let roi = body_roi(best);
            log::debug!("found body with confidence {:.2}, roi {roi:?}", best.confidence());
            self.tracker.set_roi(roi);
        }

        Ok(self.tracker.track(&image)?.map(|res| res.estimate()))
    }
}

/// The bounding box of the detection keypoints, centered on the hips and padded.
fn body_roi(det: &Detection) -> Rect {
    let hips = det.keypoints()[Keypoint::Hips as usize];
    let bounds = Rect::bounding(det.keypoints().iter().map(|kp| kp.pos()))
        .unwrap_or_else(|| det.bounding_rect());
    bounds
        .grow_move_center(hips.x(), hips.y())
        .grow_rel(PoseTracker::ROI_PADDING)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use crate::detection::Keypoint as Kp;

    use super::*;

    #[test]
    fn roi_is_centered_on_hips() {
        let mut det = Detection::new(0.9, Rect::from_center(50.0, 20.0, 10.0, 10.0));
        det.push_keypoint(Kp::new(50.0, 100.0));
        det.push_keypoint(Kp::new(50.0, 20.0));
        det.push_keypoint(Kp::new(50.0, 60.0));
        det.push_keypoint(Kp::new(70.0, 60.0));

        let roi = body_roi(&det);
        assert_relative_eq!(roi.center().x, 50.0);
        assert_relative_eq!(roi.center().y, 100.0);
        // Grown to reach y = 20 from the hips, then padded.
        assert_relative_eq!(roi.height(), 160.0 * 1.3, epsilon = 1e-3);
        for kp in det.keypoints() {
            assert!(roi.contains_point(kp.pos()));
        }
    }
}
