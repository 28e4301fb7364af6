//! Multi-hand tracking.

use nalgebra::Rotation2;

use crate::{
    detection::{Detection, Detector},
    image::{AsImageView, ImageView, Rect, RotatedRect, Vec2f},
    landmark::{Estimator, LandmarkTracker},
    models::ModelDir,
    timer::Timer,
};

use super::{
    detection::PalmNetwork,
    landmark::{HandLandmarkNetwork, LandmarkResult},
};

/// Palm box size relative to the hand's ROI edge length.
const PALM_TO_HAND_SCALE: f32 = 2.6;
/// How far the ROI is moved towards the fingers, relative to the palm box height.
const PALM_TO_HAND_SHIFT: f32 = 0.5;

/// Detects hands and follows them across frames.
///
/// The palm detector only runs while fewer than `max_hands` hands are tracked. Every tracked hand
/// is then followed by running the landmark network on the ROI derived from the previous frame,
/// until the landmark network's presence score drops below the minimum tracking confidence.
pub struct HandTracker {
    detector: Detector,
    network: HandLandmarkNetwork,
    hands: Vec<TrackedHand>,
    next_hand_id: HandId,
    max_hands: usize,
    tracking_conf: f32,
    iou_thresh: f32,
    t_track: Timer,
}

impl HandTracker {
    pub const DEFAULT_MAX_HANDS: usize = 2;
    pub const DEFAULT_DETECTION_CONFIDENCE: f32 = 0.7;
    pub const DEFAULT_TRACKING_CONFIDENCE: f32 = 0.7;
    pub const DEFAULT_IOU_THRESH: f32 = 0.3;

    pub fn load(models: &ModelDir) -> anyhow::Result<Self> {
        Ok(Self::new(
            PalmNetwork::load(models)?,
            HandLandmarkNetwork::load(models)?,
        ))
    }

    pub fn new(palm: PalmNetwork, network: HandLandmarkNetwork) -> Self {
        let mut detector = Detector::new(palm);
        detector.set_threshold(Self::DEFAULT_DETECTION_CONFIDENCE);
        Self {
            detector,
            network,
            hands: Vec::new(),
            next_hand_id: HandId(0),
            max_hands: Self::DEFAULT_MAX_HANDS,
            tracking_conf: Self::DEFAULT_TRACKING_CONFIDENCE,
            iou_thresh: Self::DEFAULT_IOU_THRESH,
            t_track: Timer::new("track"),
        }
    }

    /// Sets the maximum number of hands to track at once.
    ///
    /// Hands beyond the limit are dropped, newest first.
    pub fn set_max_hands(&mut self, max_hands: usize) {
        self.max_hands = max_hands;
        self.hands.truncate(max_hands);
    }

    /// The hands found by the last call to [`HandTracker::track`], oldest first.
    pub fn hands(&self) -> impl Iterator<Item = HandData<'_>> {
        self.hands.iter().map(|hand| HandData {
            id: hand.id,
            result: &hand.result,
            view_rect: hand.view_rect,
        })
    }

    pub fn timers(&self) -> [&Timer; 4] {
        let [infer, extract, nms] = self.detector.timers();
        [infer, extract, nms, &self.t_track]
    }

    /// Updates all tracked hands with `image`, and looks for new ones if there is room.
    ///
    /// Must always be called with images of the same size.
    pub fn track<V: AsImageView>(&mut self, image: &V) -> anyhow::Result<()> {
        self.track_impl(image.as_view())
    }

    fn track_impl(&mut self, image: ImageView<'_>) -> anyhow::Result<()> {
        let guard = self.t_track.start();
        retain_tracked(&mut self.hands, |hand| {
            let tracked = hand.update(&image)?;
            if !tracked {
                log::debug!("lost track of hand {:?}", hand.id);
            }
            Ok(tracked)
        })?;
        drop(guard);

        if self.hands.len() >= self.max_hands {
            return Ok(());
        }

        let tracked = self
            .hands
            .iter()
            .filter_map(|hand| hand.tracker.roi().copied())
            .collect::<Vec<_>>();
        let detections = self.detector.detect(&image)?;
        let candidates = admit(
            &tracked,
            detections.iter().map(hand_roi),
            self.max_hands,
            self.iou_thresh,
        );

        for roi in candidates {
            let mut tracker = LandmarkTracker::new(Estimator::new(self.network.clone()));
            tracker.set_loss_threshold(self.tracking_conf);
            tracker.set_roi(roi);
            let mut hand = TrackedHand {
                id: self.next_hand_id,
                tracker,
                result: LandmarkResult::default(),
                view_rect: roi,
            };
            if hand.update(&image)? {
                log::debug!(
                    "tracking {:?} hand {:?}",
                    hand.result.handedness(),
                    hand.id
                );
                self.next_hand_id.0 += 1;
                self.hands.push(hand);
            }
        }
        Ok(())
    }
}

/// Updates every item with `update`, removing those it returns `false` for.
///
/// The remaining items keep their order.
fn retain_tracked<T>(
    items: &mut Vec<T>,
    mut update: impl FnMut(&mut T) -> anyhow::Result<bool>,
) -> anyhow::Result<()> {
    let mut i = 0;
    while i < items.len() {
        if update(&mut items[i])? {
            i += 1;
        } else {
            items.remove(i);
        }
    }
    Ok(())
}

/// Picks the hand ROIs to start tracking, in detection order.
///
/// A candidate is skipped if its IoU with an already tracked or already picked ROI is at least
/// `iou_thresh`. No more candidates are picked than there is room for next to `tracked`.
fn admit(
    tracked: &[RotatedRect],
    candidates: impl IntoIterator<Item = RotatedRect>,
    max_hands: usize,
    iou_thresh: f32,
) -> Vec<RotatedRect> {
    let room = max_hands.saturating_sub(tracked.len());
    let mut picked: Vec<RotatedRect> = Vec::with_capacity(room);
    for roi in candidates {
        if picked.len() >= room {
            break;
        }
        let overlaps = tracked
            .iter()
            .chain(&picked)
            .any(|other| other.rect().iou(roi.rect()) >= iou_thresh);
        if !overlaps {
            picked.push(roi);
        }
    }
    picked
}

struct TrackedHand {
    id: HandId,
    tracker: LandmarkTracker<LandmarkResult>,
    result: LandmarkResult,
    view_rect: RotatedRect,
}

impl TrackedHand {
    /// Returns `false` if the hand was lost.
    fn update(&mut self, image: &ImageView<'_>) -> anyhow::Result<bool> {
        match self.tracker.track(image)? {
            Some(res) => {
                self.result.clone_from(res.estimate());
                self.view_rect = res.view_rect();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// Computes the ROI of a whole hand from a palm detection.
///
/// The palm box is made square, moved towards the fingers and enlarged, so that the fingers are
/// inside the ROI no matter how far they are spread.
fn hand_roi(det: &Detection) -> RotatedRect {
    let palm = det.bounding_rect();
    let size = palm.width().max(palm.height());
    let shift = Rotation2::new(det.angle()) * Vec2f::new(0.0, -PALM_TO_HAND_SHIFT * palm.height());
    let center = palm.center() + shift;
    let rect = Rect::from_center(center.x, center.y, size, size).scale(PALM_TO_HAND_SCALE);
    RotatedRect::new(rect, det.angle())
}

/// ID of a tracked hand.
///
/// IDs are unique per [`HandTracker`] and stay the same for as long as the hand is tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HandId(u64);

/// Tracking data for one hand.
pub struct HandData<'a> {
    id: HandId,
    result: &'a LandmarkResult,
    view_rect: RotatedRect,
}

impl<'a> HandData<'a> {
    pub fn id(&self) -> HandId {
        self.id
    }

    /// Hand landmarks, in full image coordinates.
    pub fn landmark_result(&self) -> &'a LandmarkResult {
        self.result
    }

    /// The area of the image the landmarks were estimated in.
    pub fn view_rect(&self) -> RotatedRect {
        self.view_rect
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_2;

    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn upright_palm_roi_extends_upwards() {
        let det = Detection::new(0.9, Rect::from_center(100.0, 100.0, 20.0, 10.0));
        let roi = hand_roi(&det);
        assert_relative_eq!(roi.rotation_radians(), 0.0);
        assert_relative_eq!(roi.center().x, 100.0);
        assert_relative_eq!(roi.center().y, 95.0);
        assert_relative_eq!(roi.rect().width(), 52.0);
        assert_relative_eq!(roi.rect().height(), 52.0);
    }

    #[test]
    fn rotated_palm_roi_extends_towards_fingers() {
        let mut det = Detection::new(0.9, Rect::from_center(100.0, 100.0, 10.0, 10.0));
        // Fingers pointing to the right.
        det.set_angle(FRAC_PI_2);
        let roi = hand_roi(&det);
        assert_relative_eq!(roi.rotation_radians(), FRAC_PI_2);
        assert_relative_eq!(roi.center().x, 105.0, epsilon = 1e-4);
        assert_relative_eq!(roi.center().y, 100.0, epsilon = 1e-4);
    }

    #[test]
    fn roi_contains_palm() {
        let det = Detection::new(0.9, Rect::from_center(50.0, 60.0, 30.0, 30.0));
        let roi = hand_roi(&det);
        for corner in det.bounding_rect().corners() {
            assert!(roi.contains_point(corner));
        }
    }

    fn roi_at(x: f32) -> RotatedRect {
        RotatedRect::from(Rect::from_center(x, 100.0, 50.0, 50.0))
    }

    #[test]
    fn admit_respects_max_hands() {
        let candidates = [roi_at(100.0), roi_at(300.0), roi_at(500.0)];
        assert_eq!(
            admit(&[], candidates, 2, 0.3),
            [roi_at(100.0), roi_at(300.0)]
        );
        assert_eq!(admit(&[roi_at(700.0)], candidates, 2, 0.3), [roi_at(100.0)]);
        assert!(admit(&[roi_at(700.0), roi_at(900.0)], candidates, 2, 0.3).is_empty());
        let over_limit = [roi_at(700.0), roi_at(900.0), roi_at(1100.0)];
        assert!(admit(&over_limit, candidates, 2, 0.3).is_empty());
    }

    #[test]
    fn admit_suppresses_tracked_hands() {
        let tracked = [roi_at(100.0)];
        // Shifted by 10: IoU 40/60.
        assert!(admit(&tracked, [roi_at(110.0)], 2, 0.3).is_empty());
        // Shifted by 40: IoU 10/90.
        assert_eq!(admit(&tracked, [roi_at(140.0)], 2, 0.3), [roi_at(140.0)]);
        // Exactly at the threshold: IoU 20/80.
        assert!(admit(&tracked, [roi_at(130.0)], 2, 0.25).is_empty());
    }

    #[test]
    fn admit_keeps_detection_order() {
        let candidates = [roi_at(500.0), roi_at(505.0), roi_at(100.0)];
        assert_eq!(
            admit(&[], candidates, 3, 0.3),
            [roi_at(500.0), roi_at(100.0)]
        );
    }

    #[test]
    fn lost_hands_are_removed_in_order() {
        let mut hands = vec![1, 2, 3, 4, 5];
        retain_tracked(&mut hands, |h| Ok(*h % 2 == 1)).unwrap();
        assert_eq!(hands, [1, 3, 5]);

        let mut visited = Vec::new();
        let err = retain_tracked(&mut hands, |h| {
            visited.push(*h);
            if *h == 3 {
                anyhow::bail!("inference failed");
            }
            Ok(true)
        });
        assert!(err.is_err());
        assert_eq!(visited, [1, 3]);
        assert_eq!(hands, [1, 3, 5]);
    }

    #[test]
    fn hand_ids_order_by_age() {
        assert!(HandId(0) < HandId(1));
    }
}
