//! Non-Maximum Suppression and Averaging.
//!
//! SSD networks report each object several times from neighboring anchors. These passes collapse
//! overlapping detections into one, either by keeping only the most confident one
//! ([`SuppressionMode::Remove`]) or by averaging them weighted by confidence
//! ([`SuppressionMode::Average`], the default, which jitters less between frames).

use std::mem;

use crate::{
    image::{Rect, Vec2f},
    iter::zip_exact,
    num::TotalF32,
};

use super::{Detection, Keypoint};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuppressionMode {
    /// Keep only the most confident of each group of overlapping detections.
    Remove,
    /// Replace each group with its confidence-weighted average.
    Average,
}

pub struct NonMaxSuppression {
    iou_thresh: f32,
    mode: SuppressionMode,
    pending: Vec<Detection>,
    group: Vec<Detection>,
}

impl Default for NonMaxSuppression {
    fn default() -> Self {
        Self::new()
    }
}

impl NonMaxSuppression {
    /// Detections whose IoU with a more confident one reaches this value are merged into it.
    pub const DEFAULT_IOU_THRESH: f32 = 0.3;

    pub fn new() -> Self {
        Self {
            iou_thresh: Self::DEFAULT_IOU_THRESH,
            mode: SuppressionMode::Average,
            pending: Vec::new(),
            group: Vec::new(),
        }
    }

    pub fn set_iou_thresh(&mut self, iou_thresh: f32) {
        self.iou_thresh = iou_thresh;
    }

    pub fn set_mode(&mut self, mode: SuppressionMode) {
        self.mode = mode;
    }

    /// Filters `detections` in place. The result is ordered by descending confidence.
    pub fn process(&mut self, detections: &mut Vec<Detection>) {
        self.pending.clear();
        self.pending.append(detections);
        // Ascending, so the most confident detection is popped first.
        self.pending.sort_unstable_by_key(|det| TotalF32(det.confidence));

        while let Some(seed) = self.pending.pop() {
            let seed_rect = seed.bounding_rect();
            let thresh = self.iou_thresh;
            let (overlapping, rest): (Vec<_>, Vec<_>) = mem::take(&mut self.pending)
                .into_iter()
                .partition(|other| seed_rect.iou(&other.bounding_rect()) >= thresh);
            self.pending = rest;

            match self.mode {
                SuppressionMode::Remove => detections.push(seed),
                SuppressionMode::Average => {
                    self.group.clear();
                    self.group.push(seed);
                    self.group.extend(overlapping);
                    detections.push(average(&self.group));
                }
            }
        }
    }
}

/// Confidence-weighted average of `group`. The first (most confident) entry's confidence is kept.
fn average(group: &[Detection]) -> Detection {
    let first = &group[0];
    let mut center = Vec2f::zeros();
    let mut size = Vec2f::zeros();
    let mut angle = 0.0;
    let mut keypoints = vec![Vec2f::zeros(); first.keypoints.len()];
    let mut total = 0.0;

    for det in group {
        let w = det.confidence;
        total += w;
        center += det.rect.center() * w;
        size += det.rect.size() * w;
        angle += det.angle * w;
        for (acc, kp) in zip_exact(&mut keypoints, &det.keypoints) {
            *acc += kp.pos() * w;
        }
    }

    if total <= 0.0 {
        return first.clone();
    }
    let (center, size) = (center / total, size / total);
    let rect = Rect::from_center(center.x, center.y, size.x, size.y);
    let mut out = Detection::new(first.confidence, rect);
    out.set_angle(angle / total);
    out.keypoints = keypoints
        .into_iter()
        .map(|p| Keypoint::new(p.x / total, p.y / total))
        .collect();
    out
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn run(nms: &mut NonMaxSuppression, dets: Vec<Detection>) -> Vec<Detection> {
        let mut dets = dets;
        nms.process(&mut dets);
        dets
    }

    #[test]
    fn remove_keeps_most_confident() {
        let mut nms = NonMaxSuppression::new();
        nms.set_mode(SuppressionMode::Remove);
        let rect = Rect::from_center(10.0, 10.0, 4.0, 4.0);
        let out = run(
            &mut nms,
            vec![
                Detection::new(0.55, rect.scale(1.2)),
                Detection::new(0.9, rect),
                Detection::new(0.7, rect.move_by([1.0, 0.0])),
            ],
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].confidence(), 0.9);
        assert_eq!(out[0].bounding_rect(), rect);
    }

    #[test]
    fn disjoint_detections_survive_in_confidence_order() {
        let mut nms = NonMaxSuppression::new();
        let out = run(
            &mut nms,
            vec![
                Detection::new(0.6, Rect::from_center(0.0, 0.0, 1.0, 1.0)),
                Detection::new(0.8, Rect::from_center(5.0, 0.0, 1.0, 1.0)),
            ],
        );
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].confidence(), 0.8);
        assert_eq!(out[1].confidence(), 0.6);
    }

    #[test]
    fn average_weights_by_confidence() {
        let mut nms = NonMaxSuppression::new();
        nms.set_iou_thresh(0.0);
        let mut a = Detection::new(0.75, Rect::from_center(0.0, 0.0, 2.0, 2.0));
        a.push_keypoint(Keypoint::new(0.0, 0.0));
        let mut b = Detection::new(0.25, Rect::from_center(4.0, 0.0, 6.0, 2.0));
        b.push_keypoint(Keypoint::new(4.0, 8.0));
        b.set_angle(1.0);

        let out = run(&mut nms, vec![b, a]);
        assert_eq!(out.len(), 1);
        let d = &out[0];
        assert_eq!(d.confidence(), 0.75);
        assert_relative_eq!(d.bounding_rect().center().x, 1.0);
        assert_relative_eq!(d.bounding_rect().width(), 3.0);
        assert_relative_eq!(d.angle(), 0.25);
        assert_relative_eq!(d.keypoints()[0].x(), 1.0);
        assert_relative_eq!(d.keypoints()[0].y(), 2.0);
    }
}
