//! Anchor generation for Single Shot MultiBox Detectors (SSDs).
//!
//! Only covers what the bundled detectors need: one anchor per box with its center at the
//! middle of a feature map cell, and sizes fixed to 1 (so box sizes are absolute).

use std::ops::Index;

use crate::{
    image::{Rect, Vec2f},
    nn::Outputs,
    num::sigmoid,
    resolution::Resolution,
};

use super::{Detection, Keypoint};

/// One output feature map of an SSD network.
#[derive(Debug, Clone, Copy)]
pub struct LayerInfo {
    boxes_per_cell: u32,
    width: u32,
    height: u32,
}

impl LayerInfo {
    /// `boxes_per_cell` anchors are placed in each cell of a `width x height` feature map.
    pub const fn new(boxes_per_cell: u32, width: u32, height: u32) -> Self {
        assert!(boxes_per_cell != 0);
        Self {
            boxes_per_cell,
            width,
            height,
        }
    }
}

/// Anchor centers, normalized to `0.0..=1.0`, in network output order.
#[derive(Debug, Clone)]
pub struct Anchors {
    centers: Vec<Vec2f>,
}

impl Anchors {
    pub fn new(layers: &[LayerInfo]) -> Self {
        let mut centers = Vec::new();
        for layer in layers {
            let (w, h) = (layer.width as f32, layer.height as f32);
            for y in 0..layer.height {
                for x in 0..layer.width {
                    let center = Vec2f::new((x as f32 + 0.5) / w, (y as f32 + 0.5) / h);
                    centers.extend((0..layer.boxes_per_cell).map(|_| center));
                }
            }
        }
        Self { centers }
    }

    pub fn len(&self) -> usize {
        self.centers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.centers.is_empty()
    }
}

/// Decodes the two outputs shared by the bundled SSD detectors.
///
/// Output 0 holds box regressors of shape `[1, anchors, 4 + 2 * keypoints]`: box center offset
/// and size, then keypoint offsets, all in input pixels relative to the anchor. Output 1 holds
/// one score logit per anchor (`[1, anchors, 1]`).
pub fn extract_boxes(
    anchors: &Anchors,
    input_res: Resolution,
    keypoints: usize,
    outputs: &Outputs,
    threshold: f32,
    detections: &mut Vec<Detection>,
) -> anyhow::Result<()> {
    let params = 4 + 2 * keypoints;
    let boxes = outputs.checked(0, &[1, anchors.len(), params])?;
    let scores = outputs.checked(1, &[1, anchors.len(), 1])?;
    let size = Vec2f::new(input_res.width() as f32, input_res.height() as f32);

    for (index, score) in scores.index([0]).iter().enumerate() {
        let confidence = sigmoid(score.as_slice()[0]);
        if confidence < threshold {
            continue;
        }

        let origin = anchors[index].component_mul(&size);
        let p = boxes.index([0, index]).as_slice();
        let rect = Rect::from_center(p[0] + origin.x, p[1] + origin.y, p[2], p[3]);
        let mut det = Detection::new(confidence, rect);
        for kp in p[4..].chunks_exact(2) {
            det.push_keypoint(Keypoint::new(kp[0] + origin.x, kp[1] + origin.y));
        }
        detections.push(det);
    }
    Ok(())
}

impl Index<usize> for Anchors {
    type Output = Vec2f;

    fn index(&self, index: usize) -> &Vec2f {
        &self.centers[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchor_counts_match_networks() {
        let palm = Anchors::new(&[LayerInfo::new(2, 24, 24), LayerInfo::new(6, 12, 12)]);
        assert_eq!(palm.len(), 2016);

        let face = Anchors::new(&[LayerInfo::new(2, 16, 16), LayerInfo::new(6, 8, 8)]);
        assert_eq!(face.len(), 896);

        let pose = Anchors::new(&[
            LayerInfo::new(2, 28, 28),
            LayerInfo::new(2, 14, 14),
            LayerInfo::new(6, 7, 7),
        ]);
        assert_eq!(pose.len(), 2254);
    }

    #[test]
    fn extracts_boxes_above_threshold() {
        use crate::nn::tensor::Tensor;

        let anchors = Anchors::new(&[LayerInfo::new(1, 2, 1)]);
        let boxes = Tensor::from_iter(
            &[1, 2, 6],
            [
                1.0, 2.0, 10.0, 20.0, -1.0, -1.0, //
                0.0, 0.0, 5.0, 5.0, 0.0, 0.0,
            ],
        );
        let scores = Tensor::from_iter(&[1, 2, 1], [3.0, -3.0]);
        let outputs: Outputs = [boxes, scores].into_iter().collect();

        let mut dets = Vec::new();
        extract_boxes(&anchors, Resolution::new(8, 4), 1, &outputs, 0.5, &mut dets).unwrap();
        assert_eq!(dets.len(), 1);
        // First anchor sits at (0.25, 0.5) -> (2, 2) in input pixels.
        assert_eq!(dets[0].bounding_rect(), Rect::from_center(3.0, 4.0, 10.0, 20.0));
        assert_eq!(dets[0].keypoints(), &[Keypoint::new(1.0, 1.0)]);
        assert!(dets[0].confidence() > 0.9);

        let res = Resolution::new(8, 4);
        assert!(extract_boxes(&anchors, res, 2, &outputs, 0.5, &mut dets).is_err());
    }

    #[test]
    fn anchors_are_cell_centers() {
        let anchors = Anchors::new(&[LayerInfo::new(2, 2, 2), LayerInfo::new(1, 1, 1)]);
        assert_eq!(anchors.len(), 9);
        assert_eq!(anchors[0], Vec2f::new(0.25, 0.25));
        assert_eq!(anchors[1], anchors[0]);
        assert_eq!(anchors[2], Vec2f::new(0.75, 0.25));
        assert_eq!(anchors[4], Vec2f::new(0.25, 0.75));
        assert_eq!(anchors[8], Vec2f::new(0.5, 0.5));
    }
}
