//! Object detection with SSD-style networks.
//!
//! A [`Detector`] runs a [`Network`] on a whole image, extracts candidate [`Detection`]s from the
//! raw outputs, merges duplicates with [`NonMaxSuppression`] and maps the results back into the
//! image's coordinate system.

pub mod nms;
pub mod ssd;

use crate::{
    image::{AsImageView, ImageView, Rect, Vec2f},
    nn::{Cnn, Outputs},
    timer::Timer,
};

use self::nms::NonMaxSuppression;

/// A neural network that detects objects in an image.
pub trait Network: Send + 'static {
    fn cnn(&self) -> &Cnn;

    /// Appends every detection with a confidence of at least `threshold` to `detections`.
    ///
    /// Positions are in the coordinate system of the network input, in pixels.
    fn extract(
        &self,
        outputs: &Outputs,
        threshold: f32,
        detections: &mut Vec<Detection>,
    ) -> anyhow::Result<()>;
}

pub struct Detector {
    network: Box<dyn Network>,
    detections: Vec<Detection>,
    threshold: f32,
    nms: NonMaxSuppression,
    t_infer: Timer,
    t_extract: Timer,
    t_nms: Timer,
}

impl Detector {
    pub const DEFAULT_THRESHOLD: f32 = 0.5;

    pub fn new<N: Network>(network: N) -> Self {
        Self {
            network: Box::new(network),
            detections: Vec::new(),
            threshold: Self::DEFAULT_THRESHOLD,
            nms: NonMaxSuppression::new(),
            t_infer: Timer::new("infer"),
            t_extract: Timer::new("extract"),
            t_nms: Timer::new("nms"),
        }
    }

    /// Sets the minimum confidence a detection needs to be reported.
    pub fn set_threshold(&mut self, threshold: f32) {
        self.threshold = threshold;
    }

    /// Detects objects in `image`, most confident first.
    pub fn detect<V: AsImageView>(&mut self, image: &V) -> anyhow::Result<&[Detection]> {
        self.detect_impl(image.as_view())
    }

    fn detect_impl(&mut self, image: ImageView<'_>) -> anyhow::Result<&[Detection]> {
        self.detections.clear();

        let cnn = self.network.cnn();
        let input_res = cnn.input_resolution();
        let Some(ratio) = input_res.aspect_ratio() else {
            anyhow::bail!("network has an empty input resolution {input_res}");
        };

        // Pad the image to the network's aspect ratio with an oversized view; the area outside
        // of the image reads as black.
        let rect = image.rect().grow_to_fit_aspect(ratio);
        let view = image.view(rect);
        let outputs = self.t_infer.time(|| cnn.estimate(&view))?;
        log::trace!("detector outputs: {outputs:?}");

        let (network, threshold) = (&self.network, self.threshold);
        let detections = &mut self.detections;
        self.t_extract
            .time(|| network.extract(&outputs, threshold, detections))?;
        let nms = &mut self.nms;
        self.t_nms.time(|| nms.process(detections));

        let scale = rect.width() / input_res.width() as f32;
        let offset = rect.top_left();
        for det in detections.iter_mut() {
            det.map_positions(|p| p * scale + offset);
        }

        Ok(&self.detections)
    }

    pub fn timers(&self) -> [&Timer; 3] {
        [&self.t_infer, &self.t_extract, &self.t_nms]
    }
}

/// A detected object: a bounding box, a confidence in `0.0..=1.0`, a clockwise rotation angle
/// (0 if the network doesn't estimate one) and network-specific keypoints.
#[derive(Debug, Clone)]
pub struct Detection {
    confidence: f32,
    angle: f32,
    rect: Rect,
    keypoints: Vec<Keypoint>,
}

impl Detection {
    pub fn new(confidence: f32, rect: Rect) -> Self {
        Self {
            confidence,
            angle: 0.0,
            rect,
            keypoints: Vec::new(),
        }
    }

    pub fn push_keypoint(&mut self, keypoint: Keypoint) {
        self.keypoints.push(keypoint);
    }

    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    /// Clockwise rotation of the object, in radians.
    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn set_angle(&mut self, angle: f32) {
        self.angle = angle;
    }

    pub fn bounding_rect(&self) -> Rect {
        self.rect
    }

    pub fn keypoints(&self) -> &[Keypoint] {
        &self.keypoints
    }

    fn map_positions(&mut self, f: impl Fn(Vec2f) -> Vec2f) {
        let center = f(self.rect.center());
        let size = f(self.rect.center() + self.rect.size()) - center;
        self.rect = Rect::from_center(center.x, center.y, size.x, size.y);
        for kp in &mut self.keypoints {
            let p = f(kp.pos());
            *kp = Keypoint::new(p.x, p.y);
        }
    }
}

/// A point of interest reported alongside a [`Detection`], such as an eye or a wrist.
///
/// What each keypoint means depends on the network and on its index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keypoint {
    x: f32,
    y: f32,
}

impl Keypoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn pos(&self) -> Vec2f {
        Vec2f::new(self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_positions_scales_and_offsets() {
        let mut det = Detection::new(0.9, Rect::from_center(10.0, 10.0, 4.0, 2.0));
        det.push_keypoint(Keypoint::new(8.0, 9.0));
        det.map_positions(|p| p * 2.0 + Vec2f::new(-5.0, 3.0));
        assert_eq!(det.bounding_rect(), Rect::from_center(15.0, 23.0, 8.0, 4.0));
        assert_eq!(det.keypoints(), &[Keypoint::new(11.0, 21.0)]);
    }
}
