//! Landmark estimation and region-of-interest tracking.
//!
//! An [`Estimator`] runs a landmark [`Network`] on an image (usually a small, rotated crop around
//! the object). A [`LandmarkTracker`] feeds the estimator a crop that follows the object from
//! frame to frame, using the landmarks of the previous frame to place the next crop.

use anyhow::bail;
use nalgebra::Vector3;

use crate::{
    image::{AsImageView, ImageView, Rect, RotatedRect, Vec2f},
    nn::{Cnn, Outputs},
    resolution::AspectRatio,
    timer::Timer,
};

/// A single estimated landmark.
///
/// `x` and `y` are in pixels of the image the estimate refers to. `z` is depth relative to the
/// object in roughly the same scale as `x`, and may be meaningless for some networks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Landmark {
    pos: Vector3<f32>,
    visibility: Option<f32>,
    presence: Option<f32>,
}

impl Landmark {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self {
            pos: Vector3::new(x, y, z),
            visibility: None,
            presence: None,
        }
    }

    /// Attaches the probability that the landmark is visible (not occluded).
    #[must_use]
    pub fn with_visibility(self, visibility: f32) -> Self {
        Self {
            visibility: Some(visibility),
            ..self
        }
    }

    /// Attaches the probability that the landmark lies inside the image.
    #[must_use]
    pub fn with_presence(self, presence: f32) -> Self {
        Self {
            presence: Some(presence),
            ..self
        }
    }

    #[inline]
    pub fn x(&self) -> f32 {
        self.pos.x
    }

    #[inline]
    pub fn y(&self) -> f32 {
        self.pos.y
    }

    #[inline]
    pub fn z(&self) -> f32 {
        self.pos.z
    }

    /// The `x`/`y` position.
    #[inline]
    pub fn pos(&self) -> Vec2f {
        self.pos.xy()
    }

    pub fn visibility(&self) -> Option<f32> {
        self.visibility
    }

    pub fn presence(&self) -> Option<f32> {
        self.presence
    }

    fn set_pos(&mut self, p: Vec2f) {
        self.pos.x = p.x;
        self.pos.y = p.y;
    }
}

/// A fixed-size list of [`Landmark`]s.
#[derive(Debug, Clone, PartialEq)]
pub struct Landmarks {
    inner: Box<[Landmark]>,
}

impl Landmarks {
    /// Creates `len` landmarks at the origin.
    pub fn new(len: usize) -> Self {
        Self {
            inner: vec![Landmark::new(0.0, 0.0, 0.0); len].into_boxed_slice(),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> &Landmark {
        &self.inner[index]
    }

    #[inline]
    pub fn set(&mut self, index: usize, landmark: Landmark) {
        self.inner[index] = landmark;
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Landmark> {
        self.inner.iter()
    }

    /// Applies `f` to the `x`/`y` position of every landmark. `z` is scaled along with `x`.
    pub fn map_positions(&mut self, f: impl Fn(Vec2f) -> Vec2f) {
        for lm in self.inner.iter_mut() {
            let before = lm.pos();
            let after = f(before);
            // Keep depth in the same units as x by measuring how far a unit step in x moves.
            let scale = (f(before + Vec2f::new(1.0, 0.0)) - after).norm();
            lm.set_pos(after);
            lm.pos.z *= scale;
        }
    }

    /// Axis-aligned bounding box of all landmark positions. [`None`] if there are no landmarks.
    pub fn bounding_rect(&self) -> Option<Rect> {
        Rect::bounding(self.iter().map(|lm| lm.pos()))
    }
}

/// Result of a landmark [`Network`].
pub trait Estimate: Send + 'static {
    fn landmarks(&self) -> &Landmarks;

    fn landmarks_mut(&mut self) -> &mut Landmarks;

    /// The object's clockwise rotation in radians, if the network's landmarks define one.
    ///
    /// [`LandmarkTracker`] uses this to rotate the next crop so the object stays upright.
    fn angle_radians(&self) -> Option<f32> {
        None
    }
}

/// Estimates that report whether the object is still in view.
pub trait Confidence {
    /// In `0.0..=1.0`. [`LandmarkTracker`] drops the object when this falls below its threshold.
    fn confidence(&self) -> f32;
}

/// A neural network that estimates landmarks.
pub trait Network: Send + 'static {
    type Output: Estimate;

    fn cnn(&self) -> &Cnn;

    /// Writes the network results to `estimate`, in pixels of the network input.
    fn extract(&self, outputs: &Outputs, estimate: &mut Self::Output) -> anyhow::Result<()>;
}

pub struct Estimator<E: Estimate> {
    network: Box<dyn Network<Output = E>>,
    estimate: E,
    t_infer: Timer,
    t_extract: Timer,
}

impl<E: Estimate + Default> Estimator<E> {
    pub fn new<N: Network<Output = E>>(network: N) -> Self {
        Self {
            network: Box::new(network),
            estimate: E::default(),
            t_infer: Timer::new("infer"),
            t_extract: Timer::new("extract"),
        }
    }
}

impl<E: Estimate> Estimator<E> {
    fn aspect_ratio(&self) -> anyhow::Result<AspectRatio> {
        let res = self.network.cnn().input_resolution();
        match res.aspect_ratio() {
            Some(ratio) => Ok(ratio),
            None => bail!("landmark network has an empty input resolution {res}"),
        }
    }

    pub fn timers(&self) -> [&Timer; 2] {
        [&self.t_infer, &self.t_extract]
    }

    /// Estimates landmarks in `image`. The returned positions are in `image` coordinates.
    ///
    /// If `image` doesn't have the network's aspect ratio, a larger view around it is used, which
    /// may include pixels next to `image` (or black padding).
    pub fn estimate<V: AsImageView>(&mut self, image: &V) -> anyhow::Result<&mut E> {
        self.estimate_impl(image.as_view())
    }

    fn estimate_impl(&mut self, image: ImageView<'_>) -> anyhow::Result<&mut E> {
        let rect = image.rect().grow_to_fit_aspect(self.aspect_ratio()?);
        let view = image.view(rect);

        let cnn = self.network.cnn();
        let outputs = self.t_infer.time(|| cnn.estimate(&view))?;
        log::trace!("landmark outputs: {outputs:?}");

        let (network, estimate) = (&self.network, &mut self.estimate);
        self.t_extract.time(|| network.extract(&outputs, estimate))?;

        let scale = rect.width() / cnn.input_resolution().width() as f32;
        let offset = rect.top_left();
        self.estimate
            .landmarks_mut()
            .map_positions(|p| p * scale + offset);
        Ok(&mut self.estimate)
    }
}

/// Follows an object across frames with a rotated region of interest (ROI).
///
/// After being seeded with [`LandmarkTracker::set_roi`], every call to
/// [`LandmarkTracker::track`] estimates landmarks inside the ROI and moves the ROI to the padded
/// bounding box of those landmarks, rotated to the object's angle.
pub struct LandmarkTracker<E: Estimate + Confidence> {
    estimator: Estimator<E>,
    roi: Option<RotatedRect>,
    loss_thresh: f32,
    roi_padding: f32,
}

impl<E: Estimate + Confidence> LandmarkTracker<E> {
    pub const DEFAULT_LOSS_THRESHOLD: f32 = 0.5;
    pub const DEFAULT_ROI_PADDING: f32 = 0.3;

    pub fn new(estimator: Estimator<E>) -> Self {
        Self {
            estimator,
            roi: None,
            loss_thresh: Self::DEFAULT_LOSS_THRESHOLD,
            roi_padding: Self::DEFAULT_ROI_PADDING,
        }
    }

    pub fn timers(&self) -> [&Timer; 2] {
        self.estimator.timers()
    }

    /// Tracking is considered lost when the estimate's confidence falls below `threshold`.
    pub fn set_loss_threshold(&mut self, threshold: f32) {
        self.loss_thresh = threshold;
    }

    /// Sets the padding added around the landmark bounding box, relative to its size, on every
    /// side.
    pub fn set_roi_padding(&mut self, padding: f32) {
        assert!(padding >= 0.0, "negative ROI padding {padding}");
        self.roi_padding = padding;
    }

    pub fn roi(&self) -> Option<&RotatedRect> {
        self.roi.as_ref()
    }

    /// Starts tracking the object in `roi`, used as-is without padding.
    pub fn set_roi(&mut self, roi: impl Into<RotatedRect>) {
        self.roi = Some(roi.into());
    }

    /// Estimates landmarks in the current ROI of `full_image` and moves the ROI along.
    ///
    /// Returns `Ok(None)` if no ROI is set or if the object was lost, in which case the ROI is
    /// cleared. Must always be called with images of the same size.
    pub fn track<V: AsImageView>(
        &mut self,
        full_image: &V,
    ) -> anyhow::Result<Option<TrackingResult<'_, E>>> {
        self.track_impl(full_image.as_view())
    }

    fn track_impl(
        &mut self,
        full_image: ImageView<'_>,
    ) -> anyhow::Result<Option<TrackingResult<'_, E>>> {
        let Some(roi) = self.roi else {
            return Ok(None);
        };
        let view_rect = roi.grow_to_fit_aspect(self.estimator.aspect_ratio()?);
        let view = full_image.view(view_rect);

        let estimate = self.estimator.estimate(&view)?;
        let Some(updated_roi) = follow(estimate, roi, view_rect, self.loss_thresh) else {
            self.roi = None;
            return Ok(None);
        };
        self.roi = Some(updated_roi.grow_rel(self.roi_padding));

        Ok(Some(TrackingResult {
            view_rect,
            estimate,
            updated_roi,
        }))
    }
}

/// Moves `estimate` from `view_rect` into full image coordinates and computes the unpadded ROI
/// for the next frame.
///
/// Returns [`None`] if the object was lost.
fn follow<E: Estimate + Confidence>(
    estimate: &mut E,
    roi: RotatedRect,
    view_rect: RotatedRect,
    loss_thresh: f32,
) -> Option<RotatedRect> {
    if estimate.confidence() < loss_thresh {
        log::trace!(
            "tracking lost: confidence {} < {loss_thresh}",
            estimate.confidence()
        );
        return None;
    }

    let angle = roi.rotation_radians() + estimate.angle_radians().unwrap_or(0.0);
    estimate
        .landmarks_mut()
        .map_positions(|p| view_rect.transform_out(p));
    RotatedRect::bounding(angle, estimate.landmarks().iter().map(|lm| lm.pos()))
}

/// Returned by [`LandmarkTracker::track`].
pub struct TrackingResult<'a, E: Estimate> {
    view_rect: RotatedRect,
    estimate: &'a E,
    updated_roi: RotatedRect,
}

impl<'a, E: Estimate> TrackingResult<'a, E> {
    /// The area of the full image the landmarks were estimated in.
    pub fn view_rect(&self) -> RotatedRect {
        self.view_rect
    }

    /// The estimate, with landmarks in full image coordinates.
    pub fn estimate(&self) -> &'a E {
        self.estimate
    }

    /// The unpadded landmark bounding box.
    pub fn updated_roi(&self) -> RotatedRect {
        self.updated_roi
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_2;

    use approx::assert_relative_eq;

    use super::*;

    fn random_landmarks(n: usize) -> Landmarks {
        let mut lms = Landmarks::new(n);
        for i in 0..n {
            let lm = Landmark::new(fastrand::f32() * 100.0, fastrand::f32() * 100.0, 1.0);
            lms.set(i, lm);
        }
        lms
    }

    #[test]
    fn builder_keeps_optional_scores() {
        let lm = Landmark::new(1.0, 2.0, 3.0).with_visibility(0.25);
        assert_eq!(lm.visibility(), Some(0.25));
        assert_eq!(lm.presence(), None);
        assert_eq!(lm.with_presence(0.5).presence(), Some(0.5));
    }

    #[test]
    fn map_positions_scales_depth() {
        let mut lms = Landmarks::new(1);
        lms.set(0, Landmark::new(1.0, 2.0, 3.0).with_presence(0.9));
        lms.map_positions(|p| p * 2.0 + Vec2f::new(10.0, 0.0));
        let lm = lms.get(0);
        assert_relative_eq!(lm.x(), 12.0);
        assert_relative_eq!(lm.y(), 4.0);
        assert_relative_eq!(lm.z(), 6.0);
        assert_eq!(lm.presence(), Some(0.9));
    }

    #[test]
    fn rotation_keeps_depth() {
        let rect = RotatedRect::new(Rect::from_center(0.0, 0.0, 10.0, 10.0), FRAC_PI_2);
        let mut lms = random_landmarks(5);
        lms.map_positions(|p| rect.transform_out(p));
        for lm in lms.iter() {
            assert_relative_eq!(lm.z(), 1.0, epsilon = 1e-4);
        }
    }

    struct Fixed {
        landmarks: Landmarks,
        confidence: f32,
        angle: Option<f32>,
    }

    impl Estimate for Fixed {
        fn landmarks(&self) -> &Landmarks {
            &self.landmarks
        }

        fn landmarks_mut(&mut self) -> &mut Landmarks {
            &mut self.landmarks
        }

        fn angle_radians(&self) -> Option<f32> {
            self.angle
        }
    }

    impl Confidence for Fixed {
        fn confidence(&self) -> f32 {
            self.confidence
        }
    }

    fn square_estimate(confidence: f32) -> Fixed {
        let mut landmarks = Landmarks::new(2);
        landmarks.set(0, Landmark::new(2.0, 2.0, 0.0));
        landmarks.set(1, Landmark::new(8.0, 6.0, 0.0));
        Fixed {
            landmarks,
            confidence,
            angle: None,
        }
    }

    #[test]
    fn follow_maps_landmarks_into_image() {
        let roi = RotatedRect::from(Rect::from_top_left(100.0, 50.0, 10.0, 10.0));
        let mut estimate = square_estimate(0.9);
        let next = follow(&mut estimate, roi, roi, 0.5).unwrap();

        assert_relative_eq!(estimate.landmarks().get(0).x(), 102.0, epsilon = 1e-4);
        assert_relative_eq!(estimate.landmarks().get(1).y(), 56.0, epsilon = 1e-4);
        assert_relative_eq!(next.rotation_radians(), 0.0);
        assert_relative_eq!(next.center().x, 105.0, epsilon = 1e-4);
        assert_relative_eq!(next.center().y, 54.0, epsilon = 1e-4);
        assert_relative_eq!(next.rect().width(), 6.0, epsilon = 1e-4);
        assert_relative_eq!(next.rect().height(), 4.0, epsilon = 1e-4);
    }

    #[test]
    fn follow_adds_estimated_angle() {
        let roi = RotatedRect::new(Rect::from_top_left(0.0, 0.0, 10.0, 10.0), 0.25);
        let mut estimate = square_estimate(0.9);
        estimate.angle = Some(0.5);
        let next = follow(&mut estimate, roi, roi, 0.5).unwrap();
        assert_relative_eq!(next.rotation_radians(), 0.75);
    }

    #[test]
    fn follow_loses_object_below_threshold() {
        let roi = RotatedRect::from(Rect::from_top_left(0.0, 0.0, 10.0, 10.0));
        let mut estimate = square_estimate(0.4);
        assert!(follow(&mut estimate, roi, roi, 0.5).is_none());
        // Landmarks are left alone.
        assert_relative_eq!(estimate.landmarks().get(1).x(), 8.0);

        // The threshold itself still counts as tracked.
        let mut estimate = square_estimate(0.5);
        assert!(follow(&mut estimate, roi, roi, 0.5).is_some());
    }

    #[test]
    fn bounding_rect_contains_all() {
        let lms = random_landmarks(21);
        let rect = lms.bounding_rect().unwrap().grow_rel(0.001);
        assert!(lms.iter().all(|lm| rect.contains_point(lm.pos())));
        assert!(Landmarks::new(0).bounding_rect().is_none());
    }
}
