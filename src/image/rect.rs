//! Floating-point rectangles.
//!
//! Detections, regions of interest and image views are all described with these types. Positions
//! are in pixels of whatever image or view the rectangle belongs to, with Y pointing down.

use std::{fmt, ops::RangeInclusive};

use nalgebra::{Rotation2, Vector2};

use crate::resolution::AspectRatio;

/// 2D float vector used for points and sizes.
pub type Vec2f = Vector2<f32>;

/// An axis-aligned rectangle, stored as center and size.
///
/// Width and height may be zero, but never negative.
#[derive(Clone, Copy, PartialEq)]
pub struct Rect {
    center: Vec2f,
    size: Vec2f,
}

impl Rect {
    #[inline]
    pub fn from_center(x_center: f32, y_center: f32, width: f32, height: f32) -> Self {
        Self {
            center: Vec2f::new(x_center, y_center),
            size: Vec2f::new(width, height),
        }
    }

    #[inline]
    pub fn from_top_left(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self::from_center(x + width * 0.5, y + height * 0.5, width, height)
    }

    /// Creates the rectangle spanning the given X and Y coordinate ranges.
    pub fn from_ranges(x: RangeInclusive<f32>, y: RangeInclusive<f32>) -> Self {
        Self::spanning(
            Vec2f::new(*x.start(), *y.start()),
            Vec2f::new(*x.end(), *y.end()),
        )
    }

    /// Computes the smallest axis-aligned rectangle containing all `points`.
    ///
    /// Returns [`None`] when `points` is empty.
    pub fn bounding<I, P>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = P>,
        P: Into<Vec2f>,
    {
        let mut points = points.into_iter().map(Into::into);
        let first: Vec2f = points.next()?;
        let (min, max) = points.fold((first, first), |(min, max), p| (min.inf(&p), max.sup(&p)));
        Some(Self::spanning(min, max))
    }

    fn spanning(min: Vec2f, max: Vec2f) -> Self {
        assert!(
            min.x <= max.x && min.y <= max.y,
            "invalid rectangle span {min:?} -> {max:?}"
        );
        Self {
            center: (min + max) * 0.5,
            size: max - min,
        }
    }

    /// Scales width and height by `scale`, keeping the center in place.
    #[must_use]
    pub fn scale(&self, scale: f32) -> Self {
        Self {
            size: self.size * scale,
            ..*self
        }
    }

    /// Adds `amount * width` to the left and right, and `amount * height` to the top and bottom.
    #[must_use]
    pub fn grow_rel(&self, amount: f32) -> Self {
        self.scale(1.0 + 2.0 * amount)
    }

    /// Widens or heightens `self` symmetrically until it has the `target` aspect ratio.
    ///
    /// # Panics
    ///
    /// Panics if `self` has zero width or height.
    #[must_use]
    pub fn grow_to_fit_aspect(&self, target: AspectRatio) -> Self {
        assert!(
            self.width() > 0.0 && self.height() > 0.0,
            "cannot fit empty rectangle {self:?} to an aspect ratio"
        );
        let ratio = target.as_f32();
        let mut size = self.size;
        if self.height() * ratio >= self.width() {
            size.x = self.height() * ratio;
        } else {
            size.y = self.width() / ratio;
        }
        Self { size, ..*self }
    }

    /// Moves the center to `(x_center, y_center)`, growing the rectangle so that it still
    /// contains everything it contained before.
    #[must_use]
    pub fn grow_move_center(&self, x_center: f32, y_center: f32) -> Self {
        let half_w = (x_center - self.x()).abs().max((x_center - self.x() - self.width()).abs());
        let half_h = (y_center - self.y()).abs().max((y_center - self.y() - self.height()).abs());
        Self::from_center(x_center, y_center, half_w * 2.0, half_h * 2.0)
    }

    #[inline]
    pub fn top_left(&self) -> Vec2f {
        self.center - self.size * 0.5
    }

    /// X coordinate of the left edge.
    #[inline]
    pub fn x(&self) -> f32 {
        self.top_left().x
    }

    /// Y coordinate of the top edge.
    #[inline]
    pub fn y(&self) -> f32 {
        self.top_left().y
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.size.x
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.size.y
    }

    #[inline]
    pub fn center(&self) -> Vec2f {
        self.center
    }

    #[inline]
    pub fn size(&self) -> Vec2f {
        self.size
    }

    #[inline]
    pub fn area(&self) -> f32 {
        self.size.x * self.size.y
    }

    #[must_use]
    pub fn move_by(&self, offset: impl Into<Vec2f>) -> Self {
        Self {
            center: self.center + offset.into(),
            ..*self
        }
    }

    /// Moves the top left corner to `(x, y)`.
    #[must_use]
    pub fn move_to(&self, x: f32, y: f32) -> Self {
        Self::from_top_left(x, y, self.width(), self.height())
    }

    /// Returns the overlapping area of `self` and `other`, or [`None`] if they are disjoint.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let min = self.top_left().sup(&other.top_left());
        let max = (self.top_left() + self.size).inf(&(other.top_left() + other.size));
        (min.x <= max.x && min.y <= max.y).then(|| Self::spanning(min, max))
    }

    fn intersection_area(&self, other: &Rect) -> f32 {
        self.intersection(other).map_or(0.0, |r| r.area())
    }

    /// Computes the Intersection over Union (IoU) of `self` and `other`.
    ///
    /// Returns 0.0 when both rectangles are empty.
    pub fn iou(&self, other: &Rect) -> f32 {
        let intersection = self.intersection_area(other);
        let union = self.area() + other.area() - intersection;
        if union <= 0.0 {
            0.0
        } else {
            intersection / union
        }
    }

    pub fn contains_point(&self, point: impl Into<Vec2f>) -> bool {
        let p = point.into();
        let tl = self.top_left();
        let br = tl + self.size;
        tl.x <= p.x && p.x <= br.x && tl.y <= p.y && p.y <= br.y
    }

    /// Returns the corners in the order top-left, top-right, bottom-right, bottom-left.
    pub fn corners(&self) -> [Vec2f; 4] {
        let tl = self.top_left();
        let (w, h) = (self.width(), self.height());
        [
            tl,
            tl + Vec2f::new(w, 0.0),
            tl + Vec2f::new(w, h),
            tl + Vec2f::new(0.0, h),
        ]
    }
}

impl fmt::Debug for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Rect @ ({},{})/{}x{}",
            self.center.x, self.center.y, self.size.x, self.size.y
        )
    }
}

/// A [`Rect`] rotated clockwise around its center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotatedRect {
    rect: Rect,
    radians: f32,
}

impl RotatedRect {
    #[inline]
    pub fn new(rect: Rect, radians: f32) -> Self {
        Self { rect, radians }
    }

    /// Computes a rectangle rotated by `radians` that contains all `points`.
    ///
    /// Returns [`None`] when `points` is empty.
    pub fn bounding<I, P>(radians: f32, points: I) -> Option<Self>
    where
        I: IntoIterator<Item = P>,
        P: Into<Vec2f>,
    {
        // Undo the rotation, take the axis-aligned bounds there, then rotate the center back.
        let unrotate = Rotation2::new(-radians);
        let inner = Rect::bounding(points.into_iter().map(|p| unrotate * p.into()))?;
        let center = Rotation2::new(radians) * inner.center();
        Some(Self::new(
            Rect::from_center(center.x, center.y, inner.width(), inner.height()),
            radians,
        ))
    }

    /// Clockwise rotation in radians.
    #[inline]
    pub fn rotation_radians(&self) -> f32 {
        self.radians
    }

    /// The rectangle before rotation.
    #[inline]
    pub fn rect(&self) -> &Rect {
        &self.rect
    }

    #[inline]
    pub fn center(&self) -> Vec2f {
        self.rect.center()
    }

    /// Applies `f` to the unrotated rectangle.
    #[must_use]
    pub fn map(mut self, f: impl FnOnce(Rect) -> Rect) -> Self {
        self.rect = f(self.rect);
        self
    }

    #[must_use]
    pub fn grow_rel(&self, amount: f32) -> Self {
        self.map(|r| r.grow_rel(amount))
    }

    #[must_use]
    pub fn grow_to_fit_aspect(&self, target: AspectRatio) -> Self {
        self.map(|r| r.grow_to_fit_aspect(target))
    }

    /// Corners in the parent coordinate system, in the order of [`Rect::corners`].
    pub fn rotated_corners(&self) -> [Vec2f; 4] {
        let rot = Rotation2::new(self.radians);
        let center = self.rect.center();
        self.rect.corners().map(|c| center + rot * (c - center))
    }

    pub fn contains_point(&self, point: impl Into<Vec2f>) -> bool {
        let p = self.transform_in(point);
        Rect::from_top_left(0.0, 0.0, self.rect.width(), self.rect.height()).contains_point(p)
    }

    /// Maps a point from the parent coordinate system into the rectangle's own system.
    ///
    /// The origin of the inner system is the (rotated) top left corner.
    pub fn transform_in(&self, point: impl Into<Vec2f>) -> Vec2f {
        let half = self.rect.size() * 0.5;
        Rotation2::new(-self.radians) * (point.into() - self.rect.center()) + half
    }

    /// Maps a point from the rectangle's own coordinate system into the parent system.
    pub fn transform_out(&self, point: impl Into<Vec2f>) -> Vec2f {
        let half = self.rect.size() * 0.5;
        Rotation2::new(self.radians) * (point.into() - half) + self.rect.center()
    }
}

impl From<Rect> for RotatedRect {
    fn from(rect: Rect) -> Self {
        Self::new(rect, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::{FRAC_PI_2, PI};

    use approx::assert_relative_eq;

    use super::*;

    fn assert_vec_eq(a: Vec2f, b: [f32; 2]) {
        assert_relative_eq!(a.x, b[0], epsilon = 1e-4);
        assert_relative_eq!(a.y, b[1], epsilon = 1e-4);
    }

    #[test]
    fn iou_of_nested_rects() {
        let inner = Rect::from_center(3.0, 3.0, 2.0, 2.0);
        let outer = Rect::from_center(3.0, 3.0, 4.0, 4.0);
        assert_eq!(inner.intersection(&outer), Some(inner));
        assert_eq!(inner.iou(&outer), 0.25);
        assert_eq!(outer.iou(&inner), 0.25);
    }

    #[test]
    fn iou_of_disjoint_and_empty_rects() {
        let a = Rect::from_top_left(0.0, 0.0, 1.0, 1.0);
        let b = Rect::from_top_left(5.0, 0.0, 1.0, 1.0);
        assert_eq!(a.intersection(&b), None);
        assert_eq!(a.iou(&b), 0.0);

        let empty = Rect::from_center(0.0, 0.0, 0.0, 0.0);
        assert_eq!(empty.iou(&empty), 0.0);
    }

    #[test]
    fn bounding_points() {
        assert!(Rect::bounding(std::iter::empty::<[f32; 2]>()).is_none());
        assert_eq!(
            Rect::bounding([[2.0, 1.0], [-2.0, 3.0], [0.0, -1.0]]).unwrap(),
            Rect::from_ranges(-2.0..=2.0, -1.0..=3.0),
        );
    }

    #[test]
    fn grow() {
        let r = Rect::from_top_left(0.0, 0.0, 10.0, 20.0).grow_rel(0.5);
        assert_eq!(r, Rect::from_center(5.0, 10.0, 20.0, 40.0));

        let square = AspectRatio::SQUARE;
        assert_eq!(
            Rect::from_center(0.0, 0.0, 30.0, 10.0).grow_to_fit_aspect(square),
            Rect::from_center(0.0, 0.0, 30.0, 30.0),
        );
        assert_eq!(
            Rect::from_center(0.0, 0.0, 10.0, 30.0).grow_to_fit_aspect(square),
            Rect::from_center(0.0, 0.0, 30.0, 30.0),
        );

        let moved = Rect::from_top_left(0.0, 0.0, 4.0, 4.0).grow_move_center(1.0, 1.0);
        assert_eq!(moved, Rect::from_center(1.0, 1.0, 6.0, 6.0));
    }

    #[test]
    fn rotated_transform_roundtrips() {
        let rect = RotatedRect::new(Rect::from_top_left(10.0, 20.0, 4.0, 2.0), 0.7);
        for p in [[0.0, 0.0], [4.0, 2.0], [1.5, -3.0]] {
            let out = rect.transform_out(p);
            assert_vec_eq(rect.transform_in(out), p);
        }
    }

    #[test]
    fn quarter_turn() {
        // A 1x1 square rotated clockwise by 90° maps its own top-left corner to the parent's
        // top-right corner.
        let rect = RotatedRect::new(Rect::from_top_left(0.0, 0.0, 1.0, 1.0), FRAC_PI_2);
        assert_vec_eq(rect.transform_out([0.0, 0.0]), [1.0, 0.0]);
        assert_vec_eq(rect.transform_in([1.0, 0.0]), [0.0, 0.0]);
        assert_vec_eq(rect.transform_out([0.5, 0.5]), [0.5, 0.5]);

        let flipped = RotatedRect::new(Rect::from_top_left(10.0, 20.0, 1.0, 1.0), PI);
        assert_vec_eq(flipped.transform_out([0.0, 0.0]), [11.0, 21.0]);
    }

    #[test]
    fn rotated_bounding_contains_points() {
        let points = [[0.0, 0.0], [3.0, 1.0], [1.0, 4.0], [-2.0, 2.0]];
        for radians in [0.0, 0.3, -1.2, PI] {
            let rect = RotatedRect::bounding(radians, points).unwrap().grow_rel(0.01);
            for p in points {
                assert!(rect.contains_point(p), "{rect:?} misses {p:?}");
            }
        }
        assert!(RotatedRect::bounding(0.0, std::iter::empty::<[f32; 2]>()).is_none());
    }

    #[test]
    fn rotated_corners_keep_center() {
        let rect = RotatedRect::new(Rect::from_center(5.0, 5.0, 4.0, 2.0), FRAC_PI_2);
        let corners = rect.rotated_corners();
        assert_vec_eq(corners[0], [6.0, 3.0]);
        let sum = corners.iter().fold(Vec2f::zeros(), |acc, c| acc + c);
        assert_vec_eq(sum / 4.0, [5.0, 5.0]);
    }
}
