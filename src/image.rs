//! Image manipulation.
//!
//! This module provides:
//!
//! - The [`Image`] type, an owned RGBA image.
//! - [`ImageView`] and [`ImageViewMut`], borrowed (possibly rotated) views into an [`Image`].
//! - The [`AsImageView`] and [`AsImageViewMut`] traits to abstract over images and views.
//! - The [`draw`] module with drop-guard builders to visualize results.
//! - [`Rect`] and [`RotatedRect`], floating-point rectangles.

mod blend;
pub mod draw;
mod jpeg;
mod rect;

#[cfg(test)]
mod tests;

use std::fmt;

use embedded_graphics::{pixelcolor::raw::RawU32, prelude::PixelColor};
use image::{ImageBuffer, Rgba, RgbaImage};

use crate::resolution::Resolution;

pub use blend::*;
pub use rect::*;

/// An 8-bit sRGB image with alpha channel.
#[derive(Clone)]
pub struct Image {
    buf: RgbaImage,
}

impl Image {
    /// Creates a fully transparent black image of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            buf: ImageBuffer::new(width, height),
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.buf.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.buf.height()
    }

    #[inline]
    pub fn resolution(&self) -> Resolution {
        Resolution::new(self.width(), self.height())
    }

    /// Returns a [`Rect`] at `(0, 0)` covering the whole image.
    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::from_top_left(0.0, 0.0, self.width() as f32, self.height() as f32)
    }

    pub(crate) fn get(&self, x: u32, y: u32) -> Color {
        Color(self.buf[(x, y)].0)
    }

    pub(crate) fn set(&mut self, x: u32, y: u32, color: Color) {
        self.buf[(x, y)] = Rgba(color.0);
    }

    /// Creates an immutable view of the area `rect` covers.
    ///
    /// Pixels of the view that fall outside of `self` read as [`Color::NULL`].
    pub fn view(&self, rect: impl Into<RotatedRect>) -> ImageView<'_> {
        ImageView {
            image: self,
            data: ViewData::full(self).view(rect),
        }
    }

    /// Creates a mutable view of the area `rect` covers.
    ///
    /// Pixels of the view that fall outside of `self` read as [`Color::NULL`] and ignore writes.
    pub fn view_mut(&mut self, rect: impl Into<RotatedRect>) -> ImageViewMut<'_> {
        ImageViewMut {
            data: ViewData::full(self).view(rect),
            image: self,
        }
    }

    /// Mirrors the image around its vertical axis.
    pub fn flip_horizontal_in_place(&mut self) {
        image::imageops::flip_horizontal_in_place(&mut self.buf);
    }

    /// Sets every pixel to `color`.
    pub fn clear(&mut self, color: Color) {
        self.buf.pixels_mut().for_each(|pix| pix.0 = color.0);
    }

    /// Blends `src` onto `self`, stretching it to cover the whole image.
    ///
    /// The operation runs when the returned [`Blend`] is dropped. Alpha blending is the default.
    pub fn blend_from<'b, V: AsImageView>(&'b mut self, src: &'b V) -> Blend<'b> {
        Blend::new(self.as_view_mut(), src.as_view())
    }

    pub(crate) fn as_rgba8(&self) -> &RgbaImage {
        &self.buf
    }
}

impl fmt::Debug for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{} Image", self.width(), self.height())
    }
}

#[derive(Debug, Clone, Copy)]
struct ViewData {
    /// Area of the view in root image coordinates.
    rect: RotatedRect,
}

impl ViewData {
    fn full(image: &Image) -> Self {
        Self {
            rect: image.rect().into(),
        }
    }

    fn view(&self, rect: impl Into<RotatedRect>) -> Self {
        let rect: RotatedRect = rect.into();
        let center = self.rect.transform_out(rect.center());
        let size = rect.rect().size();
        Self {
            rect: RotatedRect::new(
                Rect::from_center(center.x, center.y, size.x, size.y),
                self.rect.rotation_radians() + rect.rotation_radians(),
            ),
        }
    }

    fn size(&self) -> Vec2f {
        self.rect.rect().size()
    }

    fn resolution(&self) -> Resolution {
        let size = self.size();
        Resolution::new(size.x.round() as u32, size.y.round() as u32)
    }

    /// Maps a continuous view position to the root image pixel it lands in.
    fn image_coord(&self, x: f32, y: f32, image: &Image) -> Option<(u32, u32)> {
        let p = self.rect.transform_out([x, y]);
        if p.x < 0.0 || p.y < 0.0 {
            return None;
        }
        let (x, y) = (p.x as u32, p.y as u32);
        (x < image.width() && y < image.height()).then_some((x, y))
    }

    fn sample(&self, x: f32, y: f32, image: &Image) -> Color {
        self.image_coord(x, y, image)
            .map_or(Color::NULL, |(x, y)| image.get(x, y))
    }
}

/// An immutable view of a (possibly rotated) area of an [`Image`].
#[derive(Clone, Copy)]
pub struct ImageView<'a> {
    image: &'a Image,
    data: ViewData,
}

impl<'a> ImageView<'a> {
    /// Width of the view in pixels of the underlying image. May be fractional.
    pub fn width(&self) -> f32 {
        self.data.size().x
    }

    pub fn height(&self) -> f32 {
        self.data.size().y
    }

    /// The view's size rounded to whole pixels.
    pub fn resolution(&self) -> Resolution {
        self.data.resolution()
    }

    /// Returns a [`Rect`] at `(0, 0)` with the size of this view.
    pub fn rect(&self) -> Rect {
        Rect::from_top_left(0.0, 0.0, self.width(), self.height())
    }

    /// Returns the pixel at the continuous view position `(x, y)` (nearest neighbor).
    pub fn sample(&self, x: f32, y: f32) -> Color {
        self.data.sample(x, y, self.image)
    }

    pub(crate) fn get(&self, x: u32, y: u32) -> Color {
        self.sample(x as f32 + 0.5, y as f32 + 0.5)
    }

    /// Creates a subview of the area `rect` covers, in this view's coordinates.
    pub fn view(&self, rect: impl Into<RotatedRect>) -> ImageView<'a> {
        ImageView {
            image: self.image,
            data: self.data.view(rect),
        }
    }

    /// Copies the visible pixels into a new [`Image`].
    pub fn to_image(&self) -> Image {
        let res = self.resolution();
        let mut image = Image::new(res.width(), res.height());
        image.blend_from(self).mode(BlendMode::Overwrite);
        image
    }
}

impl fmt::Debug for ImageView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ImageView {:?}", self.data.rect)
    }
}

/// A mutable view of a (possibly rotated) area of an [`Image`].
pub struct ImageViewMut<'a> {
    image: &'a mut Image,
    data: ViewData,
}

impl<'a> ImageViewMut<'a> {
    pub fn width(&self) -> f32 {
        self.data.size().x
    }

    pub fn height(&self) -> f32 {
        self.data.size().y
    }

    pub fn resolution(&self) -> Resolution {
        self.data.resolution()
    }

    pub fn rect(&self) -> Rect {
        Rect::from_top_left(0.0, 0.0, self.width(), self.height())
    }

    pub(crate) fn get(&self, x: u32, y: u32) -> Color {
        self.data.sample(x as f32 + 0.5, y as f32 + 0.5, self.image)
    }

    /// Writes the pixel at view position `(x, y)`. Writes outside the image are dropped.
    pub(crate) fn set(&mut self, x: u32, y: u32, color: Color) {
        if let Some((x, y)) = self
            .data
            .image_coord(x as f32 + 0.5, y as f32 + 0.5, self.image)
        {
            self.image.set(x, y, color);
        }
    }

    /// Borrows an identical [`ImageViewMut`] with a shorter lifetime.
    pub fn reborrow(&mut self) -> ImageViewMut<'_> {
        ImageViewMut {
            image: self.image,
            data: self.data,
        }
    }

    pub fn view(&self, rect: impl Into<RotatedRect>) -> ImageView<'_> {
        ImageView {
            image: self.image,
            data: self.data.view(rect),
        }
    }

    pub fn view_mut(&mut self, rect: impl Into<RotatedRect>) -> ImageViewMut<'_> {
        ImageViewMut {
            image: self.image,
            data: self.data.view(rect),
        }
    }

    pub fn blend_from<'b, V: AsImageView>(&'b mut self, src: &'b V) -> Blend<'b> {
        Blend::new(self.reborrow(), src.as_view())
    }
}

impl fmt::Debug for ImageViewMut<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ImageViewMut {:?}", self.data.rect)
    }
}

/// An 8-bit RGBA color in sRGB space, with non-premultiplied alpha.
#[derive(PartialEq, Eq, Clone, Copy)]
pub struct Color(pub(crate) [u8; 4]);

impl Color {
    /// Transparent black, the initial value of every [`Image`] pixel.
    pub const NULL: Self = Self([0, 0, 0, 0]);
    pub const BLACK: Self = Self([0, 0, 0, 255]);
    pub const WHITE: Self = Self([255, 255, 255, 255]);
    pub const RED: Self = Self([255, 0, 0, 255]);
    pub const GREEN: Self = Self([0, 255, 0, 255]);
    pub const BLUE: Self = Self([0, 0, 255, 255]);
    pub const YELLOW: Self = Self([255, 255, 0, 255]);
    pub const CYAN: Self = Self([0, 255, 255, 255]);

    #[inline]
    pub const fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b, 255])
    }

    #[inline]
    pub fn r(&self) -> u8 {
        self.0[0]
    }

    #[inline]
    pub fn g(&self) -> u8 {
        self.0[1]
    }

    #[inline]
    pub fn b(&self) -> u8 {
        self.0[2]
    }

    #[inline]
    pub fn a(&self) -> u8 {
        self.0[3]
    }

    #[must_use]
    pub fn with_alpha(mut self, a: u8) -> Color {
        self.0[3] = a;
        self
    }
}

impl fmt::Debug for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b, a] = self.0;
        write!(f, "#{r:02x}{g:02x}{b:02x}{a:02x}")
    }
}

impl PixelColor for Color {
    type Raw = RawU32;
}

/// Read-only access to image data, implemented by [`Image`] and both view types.
pub trait AsImageView {
    fn as_view(&self) -> ImageView<'_>;
}

/// Write access to image data, implemented by [`Image`] and [`ImageViewMut`].
pub trait AsImageViewMut: AsImageView {
    fn as_view_mut(&mut self) -> ImageViewMut<'_>;
}

impl AsImageView for Image {
    fn as_view(&self) -> ImageView<'_> {
        self.view(self.rect())
    }
}

impl AsImageViewMut for Image {
    fn as_view_mut(&mut self) -> ImageViewMut<'_> {
        let rect = self.rect();
        self.view_mut(rect)
    }
}

impl AsImageView for ImageView<'_> {
    fn as_view(&self) -> ImageView<'_> {
        *self
    }
}

impl AsImageView for ImageViewMut<'_> {
    fn as_view(&self) -> ImageView<'_> {
        ImageView {
            image: self.image,
            data: self.data,
        }
    }
}

impl AsImageViewMut for ImageViewMut<'_> {
    fn as_view_mut(&mut self) -> ImageViewMut<'_> {
        self.reborrow()
    }
}

impl<V: AsImageView> AsImageView for &V {
    fn as_view(&self) -> ImageView<'_> {
        (**self).as_view()
    }
}

impl<V: AsImageView> AsImageView for &mut V {
    fn as_view(&self) -> ImageView<'_> {
        (**self).as_view()
    }
}

impl<V: AsImageViewMut> AsImageViewMut for &mut V {
    fn as_view_mut(&mut self) -> ImageViewMut<'_> {
        (**self).as_view_mut()
    }
}
