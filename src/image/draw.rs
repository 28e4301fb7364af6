//! Drawing shapes and text onto images.
//!
//! Every function returns a guard that draws the shape when it is dropped, so options can be
//! chained onto the call:
//!
//! ```no_run
//! # use visiondeck::image::{draw, Color, Image};
//! # let mut image = Image::new(64, 64);
//! draw::line(&mut image, 0.0, 0.0, 10.0, 10.0).color(Color::GREEN).stroke_width(2);
//! ```

use std::convert::Infallible;

use embedded_graphics::{
    mono_font::{ascii::FONT_10X20, MonoTextStyle},
    prelude::*,
    primitives::{Circle, Line, PrimitiveStyle, Rectangle},
    text::{self, Text, TextStyleBuilder},
};

use super::{AsImageViewMut, Color, ImageViewMut, Rect, Vec2f};

fn point(p: Vec2f) -> Point {
    Point::new(p.x.round() as i32, p.y.round() as i32)
}

fn render<D>(image: &mut ImageViewMut<'_>, drawable: D)
where
    D: Drawable<Color = Color>,
{
    match drawable.draw(&mut Target(image.reborrow())) {
        Ok(_) => {}
        Err(infallible) => match infallible {},
    }
}

/// Guard returned by [`rect`].
pub struct DrawRect<'a> {
    image: ImageViewMut<'a>,
    rect: Rect,
    color: Color,
    stroke_width: u32,
}

impl DrawRect<'_> {
    pub fn color(&mut self, color: Color) -> &mut Self {
        self.color = color;
        self
    }

    /// Defaults to 1.
    pub fn stroke_width(&mut self, width: u32) -> &mut Self {
        self.stroke_width = width;
        self
    }
}

impl Drop for DrawRect<'_> {
    fn drop(&mut self) {
        let size = self.rect.size();
        let rect = Rectangle::new(
            point(self.rect.top_left()),
            Size::new(size.x.round() as u32, size.y.round() as u32),
        );
        let style = PrimitiveStyle::with_stroke(self.color, self.stroke_width);
        render(&mut self.image, rect.into_styled(style));
    }
}

/// Guard returned by [`line`].
pub struct DrawLine<'a> {
    image: ImageViewMut<'a>,
    start: Vec2f,
    end: Vec2f,
    color: Color,
    stroke_width: u32,
}

impl DrawLine<'_> {
    pub fn color(&mut self, color: Color) -> &mut Self {
        self.color = color;
        self
    }

    pub fn stroke_width(&mut self, width: u32) -> &mut Self {
        self.stroke_width = width;
        self
    }
}

impl Drop for DrawLine<'_> {
    fn drop(&mut self) {
        let line = Line::new(point(self.start), point(self.end));
        let style = PrimitiveStyle::with_stroke(self.color, self.stroke_width);
        render(&mut self.image, line.into_styled(style));
    }
}

/// Guard returned by [`circle`].
pub struct DrawCircle<'a> {
    image: ImageViewMut<'a>,
    center: Vec2f,
    radius: u32,
    color: Color,
}

impl DrawCircle<'_> {
    pub fn color(&mut self, color: Color) -> &mut Self {
        self.color = color;
        self
    }

    pub fn radius(&mut self, radius: u32) -> &mut Self {
        self.radius = radius;
        self
    }
}

impl Drop for DrawCircle<'_> {
    fn drop(&mut self) {
        let circle = Circle::with_center(point(self.center), self.radius * 2 + 1);
        render(
            &mut self.image,
            circle.into_styled(PrimitiveStyle::with_fill(self.color)),
        );
    }
}

/// Guard returned by [`text`].
pub struct DrawText<'a> {
    image: ImageViewMut<'a>,
    pos: Vec2f,
    text: &'a str,
    color: Color,
    alignment: text::Alignment,
    baseline: text::Baseline,
}

impl DrawText<'_> {
    pub fn color(&mut self, color: Color) -> &mut Self {
        self.color = color;
        self
    }

    /// Places the text's baseline at the `y` coordinate.
    pub fn align_baseline(&mut self) -> &mut Self {
        self.baseline = text::Baseline::Alphabetic;
        self
    }

    /// Starts the text at the `x` coordinate.
    pub fn align_left(&mut self) -> &mut Self {
        self.alignment = text::Alignment::Left;
        self
    }
}

impl Drop for DrawText<'_> {
    fn drop(&mut self) {
        let style = TextStyleBuilder::new()
            .alignment(self.alignment)
            .baseline(self.baseline)
            .build();
        let text = Text::with_text_style(
            self.text,
            point(self.pos),
            MonoTextStyle::new(&FONT_10X20, self.color),
            style,
        );
        render(&mut self.image, text);
    }
}

/// Outlines an axis-aligned rectangle. Red by default.
pub fn rect<I: AsImageViewMut>(image: &mut I, rect: Rect) -> DrawRect<'_> {
    DrawRect {
        image: image.as_view_mut(),
        rect,
        color: Color::RED,
        stroke_width: 1,
    }
}

/// Draws a line. Blue by default.
pub fn line<I: AsImageViewMut>(
    image: &mut I,
    start_x: f32,
    start_y: f32,
    end_x: f32,
    end_y: f32,
) -> DrawLine<'_> {
    DrawLine {
        image: image.as_view_mut(),
        start: Vec2f::new(start_x, start_y),
        end: Vec2f::new(end_x, end_y),
        color: Color::BLUE,
        stroke_width: 1,
    }
}

/// Draws a filled circle. Radius 3 by default.
pub fn circle<I: AsImageViewMut>(image: &mut I, x: f32, y: f32) -> DrawCircle<'_> {
    DrawCircle {
        image: image.as_view_mut(),
        center: Vec2f::new(x, y),
        radius: 3,
        color: Color::RED,
    }
}

/// Draws text, centered on `(x, y)` unless configured otherwise.
pub fn text<'a, I: AsImageViewMut>(image: &'a mut I, x: f32, y: f32, text: &'a str) -> DrawText<'a> {
    DrawText {
        image: image.as_view_mut(),
        pos: Vec2f::new(x, y),
        text,
        color: Color::RED,
        alignment: text::Alignment::Center,
        baseline: text::Baseline::Middle,
    }
}

struct Target<'a>(ImageViewMut<'a>);

impl Dimensions for Target<'_> {
    fn bounding_box(&self) -> Rectangle {
        let res = self.0.resolution();
        Rectangle::new(Point::zero(), Size::new(res.width(), res.height()))
    }
}

impl DrawTarget for Target<'_> {
    type Color = Color;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let res = self.0.resolution();
        for Pixel(p, color) in pixels {
            if p.x >= 0 && p.y >= 0 && (p.x as u32) < res.width() && (p.y as u32) < res.height() {
                self.0.set(p.x as u32, p.y as u32, color);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::image::Image;

    use super::*;

    fn count(image: &Image, color: Color) -> usize {
        image.as_rgba8().pixels().filter(|p| p.0 == color.0).count()
    }

    #[test]
    fn filled_circle() {
        let mut image = Image::new(32, 32);
        circle(&mut image, 16.0, 16.0).radius(8).color(Color::RED);
        assert_eq!(image.get(16, 16), Color::RED);
        assert_eq!(image.get(16, 9), Color::RED);
        assert_eq!(image.get(0, 0), Color::NULL);
        let n = count(&image, Color::RED);
        assert!((180..=300).contains(&n), "{n} pixels");
    }

    #[test]
    fn clipped_at_edges() {
        let mut image = Image::new(8, 8);
        circle(&mut image, 0.0, 0.0).radius(3);
        line(&mut image, -20.0, 4.0, 20.0, 4.0).color(Color::GREEN);
        assert_eq!(image.get(0, 0), Color::RED);
        assert_eq!(count(&image, Color::GREEN), 8);
    }

    #[test]
    fn text_is_drawn() {
        let mut image = Image::new(100, 40);
        text(&mut image, 5.0, 30.0, "Hi")
            .align_left()
            .align_baseline()
            .color(Color::GREEN);
        assert!(count(&image, Color::GREEN) > 0);
    }
}
