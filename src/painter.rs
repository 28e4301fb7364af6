//! Finger painting.

use crate::{
    image::{draw, BlendMode, Color, Image},
    resolution::Resolution,
};

/// A transparent layer that strokes are painted on, composed onto every frame.
pub struct Canvas {
    image: Option<Image>,
    brush: Color,
    radius: u32,
}

impl Canvas {
    pub const BRUSH_RADIUS: u32 = 8;
    /// Weight of the canvas colors when they are added to a frame.
    pub const WEIGHT: f32 = 0.5;

    pub fn new() -> Self {
        Self {
            image: None,
            brush: Color::RED,
            radius: Self::BRUSH_RADIUS,
        }
    }

    /// Makes sure the canvas matches the frame size.
    ///
    /// The canvas is created on the first call, and recreated (losing the painting) whenever the
    /// resolution changes.
    pub fn fit(&mut self, res: Resolution) {
        match &self.image {
            Some(image) if image.resolution() == res => {}
            Some(_) => {
                log::debug!("frame size changed to {res}, recreating canvas");
                self.image = Some(Image::new(res.width(), res.height()));
            }
            None => self.image = Some(Image::new(res.width(), res.height())),
        }
    }

    /// Puts a dot of the brush color at `(x, y)`, in frame pixels.
    ///
    /// Does nothing before the canvas was [`fit`](Canvas::fit) to a frame.
    pub fn paint(&mut self, x: f32, y: f32) {
        if let Some(image) = &mut self.image {
            draw::circle(image, x, y)
                .radius(self.radius)
                .color(self.brush);
        }
    }

    /// Adds the canvas onto `frame`, fitting it to the frame first.
    pub fn compose(&mut self, frame: &mut Image) {
        self.fit(frame.resolution());
        if let Some(canvas) = &self.image {
            frame
                .blend_from(canvas)
                .mode(BlendMode::Additive(Self::WEIGHT));
        }
    }

    /// Erases everything painted so far.
    pub fn clear(&mut self) {
        if let Some(image) = &mut self.image {
            image.clear(Color::NULL);
        }
    }

    pub fn image(&self) -> Option<&Image> {
        self.image.as_ref()
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn black(w: u32, h: u32) -> Image {
        let mut image = Image::new(w, h);
        image.clear(Color::BLACK);
        image
    }

    #[test]
    fn canvas_is_lazy() {
        let mut canvas = Canvas::new();
        canvas.paint(5.0, 5.0);
        assert!(canvas.image().is_none());

        canvas.fit(Resolution::new(32, 24));
        let image = canvas.image().unwrap();
        assert_eq!(image.resolution(), Resolution::new(32, 24));
        assert_eq!(image.get(5, 5), Color::NULL);
    }

    #[test]
    fn paint_and_compose() {
        let mut canvas = Canvas::new();
        let mut frame = black(64, 64);
        canvas.fit(frame.resolution());
        canvas.paint(32.0, 32.0);

        let painted = canvas.image().unwrap();
        assert_eq!(painted.get(32, 32), Color::RED);
        assert_eq!(painted.get(32, 32 - 7), Color::RED);
        assert_eq!(painted.get(32, 32 - 10), Color::NULL);

        canvas.compose(&mut frame);
        assert_eq!(frame.get(32, 32), Color::from_rgb8(128, 0, 0));
        assert_eq!(frame.get(0, 0), Color::BLACK);

        // Saturates instead of wrapping.
        let mut bright = black(64, 64);
        bright.clear(Color::from_rgb8(200, 10, 10));
        canvas.compose(&mut bright);
        assert_eq!(bright.get(32, 32), Color::from_rgb8(255, 10, 10));
    }

    #[test]
    fn strokes_persist_until_cleared() {
        let mut canvas = Canvas::new();
        canvas.fit(Resolution::new(64, 64));
        canvas.paint(10.0, 10.0);
        canvas.paint(50.0, 50.0);

        let mut frame = black(64, 64);
        canvas.compose(&mut frame);
        assert_eq!(frame.get(10, 10).r(), 128);
        assert_eq!(frame.get(50, 50).r(), 128);

        canvas.clear();
        let mut frame = black(64, 64);
        canvas.compose(&mut frame);
        assert_eq!(frame.get(10, 10), Color::BLACK);
    }

    #[test]
    fn resize_recreates_canvas() {
        let mut canvas = Canvas::new();
        canvas.fit(Resolution::new(64, 64));
        canvas.paint(10.0, 10.0);
        canvas.fit(Resolution::new(64, 64));
        assert_eq!(canvas.image().unwrap().get(10, 10), Color::RED);

        let mut frame = black(32, 16);
        canvas.compose(&mut frame);
        assert_eq!(canvas.image().unwrap().resolution(), Resolution::new(32, 16));
        assert_eq!(frame.get(10, 10), Color::BLACK);
    }
}
