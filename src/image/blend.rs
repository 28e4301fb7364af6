use super::{Color, ImageView, ImageViewMut};

/// How source and destination pixels are combined by a [`Blend`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BlendMode {
    /// Replace the destination pixel with the source pixel.
    Overwrite,

    /// Draw the source in front of the destination, weighted by the source alpha.
    Alpha,

    /// Add the source color, scaled by the given weight, to the destination color, saturating at
    /// white. Alpha is left untouched.
    Additive(f32),
}

/// A pending blend of one image onto another.
///
/// Returned by [`Image::blend_from`][super::Image::blend_from] and
/// [`ImageViewMut::blend_from`]. The blend is performed when this value is dropped.
pub struct Blend<'a> {
    dest: ImageViewMut<'a>,
    src: ImageView<'a>,
    mode: BlendMode,
}

impl<'a> Blend<'a> {
    pub(super) fn new(dest: ImageViewMut<'a>, src: ImageView<'a>) -> Self {
        Self {
            dest,
            src,
            mode: BlendMode::Alpha,
        }
    }

    pub fn mode(&mut self, mode: BlendMode) -> &mut Self {
        self.mode = mode;
        self
    }
}

impl Drop for Blend<'_> {
    fn drop(&mut self) {
        let res = self.dest.resolution();
        let (sx, sy) = (
            self.src.width() / res.width() as f32,
            self.src.height() / res.height() as f32,
        );
        for y in 0..res.height() {
            for x in 0..res.width() {
                let src = self.src.sample((x as f32 + 0.5) * sx, (y as f32 + 0.5) * sy);
                let dest = self.dest.get(x, y);
                let out = match self.mode {
                    BlendMode::Overwrite => src,
                    BlendMode::Alpha => blend_alpha(dest, src),
                    BlendMode::Additive(weight) => blend_additive(dest, src, weight),
                };
                self.dest.set(x, y, out);
            }
        }
    }
}

fn blend_additive(dest: Color, src: Color, weight: f32) -> Color {
    let mut out = dest;
    for i in 0..3 {
        let sum = f32::from(dest.0[i]) + f32::from(src.0[i]) * weight;
        out.0[i] = sum.round().clamp(0.0, 255.0) as u8;
    }
    out
}

fn blend_alpha(dest: Color, src: Color) -> Color {
    let src_a = f32::from(src.a()) / 255.0;
    let dest_a = f32::from(dest.a()) / 255.0;
    let out_a = src_a + dest_a * (1.0 - src_a);
    if out_a <= 0.0 {
        return Color::NULL;
    }

    let mut out = [0; 4];
    for i in 0..3 {
        let s = srgb_to_linear(src.0[i]);
        let d = srgb_to_linear(dest.0[i]);
        out[i] = linear_to_srgb((s * src_a + d * dest_a * (1.0 - src_a)) / out_a);
    }
    out[3] = (out_a * 255.0).round() as u8;
    Color(out)
}

fn srgb_to_linear(c: u8) -> f32 {
    let c = f32::from(c) / 255.0;
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

fn linear_to_srgb(c: f32) -> u8 {
    let c = if c <= 0.0031308 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    };
    (c * 255.0).round().clamp(0.0, 255.0) as u8
}
