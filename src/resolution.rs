//! Image, camera and network input resolutions.

use std::fmt;

use crate::image::Rect;

/// Size of an image in pixels (`width x height`).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Resolution {
    width: u32,
    height: u32,
}

impl Resolution {
    /// `640x480`, the capture size requested from webcams by default.
    pub const VGA: Self = Self {
        width: 640,
        height: 480,
    };

    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn num_pixels(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// Returns the reduced aspect ratio, or [`None`] if either dimension is 0.
    pub fn aspect_ratio(&self) -> Option<AspectRatio> {
        AspectRatio::new(self.width, self.height)
    }

    /// Returns the largest centered [`Rect`] inside `self` that has aspect ratio `ratio`.
    pub fn fit_aspect_ratio(&self, ratio: AspectRatio) -> Rect {
        let (w, h) = (self.width as f32, self.height as f32);
        let full = Rect::from_top_left(0.0, 0.0, w, h);
        let Some(own) = self.aspect_ratio() else {
            return full;
        };

        let rect = if ratio.as_f32() > own.as_f32() {
            // Wider than us: use the full width, letterbox top and bottom.
            let fit_h = w / ratio.as_f32();
            Rect::from_top_left(0.0, (h - fit_h) * 0.5, w, fit_h)
        } else {
            let fit_w = h * ratio.as_f32();
            Rect::from_top_left((w - fit_w) * 0.5, 0.0, fit_w, h)
        };
        log::trace!("fit {ratio} into {self} -> {rect:?}");
        rect
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl fmt::Debug for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Parses strings like `1280x720`.
impl std::str::FromStr for Resolution {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .split_once(['x', 'X'])
            .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{s}'"))?;
        let parse = |v: &str| {
            v.trim()
                .parse::<u32>()
                .map_err(|e| format!("invalid dimension '{v}': {e}"))
        };
        Ok(Self::new(parse(w)?, parse(h)?))
    }
}

/// Ratio of width to height, always stored in lowest terms.
#[derive(PartialEq, Eq, Clone, Copy)]
pub struct AspectRatio {
    width: u32,
    height: u32,
}

impl AspectRatio {
    /// 1:1, the input shape of every bundled network.
    pub const SQUARE: Self = Self {
        width: 1,
        height: 1,
    };

    /// Returns [`None`] if `width` or `height` is 0.
    pub fn new(width: u32, height: u32) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }
        let d = gcd(width, height);
        Some(Self {
            width: width / d,
            height: height / d,
        })
    }

    #[inline]
    pub fn as_f32(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.width, self.height)
    }
}

impl fmt::Debug for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gcd_reduces() {
        assert_eq!(gcd(1920, 1080), 120);
        assert_eq!(gcd(7, 13), 1);
        assert_eq!(gcd(0, 5), 5);
    }

    #[test]
    fn aspect_ratio_lowest_terms() {
        assert_eq!(AspectRatio::new(0, 480), None);
        assert_eq!(AspectRatio::new(640, 480).unwrap().to_string(), "4:3");
        assert_eq!(AspectRatio::new(256, 256), Some(AspectRatio::SQUARE));
        assert_eq!(Resolution::VGA.aspect_ratio().unwrap().as_f32(), 4.0 / 3.0);
    }

    #[test]
    fn fit_square_into_vga() {
        let rect = Resolution::VGA.fit_aspect_ratio(AspectRatio::SQUARE);
        assert_eq!(rect, Rect::from_top_left(80.0, 0.0, 480.0, 480.0));

        let wide = Resolution::new(100, 100).fit_aspect_ratio(AspectRatio::new(2, 1).unwrap());
        assert_eq!(wide, Rect::from_top_left(0.0, 25.0, 100.0, 50.0));
    }

    #[test]
    fn parse_resolution() {
        assert_eq!("1280x720".parse::<Resolution>(), Ok(Resolution::new(1280, 720)));
        assert!("1280".parse::<Resolution>().is_err());
        assert!("ax720".parse::<Resolution>().is_err());
    }
}
