use std::{
    env::{self, VarError},
    process,
};

use anyhow::{anyhow, Context};
use image::{codecs::jpeg::JpegEncoder, ColorType, ImageBuffer};
use once_cell::sync::Lazy;

use super::Image;

/// JPEG decoders the webcam path can use.
enum JpegBackend {
    /// Mozilla's libjpeg fork via the `mozjpeg` crate. Fast, but C.
    MozJpeg,
    /// The pure-Rust decoder behind the `image` crate. Slower.
    Image,
}

const DEFAULT_BACKEND: JpegBackend = JpegBackend::MozJpeg;

const BACKEND_VAR: &str = "VISIONDECK_JPEG_BACKEND";

static JPEG_BACKEND: Lazy<JpegBackend> = Lazy::new(|| match env::var(BACKEND_VAR) {
    Ok(v) if v == "mozjpeg" => JpegBackend::MozJpeg,
    Ok(v) if v == "image" => JpegBackend::Image,
    Ok(v) => {
        eprintln!("invalid value set for `{BACKEND_VAR}` variable: '{v}'; exiting");
        process::exit(1);
    }
    Err(VarError::NotPresent) => DEFAULT_BACKEND,
    Err(VarError::NotUnicode(s)) => {
        eprintln!(
            "invalid value set for `{BACKEND_VAR}` variable: {}; exiting",
            s.to_string_lossy()
        );
        process::exit(1);
    }
});

impl Image {
    /// Decodes a JFIF JPEG or a single Motion JPEG frame.
    pub fn decode_jpeg(data: &[u8]) -> anyhow::Result<Self> {
        let buf = match *JPEG_BACKEND {
            JpegBackend::Image => {
                image::load_from_memory_with_format(data, image::ImageFormat::Jpeg)?.to_rgba8()
            }
            JpegBackend::MozJpeg => {
                let mut decompress = mozjpeg::Decompress::new_mem(data)?.rgba()?;
                let (width, height) = (decompress.width(), decompress.height());
                let pixels = decompress
                    .read_scanlines_flat()
                    .ok_or_else(|| anyhow!("truncated JPEG data"))?;
                ImageBuffer::from_raw(width.try_into()?, height.try_into()?, pixels)
                    .ok_or_else(|| anyhow!("decoded JPEG does not match its {width}x{height} header"))?
            }
        };

        Ok(Self { buf })
    }

    /// Encodes the image as a baseline JPEG, dropping the alpha channel.
    ///
    /// `quality` ranges from 1 to 100.
    pub fn encode_jpeg(&self, quality: u8) -> anyhow::Result<Vec<u8>> {
        let rgb: Vec<u8> = self
            .buf
            .pixels()
            .flat_map(|p| [p.0[0], p.0[1], p.0[2]])
            .collect();
        let mut out = Vec::with_capacity(rgb.len() / 8);
        JpegEncoder::new_with_quality(&mut out, quality.clamp(1, 100))
            .encode(&rgb, self.width(), self.height(), ColorType::Rgb8)
            .with_context(|| format!("failed to encode {self:?} as JPEG"))?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use crate::image::Color;

    use super::*;

    #[test]
    fn encode_then_decode_keeps_size_and_color() {
        let mut image = Image::new(16, 8);
        image.clear(Color::RED);
        let jpeg = image.encode_jpeg(90).unwrap();
        assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);

        let decoded = Image::decode_jpeg(&jpeg).unwrap();
        assert_eq!(decoded.resolution(), image.resolution());
        let c = decoded.get(8, 4);
        assert!(c.r() > 230 && c.g() < 30 && c.b() < 30, "{c:?}");
        assert_eq!(c.a(), 255);
    }
}
