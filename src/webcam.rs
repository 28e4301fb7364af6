//! V4L2 webcam capture.
//!
//! Only `VIDEO_CAPTURE` devices that deliver JPEG or Motion JPEG frames are supported.

use std::{cmp::Reverse, env, fmt};

use anyhow::bail;
use linuxvideo::{
    format::{FrameIntervals, FrameSizes, PixFormat, Pixelformat},
    stream::ReadStream,
    BufType, CapabilityFlags, Device, Fract,
};
use once_cell::sync::Lazy;

use crate::{image::Image, num::TotalF32, resolution::Resolution, timer::Timer};

const WEBCAM_NAME_VAR: &str = "VISIONDECK_WEBCAM_NAME";

static WEBCAM_NAME: Lazy<Option<String>> = Lazy::new(|| {
    let name = env::var(WEBCAM_NAME_VAR).ok()?;
    log::debug!("webcam override: `{WEBCAM_NAME_VAR}` is set to '{name}'");
    Some(name)
});

/// Which device to open, and the frame format to ask it for.
#[derive(Debug, Default, Clone)]
pub struct WebcamOptions {
    name: Option<String>,
    resolution: Option<Resolution>,
    fps: Option<u32>,
}

impl WebcamOptions {
    /// Only opens the device whose card name is `name`.
    ///
    /// Takes precedence over `VISIONDECK_WEBCAM_NAME`.
    pub fn name(self, name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..self
        }
    }

    /// Asks for at least this resolution. Smaller formats are used if the camera has none.
    pub fn resolution(self, resolution: Resolution) -> Self {
        Self {
            resolution: Some(resolution),
            ..self
        }
    }

    /// Asks for at least this frame rate. Slower formats are used if the camera has none.
    pub fn fps(self, fps: u32) -> Self {
        Self {
            fps: Some(fps),
            ..self
        }
    }

    fn device_name(&self) -> Option<&str> {
        self.name.as_deref().or(WEBCAM_NAME.as_deref())
    }
}

#[derive(Clone, Copy, PartialEq)]
struct FrameFormat {
    resolution: Resolution,
    interval: Fract,
}

impl FrameFormat {
    fn fps(&self) -> f32 {
        1.0 / self.interval.as_f32()
    }
}

impl fmt::Debug for FrameFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {:.1}Hz", self.resolution, self.fps())
    }
}

/// Picks the largest format that satisfies the resolution and frame rate requests, at its
/// highest frame rate.
///
/// If no format satisfies both, the frame rate request is dropped first, then the resolution
/// request.
fn pick_format(
    formats: &[FrameFormat],
    mut resolution: Option<Resolution>,
    mut fps: Option<u32>,
) -> Option<FrameFormat> {
    loop {
        let best = formats
            .iter()
            .filter(|fmt| {
                resolution.map_or(true, |res| {
                    fmt.resolution.width() >= res.width() && fmt.resolution.height() >= res.height()
                }) && fps.map_or(true, |fps| fmt.fps().round() >= fps as f32)
            })
            .min_by_key(|fmt| {
                // Smallest sufficient resolution when one was requested, largest otherwise.
                let pixels = fmt.resolution.num_pixels();
                let size_key = match resolution {
                    Some(_) => pixels as i64,
                    None => -(pixels as i64),
                };
                (size_key, Reverse(TotalF32(fmt.fps())))
            })
            .copied();
        if best.is_some() {
            return best;
        }
        log::debug!("no webcam format for {resolution:?} @ {fps:?} FPS, relaxing");
        if fps.take().is_none() && resolution.take().is_none() {
            return None;
        }
    }
}

fn supported_formats(device: &Device) -> anyhow::Result<(Pixelformat, Vec<FrameFormat>)> {
    let mut pixel_format = None;
    for format in device.formats(BufType::VIDEO_CAPTURE) {
        let format = format?;
        if matches!(format.pixelformat(), Pixelformat::JPEG | Pixelformat::MJPG) {
            pixel_format = Some(format.pixelformat());
            break;
        }
    }
    let Some(pixel_format) = pixel_format else {
        bail!("device does not support JPEG or MJPG capture");
    };

    let sizes = match device.frame_sizes(pixel_format)? {
        FrameSizes::Discrete(sizes) => sizes,
        FrameSizes::Stepwise(_) | FrameSizes::Continuous(_) => {
            bail!("stepwise or continuous resolutions are not supported");
        }
    };
    let mut formats = Vec::new();
    for size in sizes {
        let intervals = match device.frame_intervals(pixel_format, size.width(), size.height())? {
            FrameIntervals::Discrete(intervals) => intervals,
            FrameIntervals::Stepwise(_) | FrameIntervals::Continuous(_) => {
                bail!("stepwise or continuous frame rates are not supported")
            }
        };
        for interval in intervals {
            formats.push(FrameFormat {
                resolution: Resolution::new(size.width(), size.height()),
                interval: *interval.fract(),
            });
        }
    }
    Ok((pixel_format, formats))
}

/// A webcam producing decoded [`Image`]s.
pub struct Webcam {
    stream: ReadStream,
    resolution: Resolution,
    t_dequeue: Timer,
    t_decode: Timer,
}

impl Webcam {
    /// Opens the requested webcam, or the first usable one if no name was given.
    ///
    /// This can block for hundreds of milliseconds while the camera initializes.
    pub fn open(options: WebcamOptions) -> anyhow::Result<Self> {
        for res in linuxvideo::list()? {
            match res {
                Ok(dev) => match Self::open_impl(dev, &options) {
                    Ok(Some(webcam)) => return Ok(webcam),
                    Ok(None) => {}
                    Err(e) => log::debug!("skipping device: {e}"),
                },
                Err(e) => log::warn!("{e}"),
            }
        }

        match options.device_name() {
            Some(name) => bail!("no supported webcam named '{name}' found"),
            None => bail!("no supported webcam found"),
        }
    }

    fn open_impl(dev: Device, options: &WebcamOptions) -> anyhow::Result<Option<Self>> {
        let caps = dev.capabilities()?;
        if let Some(name) = options.device_name() {
            if caps.card() != name {
                return Ok(None);
            }
        }

        let flags = caps.device_capabilities();
        let path = dev.path()?;
        log::debug!("device {} ({}): {flags:?}", caps.card(), path.display());
        if !flags.contains(CapabilityFlags::VIDEO_CAPTURE) {
            return Ok(None);
        }

        let (pixel_format, formats) = supported_formats(&dev)?;
        let Some(format) = pick_format(&formats, options.resolution, options.fps) else {
            bail!("{} offers no usable frame formats", caps.card());
        };

        let capture = dev.video_capture(PixFormat::new(
            format.resolution.width(),
            format.resolution.height(),
            pixel_format,
        ))?;
        let actual = capture.format();
        let resolution = Resolution::new(actual.width(), actual.height());
        let interval = capture.set_frame_interval(format.interval)?;

        log::info!(
            "opened {} ({}), {resolution} @ {:.1}Hz",
            caps.card(),
            path.display(),
            1.0 / interval.as_f32(),
        );

        Ok(Some(Self {
            stream: capture.into_stream(2)?,
            resolution,
            t_dequeue: Timer::new("dequeue"),
            t_decode: Timer::new("decode"),
        }))
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Blocks until the next frame is available and decodes it.
    ///
    /// Frames that fail to decode are replaced with a blank image; device errors are returned.
    pub fn read(&mut self) -> anyhow::Result<Image> {
        let dequeue_guard = self.t_dequeue.start();
        let (t_decode, res) = (&mut self.t_decode, self.resolution);
        self.stream
            .dequeue(|buf| {
                drop(dequeue_guard);
                let image = match t_decode.time(|| Image::decode_jpeg(&buf)) {
                    Ok(image) => image,
                    Err(e) => {
                        // USB transfers occasionally corrupt MJPG frames.
                        log::error!("webcam decode error: {e}");
                        Image::new(res.width(), res.height())
                    }
                };
                Ok(image)
            })
            .map_err(Into::into)
    }

    pub fn timers(&self) -> [&Timer; 2] {
        [&self.t_dequeue, &self.t_decode]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fmt(w: u32, h: u32, fps: u32) -> FrameFormat {
        FrameFormat {
            resolution: Resolution::new(w, h),
            interval: Fract::new(1, fps),
        }
    }

    fn formats() -> Vec<FrameFormat> {
        vec![
            fmt(640, 480, 30),
            fmt(640, 480, 60),
            fmt(1280, 720, 30),
            fmt(1920, 1080, 15),
        ]
    }

    #[test]
    fn picks_smallest_sufficient_resolution_at_highest_rate() {
        let picked = pick_format(&formats(), Some(Resolution::new(640, 480)), None).unwrap();
        assert_eq!(picked, fmt(640, 480, 60));
    }

    #[test]
    fn respects_frame_rate() {
        let picked = pick_format(&formats(), Some(Resolution::new(1280, 720)), Some(30)).unwrap();
        assert_eq!(picked, fmt(1280, 720, 30));
    }

    #[test]
    fn relaxes_fps_first() {
        let picked = pick_format(&formats(), Some(Resolution::new(1920, 1080)), Some(30)).unwrap();
        assert_eq!(picked, fmt(1920, 1080, 15));
    }

    #[test]
    fn unconstrained_picks_largest() {
        assert_eq!(
            pick_format(&formats(), None, None).unwrap(),
            fmt(1920, 1080, 15)
        );
        assert_eq!(pick_format(&[], None, None), None);
    }
}
