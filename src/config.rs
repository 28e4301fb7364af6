//! Command line options.

use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::PathBuf,
};

use anyhow::bail;
use clap::Parser;

use crate::{
    media::KeyBackend, models::ModelDir, project::Project, resolution::Resolution,
    webcam::WebcamOptions,
};

pub const DEFAULT_PORT: u16 = 8501;

/// Live webcam vision demos, viewed and controlled from the browser.
#[derive(Debug, Parser)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// Port to serve the browser UI on
    #[clap(long, default_value_t = DEFAULT_PORT)]
    pub port: u16,
    /// Address to serve the browser UI on
    #[clap(long, default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
    pub bind: IpAddr,
    /// Card name of the webcam to open (overrides `VISIONDECK_WEBCAM_NAME`)
    #[clap(long)]
    pub device: Option<String>,
    /// Directory containing the ONNX models (overrides `VISIONDECK_MODEL_DIR`)
    #[clap(long)]
    pub models: Option<PathBuf>,
    /// Project to start with
    #[clap(long, default_value_t = Project::default())]
    pub project: Project,
    /// Minimum capture resolution, as `WIDTHxHEIGHT`
    #[clap(long, value_parser = parse_resolution)]
    pub resolution: Option<Resolution>,
    /// Minimum capture frame rate
    #[clap(long)]
    pub fps: Option<u32>,
    /// Log media keys instead of pressing them
    #[clap(long)]
    pub dry_run: bool,
    /// Log at trace level
    #[clap(short, long)]
    pub verbose: bool,
}

impl Args {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }

    pub fn model_dir(&self) -> ModelDir {
        ModelDir::resolve(self.models.clone())
    }

    pub fn key_backend(&self) -> KeyBackend {
        if self.dry_run {
            KeyBackend::Log
        } else {
            KeyBackend::Enigo
        }
    }

    pub fn webcam_options(&self) -> WebcamOptions {
        let mut options = WebcamOptions::default();
        if let Some(name) = &self.device {
            options = options.name(name);
        }
        if let Some(res) = self.resolution {
            options = options.resolution(res);
        }
        if let Some(fps) = self.fps {
            options = options.fps(fps);
        }
        options
    }
}

fn parse_resolution(s: &str) -> anyhow::Result<Resolution> {
    let res: Resolution = s.parse().map_err(anyhow::Error::msg)?;
    if res.num_pixels() == 0 {
        bail!("resolution '{s}' is empty");
    }
    Ok(res)
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn verify_cli() {
        Args::command().debug_assert();
    }

    #[test]
    fn defaults() {
        let args = Args::try_parse_from(["visiondeck"]).unwrap();
        assert_eq!(args.addr(), "127.0.0.1:8501".parse().unwrap());
        assert_eq!(args.project, Project::HandTracking);
        assert_eq!(args.key_backend(), KeyBackend::Enigo);
        assert!(args.resolution.is_none());
        assert!(!args.verbose);
    }

    #[test]
    fn all_options() {
        let args = Args::try_parse_from([
            "visiondeck",
            "--port=9000",
            "--bind=0.0.0.0",
            "--device=HD Webcam",
            "--models=/tmp/models",
            "--project=virtual-painter",
            "--resolution=1280x720",
            "--fps=30",
            "--dry-run",
            "-v",
        ])
        .unwrap();
        assert_eq!(args.addr(), "0.0.0.0:9000".parse().unwrap());
        assert_eq!(args.device.as_deref(), Some("HD Webcam"));
        assert_eq!(args.model_dir().path(), std::path::Path::new("/tmp/models"));
        assert_eq!(args.project, Project::VirtualPainter);
        assert_eq!(args.resolution, Some(Resolution::new(1280, 720)));
        assert_eq!(args.fps, Some(30));
        assert_eq!(args.key_backend(), KeyBackend::Log);
        assert!(args.verbose);
    }

    #[test]
    fn invalid_values() {
        for arg in [
            "--project=painter",
            "--resolution=1280",
            "--resolution=0x720",
            "--resolution=wide",
            "--port=99999",
        ] {
            assert!(Args::try_parse_from(["visiondeck", arg]).is_err(), "{arg}");
        }
    }
}
