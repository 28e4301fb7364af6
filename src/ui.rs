//! Browser UI: a settings sidebar next to a live MJPEG stream of the processed frames.
//!
//! The server speaks plain HTTP/1.1 and handles every connection on its own thread. Each
//! response closes the connection.

pub mod http;
pub mod hub;

use std::{
    io::{self, prelude::*, BufReader, BufWriter},
    net::{SocketAddr, TcpListener, TcpStream},
    sync::Arc,
    thread::{self, JoinHandle},
    time::Duration,
};

use anyhow::Context;

use crate::{
    image::Image,
    settings::SharedSettings,
    timer::{FpsCounter, Timer},
    worker::Worker,
};

use self::{
    http::{Method, Request, Response, Status},
    hub::FrameHub,
};

const INDEX_HTML: &str = include_str!("ui/index.html");
const BOUNDARY: &str = "frame";
const JPEG_QUALITY: u8 = 80;
const READ_TIMEOUT: Duration = Duration::from_secs(10);
const WRITE_TIMEOUT: Duration = Duration::from_secs(10);

/// What to send back for a request.
#[derive(Debug)]
pub enum Reply {
    Response(Response),
    /// Stream frames from the [`FrameHub`] until the client goes away.
    Stream,
}

/// Computes the reply to `req`, applying settings changes it carries.
pub fn route(req: &Request, settings: &SharedSettings) -> Reply {
    match (req.path(), req.method()) {
        ("/", Method::Get) => Reply::Response(Response::new(
            Status::Ok,
            "text/html; charset=utf-8",
            INDEX_HTML,
        )),
        ("/stream", Method::Get) => Reply::Stream,
        ("/settings", Method::Get) => match req.query() {
            Some(query) => Reply::Response(apply_form(query, settings)),
            None => Reply::Response(Response::text(Status::Ok, settings.get().to_string())),
        },
        ("/settings", Method::Post) => {
            let response = match std::str::from_utf8(req.body()) {
                Ok(body) => apply_form(body, settings),
                Err(_) => Response::text(Status::BadRequest, "request body is not UTF-8\n"),
            };
            Reply::Response(response)
        }
        ("/" | "/stream", _) => Reply::Response(Response::method_not_allowed("GET")),
        ("/settings", _) => Reply::Response(Response::method_not_allowed("GET, POST")),
        _ => Reply::Response(Response::text(Status::NotFound, "not found\n")),
    }
}

fn apply_form(form: &str, settings: &SharedSettings) -> Response {
    let result = http::parse_form(form).and_then(|fields| {
        settings.apply(fields.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    });
    match result {
        Ok(()) => Response::text(Status::Ok, settings.get().to_string()),
        Err(e) => {
            log::debug!("rejected settings '{form}': {e:#}");
            Response::text(Status::BadRequest, format!("{e:#}\n"))
        }
    }
}

/// The HTTP server serving the UI page, the stream and the settings endpoint.
pub struct Server {
    listener: TcpListener,
    settings: SharedSettings,
    hub: FrameHub,
}

impl Server {
    pub fn bind(addr: SocketAddr, settings: SharedSettings, hub: FrameHub) -> anyhow::Result<Self> {
        let listener =
            TcpListener::bind(addr).with_context(|| format!("failed to bind to {addr}"))?;
        Ok(Self {
            listener,
            settings,
            hub,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Runs the server on a background thread.
    pub fn spawn(self) -> io::Result<JoinHandle<()>> {
        thread::Builder::new()
            .name("http".into())
            .spawn(move || self.run())
    }

    /// Accepts connections forever.
    pub fn run(self) {
        for conn in self.listener.incoming() {
            let stream = match conn {
                Ok(stream) => stream,
                Err(e) => {
                    log::warn!("failed to accept connection: {e}");
                    continue;
                }
            };
            let settings = self.settings.clone();
            let hub = self.hub.clone();
            let spawned = thread::Builder::new()
                .name("http-conn".into())
                .spawn(move || {
                    let peer = stream.peer_addr().ok();
                    if let Err(e) = handle_connection(stream, &settings, &hub) {
                        log::debug!("connection from {peer:?} ended: {e:#}");
                    }
                });
            if let Err(e) = spawned {
                log::error!("failed to spawn connection thread: {e}");
            }
        }
    }
}

fn handle_connection(
    stream: TcpStream,
    settings: &SharedSettings,
    hub: &FrameHub,
) -> anyhow::Result<()> {
    stream.set_read_timeout(Some(READ_TIMEOUT))?;
    stream.set_write_timeout(Some(WRITE_TIMEOUT))?;
    let mut writer = BufWriter::new(stream.try_clone()?);
    let mut reader = BufReader::new(stream);

    let req = match Request::read(&mut reader) {
        Ok(req) => req,
        Err(e) => {
            Response::text(Status::BadRequest, format!("{e:#}\n")).write_to(&mut writer)?;
            return Err(e);
        }
    };
    log::trace!("{} {}", req.method(), req.path());

    match route(&req, settings) {
        Reply::Response(response) => response.write_to(&mut writer)?,
        Reply::Stream => stream_frames(&mut writer, hub)?,
    }
    Ok(())
}

fn stream_frames<W: Write>(w: &mut W, hub: &FrameHub) -> io::Result<()> {
    write!(
        w,
        "HTTP/1.1 200 OK\r\nContent-Type: multipart/x-mixed-replace; boundary={BOUNDARY}\r\nCache-Control: no-store\r\nConnection: close\r\n\r\n"
    )?;
    w.flush()?;

    let frames = hub.subscribe();
    log::debug!("stream client connected ({} total)", hub.client_count());
    for frame in frames {
        write!(
            w,
            "--{BOUNDARY}\r\nContent-Type: image/jpeg\r\nContent-Length: {}\r\n\r\n",
            frame.len()
        )?;
        w.write_all(&frame)?;
        w.write_all(b"\r\n")?;
        w.flush()?;
    }
    Ok(())
}

/// Starts a worker that JPEG-encodes frames and publishes them to `hub`.
///
/// Frames sent while the worker is still encoding the previous one should be dropped with
/// [`Worker::try_send`].
pub fn spawn_encoder(hub: FrameHub) -> io::Result<Worker<Image>> {
    let mut t_encode = Timer::new("encode");
    let mut fps = FpsCounter::new("encoder");
    Worker::builder()
        .name("jpeg encoder")
        .capacity(1)
        .spawn(move |image: Image| {
            let encoded = t_encode.time(|| image.encode_jpeg(JPEG_QUALITY));
            match encoded {
                Ok(jpeg) => hub.publish(Arc::from(jpeg)),
                Err(e) => log::error!("failed to encode frame: {e:#}"),
            }
            fps.tick_with([&t_encode]);
        })
}

#[cfg(test)]
mod tests {
    use crate::{project::Project, settings::Settings};

    use super::*;

    fn request(raw: &str) -> Request {
        Request::read(&mut raw.as_bytes()).unwrap()
    }

    fn respond(raw: &str, settings: &SharedSettings) -> Response {
        match route(&request(raw), settings) {
            Reply::Response(r) => r,
            Reply::Stream => panic!("unexpected stream reply for {raw:?}"),
        }
    }

    fn body(response: &Response) -> &str {
        std::str::from_utf8(response.body()).unwrap()
    }

    #[test]
    fn index_lists_every_project() {
        let settings = SharedSettings::new(Settings::default());
        let resp = respond("GET / HTTP/1.1\r\n\r\n", &settings);
        assert_eq!(resp.status(), Status::Ok);
        for project in Project::ALL {
            assert!(body(&resp).contains(project.slug()), "{project}");
        }
        assert!(body(&resp).contains("/stream"));
    }

    #[test]
    fn stream_route() {
        let settings = SharedSettings::new(Settings::default());
        assert!(matches!(
            route(&request("GET /stream HTTP/1.1\r\n\r\n"), &settings),
            Reply::Stream
        ));
        let resp = respond("POST /stream HTTP/1.1\r\n\r\n", &settings);
        assert_eq!(resp.status(), Status::MethodNotAllowed);
    }

    #[test]
    fn settings_via_query_and_body() {
        let settings = SharedSettings::new(Settings::default());

        let resp = respond("GET /settings HTTP/1.1\r\n\r\n", &settings);
        assert_eq!(resp.status(), Status::Ok);
        assert!(body(&resp).contains("project=hand-tracking\n"));

        let resp = respond(
            "GET /settings?project=virtual-painter&clear HTTP/1.1\r\n\r\n",
            &settings,
        );
        assert_eq!(resp.status(), Status::Ok);
        assert_eq!(settings.get().project(), Project::VirtualPainter);
        assert!(settings.take_clear_request());

        let resp = respond(
            "POST /settings HTTP/1.1\r\nContent-Length: 33\r\n\r\ncooldown=1.5&show_landmarks=false",
            &settings,
        );
        assert_eq!(resp.status(), Status::Ok, "{}", body(&resp));
        assert!(body(&resp).contains("cooldown=1.5\n"));
        assert!(!settings.get().show_landmarks());
    }

    #[test]
    fn invalid_settings_are_rejected() {
        let settings = SharedSettings::new(Settings::default());
        let generation = settings.generation();
        for raw in [
            "GET /settings?project=nope HTTP/1.1\r\n\r\n",
            "GET /settings?cooldown=fast HTTP/1.1\r\n\r\n",
            "GET /settings?volume=11 HTTP/1.1\r\n\r\n",
            "GET /settings?project=%zz HTTP/1.1\r\n\r\n",
        ] {
            let resp = respond(raw, &settings);
            assert_eq!(resp.status(), Status::BadRequest, "{raw:?}");
        }
        assert_eq!(settings.generation(), generation);
    }

    #[test]
    fn unknown_routes() {
        let settings = SharedSettings::new(Settings::default());
        let resp = respond("GET /favicon.ico HTTP/1.1\r\n\r\n", &settings);
        assert_eq!(resp.status(), Status::NotFound);
        let resp = respond("DELETE /settings HTTP/1.1\r\n\r\n", &settings);
        assert_eq!(resp.status(), Status::MethodNotAllowed);
    }
}
