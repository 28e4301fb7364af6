use std::{
    io::{prelude::*, BufReader},
    net::{SocketAddr, TcpStream},
    sync::Arc,
    time::Duration,
};

use visiondeck::{
    project::Project,
    settings::{Settings, SharedSettings},
    ui::{hub::FrameHub, Server},
};

fn start() -> (SocketAddr, SharedSettings, FrameHub) {
    let settings = SharedSettings::new(Settings::default());
    let hub = FrameHub::new();
    let server = Server::bind(
        "127.0.0.1:0".parse().unwrap(),
        settings.clone(),
        hub.clone(),
    )
    .unwrap();
    let addr = server.local_addr().unwrap();
    server.spawn().unwrap();
    (addr, settings, hub)
}

fn connect(addr: SocketAddr) -> TcpStream {
    let stream = TcpStream::connect(addr).unwrap();
    stream
        .set_read_timeout(Some(Duration::from_secs(5)))
        .unwrap();
    stream
}

/// Sends `request` and returns the status line and the body.
fn exchange(addr: SocketAddr, request: &str) -> (String, String) {
    let mut stream = connect(addr);
    stream.write_all(request.as_bytes()).unwrap();
    let mut response = String::new();
    stream.read_to_string(&mut response).unwrap();
    let (head, body) = response.split_once("\r\n\r\n").unwrap();
    let status = head.lines().next().unwrap().to_string();
    (status, body.to_string())
}

#[test]
fn serves_page() {
    let (addr, _, _) = start();
    let (status, body) = exchange(addr, "GET / HTTP/1.1\r\nHost: localhost\r\n\r\n");
    assert_eq!(status, "HTTP/1.1 200 OK");
    assert!(body.contains("<img"), "{body}");
}

#[test]
fn reads_and_changes_settings() {
    let (addr, settings, _) = start();

    let (status, body) = exchange(addr, "GET /settings HTTP/1.1\r\n\r\n");
    assert_eq!(status, "HTTP/1.1 200 OK");
    assert_eq!(body, "project=hand-tracking\ncooldown=0.8\nshow_landmarks=true\n");

    let form = "project=gesture-media-control&cooldown=1.25";
    let (status, body) = exchange(
        addr,
        &format!(
            "POST /settings HTTP/1.1\r\nContent-Type: application/x-www-form-urlencoded\r\nContent-Length: {}\r\n\r\n{form}",
            form.len()
        ),
    );
    assert_eq!(status, "HTTP/1.1 200 OK", "{body}");
    assert_eq!(settings.get().project(), Project::GestureMediaControl);
    assert!(body.contains("cooldown=1.3\n"), "{body}");

    let (status, _) = exchange(addr, "GET /settings?show_landmarks=off HTTP/1.1\r\n\r\n");
    assert_eq!(status, "HTTP/1.1 200 OK");
    assert!(!settings.get().show_landmarks());
}

#[test]
fn error_statuses() {
    let (addr, settings, _) = start();
    let generation = settings.generation();

    let (status, _) = exchange(addr, "GET /nothing HTTP/1.1\r\n\r\n");
    assert_eq!(status, "HTTP/1.1 404 Not Found");

    let (status, _) = exchange(addr, "PUT /settings HTTP/1.1\r\n\r\n");
    assert_eq!(status, "HTTP/1.1 405 Method Not Allowed");

    let (status, _) = exchange(addr, "GET /settings?cooldown=soon HTTP/1.1\r\n\r\n");
    assert_eq!(status, "HTTP/1.1 400 Bad Request");

    let (status, _) = exchange(addr, "nonsense\r\n");
    assert_eq!(status, "HTTP/1.1 400 Bad Request");

    assert_eq!(settings.generation(), generation);
}

#[test]
fn streams_published_frames() {
    let (addr, _, hub) = start();
    let mut stream = connect(addr);
    stream.write_all(b"GET /stream HTTP/1.1\r\n\r\n").unwrap();
    let mut reader = BufReader::new(stream);

    let mut line = String::new();
    reader.read_line(&mut line).unwrap();
    assert_eq!(line, "HTTP/1.1 200 OK\r\n");
    let mut content_type = None;
    loop {
        line.clear();
        reader.read_line(&mut line).unwrap();
        if line == "\r\n" {
            break;
        }
        if let Some(value) = line.strip_prefix("Content-Type:") {
            content_type = Some(value.trim().to_string());
        }
    }
    assert_eq!(
        content_type.as_deref(),
        Some("multipart/x-mixed-replace; boundary=frame")
    );

    let jpeg: Arc<[u8]> = Arc::from(&b"\xff\xd8not really a jpeg\xff\xd9"[..]);
    hub.publish(jpeg.clone());

    line.clear();
    reader.read_line(&mut line).unwrap();
    assert_eq!(line, "--frame\r\n");
    let mut length = None;
    loop {
        line.clear();
        reader.read_line(&mut line).unwrap();
        if line == "\r\n" {
            break;
        }
        let (name, value) = line.split_once(':').unwrap();
        match name {
            "Content-Type" => assert_eq!(value.trim(), "image/jpeg"),
            "Content-Length" => length = Some(value.trim().parse::<usize>().unwrap()),
            _ => {}
        }
    }
    let mut part = vec![0; length.unwrap()];
    reader.read_exact(&mut part).unwrap();
    assert_eq!(&part[..], &jpeg[..]);
}
