//! Just enough HTTP/1.1 for the UI: request parsing, form decoding and plain responses.

use std::{
    fmt,
    io::{self, prelude::*},
};

use anyhow::{bail, Context};

/// Bodies larger than this are rejected.
const MAX_BODY_LEN: usize = 64 * 1024;
/// Requests with more header lines than this are rejected.
const MAX_HEADERS: usize = 100;
/// Longest accepted request or header line, including the line terminator.
const MAX_LINE: u64 = 8 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Other(String),
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => f.write_str("GET"),
            Method::Post => f.write_str("POST"),
            Method::Other(m) => f.write_str(m),
        }
    }
}

/// A parsed HTTP request.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    path: String,
    query: Option<String>,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl Request {
    /// Reads one request from `reader`.
    ///
    /// Fails if the connection is closed early or the request is malformed.
    pub fn read<R: BufRead>(reader: &mut R) -> anyhow::Result<Self> {
        let mut line = String::new();
        if read_line(reader, &mut line)? == 0 {
            bail!("connection closed before request line");
        }
        let mut parts = line.trim_end().split(' ');
        let (Some(method), Some(target), Some(version), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            bail!("malformed request line '{}'", line.trim_end());
        };
        if !version.starts_with("HTTP/1.") {
            bail!("unsupported HTTP version '{version}'");
        }
        let method = match method {
            "GET" => Method::Get,
            "POST" => Method::Post,
            "" => bail!("empty request method"),
            other => Method::Other(other.to_string()),
        };
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path, Some(query.to_string())),
            None => (target, None),
        };
        if !path.starts_with('/') {
            bail!("invalid request target '{target}'");
        }
        let path = path.to_string();

        let mut headers = Vec::new();
        loop {
            line.clear();
            if read_line(reader, &mut line)? == 0 {
                bail!("connection closed in request headers");
            }
            let header = line.trim_end_matches(['\r', '\n']);
            if header.is_empty() {
                break;
            }
            if headers.len() == MAX_HEADERS {
                bail!("too many request headers");
            }
            let Some((name, value)) = header.split_once(':') else {
                bail!("malformed request header '{header}'");
            };
            headers.push((name.trim().to_string(), value.trim().to_string()));
        }

        let mut request = Self {
            method,
            path: path.to_string(),
            query,
            headers,
            body: Vec::new(),
        };

        if let Some(len) = request.header("Content-Length") {
            let len: usize = len
                .parse()
                .with_context(|| format!("invalid Content-Length '{len}'"))?;
            if len > MAX_BODY_LEN {
                bail!("request body too large ({len} bytes)");
            }
            let mut body = vec![0; len];
            reader
                .read_exact(&mut body)
                .context("connection closed in request body")?;
            request.body = body;
        }

        Ok(request)
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Looks up a header, ignoring the case of its name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }
}

/// Appends one line to `line`, failing if it is longer than [`MAX_LINE`].
fn read_line<R: BufRead>(reader: &mut R, line: &mut String) -> anyhow::Result<usize> {
    let n = reader.by_ref().take(MAX_LINE).read_line(line)?;
    if n as u64 == MAX_LINE && !line.ends_with('\n') {
        bail!("request line exceeds {MAX_LINE} bytes");
    }
    Ok(n)
}

/// Decodes `application/x-www-form-urlencoded` data.
///
/// Empty pairs are skipped; a key without `=` gets an empty value.
pub fn parse_form(form: &str) -> anyhow::Result<Vec<(String, String)>> {
    form.split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            Ok((percent_decode(key)?, percent_decode(value)?))
        })
        .collect()
}

fn percent_decode(s: &str) -> anyhow::Result<String> {
    let mut out = Vec::with_capacity(s.len());
    let mut bytes = s.bytes();
    while let Some(b) = bytes.next() {
        match b {
            b'+' => out.push(b' '),
            b'%' => {
                let (Some(hi), Some(lo)) = (bytes.next(), bytes.next()) else {
                    bail!("truncated percent escape in '{s}'");
                };
                let (Some(hi), Some(lo)) = (hex_value(hi), hex_value(lo)) else {
                    bail!("invalid percent escape in '{s}'");
                };
                out.push(hi << 4 | lo);
            }
            _ => out.push(b),
        }
    }
    String::from_utf8(out).with_context(|| format!("'{s}' does not decode to UTF-8"))
}

fn hex_value(digit: u8) -> Option<u8> {
    (digit as char).to_digit(16).map(|v| v as u8)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    BadRequest,
    NotFound,
    MethodNotAllowed,
}

impl Status {
    pub fn code(&self) -> u16 {
        match self {
            Status::Ok => 200,
            Status::BadRequest => 400,
            Status::NotFound => 404,
            Status::MethodNotAllowed => 405,
        }
    }

    pub fn reason(&self) -> &'static str {
        match self {
            Status::Ok => "OK",
            Status::BadRequest => "Bad Request",
            Status::NotFound => "Not Found",
            Status::MethodNotAllowed => "Method Not Allowed",
        }
    }
}

/// A complete (non-streaming) response.
#[derive(Debug, Clone)]
pub struct Response {
    status: Status,
    content_type: &'static str,
    allow: Option<&'static str>,
    body: Vec<u8>,
}

impl Response {
    pub fn new(status: Status, content_type: &'static str, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            content_type,
            allow: None,
            body: body.into(),
        }
    }

    pub fn text(status: Status, body: impl Into<String>) -> Self {
        Self::new(status, "text/plain; charset=utf-8", body.into())
    }

    /// A 405 response listing the allowed methods.
    pub fn method_not_allowed(allow: &'static str) -> Self {
        Self {
            allow: Some(allow),
            ..Self::text(Status::MethodNotAllowed, "method not allowed\n")
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        write!(
            w,
            "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nCache-Control: no-store\r\nConnection: close\r\n",
            self.status.code(),
            self.status.reason(),
            self.content_type,
            self.body.len(),
        )?;
        if let Some(allow) = self.allow {
            write!(w, "Allow: {allow}\r\n")?;
        }
        w.write_all(b"\r\n")?;
        w.write_all(&self.body)?;
        w.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> anyhow::Result<Request> {
        Request::read(&mut raw.as_bytes())
    }

    #[test]
    fn get_with_query() {
        let req = parse("GET /settings?project=face-detection HTTP/1.1\r\nHost: x\r\n\r\n").unwrap();
        assert_eq!(req.method(), &Method::Get);
        assert_eq!(req.path(), "/settings");
        assert_eq!(req.query(), Some("project=face-detection"));
        assert_eq!(req.header("host"), Some("x"));
        assert!(req.body().is_empty());
    }

    #[test]
    fn post_with_body() {
        let req = parse(
            "POST /settings HTTP/1.1\r\ncontent-length: 12\r\n\r\ncooldown=1.5trailing",
        )
        .unwrap();
        assert_eq!(req.method(), &Method::Post);
        assert_eq!(req.body(), b"cooldown=1.5");
    }

    #[test]
    fn bare_newlines_are_accepted() {
        let req = parse("GET / HTTP/1.0\nAccept: */*\n\n").unwrap();
        assert_eq!(req.path(), "/");
        assert_eq!(req.header("Accept"), Some("*/*"));
    }

    #[test]
    fn other_methods_are_kept() {
        let req = parse("DELETE /settings HTTP/1.1\r\n\r\n").unwrap();
        assert_eq!(req.method(), &Method::Other("DELETE".into()));
    }

    #[test]
    fn malformed_requests() {
        for raw in [
            "",
            "GET /\r\n\r\n",
            "GET / HTTP/1.1 extra\r\n\r\n",
            "GET / SPDY/3\r\n\r\n",
            "GET relative HTTP/1.1\r\n\r\n",
            "GET / HTTP/1.1\r\nno colon\r\n\r\n",
            "GET / HTTP/1.1\r\nHost: x\r\n",
            "POST / HTTP/1.1\r\nContent-Length: ten\r\n\r\n",
            "POST / HTTP/1.1\r\nContent-Length: 10\r\n\r\nshort",
            "POST / HTTP/1.1\r\nContent-Length: 100000\r\n\r\n",
        ] {
            assert!(parse(raw).is_err(), "{raw:?}");
        }
    }

    #[test]
    fn overlong_lines_are_rejected() {
        let long = "a".repeat(MAX_LINE as usize);
        let err = parse(&format!("GET /{long} HTTP/1.1\r\n\r\n")).unwrap_err();
        assert!(err.to_string().contains("exceeds"), "{err}");
        let err = parse(&format!("GET / HTTP/1.1\r\nX-Pad: {long}\r\n\r\n")).unwrap_err();
        assert!(err.to_string().contains("exceeds"), "{err}");

        // A line that fills the limit exactly, terminator included, is still fine.
        let pad = "a".repeat(MAX_LINE as usize - "X: \r\n".len());
        let req = parse(&format!("GET / HTTP/1.1\r\nX: {pad}\r\n\r\n")).unwrap();
        assert_eq!(req.header("x"), Some(pad.as_str()));
    }

    #[test]
    fn form_decoding() {
        let form = parse_form("project=hand-tracking&cooldown=0.5&&clear&x=a%20b+c%2B").unwrap();
        let expected = [
            ("project", "hand-tracking"),
            ("cooldown", "0.5"),
            ("clear", ""),
            ("x", "a b c+"),
        ];
        assert_eq!(form.len(), expected.len());
        for ((k, v), (ek, ev)) in form.iter().zip(expected) {
            assert_eq!((k.as_str(), v.as_str()), (ek, ev));
        }

        assert!(parse_form("a=%2").is_err());
        assert!(parse_form("a=%zz").is_err());
        assert!(parse_form("a=%ff").is_err());
        assert!(parse_form("").unwrap().is_empty());
    }

    #[test]
    fn response_format() {
        let mut out = Vec::new();
        Response::method_not_allowed("GET, POST")
            .write_to(&mut out)
            .unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.starts_with("HTTP/1.1 405 Method Not Allowed\r\n"), "{out}");
        assert!(out.contains("Allow: GET, POST\r\n"), "{out}");
        assert!(out.contains("Content-Length: 19\r\n"), "{out}");
        assert!(out.ends_with("\r\n\r\nmethod not allowed\n"), "{out}");
    }
}
