use std::collections::HashMap;

use thiserror::Error;

use crate::http::latin1;
use crate::http::request::{Method, Request};

/// Separates the header block from the body.
pub const HEADER_TERMINATOR: &[u8] = b"\r\n\r\n";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("malformed request line {0:?}")]
    MalformedRequestLine(String),
    #[error("malformed header line {0:?}")]
    MalformedHeader(String),
    #[error("invalid Content-Length {0:?}")]
    InvalidContentLength(String),
}

/// A request head that only parsed in part.
///
/// `request` carries everything parsed before `error` was hit; later fields
/// keep their empty defaults.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct PartialRequest {
    pub request: Request,
    pub error: ParseError,
}

impl PartialRequest {
    /// Whether the request line survived, i.e. the request can still be routed.
    pub fn is_routable(&self) -> bool {
        !matches!(self.error, ParseError::MalformedRequestLine(_))
    }
}

/// Offset of the first `CRLFCRLF` in `buf`.
pub fn find_headers_end(buf: &[u8]) -> Option<usize> {
    buf.windows(HEADER_TERMINATOR.len())
        .position(|w| w == HEADER_TERMINATOR)
}

/// Parses a header block (request line plus header lines, without the
/// trailing `CRLFCRLF`). The body is filled in by the caller.
pub fn parse_head(head: &[u8]) -> Result<Request, PartialRequest> {
    let text = latin1::decode(head);
    let mut lines = text.split("\r\n");
    let mut request = Request::default();

    // Request line: three tokens separated by single spaces. Extra tokens are ignored.
    let request_line = lines.next().unwrap_or_default();
    let mut parts = request_line.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(method), Some(path), Some(version)) => {
            request.method = Method::parse(method);
            request.path = path.to_string();
            request.version = version.to_string();
        }
        _ => {
            return Err(PartialRequest {
                request,
                error: ParseError::MalformedRequestLine(request_line.to_string()),
            });
        }
    }

    let mut headers = HashMap::new();
    for line in lines {
        let Some((key, value)) = line.split_once(": ") else {
            return Err(PartialRequest {
                request,
                error: ParseError::MalformedHeader(line.to_string()),
            });
        };
        headers.insert(key.to_string(), value.to_string());
    }
    request.headers = headers;

    // Any integer is accepted; a negative length just means no further reads.
    if let Some(value) = request.header("Content-Length") {
        if value.trim().parse::<i128>().is_err() {
            let error = ParseError::InvalidContentLength(value.to_string());
            return Err(PartialRequest { request, error });
        }
    }

    Ok(request)
}
