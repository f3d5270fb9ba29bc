use std::net::SocketAddr;
use std::sync::Arc;

use bytes::{Buf, BytesMut};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};
use tokio::net::TcpStream;
use tracing::{debug, error, info, warn};

use crate::http::parser::{HEADER_TERMINATOR, ParseError, find_headers_end, parse_head};
use crate::http::request::Request;
use crate::http::writer::ResponseWriter;
use crate::routes::{HandlerError, Router};

/// Read size while looking for the end of the header block.
pub const HEAD_CHUNK: usize = 256;
/// Upper bound on a single read while completing a `Content-Length` body.
pub const BODY_CHUNK: usize = 512;

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("i/o error while reading request: {0}")]
    Io(#[from] std::io::Error),
    #[error("peer closed the connection before the request was complete")]
    ConnectionClosed,
    #[error("unroutable request: {0}")]
    Parse(#[from] ParseError),
}

/// Reads exactly one request from `stream`.
///
/// Bytes are accumulated until the first `CRLFCRLF`. With a `Content-Length`
/// header the body is then read to exactly that many bytes; without one the
/// body is whatever arrived alongside the header block.
///
/// A malformed header line or `Content-Length` is logged and the request is
/// returned with what was parsed so far (empty headers and/or body). Only a
/// malformed request line fails with [`FrameError::Parse`].
///
/// There is no read timeout: a peer that never completes its request keeps
/// this future pending until it disconnects.
pub async fn read_request<S>(stream: &mut S) -> Result<Request, FrameError>
where
    S: AsyncRead + Unpin,
{
    let (mut buffer, headers_end) = read_head(stream).await?;
    let head = buffer.split_to(headers_end);
    buffer.advance(HEADER_TERMINATOR.len());

    let mut request = match parse_head(&head) {
        Ok(request) => request,
        Err(partial) if partial.is_routable() => {
            warn!(
                error = %partial.error,
                path = %partial.request.path,
                "Request only partially parsed, continuing"
            );
            return Ok(partial.request);
        }
        Err(partial) => return Err(partial.error.into()),
    };

    request.body = match request.content_length() {
        Some(length) => read_body(stream, buffer.to_vec(), length).await?,
        None => buffer.to_vec(),
    };

    Ok(request)
}

async fn read_head<S>(stream: &mut S) -> Result<(BytesMut, usize), FrameError>
where
    S: AsyncRead + Unpin,
{
    let mut buffer = BytesMut::with_capacity(HEAD_CHUNK * 4);
    let mut chunk = [0u8; HEAD_CHUNK];

    loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Err(FrameError::ConnectionClosed);
        }

        // The terminator may straddle two reads.
        let search_from = buffer.len().saturating_sub(HEADER_TERMINATOR.len() - 1);
        buffer.extend_from_slice(&chunk[..n]);

        if let Some(pos) = find_headers_end(&buffer[search_from..]) {
            return Ok((buffer, search_from + pos));
        }
    }
}

async fn read_body<S>(stream: &mut S, mut body: Vec<u8>, length: usize) -> Result<Vec<u8>, FrameError>
where
    S: AsyncRead + Unpin,
{
    if body.len() >= length {
        body.truncate(length);
        return Ok(body);
    }

    // Grow only as bytes arrive; the announced length is untrusted.
    body.reserve((length - body.len()).min(BODY_CHUNK));
    let mut chunk = [0u8; BODY_CHUNK];
    while body.len() < length {
        let want = (length - body.len()).min(BODY_CHUNK);
        let n = stream.read(&mut chunk[..want]).await?;
        if n == 0 {
            return Err(FrameError::ConnectionClosed);
        }
        body.extend_from_slice(&chunk[..n]);
    }

    Ok(body)
}

/// One accepted client connection, handled start to finish by a single task.
#[derive(Debug)]
pub struct Connection<S = TcpStream> {
    stream: S,
    peer: SocketAddr,
    router: Arc<Router>,
    state: ConnectionState,
}

#[derive(Debug)]
pub enum ConnectionState {
    Reading,
    Processing(Request),
    Writing(ResponseWriter),
    Closed,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, peer: SocketAddr, router: Arc<Router>) -> Self {
        Self {
            stream,
            peer,
            router,
            state: ConnectionState::Reading,
        }
    }

    /// Reads one request, routes it, writes at most one response, then stops.
    /// The stream is closed when the connection is dropped.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        loop {
            match &mut self.state {
                ConnectionState::Reading => match read_request(&mut self.stream).await {
                    Ok(request) => {
                        debug!(
                            peer = %self.peer,
                            method = ?request.method,
                            path = %request.path,
                            body_len = request.body.len(),
                            "Request framed"
                        );
                        self.state = ConnectionState::Processing(request);
                    }
                    Err(FrameError::Io(e)) => return Err(e.into()),
                    Err(e) => {
                        warn!(peer = %self.peer, error = %e, "Dropping connection");
                        self.state = ConnectionState::Closed;
                    }
                },

                ConnectionState::Processing(request) => {
                    match self.router.dispatch(request).await {
                        Ok(response) => {
                            info!(
                                peer = %self.peer,
                                method = ?request.method,
                                path = %request.path,
                                status = response.status.as_u16(),
                                "Request handled"
                            );
                            let writer = ResponseWriter::new(&response);
                            self.state = ConnectionState::Writing(writer);
                        }
                        Err(e) => {
                            log_handler_error(self.peer, request, &e);
                            self.state = ConnectionState::Closed;
                        }
                    }
                }

                ConnectionState::Writing(writer) => {
                    writer.write_to_stream(&mut self.stream).await?;
                    self.state = ConnectionState::Closed;
                }

                ConnectionState::Closed => {
                    break;
                }
            }
        }

        Ok(())
    }
}

// Handler failures leave the client without a response.
fn log_handler_error(peer: SocketAddr, request: &Request, err: &HandlerError) {
    match err {
        HandlerError::Io(_) => error!(
            peer = %peer,
            method = ?request.method,
            path = %request.path,
            error = %err,
            "Handler failed, closing without response"
        ),
        _ => warn!(
            peer = %peer,
            method = ?request.method,
            path = %request.path,
            error = %err,
            "Request rejected, closing without response"
        ),
    }
}
