//! Built-in endpoints
//!
//! Routing is by substring of the request path, evaluated in a fixed order,
//! so `/echo-user-agent/x` is an echo request. Each handler produces exactly
//! one response or an error; on error the connection closes unanswered.

pub mod files;
pub mod text;

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::http::request::{Method, Request};
use crate::http::response::Response;

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("file {0} already exists")]
    FileExists(PathBuf),
    #[error("missing request header {0}")]
    MissingHeader(&'static str),
    #[error("path has no segment after {0:?}")]
    MissingPathSegment(&'static str),
    #[error("refusing file name {0:?}")]
    InvalidFileName(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Maps framed requests onto the built-in handlers.
///
/// The files root is the only state, and it is read-only, so one router is
/// shared by every connection.
#[derive(Debug, Clone)]
pub struct Router {
    root: PathBuf,
}

impl Router {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub async fn dispatch(&self, request: &Request) -> Result<Response, HandlerError> {
        let path = request.path.as_str();

        // POSTs elsewhere fall through to the read-only routes below.
        if request.method == Method::POST && path.contains(files::MARKER) {
            return files::create_file(&self.root, request).await;
        }

        if path.contains("echo") {
            text::echo(request)
        } else if path == "/" {
            Ok(text::blank())
        } else if path.contains("user-agent") {
            text::user_agent(request)
        } else if path.contains("files") {
            files::read_file(&self.root, request).await
        } else {
            text::not_found(request)
        }
    }
}

/// The part of `path` between the first and second occurrence of `marker`.
pub(crate) fn path_segment<'a>(path: &'a str, marker: &'static str) -> Result<&'a str, HandlerError> {
    path.split(marker)
        .nth(1)
        .ok_or(HandlerError::MissingPathSegment(marker))
}
