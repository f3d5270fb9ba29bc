use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::http::encoding::{compress, select_encoding};
use crate::http::request::Request;
use crate::http::response::{Headers, Response, ResponseBuilder, StatusCode};
use crate::routes::{HandlerError, path_segment};

pub const MARKER: &str = "/files/";

/// Joins `name` under `root`, refusing anything but plain relative
/// components (`..`, absolute paths and the empty name are rejected).
pub fn resolve(root: &Path, name: &str) -> Result<PathBuf, HandlerError> {
    let relative = Path::new(name);
    let mut components = relative.components().peekable();
    let plain = components.peek().is_some()
        && components.all(|c| matches!(c, Component::Normal(_)));

    if !plain {
        return Err(HandlerError::InvalidFileName(name.to_string()));
    }
    Ok(root.join(relative))
}

/// `GET /files/{name}`: the raw file content, or a bare 404 when there is
/// no such file.
pub async fn read_file(root: &Path, request: &Request) -> Result<Response, HandlerError> {
    let name = path_segment(&request.path, MARKER)?;
    let file_path = match resolve(root, name) {
        Ok(p) => p,
        Err(e) => {
            warn!(error = %e, "Treating unsafe file name as missing");
            return Ok(Response::not_found());
        }
    };

    let content = match tokio::fs::read(&file_path).await {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %file_path.display(), "File not found");
            return Ok(Response::not_found());
        }
        Err(e) => return Err(e.into()),
    };

    let mut headers = Headers::new();
    headers.insert("Content-Type", "application/octet-stream");
    let accepted = select_encoding(&request.headers, &mut headers);
    let body = compress(accepted.as_deref(), &content)?;

    Ok(ResponseBuilder::new(StatusCode::Ok)
        .headers(headers)
        .sized_body(body)
        .build())
}

/// `POST /files/{name}`: stores the request body in a new file. An existing
/// file is never overwritten.
pub async fn create_file(root: &Path, request: &Request) -> Result<Response, HandlerError> {
    let name = path_segment(&request.path, MARKER)?;
    let file_path = resolve(root, name)?;

    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&file_path)
        .await
        .map_err(|e| match e.kind() {
            ErrorKind::AlreadyExists => HandlerError::FileExists(file_path.clone()),
            _ => HandlerError::Io(e),
        })?;

    file.write_all(&request.body).await?;
    file.flush().await?;

    debug!(path = %file_path.display(), bytes = request.body.len(), "File created");
    Ok(Response::created())
}
