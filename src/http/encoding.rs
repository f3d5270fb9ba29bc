//! Response content-encoding negotiation and body compression.

use std::collections::HashMap;
use std::io::{self, Write};

use flate2::Compression;
use flate2::write::GzEncoder;
use tracing::trace;

use crate::http::response::Headers;

/// Content codings the server can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentEncoding {
    Gzip,
}

impl ContentEncoding {
    /// Matches a single `Accept-Encoding` token exactly; unsupported tokens
    /// yield `None`.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "gzip" => Some(Self::Gzip),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gzip => "gzip",
        }
    }
}

/// Negotiates the response encoding from the request's `Accept-Encoding`.
///
/// Returns `None` and leaves `response_headers` untouched when the request
/// has no `Accept-Encoding` header. Otherwise the supported tokens, in
/// request order and without duplicates, are returned and written to
/// `Content-Encoding` joined by `,`. That header is written even when no
/// token is supported, leaving it with an empty value.
pub fn select_encoding(
    request_headers: &HashMap<String, String>,
    response_headers: &mut Headers,
) -> Option<Vec<ContentEncoding>> {
    let accept = request_headers.get("Accept-Encoding")?;

    let mut accepted = Vec::new();
    for encoding in accept.split(", ").filter_map(ContentEncoding::from_token) {
        if !accepted.contains(&encoding) {
            accepted.push(encoding);
        }
    }

    let joined = accepted
        .iter()
        .map(ContentEncoding::as_str)
        .collect::<Vec<_>>()
        .join(",");
    response_headers.insert("Content-Encoding", joined);

    Some(accepted)
}

/// Encodes `data` with the first accepted encoding, or returns it unchanged
/// when nothing was negotiated.
pub fn compress(accepted: Option<&[ContentEncoding]>, data: &[u8]) -> io::Result<Vec<u8>> {
    match accepted.and_then(|a| a.first()) {
        None => Ok(data.to_vec()),
        Some(ContentEncoding::Gzip) => {
            let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(data).inspect_err(|err| {
                trace!("Error encoding gzip encoding: {}", err);
            })?;
            encoder.finish()
        }
    }
}
