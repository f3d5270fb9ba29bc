//! Hearth - a small hand-framed HTTP/1.1 server
//!
//! Core library: request framing, content-encoding negotiation, response
//! serialization and the fixed set of built-in endpoints.

pub mod config;
pub mod http;
pub mod routes;
pub mod server;
