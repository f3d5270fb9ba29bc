//! HTTP protocol engine.
//!
//! One request per connection: no keep-alive, no pipelining, no chunked
//! transfer-encoding.
//!
//! - **`connection`**: drives one accepted socket through the request-response cycle
//! - **`parser`**: parses the header block of a framed request
//! - **`request`**: HTTP request representation
//! - **`response`**: status codes, ordered headers and the response builder
//! - **`writer`**: serializes and writes responses to the client
//! - **`encoding`**: `Accept-Encoding` negotiation and gzip compression
//! - **`latin1`**: byte-transparent text conversion
//!
//! # Connection State Machine
//!
//! ```text
//!        ┌─────────────┐
//!        │   Reading   │ ← Accumulate bytes until CRLFCRLF, then the body
//!        └──────┬──────┘
//!               │ Request framed
//!               ▼
//!        ┌──────────────────┐
//!        │   Processing     │ ← Route to a handler
//!        └──────┬───────────┘
//!               │ Response ready
//!               ▼
//!        ┌──────────────────┐
//!        │    Writing       │ ← Send response to client
//!        └──────┬───────────┘
//!               │
//!               ▼
//!            Closed
//! ```

pub mod connection;
pub mod encoding;
pub mod latin1;
pub mod parser;
pub mod request;
pub mod response;
pub mod writer;
