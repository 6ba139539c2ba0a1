//! Transport layer (HTTP).
//!
//! Converts axum requests into core `Request`s and core `Response`s back
//! into HTTP responses.

pub mod http;
