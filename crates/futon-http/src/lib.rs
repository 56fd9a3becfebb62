//! futon-http: async HTTP transport for the futon CouchDB client
//!
//! Wraps `reqwest` behind a small, connection-pooled client handle. The
//! CouchDB binding in the `futon` crate only ever needs four verbs (GET,
//! HEAD, POST, PUT) with optional JSON bodies, so that is the whole surface.
//!
//! # Architecture
//!
//! - `HttpClient`: connection-pooled async client, cheap to clone
//! - `HttpClientConfig`: builder-style configuration applied at construction
//! - `HttpResponse`: owned status/body snapshot with JSON helpers

pub mod client;
pub mod config;
pub mod error;
pub mod response;

pub use client::{HttpClient, HttpMethod};
pub use config::HttpClientConfig;
pub use error::{HttpError, HttpResult};
pub use response::HttpResponse;
