//! Encoders, decoders and content negotiation
//!
//! Resources never talk to a wire format directly. Response bodies go through an
//! [`Encoder`] picked from the request's `Accept` header, and request bodies go
//! through a [`Decoder`] picked from its `Content-Type`. Both are tagged with the
//! content type they handle and registered on a [`Codecs`] set.
//!
//! Only [`JsonCodec`] ships by default.
//!
//! # Example
//!
//! ```rust
//! use acton_resource::codec::{Codecs, JsonCodec};
//! use axum::http::{header, HeaderMap, HeaderValue};
//!
//! let codecs = Codecs::default();
//!
//! let mut headers = HeaderMap::new();
//! headers.insert(header::ACCEPT, HeaderValue::from_static("text/html, */*;q=0.1"));
//!
//! let encoder = codecs.select_encoder(&headers).unwrap();
//! assert_eq!(encoder.content_type(), "application/json");
//! ```

mod json;
mod negotiation;

use axum::body::Bytes;
use serde_json::Value;

use crate::capability::State;
use crate::resource::{ResourceError, ResourceResult};

pub use json::JsonCodec;
pub use negotiation::{parse_accept, Codecs, MediaRange, WILDCARD};

/// Turns values into response bodies
pub trait Encoder: Send + Sync {
    /// The content type this encoder produces
    fn content_type(&self) -> &str;

    /// Encode a successful response body
    fn encode(&self, value: &Value) -> ResourceResult<Bytes>;

    /// Encode an error body
    ///
    /// Errors are not serialized generically: every encoder emits the
    /// `errorMessage`/`errorDetails` pair in its own format.
    fn encode_error(&self, error: &ResourceError) -> Bytes;
}

/// Turns request bodies into element state
pub trait Decoder: Send + Sync {
    /// The content type this decoder consumes
    fn content_type(&self) -> &str;

    /// Decode a request body into a state mapping
    fn decode(&self, body: &[u8]) -> ResourceResult<State>;
}
