//! Content negotiation against a registered set of codecs
//!
//! Encoder selection walks the `Accept` header in the order the client wrote it
//! and returns the first registered encoder for an accepted type. `q` parameters
//! are parsed and kept on [`MediaRange`] but do not reorder the header.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use axum::http::{header, HeaderMap};

use super::{Decoder, Encoder, JsonCodec};
use crate::error::{Error, Result};
use crate::resource::{ResourceError, ResourceResult};

/// The accept-anything media range
pub const WILDCARD: &str = "*/*";

/// One entry of an `Accept` header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaRange {
    /// Content type, as written by the client
    pub content_type: String,
    /// Parameters following the content type (`q` and anything else)
    pub params: BTreeMap<String, String>,
}

impl MediaRange {
    /// The client's preference for this range, 1.0 when absent or unparsable
    #[must_use]
    pub fn quality(&self) -> f32 {
        self.params
            .get("q")
            .and_then(|q| q.parse::<f32>().ok())
            .unwrap_or(1.0)
    }
}

impl fmt::Display for MediaRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.content_type)?;
        for (key, value) in &self.params {
            write!(f, ";{}={}", key, value)?;
        }
        Ok(())
    }
}

/// Parse an `Accept` header into media ranges, keeping header order
///
/// # Example
///
/// ```rust
/// use acton_resource::codec::parse_accept;
///
/// let ranges = parse_accept("text/html, application/json;q=0.9, ,*/*;q=0.1");
/// assert_eq!(ranges.len(), 3);
/// assert_eq!(ranges[1].content_type, "application/json");
/// assert_eq!(ranges[1].quality(), 0.9);
/// ```
pub fn parse_accept(header: &str) -> Vec<MediaRange> {
    header
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut segments = part.split(';');
            let content_type = segments.next().unwrap_or_default().trim().to_string();

            let params = segments
                .map(|param| match param.split_once('=') {
                    Some((key, value)) => (key.trim().to_string(), value.trim().to_string()),
                    None => (param.trim().to_string(), String::new()),
                })
                .filter(|(key, _)| !key.is_empty())
                .collect();

            MediaRange {
                content_type,
                params,
            }
        })
        .collect()
}

/// The encoders and decoders a resource understands
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use acton_resource::codec::{Codecs, JsonCodec};
///
/// let codecs = Codecs::new(Arc::new(JsonCodec))
///     .with_encoder(Arc::new(JsonCodec))
///     .with_decoder(Arc::new(JsonCodec));
///
/// assert_eq!(codecs.encoder_types(), vec!["application/json".to_string()]);
/// ```
#[derive(Clone)]
pub struct Codecs {
    encoders: Vec<Arc<dyn Encoder>>,
    decoders: Vec<Arc<dyn Decoder>>,
    default_encoder: Arc<dyn Encoder>,
}

impl Codecs {
    /// Create an empty set that falls back to `default_encoder` for `*/*`
    pub fn new(default_encoder: Arc<dyn Encoder>) -> Self {
        Self {
            encoders: Vec::new(),
            decoders: Vec::new(),
            default_encoder,
        }
    }

    /// Register an encoder; earlier registrations win ties
    #[must_use]
    pub fn with_encoder(mut self, encoder: Arc<dyn Encoder>) -> Self {
        self.encoders.push(encoder);
        self
    }

    /// Register a decoder; earlier registrations win ties
    #[must_use]
    pub fn with_decoder(mut self, decoder: Arc<dyn Decoder>) -> Self {
        self.decoders.push(decoder);
        self
    }

    /// Make the registered encoder for `content_type` the wildcard fallback
    pub fn with_default_content_type(mut self, content_type: &str) -> Result<Self> {
        let encoder = self
            .encoders
            .iter()
            .find(|encoder| encoder.content_type().eq_ignore_ascii_case(content_type))
            .cloned()
            .ok_or_else(|| {
                Error::Internal(format!(
                    "no encoder registered for default content type {}",
                    content_type
                ))
            })?;
        self.default_encoder = encoder;
        Ok(self)
    }

    /// Content types of the registered encoders
    pub fn encoder_types(&self) -> Vec<String> {
        self.encoders
            .iter()
            .map(|encoder| encoder.content_type().to_string())
            .collect()
    }

    /// Content types of the registered decoders
    pub fn decoder_types(&self) -> Vec<String> {
        self.decoders
            .iter()
            .map(|decoder| decoder.content_type().to_string())
            .collect()
    }

    pub fn default_encoder(&self) -> &Arc<dyn Encoder> {
        &self.default_encoder
    }

    /// Pick the encoder for a response
    ///
    /// # Errors
    ///
    /// [`ResourceError::UnacceptableRequest`] when no accepted type is registered
    /// and the client did not accept `*/*`.
    pub fn select_encoder(&self, headers: &HeaderMap) -> ResourceResult<Arc<dyn Encoder>> {
        let accept = headers
            .get(header::ACCEPT)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(WILDCARD);

        let accepted: Vec<String> = parse_accept(accept)
            .into_iter()
            .map(|range| range.content_type.to_ascii_lowercase())
            .collect();

        for content_type in &accepted {
            if let Some(encoder) = self
                .encoders
                .iter()
                .find(|encoder| encoder.content_type().eq_ignore_ascii_case(content_type))
            {
                tracing::trace!(content_type = encoder.content_type(), "Selected encoder");
                return Ok(Arc::clone(encoder));
            }
        }

        if accepted.iter().any(|content_type| content_type == WILDCARD) {
            return Ok(Arc::clone(&self.default_encoder));
        }

        Err(ResourceError::unacceptable(self.encoder_types(), accepted))
    }

    /// Pick the decoder for a request body
    ///
    /// # Errors
    ///
    /// [`ResourceError::MissingContentType`] without a `Content-Type` header,
    /// [`ResourceError::UnsupportedContentType`] when no decoder matches it exactly.
    pub fn select_decoder(&self, headers: &HeaderMap) -> ResourceResult<Arc<dyn Decoder>> {
        let Some(value) = headers.get(header::CONTENT_TYPE) else {
            return Err(ResourceError::missing_content_type(self.decoder_types()));
        };
        let content_type = String::from_utf8_lossy(value.as_bytes());

        self.decoders
            .iter()
            .find(|decoder| decoder.content_type() == content_type)
            .cloned()
            .ok_or_else(|| {
                ResourceError::unsupported_content_type(self.decoder_types(), content_type)
            })
    }
}

impl Default for Codecs {
    /// JSON in, JSON out
    fn default() -> Self {
        Self::new(Arc::new(JsonCodec))
            .with_encoder(Arc::new(JsonCodec))
            .with_decoder(Arc::new(JsonCodec))
    }
}

impl fmt::Debug for Codecs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Codecs")
            .field("encoders", &self.encoder_types())
            .field("decoders", &self.decoder_types())
            .field("default_encoder", &self.default_encoder.content_type())
            .finish()
    }
}
