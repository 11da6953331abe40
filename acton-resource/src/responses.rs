//! Response builders for resource handlers
//!
//! ## Status Codes Provided
//!
//! - **200 OK** - [`Encoded`] body or empty [`Updated`]
//! - **201 Created** - [`Created`], always empty
//! - **204 No Content** - [`NoContent`] after a removal
//!
//! Bodies go through the encoder chosen during negotiation, so handlers never
//! serialize directly.

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::Value;

use crate::capability::State;
use crate::codec::Encoder;
use crate::pagination::PageLinks;
use crate::resource::{ResourceError, ResourceResult};

// ============================================================================
// 200 OK with an encoded body
// ============================================================================

/// A value rendered through the negotiated encoder
pub struct Encoded {
    encoder: Arc<dyn Encoder>,
    value: Value,
    allow: Option<Vec<Method>>,
}

impl Encoded {
    pub fn new(encoder: Arc<dyn Encoder>, value: Value) -> Self {
        Self {
            encoder,
            value,
            allow: None,
        }
    }

    /// Serialize any value, typically a [`Listing`]
    pub fn serialize(encoder: Arc<dyn Encoder>, value: &impl Serialize) -> ResourceResult<Self> {
        let value = serde_json::to_value(value)
            .map_err(|e| ResourceError::internal(format!("failed to serialize response: {e}")))?;
        Ok(Self::new(encoder, value))
    }

    /// Advertise the accepted methods alongside the body
    #[must_use]
    pub fn with_allow(mut self, methods: Vec<Method>) -> Self {
        self.allow = Some(methods);
        self
    }

    /// Encode into a 200 response
    ///
    /// Fallible where [`IntoResponse`] is not, so encoding errors stay on the
    /// resource error path.
    pub fn into_result(self) -> ResourceResult<Response> {
        let body = self.encoder.encode(&self.value)?;
        let mut response = (StatusCode::OK, body).into_response();

        if let Ok(content_type) = HeaderValue::from_str(self.encoder.content_type()) {
            response
                .headers_mut()
                .insert(header::CONTENT_TYPE, content_type);
        }
        if let Some(methods) = &self.allow {
            insert_allow(&mut response, methods);
        }

        Ok(response)
    }
}

/// The paginated listing envelope
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Listing {
    pub results: Vec<State>,
    pub prev: Option<String>,
    pub next: Option<String>,
}

impl Listing {
    pub fn new(results: Vec<State>, links: PageLinks) -> Self {
        Self {
            results,
            prev: links.prev,
            next: links.next,
        }
    }
}

// ============================================================================
// Empty successes
// ============================================================================

/// 200 OK with an empty body, after an update
#[derive(Debug, Clone, Copy)]
pub struct Updated;

impl IntoResponse for Updated {
    fn into_response(self) -> Response {
        StatusCode::OK.into_response()
    }
}

/// 201 Created with an empty body
#[derive(Debug, Clone, Copy)]
pub struct Created;

impl IntoResponse for Created {
    fn into_response(self) -> Response {
        StatusCode::CREATED.into_response()
    }
}

/// 204 No Content
#[derive(Debug, Clone, Copy)]
pub struct NoContent;

impl IntoResponse for NoContent {
    fn into_response(self) -> Response {
        StatusCode::NO_CONTENT.into_response()
    }
}

/// Set the `Allow` header to `methods`, comma separated
pub(crate) fn insert_allow(response: &mut Response, methods: &[Method]) {
    let allow = methods
        .iter()
        .map(Method::as_str)
        .collect::<Vec<_>>()
        .join(", ");

    if let Ok(value) = HeaderValue::from_str(&allow) {
        response.headers_mut().insert(header::ALLOW, value);
    }
}
