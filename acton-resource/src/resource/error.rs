//! Serializable resource errors
//!
//! Every failure raised while handling a resource request is a [`ResourceError`].
//! The set of kinds is closed: each carries a human-readable message, a structured
//! details object and a fixed HTTP status code, and all of them reach the wire in
//! the same shape:
//!
//! ```json
//! {"errorMessage": "no acceptable encoder available", "errorDetails": {"...": "..."}}
//! ```
//!
//! # Example
//!
//! ```rust
//! use acton_resource::resource::{ResourceError, ResourceErrorKind};
//! use axum::http::StatusCode;
//!
//! let error = ResourceError::missing_resource("42");
//! assert_eq!(error.kind(), ResourceErrorKind::MissingResource);
//! assert_eq!(error.status_code(), StatusCode::NOT_FOUND);
//! assert_eq!(error.details()["identifier"], "42");
//! ```

use std::fmt;

use axum::{
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
};
use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::codec::{Encoder, JsonCodec};
use crate::responses::insert_allow;

/// Result type for capability and resource operations
pub type ResourceResult<T> = std::result::Result<T, ResourceError>;

/// Category of resource error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceErrorKind {
    /// The request body's content type has no registered decoder
    UnsupportedContentType,
    /// The request carried a body but no `Content-Type`
    MissingContentType,
    /// None of the accepted content types has a registered encoder
    UnacceptableRequest,
    /// The pagination window could not be computed
    Pagination,
    /// The addressed element or child does not exist
    MissingResource,
    /// An immutable attribute was given a different value
    AttributeValueUpdate,
    /// A created element's identifier differs from the one in its path
    Identifier,
    /// The resource does not answer the request method
    MethodNotAllowed,
    /// A failure outside the taxonomy (backend fault, undecodable body)
    Fault,
}

impl fmt::Display for ResourceErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedContentType => write!(f, "unsupported_content_type"),
            Self::MissingContentType => write!(f, "missing_content_type"),
            Self::UnacceptableRequest => write!(f, "unacceptable_request"),
            Self::Pagination => write!(f, "pagination"),
            Self::MissingResource => write!(f, "missing_resource"),
            Self::AttributeValueUpdate => write!(f, "attribute_value_update"),
            Self::Identifier => write!(f, "identifier"),
            Self::MethodNotAllowed => write!(f, "method_not_allowed"),
            Self::Fault => write!(f, "fault"),
        }
    }
}

/// A failure that can be serialized to the wire
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResourceError {
    /// 415: the provided content type cannot be decoded
    #[error("no acceptable decoder available for given content type")]
    UnsupportedContentType {
        supported: Vec<String>,
        provided: String,
    },

    /// 415: the request did not say what it was sending
    #[error("request didn't specify a content type")]
    MissingContentType { supported: Vec<String> },

    /// 406: nothing we can encode is acceptable to the client
    #[error("no acceptable encoder available")]
    UnacceptableRequest {
        supported: Vec<String>,
        accepted: Vec<String>,
    },

    /// 400: bad `start`/`stop` bounds
    #[error("{0}")]
    Pagination(String),

    /// 404
    #[error("no such element {identifier}")]
    MissingResource { identifier: String },

    /// 403: an immutable attribute would change
    #[error(
        "attribute update not allowed and provided value differs from existing value, update aborted"
    )]
    AttributeValueUpdate {
        attribute: String,
        new_value: Value,
        current_value: Option<Value>,
    },

    /// 403: PUT at `/things/42` produced an element that is not `42`
    #[error("new element did not have specified identifying attribute")]
    Identifier { expected: Value, actual: Value },

    /// 405: also sets the `Allow` header
    #[error("method not allowed")]
    MethodNotAllowed { allowed: Vec<Method> },

    /// Anything the taxonomy does not cover
    #[error("{message}")]
    Fault { status: StatusCode, message: String },
}

impl ResourceError {
    pub fn unsupported_content_type(supported: Vec<String>, provided: impl Into<String>) -> Self {
        Self::UnsupportedContentType {
            supported,
            provided: provided.into(),
        }
    }

    pub fn missing_content_type(supported: Vec<String>) -> Self {
        Self::MissingContentType { supported }
    }

    pub fn unacceptable(supported: Vec<String>, accepted: Vec<String>) -> Self {
        Self::UnacceptableRequest {
            supported,
            accepted,
        }
    }

    pub fn pagination(message: impl Into<String>) -> Self {
        Self::Pagination(message.into())
    }

    pub fn missing_resource(identifier: impl Into<String>) -> Self {
        Self::MissingResource {
            identifier: identifier.into(),
        }
    }

    /// Create an attribute update error
    ///
    /// `current_value` is omitted from the details when the backing store
    /// does not know it.
    pub fn attribute_value_update(
        attribute: impl Into<String>,
        new_value: Value,
        current_value: Option<Value>,
    ) -> Self {
        Self::AttributeValueUpdate {
            attribute: attribute.into(),
            new_value,
            current_value,
        }
    }

    pub fn identifier(expected: impl Into<Value>, actual: impl Into<Value>) -> Self {
        Self::Identifier {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn method_not_allowed(allowed: Vec<Method>) -> Self {
        Self::MethodNotAllowed { allowed }
    }

    /// A fault with an explicit status
    pub fn fault(status: StatusCode, message: impl Into<String>) -> Self {
        Self::Fault {
            status,
            message: message.into(),
        }
    }

    /// A 500 fault
    pub fn internal(message: impl Into<String>) -> Self {
        Self::fault(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    #[must_use]
    pub const fn kind(&self) -> ResourceErrorKind {
        match self {
            Self::UnsupportedContentType { .. } => ResourceErrorKind::UnsupportedContentType,
            Self::MissingContentType { .. } => ResourceErrorKind::MissingContentType,
            Self::UnacceptableRequest { .. } => ResourceErrorKind::UnacceptableRequest,
            Self::Pagination(_) => ResourceErrorKind::Pagination,
            Self::MissingResource { .. } => ResourceErrorKind::MissingResource,
            Self::AttributeValueUpdate { .. } => ResourceErrorKind::AttributeValueUpdate,
            Self::Identifier { .. } => ResourceErrorKind::Identifier,
            Self::MethodNotAllowed { .. } => ResourceErrorKind::MethodNotAllowed,
            Self::Fault { .. } => ResourceErrorKind::Fault,
        }
    }

    /// Get the HTTP status code for this error
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::UnsupportedContentType { .. } | Self::MissingContentType { .. } => {
                StatusCode::UNSUPPORTED_MEDIA_TYPE
            }
            Self::UnacceptableRequest { .. } => StatusCode::NOT_ACCEPTABLE,
            Self::Pagination(_) => StatusCode::BAD_REQUEST,
            Self::MissingResource { .. } => StatusCode::NOT_FOUND,
            Self::AttributeValueUpdate { .. } | Self::Identifier { .. } => StatusCode::FORBIDDEN,
            Self::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            Self::Fault { status, .. } => *status,
        }
    }

    /// The `errorMessage` rendered on the wire
    #[must_use]
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// The `errorDetails` rendered on the wire, always a JSON object
    #[must_use]
    pub fn details(&self) -> Value {
        match self {
            Self::UnsupportedContentType {
                supported,
                provided,
            } => json!({
                "supportedContentTypes": supported,
                "providedContentType": provided,
            }),
            Self::MissingContentType { supported } => json!({
                "supportedContentTypes": supported,
            }),
            Self::UnacceptableRequest {
                supported,
                accepted,
            } => json!({
                "supportedContentTypes": supported,
                "acceptedContentTypes": accepted,
            }),
            Self::MissingResource { identifier } => json!({ "identifier": identifier }),
            Self::AttributeValueUpdate {
                attribute,
                new_value,
                current_value,
            } => {
                let mut details = Map::new();
                details.insert("attribute".to_string(), Value::String(attribute.clone()));
                details.insert("newValue".to_string(), new_value.clone());
                if let Some(current) = current_value {
                    details.insert("currentValue".to_string(), current.clone());
                }
                Value::Object(details)
            }
            Self::Identifier { expected, actual } => json!({
                "expectedIdentifyingAttribute": expected,
                "actualIdentifyingAttribute": actual,
            }),
            Self::MethodNotAllowed { allowed } => json!({
                "allowedMethods": allowed.iter().map(Method::as_str).collect::<Vec<_>>(),
            }),
            Self::Pagination(_) | Self::Fault { .. } => Value::Object(Map::new()),
        }
    }

    /// Whether the status is in the 4xx range
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }

    /// Serialize this error with the given encoder
    pub fn render(&self, encoder: &dyn Encoder) -> Response {
        let status = self.status_code();

        if self.is_client_error() {
            tracing::warn!(
                kind = %self.kind(),
                status = status.as_u16(),
                "Resource error: {}", self
            );
        } else {
            tracing::error!(
                kind = %self.kind(),
                status = status.as_u16(),
                "Resource fault: {}", self
            );
        }

        let body = encoder.encode_error(self);
        let mut response = (status, body).into_response();
        if let Ok(value) = encoder.content_type().parse() {
            response
                .headers_mut()
                .insert(header::CONTENT_TYPE, value);
        }
        if let Self::MethodNotAllowed { allowed } = self {
            insert_allow(&mut response, allowed);
        }
        response
    }
}

impl IntoResponse for ResourceError {
    fn into_response(self) -> Response {
        self.render(&JsonCodec)
    }
}

impl From<anyhow::Error> for ResourceError {
    fn from(err: anyhow::Error) -> Self {
        tracing::error!(error = ?err, "Unhandled backend failure");
        Self::internal("An internal error occurred")
    }
}
