//! Request tracking layers
//!
//! Request IDs are generated as UUIDs, echoed back on the response and
//! attached to the trace span; credentials are masked before anything is logged.

use axum::http::HeaderName;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    sensitive_headers::SetSensitiveRequestHeadersLayer,
};

use crate::config::RequestTrackingConfig;

/// Sensitive headers that should be masked in logs
pub const SENSITIVE_HEADERS: &[&str] = &[
    "authorization",
    "cookie",
    "set-cookie",
    "x-api-key",
    "x-auth-token",
];

const DEFAULT_REQUEST_ID_HEADER: &str = "x-request-id";

/// The configured request ID header, `x-request-id` if it does not parse
pub fn request_id_header(config: &RequestTrackingConfig) -> HeaderName {
    config.request_id_header.parse().unwrap_or_else(|_| {
        tracing::warn!(
            header = %config.request_id_header,
            "Invalid request ID header name, using x-request-id"
        );
        HeaderName::from_static(DEFAULT_REQUEST_ID_HEADER)
    })
}

/// Create a request ID layer that fills in missing IDs with a UUID
pub fn request_id_layer(header: HeaderName) -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::new(header, MakeRequestUuid)
}

/// Create a request ID propagation layer
pub fn request_id_propagation_layer(header: HeaderName) -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::new(header)
}

/// Create a sensitive headers layer
pub fn sensitive_headers_layer() -> SetSensitiveRequestHeadersLayer {
    let headers = SENSITIVE_HEADERS
        .iter()
        .map(|h| HeaderName::from_static(h))
        .collect::<Vec<_>>();

    SetSensitiveRequestHeadersLayer::new(headers)
}
