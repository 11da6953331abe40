//! The default JSON wire format

use axum::{body::Bytes, http::StatusCode};
use serde_json::{json, Value};

use super::{Decoder, Encoder};
use crate::capability::State;
use crate::resource::{ResourceError, ResourceResult};

pub(crate) const APPLICATION_JSON: &str = "application/json";

/// JSON encoder and decoder, tagged `application/json`
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Encoder for JsonCodec {
    fn content_type(&self) -> &str {
        APPLICATION_JSON
    }

    fn encode(&self, value: &Value) -> ResourceResult<Bytes> {
        serde_json::to_vec(value)
            .map(Bytes::from)
            .map_err(|e| ResourceError::internal(format!("failed to encode response: {e}")))
    }

    fn encode_error(&self, error: &ResourceError) -> Bytes {
        let body = json!({
            "errorMessage": error.message(),
            "errorDetails": error.details(),
        });
        serde_json::to_vec(&body).map(Bytes::from).unwrap_or_default()
    }
}

impl Decoder for JsonCodec {
    fn content_type(&self) -> &str {
        APPLICATION_JSON
    }

    fn decode(&self, body: &[u8]) -> ResourceResult<State> {
        let value: Value = serde_json::from_slice(body).map_err(|e| {
            ResourceError::fault(
                StatusCode::BAD_REQUEST,
                format!("request body is not valid JSON: {e}"),
            )
        })?;

        match value {
            Value::Object(state) => Ok(state),
            other => Err(ResourceError::fault(
                StatusCode::BAD_REQUEST,
                format!("request body must be a JSON object, got {}", json_type(&other)),
            )),
        }
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
