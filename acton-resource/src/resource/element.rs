//! HTTP surface of an [`Element`]

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    http::Method,
    response::{IntoResponse, Response},
};
use serde_json::Value;

use super::{Resource, ResourceError, ResourceRegistry, ResourceRequest, ResourceResult};
use crate::capability::{AttributeSelection, Element};
use crate::responses::{Encoded, Updated};

/// Publishes one element and its named children
pub struct ElementResource {
    element: Arc<dyn Element>,
    registry: ResourceRegistry,
    children: HashMap<String, Arc<dyn Resource>>,
}

impl ElementResource {
    /// Adapt the element and, through the registry, every child it names
    pub fn new(element: Arc<dyn Element>, registry: &ResourceRegistry) -> Self {
        let mut children = HashMap::new();

        for name in element.children() {
            match element.child(&name) {
                Some(capability) => {
                    children.insert(name, registry.adapt(capability));
                }
                None => {
                    tracing::warn!(child = %name, "Element lists a child it does not provide");
                }
            }
        }

        Self {
            element,
            registry: registry.clone(),
            children,
        }
    }

    async fn get(&self, request: &ResourceRequest) -> ResourceResult<Response> {
        let encoder = self.registry.codecs().select_encoder(request.headers())?;
        let state = self.element.to_state(&AttributeSelection::All).await?;

        Encoded::new(encoder, Value::Object(state)).into_result()
    }

    async fn update(&self, request: &ResourceRequest) -> ResourceResult<Response> {
        let decoder = self.registry.codecs().select_decoder(request.headers())?;
        let state = decoder.decode(request.body())?;

        self.element.update(state).await?;
        tracing::info!(identifier = %self.element.identifier(), "Updated element");

        Ok(Updated.into_response())
    }
}

#[async_trait]
impl Resource for ElementResource {
    async fn handle(&self, request: &ResourceRequest, path: &[String]) -> ResourceResult<Response> {
        if let Some((name, rest)) = path.split_first() {
            let child = self
                .children
                .get(name)
                .ok_or_else(|| ResourceError::missing_resource(name.as_str()))?;
            return child.handle(request, rest).await;
        }

        match *request.method() {
            Method::GET => self.get(request).await,
            Method::PUT => self.update(request).await,
            _ => Err(ResourceError::method_not_allowed(vec![Method::GET, Method::PUT])),
        }
    }
}
