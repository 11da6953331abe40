//! HTTP surface of a [`Collection`]

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    http::Method,
    response::{IntoResponse, Response},
};
use futures::future::try_join_all;
use serde_json::Value;

use super::{Resource, ResourceError, ResourceRegistry, ResourceRequest, ResourceResult};
use crate::capability::{identifier_matches, identifier_string, AttributeSelection, Capability, Collection};
use crate::pagination::PageWindow;
use crate::responses::{Created, Encoded, Listing, NoContent};

/// Publishes a collection: listing, creation, removal and element lookup
pub struct CollectionResource {
    collection: Arc<dyn Collection>,
    registry: ResourceRegistry,
}

impl CollectionResource {
    pub fn new(collection: Arc<dyn Collection>, registry: ResourceRegistry) -> Self {
        Self {
            collection,
            registry,
        }
    }

    fn allows(&self, method: &Method) -> bool {
        self.collection.allowed_methods().contains(method)
    }

    /// Methods answered at the collection URL itself
    fn allow_header(&self) -> Vec<Method> {
        let mut methods: Vec<Method> = self
            .collection
            .allowed_methods()
            .into_iter()
            .filter(|method| *method == Method::GET || *method == Method::POST)
            .collect();
        methods.push(Method::OPTIONS);
        methods
    }

    async fn handle_collection(&self, request: &ResourceRequest) -> ResourceResult<Response> {
        let method = request.method();

        if *method == Method::OPTIONS {
            return self.describe(request).await;
        }
        if *method == Method::GET && self.allows(method) {
            return self.list(request).await;
        }
        if *method == Method::POST && self.allows(method) {
            return self.create(request, None).await;
        }

        tracing::debug!(method = %method, "Method not allowed on collection");
        Err(ResourceError::method_not_allowed(self.allow_header()))
    }

    async fn handle_child(
        &self,
        request: &ResourceRequest,
        identifier: &str,
        rest: &[String],
    ) -> ResourceResult<Response> {
        let method = request.method();
        let terminal = rest.is_empty();

        if terminal && *method == Method::DELETE {
            if !self.allows(method) {
                return Err(ResourceError::method_not_allowed(vec![Method::GET, Method::PUT]));
            }
            return self.delete(identifier).await;
        }

        match self.collection.get(identifier).await? {
            Some(element) => {
                tracing::debug!(identifier, "Delegating to element");
                self.registry
                    .adapt(Capability::Element(element))
                    .handle(request, rest)
                    .await
            }
            None if terminal && *method == Method::PUT && self.allows(method) => {
                self.create(request, Some(identifier)).await
            }
            None => Err(ResourceError::missing_resource(identifier)),
        }
    }

    async fn list(&self, request: &ResourceRequest) -> ResourceResult<Response> {
        let encoder = self.registry.codecs().select_encoder(request.headers())?;

        let window = PageWindow::from_query(
            &request.query_pairs()?,
            self.collection.page_size(),
            self.collection.max_page_size(),
        )?;

        let elements = self.collection.slice(window.start, window.stop).await?;
        let links = window.links(&request.url_without_query(), elements.len())?;

        let attrs = AttributeSelection::Only(self.collection.exposed_element_attributes());
        let results = try_join_all(elements.iter().map(|element| element.to_state(&attrs))).await?;

        tracing::debug!(
            start = window.start,
            stop = window.stop,
            returned = results.len(),
            "Listed collection"
        );

        Encoded::serialize(encoder, &Listing::new(results, links))?.into_result()
    }

    /// Decode the body into a new element and add it
    ///
    /// With `expected` set (PUT to a new identifier) the element must carry that
    /// identifier, otherwise nothing is added.
    async fn create(
        &self,
        request: &ResourceRequest,
        expected: Option<&str>,
    ) -> ResourceResult<Response> {
        let decoder = self.registry.codecs().select_decoder(request.headers())?;
        let state = decoder.decode(request.body())?;

        let element = self.collection.create_element_from_state(state).await?;
        let actual = element.identifier();

        if let Some(expected) = expected {
            if !identifier_matches(expected, &actual) {
                return Err(ResourceError::identifier(expected, actual));
            }
        }

        self.collection.add(element).await?;
        tracing::info!(identifier = %identifier_string(&actual), "Created element");

        Ok(Created.into_response())
    }

    async fn delete(&self, identifier: &str) -> ResourceResult<Response> {
        if self.collection.get(identifier).await?.is_none() {
            return Err(ResourceError::missing_resource(identifier));
        }

        self.collection.remove(identifier).await?;
        tracing::info!(identifier, "Removed element");

        Ok(NoContent.into_response())
    }

    async fn describe(&self, request: &ResourceRequest) -> ResourceResult<Response> {
        let encoder = self.registry.codecs().select_encoder(request.headers())?;
        let options: Value = self.collection.options().await?;

        Encoded::new(encoder, options)
            .with_allow(self.allow_header())
            .into_result()
    }
}

#[async_trait]
impl Resource for CollectionResource {
    async fn handle(&self, request: &ResourceRequest, path: &[String]) -> ResourceResult<Response> {
        match path.split_first() {
            None => self.handle_collection(request).await,
            Some((identifier, rest)) => self.handle_child(request, identifier, rest).await,
        }
    }
}
