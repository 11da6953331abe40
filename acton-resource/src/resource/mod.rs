//! Resources: capabilities adapted to HTTP
//!
//! A [`Resource`] consumes the remaining path segments of a request and either
//! answers it or hands the rest of the path to a nested resource. Collections
//! and elements are adapted through a [`ResourceRegistry`], which maps each
//! capability kind to a builder function:
//!
//! ```text
//! /things            -> CollectionResource  (list, create, options)
//! /things/42         -> ElementResource     (get, update)
//! /things/42/parts   -> child of element 42, collection or element
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use acton_resource::capability::Capability;
//! use acton_resource::resource::{ResourceRegistry, ResourceRequest};
//! use axum::http::Method;
//!
//! let registry = ResourceRegistry::default();
//! let root = registry.adapt(Capability::collection(things));
//!
//! let request = ResourceRequest::new(Method::GET, "/things".parse()?)
//!     .with_base_url("http://localhost:8080");
//! let response = root.handle(&request, &[]).await?;
//! ```

mod collection;
mod element;
mod error;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Bytes,
    http::{header::HeaderName, HeaderMap, HeaderValue, Method, StatusCode, Uri},
    response::Response,
};

pub use collection::CollectionResource;
pub use element::ElementResource;
pub use error::{ResourceError, ResourceErrorKind, ResourceResult};

use crate::capability::{Capability, Collection, Element};
use crate::codec::Codecs;

/// The parts of an HTTP request a resource looks at
///
/// Built once per request by the router; resolved encoders and decoders are
/// passed to operations as arguments and never stored here.
#[derive(Debug, Clone)]
pub struct ResourceRequest {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
    base_url: String,
}

impl ResourceRequest {
    /// `uri` is the full request URI (path and query) as the client sent it
    pub fn new(method: Method, uri: Uri) -> Self {
        Self {
            method,
            uri,
            headers: HeaderMap::new(),
            body: Bytes::new(),
            base_url: String::new(),
        }
    }

    #[must_use]
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Scheme and authority used for generated links, e.g. `http://localhost:8080`
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Decoded query pairs in the order they appear, duplicates kept
    ///
    /// # Errors
    ///
    /// A 400 fault when the query string cannot be decoded.
    pub fn query_pairs(&self) -> ResourceResult<Vec<(String, String)>> {
        let query = self.uri.query().unwrap_or_default();
        serde_urlencoded::from_str(query).map_err(|e| {
            ResourceError::fault(StatusCode::BAD_REQUEST, format!("malformed query string: {e}"))
        })
    }

    /// The request URL with its query removed
    pub fn url_without_query(&self) -> String {
        format!("{}{}", self.base_url, self.uri.path())
    }
}

/// Something that answers requests for a subtree of the URL space
#[async_trait]
pub trait Resource: Send + Sync {
    /// Answer `request`, where `path` holds the segments not yet consumed
    async fn handle(&self, request: &ResourceRequest, path: &[String]) -> ResourceResult<Response>;
}

type CollectionBuilder =
    Arc<dyn Fn(Arc<dyn Collection>, &ResourceRegistry) -> Arc<dyn Resource> + Send + Sync>;
type ElementBuilder =
    Arc<dyn Fn(Arc<dyn Element>, &ResourceRegistry) -> Arc<dyn Resource> + Send + Sync>;

/// Maps capability kinds to the resources that publish them
///
/// Cheap to clone; every resource in a tree keeps a handle to the same
/// registry and codecs.
#[derive(Clone)]
pub struct ResourceRegistry {
    codecs: Arc<Codecs>,
    collection_builder: CollectionBuilder,
    element_builder: ElementBuilder,
}

impl ResourceRegistry {
    /// Registry with the stock collection and element resources
    pub fn new(codecs: Codecs) -> Self {
        Self {
            codecs: Arc::new(codecs),
            collection_builder: Arc::new(collection_resource),
            element_builder: Arc::new(element_resource),
        }
    }

    /// Replace the resource used for collections
    #[must_use]
    pub fn with_collection_builder<F>(mut self, builder: F) -> Self
    where
        F: Fn(Arc<dyn Collection>, &ResourceRegistry) -> Arc<dyn Resource> + Send + Sync + 'static,
    {
        self.collection_builder = Arc::new(builder);
        self
    }

    /// Replace the resource used for elements
    #[must_use]
    pub fn with_element_builder<F>(mut self, builder: F) -> Self
    where
        F: Fn(Arc<dyn Element>, &ResourceRegistry) -> Arc<dyn Resource> + Send + Sync + 'static,
    {
        self.element_builder = Arc::new(builder);
        self
    }

    pub fn codecs(&self) -> &Codecs {
        &self.codecs
    }

    /// Build the resource for a capability
    pub fn adapt(&self, capability: Capability) -> Arc<dyn Resource> {
        match capability {
            Capability::Collection(collection) => (self.collection_builder)(collection, self),
            Capability::Element(element) => (self.element_builder)(element, self),
        }
    }
}

fn collection_resource(
    collection: Arc<dyn Collection>,
    registry: &ResourceRegistry,
) -> Arc<dyn Resource> {
    Arc::new(CollectionResource::new(collection, registry.clone()))
}

fn element_resource(element: Arc<dyn Element>, registry: &ResourceRegistry) -> Arc<dyn Resource> {
    Arc::new(ElementResource::new(element, registry))
}

impl Default for ResourceRegistry {
    fn default() -> Self {
        Self::new(Codecs::default())
    }
}

impl fmt::Debug for ResourceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceRegistry")
            .field("codecs", &self.codecs)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{widget, Widgets};
    use axum::response::IntoResponse;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_query_pairs_keep_duplicates_and_order() {
        let request = ResourceRequest::new(Method::GET, Uri::from_static("/w?stop=3&start=1&start=2"));
        let pairs = request.query_pairs().unwrap();
        assert_eq!(
            pairs,
            vec![
                ("stop".to_string(), "3".to_string()),
                ("start".to_string(), "1".to_string()),
                ("start".to_string(), "2".to_string()),
            ]
        );
    }

    #[test]
    fn test_url_without_query() {
        let request = ResourceRequest::new(Method::GET, Uri::from_static("/api/w?start=1"))
            .with_base_url("http://example.com/");
        assert_eq!(request.url_without_query(), "http://example.com/api/w");
    }

    struct Teapot;

    #[async_trait]
    impl Resource for Teapot {
        async fn handle(&self, _: &ResourceRequest, _: &[String]) -> ResourceResult<Response> {
            Ok(StatusCode::IM_A_TEAPOT.into_response())
        }
    }

    #[tokio::test]
    async fn test_custom_builders_are_used_for_their_kind() {
        let built = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&built);

        let registry = ResourceRegistry::default().with_element_builder(move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            Arc::new(Teapot)
        });

        let resource = registry.adapt(Capability::element(widget("a", "red")));
        let request = ResourceRequest::new(Method::GET, Uri::from_static("/"));
        let response = resource.handle(&request, &[]).await.unwrap();
        assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);

        // collections keep the stock resource, which adapts elements through the registry
        let resource = registry.adapt(Capability::collection(Widgets::with(vec![widget("a", "red")])));
        let response = resource
            .handle(&request, &["a".to_string()])
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);
        assert_eq!(built.load(Ordering::SeqCst), 2);
    }
}
