//! Collection and element capability traits

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use axum::http::Method;
use serde_json::{json, Value};

use super::state::{AttributeSelection, State};
use crate::resource::ResourceResult;

/// Default number of elements in a listing page
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Default upper bound on a listing page
pub const DEFAULT_MAX_PAGE_SIZE: usize = 100;

/// A single addressable object
///
/// Elements are shared between concurrent requests as `Arc<dyn Element>`, so
/// mutation goes through `&self` and the implementation owns its locking.
#[async_trait]
pub trait Element: Send + Sync {
    /// Name of the attribute whose value is unique within the owning collection
    fn identifying_attribute(&self) -> &str;

    /// Current value of the identifying attribute
    fn identifier(&self) -> Value;

    /// Names of the nested resources this element exposes
    fn children(&self) -> Vec<String> {
        Vec::new()
    }

    /// The nested resource called `name`
    fn child(&self, _name: &str) -> Option<Capability> {
        None
    }

    /// Export the element's state, restricted to `attrs`
    async fn to_state(&self, attrs: &AttributeSelection) -> ResourceResult<State>;

    /// Apply a state mapping to the element
    ///
    /// Implementations reject changes to immutable attributes with
    /// [`ResourceError::AttributeValueUpdate`](crate::resource::ResourceError::AttributeValueUpdate)
    /// (see [`ensure_unchanged`](super::ensure_unchanged)).
    async fn update(&self, state: State) -> ResourceResult<()>;
}

/// Element types that can be built from a state mapping
///
/// Collections usually implement
/// [`Collection::create_element_from_state`] by delegating to their default
/// element type's `from_state`.
#[async_trait]
pub trait FromState: Element + Sized {
    async fn from_state(state: State) -> ResourceResult<Self>;
}

/// A keyed container of elements
///
/// Identifiers are unique within a collection at all times. Listing uses
/// ordinal slices so the backing store decides the order.
#[async_trait]
pub trait Collection: Send + Sync {
    /// Human-readable name of the element type this collection creates
    fn default_element_kind(&self) -> &str {
        "element"
    }

    /// Attributes included for each element in a listing
    fn exposed_element_attributes(&self) -> Vec<String>;

    /// Listing width when the client does not pass `stop`
    fn page_size(&self) -> usize {
        DEFAULT_PAGE_SIZE
    }

    /// Widest listing a client may request
    fn max_page_size(&self) -> usize {
        DEFAULT_MAX_PAGE_SIZE
    }

    fn description(&self) -> String {
        String::new()
    }

    /// Methods accepted at the collection level
    fn allowed_methods(&self) -> Vec<Method> {
        vec![Method::GET, Method::POST, Method::PUT, Method::DELETE]
    }

    /// Number of elements currently held
    async fn count(&self) -> ResourceResult<usize>;

    /// Look an element up by identifier
    async fn get(&self, identifier: &str) -> ResourceResult<Option<Arc<dyn Element>>>;

    /// Elements at ordinal positions `[start, stop)`, clamped to the collection
    async fn slice(&self, start: usize, stop: usize) -> ResourceResult<Vec<Arc<dyn Element>>>;

    /// Elements whose state contains every key/value pair in `filters`
    ///
    /// The default scans the whole collection; stores with indexes should
    /// override it.
    async fn query(&self, filters: &State) -> ResourceResult<Vec<Arc<dyn Element>>> {
        let count = self.count().await?;
        let mut matches = Vec::new();

        for element in self.slice(0, count).await? {
            let state = element.to_state(&AttributeSelection::All).await?;
            if filters
                .iter()
                .all(|(key, value)| state.get(key) == Some(value))
            {
                matches.push(element);
            }
        }

        Ok(matches)
    }

    async fn add(&self, element: Arc<dyn Element>) -> ResourceResult<()>;

    async fn remove(&self, identifier: &str) -> ResourceResult<()>;

    /// Build a new element from a decoded request body, without adding it
    async fn create_element_from_state(&self, state: State) -> ResourceResult<Arc<dyn Element>>;

    /// Description served to `OPTIONS` requests
    async fn options(&self) -> ResourceResult<Value> {
        let allowed: Vec<String> = self
            .allowed_methods()
            .iter()
            .map(|method| method.to_string())
            .collect();

        Ok(json!({
            "description": self.description(),
            "defaultElementKind": self.default_element_kind(),
            "allowedMethods": allowed,
            "exposedElementAttributes": self.exposed_element_attributes(),
            "pageSize": self.page_size(),
            "maxPageSize": self.max_page_size(),
            "count": self.count().await?,
        }))
    }
}

/// Anything that can be published as a resource
#[derive(Clone)]
pub enum Capability {
    Collection(Arc<dyn Collection>),
    Element(Arc<dyn Element>),
}

impl Capability {
    pub fn collection(collection: impl Collection + 'static) -> Self {
        Self::Collection(Arc::new(collection))
    }

    pub fn element(element: impl Element + 'static) -> Self {
        Self::Element(Arc::new(element))
    }

    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Collection(_) => "collection",
            Self::Element(_) => "element",
        }
    }
}

impl From<Arc<dyn Collection>> for Capability {
    fn from(collection: Arc<dyn Collection>) -> Self {
        Self::Collection(collection)
    }
}

impl From<Arc<dyn Element>> for Capability {
    fn from(element: Arc<dyn Element>) -> Self {
        Self::Element(element)
    }
}

impl fmt::Debug for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Collection(collection) => f
                .debug_struct("Collection")
                .field("kind", &collection.default_element_kind())
                .finish_non_exhaustive(),
            Self::Element(element) => f
                .debug_struct("Element")
                .field("identifier", &element.identifier())
                .finish_non_exhaustive(),
        }
    }
}
