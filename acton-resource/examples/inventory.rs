//! Inventory Example - an in-memory store published as REST resources
//!
//! Items live in a collection at the root; every item exposes a nested `parts`
//! collection.
//!
//! Run with: cargo run --example inventory
//!
//! Test with:
//!   curl http://localhost:8080/
//!   curl 'http://localhost:8080/?start=0&stop=2'
//!   curl -X PUT -H 'Content-Type: application/json' \
//!        -d '{"name": "lamp", "price": 12}' http://localhost:8080/lamp
//!   curl -X PUT -H 'Content-Type: application/json' \
//!        -d '{"price": 15}' http://localhost:8080/lamp
//!   curl -X POST -H 'Content-Type: application/json' \
//!        -d '{"name": "bulb"}' http://localhost:8080/lamp/parts
//!   curl http://localhost:8080/lamp/parts/bulb
//!   curl -X OPTIONS http://localhost:8080/
//!   curl -X DELETE http://localhost:8080/lamp

use std::marker::PhantomData;
use std::sync::Arc;

use acton_resource::prelude::*;
use axum::http::StatusCode;
use serde_json::{json, Value};
use tokio::sync::RwLock;

/// An ordered in-memory collection of one element type
struct Shelf<E> {
    kind: &'static str,
    exposed: &'static [&'static str],
    elements: RwLock<Vec<Arc<dyn Element>>>,
    _element: PhantomData<fn() -> E>,
}

impl<E> Shelf<E> {
    fn new(kind: &'static str, exposed: &'static [&'static str]) -> Self {
        Self {
            kind,
            exposed,
            elements: RwLock::new(Vec::new()),
            _element: PhantomData,
        }
    }
}

#[async_trait]
impl<E: FromState + 'static> Collection for Shelf<E> {
    fn default_element_kind(&self) -> &str {
        self.kind
    }

    fn exposed_element_attributes(&self) -> Vec<String> {
        self.exposed.iter().map(|attr| attr.to_string()).collect()
    }

    fn description(&self) -> String {
        format!("In-memory {} shelf", self.kind)
    }

    async fn count(&self) -> ResourceResult<usize> {
        Ok(self.elements.read().await.len())
    }

    async fn get(&self, identifier: &str) -> ResourceResult<Option<Arc<dyn Element>>> {
        Ok(self
            .elements
            .read()
            .await
            .iter()
            .find(|element| identifier_matches(identifier, &element.identifier()))
            .cloned())
    }

    async fn slice(&self, start: usize, stop: usize) -> ResourceResult<Vec<Arc<dyn Element>>> {
        let elements = self.elements.read().await;
        let stop = stop.min(elements.len());
        Ok(elements[start.min(stop)..stop].to_vec())
    }

    async fn add(&self, element: Arc<dyn Element>) -> ResourceResult<()> {
        let mut elements = self.elements.write().await;
        let identifier = element.identifier();

        if elements.iter().any(|existing| existing.identifier() == identifier) {
            return Err(ResourceError::fault(
                StatusCode::CONFLICT,
                format!("{} {} already exists", self.kind, identifier_string(&identifier)),
            ));
        }
        elements.push(element);
        Ok(())
    }

    async fn remove(&self, identifier: &str) -> ResourceResult<()> {
        self.elements
            .write()
            .await
            .retain(|element| !identifier_matches(identifier, &element.identifier()));
        Ok(())
    }

    async fn create_element_from_state(&self, state: State) -> ResourceResult<Arc<dyn Element>> {
        Ok(Arc::new(E::from_state(state).await?))
    }
}

fn required_name(state: &State) -> ResourceResult<String> {
    state
        .get("name")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| ResourceError::fault(StatusCode::BAD_REQUEST, "name must be a string"))
}

/// A stock item with a nested parts collection
struct Item {
    name: String,
    state: RwLock<State>,
    parts: Arc<Shelf<Part>>,
}

#[async_trait]
impl Element for Item {
    fn identifying_attribute(&self) -> &str {
        "name"
    }

    fn identifier(&self) -> Value {
        Value::String(self.name.clone())
    }

    fn children(&self) -> Vec<String> {
        vec!["parts".to_string()]
    }

    fn child(&self, name: &str) -> Option<Capability> {
        (name == "parts").then(|| Capability::Collection(self.parts.clone()))
    }

    async fn to_state(&self, attrs: &AttributeSelection) -> ResourceResult<State> {
        Ok(attrs.project(&*self.state.read().await))
    }

    async fn update(&self, state: State) -> ResourceResult<()> {
        let mut current = self.state.write().await;
        ensure_unchanged(&current, &state, &["name"])?;
        current.extend(state);
        Ok(())
    }
}

#[async_trait]
impl FromState for Item {
    async fn from_state(mut state: State) -> ResourceResult<Self> {
        let name = required_name(&state)?;
        state.entry("price").or_insert(json!(0));

        Ok(Self {
            name,
            state: RwLock::new(state),
            parts: Arc::new(Shelf::new("part", &["name"])),
        })
    }
}

/// A part of an item; only its name is fixed
struct Part {
    name: String,
    state: RwLock<State>,
}

#[async_trait]
impl Element for Part {
    fn identifying_attribute(&self) -> &str {
        "name"
    }

    fn identifier(&self) -> Value {
        Value::String(self.name.clone())
    }

    async fn to_state(&self, attrs: &AttributeSelection) -> ResourceResult<State> {
        Ok(attrs.project(&*self.state.read().await))
    }

    async fn update(&self, state: State) -> ResourceResult<()> {
        let mut current = self.state.write().await;
        ensure_unchanged(&current, &state, &["name"])?;
        current.extend(state);
        Ok(())
    }
}

#[async_trait]
impl FromState for Part {
    async fn from_state(state: State) -> ResourceResult<Self> {
        Ok(Self {
            name: required_name(&state)?,
            state: RwLock::new(state),
        })
    }
}

async fn seed(items: &Shelf<Item>) -> ResourceResult<()> {
    for (name, price) in [("desk", 120), ("chair", 45), ("shelf", 60)] {
        let mut state = State::new();
        state.insert("name".to_string(), json!(name));
        state.insert("price".to_string(), json!(price));
        items.add(Arc::new(Item::from_state(state).await?)).await?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let items: Shelf<Item> = Shelf::new("item", &["name", "price"]);
    seed(&items)
        .await
        .map_err(|e| Error::Internal(format!("failed to seed inventory: {e}")))?;

    ServiceBuilder::new()
        .with_root(Capability::collection(items))
        .build()?
        .serve()
        .await
}
