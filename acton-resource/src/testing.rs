//! In-memory capabilities for unit tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use async_trait::async_trait;
use axum::{
    http::{Method, StatusCode},
    response::Response,
};
use serde_json::{json, Value};

use crate::capability::{
    ensure_unchanged, identifier_matches, AttributeSelection, Capability, Collection, Element,
    FromState, State,
};
use crate::resource::{ResourceError, ResourceResult};

/// A widget identified by `name`, with `color` and `weight` attributes
#[derive(Clone)]
pub(crate) struct Widget {
    name: Value,
    state: Arc<RwLock<State>>,
    children: Vec<(String, Capability)>,
}

pub(crate) fn widget(name: &str, color: &str) -> Widget {
    let state = json!({"name": name, "color": color, "weight": 1});
    Widget::new(state.as_object().cloned().unwrap_or_default())
}

impl Widget {
    fn new(state: State) -> Self {
        Self {
            name: state.get("name").cloned().unwrap_or(Value::Null),
            state: Arc::new(RwLock::new(state)),
            children: Vec::new(),
        }
    }

    pub(crate) fn with_child(mut self, name: &str, capability: Capability) -> Self {
        self.children.push((name.to_string(), capability));
        self
    }

    fn color(&self) -> Option<String> {
        self.state
            .read()
            .unwrap()
            .get("color")
            .and_then(Value::as_str)
            .map(str::to_string)
    }
}

#[async_trait]
impl Element for Widget {
    fn identifying_attribute(&self) -> &str {
        "name"
    }

    fn identifier(&self) -> Value {
        self.name.clone()
    }

    fn children(&self) -> Vec<String> {
        self.children.iter().map(|(name, _)| name.clone()).collect()
    }

    fn child(&self, name: &str) -> Option<Capability> {
        self.children
            .iter()
            .find(|(child, _)| child == name)
            .map(|(_, capability)| capability.clone())
    }

    async fn to_state(&self, attrs: &AttributeSelection) -> ResourceResult<State> {
        Ok(attrs.project(&self.state.read().unwrap()))
    }

    async fn update(&self, state: State) -> ResourceResult<()> {
        let mut current = self.state.write().unwrap();
        ensure_unchanged(&current, &state, &["name"])?;
        current.extend(state);
        Ok(())
    }
}

#[async_trait]
impl FromState for Widget {
    async fn from_state(state: State) -> ResourceResult<Self> {
        if !state.contains_key("name") {
            return Err(ResourceError::fault(StatusCode::BAD_REQUEST, "widget needs a name"));
        }
        Ok(Self::new(state))
    }
}

/// A shared, ordered widget store that counts removals
#[derive(Clone, Default)]
pub(crate) struct Widgets {
    items: Arc<Mutex<Vec<Widget>>>,
    removals: Arc<AtomicUsize>,
    read_only: bool,
}

impl Widgets {
    pub(crate) fn with(items: Vec<Widget>) -> Self {
        Self {
            items: Arc::new(Mutex::new(items)),
            ..Self::default()
        }
    }

    pub(crate) fn read_only() -> Self {
        Self {
            read_only: true,
            ..Self::default()
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.items.lock().unwrap().len()
    }

    pub(crate) fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    pub(crate) fn color_of(&self, name: &str) -> Option<String> {
        self.find(name).and_then(|widget| widget.color())
    }

    pub(crate) fn removals(&self) -> usize {
        self.removals.load(Ordering::SeqCst)
    }

    fn find(&self, name: &str) -> Option<Widget> {
        self.items
            .lock()
            .unwrap()
            .iter()
            .find(|widget| identifier_matches(name, &widget.name))
            .cloned()
    }
}

#[async_trait]
impl Collection for Widgets {
    fn default_element_kind(&self) -> &str {
        "widget"
    }

    fn exposed_element_attributes(&self) -> Vec<String> {
        vec!["name".to_string(), "color".to_string()]
    }

    fn allowed_methods(&self) -> Vec<Method> {
        if self.read_only {
            vec![Method::GET]
        } else {
            vec![Method::GET, Method::POST, Method::PUT, Method::DELETE]
        }
    }

    async fn count(&self) -> ResourceResult<usize> {
        Ok(self.len())
    }

    async fn get(&self, identifier: &str) -> ResourceResult<Option<Arc<dyn Element>>> {
        Ok(self
            .find(identifier)
            .map(|widget| Arc::new(widget) as Arc<dyn Element>))
    }

    async fn slice(&self, start: usize, stop: usize) -> ResourceResult<Vec<Arc<dyn Element>>> {
        let items = self.items.lock().unwrap();
        let stop = stop.min(items.len());
        let start = start.min(stop);
        Ok(items[start..stop]
            .iter()
            .map(|widget| Arc::new(widget.clone()) as Arc<dyn Element>)
            .collect())
    }

    async fn add(&self, element: Arc<dyn Element>) -> ResourceResult<()> {
        let state = element.to_state(&AttributeSelection::All).await?;
        let widget = Widget::from_state(state).await?;

        let mut items = self.items.lock().unwrap();
        if items.iter().any(|existing| existing.name == widget.name) {
            return Err(ResourceError::fault(StatusCode::CONFLICT, "duplicate widget"));
        }
        items.push(widget);
        Ok(())
    }

    async fn remove(&self, identifier: &str) -> ResourceResult<()> {
        self.removals.fetch_add(1, Ordering::SeqCst);
        self.items
            .lock()
            .unwrap()
            .retain(|widget| !identifier_matches(identifier, &widget.name));
        Ok(())
    }

    async fn create_element_from_state(&self, state: State) -> ResourceResult<Arc<dyn Element>> {
        let widget = Widget::from_state(state).await?;
        Ok(Arc::new(widget))
    }
}

/// Collect a response body and parse it as JSON
pub(crate) async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
