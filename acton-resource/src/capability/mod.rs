//! Capability traits implemented by backing stores
//!
//! A backing store exposes its data through two traits:
//!
//! - [`Collection`]: a keyed container of elements that can be listed, sliced,
//!   added to and removed from
//! - [`Element`]: a single addressable object with a state mapping and optional
//!   named children
//!
//! The resource layer only ever talks to these traits. Storage, locking and
//! business rules stay in the implementation; every operation is async so an
//! implementation may suspend on I/O without blocking other requests.
//!
//! # Example
//!
//! ```rust,ignore
//! use acton_resource::capability::{ensure_unchanged, AttributeSelection, Element, State};
//! use acton_resource::resource::ResourceResult;
//! use async_trait::async_trait;
//!
//! struct Crab {
//!     name: String,
//!     state: tokio::sync::RwLock<State>,
//! }
//!
//! #[async_trait]
//! impl Element for Crab {
//!     fn identifying_attribute(&self) -> &str {
//!         "name"
//!     }
//!
//!     fn identifier(&self) -> serde_json::Value {
//!         self.name.clone().into()
//!     }
//!
//!     async fn to_state(&self, attrs: &AttributeSelection) -> ResourceResult<State> {
//!         Ok(attrs.project(&*self.state.read().await))
//!     }
//!
//!     async fn update(&self, state: State) -> ResourceResult<()> {
//!         let mut current = self.state.write().await;
//!         ensure_unchanged(&current, &state, &["name"])?;
//!         current.extend(state);
//!         Ok(())
//!     }
//! }
//! ```

mod state;
mod traits;

pub use state::{ensure_unchanged, identifier_matches, identifier_string, AttributeSelection, State};
pub use traits::{
    Capability, Collection, Element, FromState, DEFAULT_MAX_PAGE_SIZE, DEFAULT_PAGE_SIZE,
};
