//! # acton-resource
//!
//! Publish arbitrary collections and their elements as REST resources over axum.
//! Storage and business rules stay in your types; this crate handles the HTTP side.
//!
//! ## Features
//!
//! - **Verb dispatch**: list, create (POST or PUT to a new identifier), update, delete
//! - **Content negotiation**: encoder from `Accept`, decoder from `Content-Type`
//! - **Pagination**: `[start, stop)` windows with prev/next links
//! - **Uniform errors**: `{"errorMessage": ..., "errorDetails": {...}}` with fixed status codes
//! - **Nested resources**: elements expose named child collections or elements
//! - **Service stack**: figment config, JSON tracing, request IDs, graceful shutdown
//!
//! ## Example
//!
//! ```rust,ignore
//! use acton_resource::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = Config::load()?;
//!
//!     let service = ServiceBuilder::new()
//!         .with_config(config)
//!         .with_root(Capability::collection(Inventory::default()))
//!         .build()?;
//!
//!     service.serve().await
//! }
//! ```

pub mod capability;
pub mod codec;
pub mod config;
pub mod error;
pub mod middleware;
pub mod observability;
pub mod pagination;
pub mod resource;
pub mod responses;
pub mod router;
pub mod server;
pub mod service_builder;

#[cfg(test)]
pub(crate) mod testing;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::capability::{
        ensure_unchanged, identifier_matches, identifier_string, AttributeSelection, Capability,
        Collection, Element, FromState, State,
    };
    pub use crate::codec::{Codecs, Decoder, Encoder, JsonCodec};
    pub use crate::config::Config;
    pub use crate::error::{Error, Result};
    pub use crate::observability::init_tracing;
    pub use crate::pagination::{PageLinks, PageWindow};
    pub use crate::resource::{
        Resource, ResourceError, ResourceErrorKind, ResourceRegistry, ResourceRequest,
        ResourceResult,
    };
    pub use crate::router::ResourceTree;
    pub use crate::server::Server;
    pub use crate::service_builder::{ResourceService, ServiceBuilder};

    pub use async_trait::async_trait;
    pub use axum::{http::Method, Router};
}
