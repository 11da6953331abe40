//! Service builder that publishes a root capability over HTTP
//!
//! ## Example
//!
//! ```rust,ignore
//! use acton_resource::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let service = ServiceBuilder::new()
//!         .with_config(Config::load()?)
//!         .with_root(Capability::collection(Inventory::default()))
//!         .with_mount_path("/api/inventory")
//!         .build()?;
//!
//!     service.serve().await
//! }
//! ```

use axum::Router;

use crate::capability::Capability;
use crate::codec::Codecs;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::resource::ResourceRegistry;
use crate::router::ResourceTree;
use crate::server::Server;

/// Assembles configuration, codecs and a root capability into a [`ResourceService`]
///
/// Uses defaults for any fields not set:
/// - config: `Config::load()`, falling back to `Config::default()`
/// - codecs: JSON only, with `negotiation.default_content_type` as the wildcard fallback
/// - mount path: `/`
#[derive(Default)]
pub struct ServiceBuilder {
    config: Option<Config>,
    root: Option<Capability>,
    codecs: Option<Codecs>,
    registry: Option<ResourceRegistry>,
    mount_path: Option<String>,
}

impl ServiceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the service configuration
    #[must_use]
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// The capability served at the mount path
    #[must_use]
    pub fn with_root(mut self, root: Capability) -> Self {
        self.root = Some(root);
        self
    }

    /// Encoders and decoders for the default registry
    ///
    /// The configured default content type is applied to them at build time.
    #[must_use]
    pub fn with_codecs(mut self, codecs: Codecs) -> Self {
        self.codecs = Some(codecs);
        self
    }

    /// Use a fully built registry, codecs included, as is
    #[must_use]
    pub fn with_registry(mut self, registry: ResourceRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Path prefix the tree is nested under
    #[must_use]
    pub fn with_mount_path(mut self, mount_path: impl Into<String>) -> Self {
        self.mount_path = Some(mount_path.into());
        self
    }

    /// Build the service
    ///
    /// Initializes tracing with the loaded config unless a subscriber is
    /// already installed.
    ///
    /// # Errors
    ///
    /// Fails without a root capability, or when no registered encoder matches
    /// the configured default content type.
    pub fn build(self) -> Result<ResourceService> {
        let config = self.config.unwrap_or_else(|| {
            Config::load().unwrap_or_else(|e| {
                tracing::warn!("Failed to load config: {}, using defaults", e);
                Config::default()
            })
        });

        if let Err(e) = crate::observability::init_tracing(&config) {
            tracing::debug!("Tracing not initialized: {}", e);
        }

        let root = self
            .root
            .ok_or_else(|| Error::Internal("no root capability to serve".to_string()))?;

        let registry = match self.registry {
            Some(registry) => registry,
            None => {
                let codecs = self
                    .codecs
                    .unwrap_or_default()
                    .with_default_content_type(&config.negotiation.default_content_type)?;
                ResourceRegistry::new(codecs)
            }
        };

        let tree = ResourceTree::new(root, registry)
            .with_links(config.links.clone())
            .with_body_limit(config.middleware.body_limit_bytes());

        let app = match self.mount_path.as_deref() {
            None | Some("") | Some("/") => tree.router(),
            Some(path) => Router::new().nest(path, tree.router()),
        };

        Ok(ResourceService { config, app })
    }
}

/// A built service: the resource router plus the config it was built with
pub struct ResourceService {
    config: Config,
    app: Router,
}

impl ResourceService {
    /// The bare router, without server middleware, for merging into a larger app
    pub fn router(&self) -> Router {
        self.app.clone()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Serve with the full middleware stack until SIGINT or SIGTERM
    pub async fn serve(self) -> Result<()> {
        Server::new(self.config).serve(self.app).await
    }
}
