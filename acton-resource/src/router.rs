//! axum glue: mount a resource tree as a [`Router`]
//!
//! Every method on `/` and `/{*path}` is routed into the tree. Path segments are
//! percent-decoded by axum and empty segments are dropped, so `/things/` and
//! `/things` address the same resource. Links are built from the original URI,
//! so the router can be nested under a prefix.
//!
//! # Example
//!
//! ```rust,ignore
//! use acton_resource::prelude::*;
//!
//! let tree = ResourceTree::new(Capability::collection(things), ResourceRegistry::default());
//! let app = Router::new().nest("/api/things", tree.router());
//! ```

use std::sync::Arc;

use axum::{
    body::{self, Bytes},
    extract::{rejection::PathRejection, OriginalUri, Path, Request, State},
    http::{header, HeaderMap, StatusCode, Uri},
    response::Response,
    routing::any,
    Router,
};

use crate::capability::Capability;
use crate::codec::Codecs;
use crate::config::LinkConfig;
use crate::resource::{Resource, ResourceError, ResourceRegistry, ResourceRequest, ResourceResult};

const DEFAULT_BODY_LIMIT: usize = 10 * 1024 * 1024;

/// A root capability adapted into resources, ready to serve
pub struct ResourceTree {
    root: Arc<dyn Resource>,
    codecs: Codecs,
    links: LinkConfig,
    body_limit: usize,
}

impl ResourceTree {
    pub fn new(root: Capability, registry: ResourceRegistry) -> Self {
        tracing::debug!(kind = root.kind(), "Building resource tree");

        Self {
            root: registry.adapt(root),
            codecs: registry.codecs().clone(),
            links: LinkConfig::default(),
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }

    /// How pagination links get their scheme and authority
    #[must_use]
    pub fn with_links(mut self, links: LinkConfig) -> Self {
        self.links = links;
        self
    }

    /// Largest request body collected, in bytes
    #[must_use]
    pub fn with_body_limit(mut self, body_limit: usize) -> Self {
        self.body_limit = body_limit;
        self
    }

    pub fn router(self) -> Router {
        Router::new()
            .route("/", any(handle_root))
            .route("/{*path}", any(handle_path))
            .with_state(Arc::new(self))
    }

    async fn dispatch(
        &self,
        uri: Uri,
        path: ResourceResult<Vec<String>>,
        request: Request,
    ) -> Response {
        let (parts, body) = request.into_parts();

        // errors are rendered in an acceptable type when there is one
        let error_encoder = self
            .codecs
            .select_encoder(&parts.headers)
            .unwrap_or_else(|_| Arc::clone(self.codecs.default_encoder()));

        let path = match path {
            Ok(path) => path,
            Err(error) => return error.render(error_encoder.as_ref()),
        };

        let body: Bytes = match body::to_bytes(body, self.body_limit).await {
            Ok(bytes) => bytes,
            Err(e) => {
                return ResourceError::fault(
                    StatusCode::PAYLOAD_TOO_LARGE,
                    format!("failed to read request body: {e}"),
                )
                .render(error_encoder.as_ref());
            }
        };

        let base_url = self.base_url(&parts.headers, &uri);
        let request = ResourceRequest::new(parts.method, uri)
            .with_headers(parts.headers)
            .with_body(body)
            .with_base_url(base_url);

        tracing::debug!(
            method = %request.method(),
            path = %request.uri().path(),
            segments = path.len(),
            "Dispatching resource request"
        );

        match self.root.handle(&request, &path).await {
            Ok(response) => response,
            Err(error) => error.render(error_encoder.as_ref()),
        }
    }

    /// `public_base_url`, else the `Host` header, else the authority of an
    /// absolute-form request URI; empty only when none is known
    fn base_url(&self, headers: &HeaderMap, uri: &Uri) -> String {
        if let Some(public) = &self.links.public_base_url {
            return public.clone();
        }

        if let Some(host) = headers.get(header::HOST).and_then(|host| host.to_str().ok()) {
            return format!("{}://{}", self.links.scheme, host);
        }

        match uri.authority() {
            Some(authority) => {
                let scheme = uri.scheme_str().unwrap_or(self.links.scheme.as_str());
                format!("{scheme}://{authority}")
            }
            None => {
                tracing::debug!("No host known for request, links will be relative");
                String::new()
            }
        }
    }
}

async fn handle_root(
    State(tree): State<Arc<ResourceTree>>,
    OriginalUri(uri): OriginalUri,
    request: Request,
) -> Response {
    tree.dispatch(uri, Ok(Vec::new()), request).await
}

async fn handle_path(
    State(tree): State<Arc<ResourceTree>>,
    path: Result<Path<String>, PathRejection>,
    OriginalUri(uri): OriginalUri,
    request: Request,
) -> Response {
    let segments = path
        .map(|Path(path)| {
            path.split('/')
                .filter(|segment| !segment.is_empty())
                .map(str::to_string)
                .collect()
        })
        .map_err(|rejection| ResourceError::fault(StatusCode::BAD_REQUEST, rejection.body_text()));

    tree.dispatch(uri, segments, request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{body_json, widget, Widgets};
    use axum::{body::Body, http::Method};
    use serde_json::json;
    use tower::ServiceExt;

    fn app(widgets: &Widgets) -> Router {
        ResourceTree::new(
            Capability::collection(widgets.clone()),
            ResourceRegistry::default(),
        )
        .router()
    }

    fn request(method: Method, uri: &str) -> Request {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::HOST, "localhost")
            .body(Body::empty())
            .unwrap()
    }

    fn many(count: usize) -> Widgets {
        Widgets::with((0..count).map(|i| widget(&format!("w{i:02}"), "red")).collect())
    }

    #[tokio::test]
    async fn test_listing_with_absolute_links() {
        let response = app(&many(25))
            .oneshot(request(Method::GET, "/?start=10&stop=20"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        let body = body_json(response).await;
        assert_eq!(body["next"], "http://localhost/?start=20&stop=30");
        assert_eq!(body["prev"], "http://localhost/?start=0&stop=10");
    }

    #[tokio::test]
    async fn test_nested_router_keeps_prefix_in_links() {
        let app = Router::new().nest("/api", app(&many(5)));
        let response = app
            .oneshot(request(Method::GET, "/api?start=0&stop=2"))
            .await
            .unwrap();

        let body = body_json(response).await;
        assert_eq!(body["next"], "http://localhost/api?start=2&stop=4");
        assert_eq!(body["prev"], serde_json::Value::Null);
    }

    #[tokio::test]
    async fn test_public_base_url_overrides_host() {
        let links = LinkConfig {
            public_base_url: Some("https://api.example.com".to_string()),
            ..LinkConfig::default()
        };
        let app = ResourceTree::new(
            Capability::collection(many(5)),
            ResourceRegistry::default(),
        )
        .with_links(links)
        .router();

        let response = app
            .oneshot(request(Method::GET, "/?stop=2"))
            .await
            .unwrap();

        let body = body_json(response).await;
        assert_eq!(body["next"], "https://api.example.com/?start=2&stop=4");
    }

    #[tokio::test]
    async fn test_pagination_error_body() {
        let response = app(&many(3))
            .oneshot(request(Method::GET, "/?start=0&start=5"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(
            body,
            json!({"errorMessage": "duplicate key start in query", "errorDetails": {}})
        );
    }

    #[tokio::test]
    async fn test_not_acceptable_is_still_rendered_as_json() {
        let mut request = request(Method::GET, "/");
        request
            .headers_mut()
            .insert(header::ACCEPT, "text/xml".parse().unwrap());

        let response = app(&many(1)).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_ACCEPTABLE);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        let body = body_json(response).await;
        assert_eq!(body["errorDetails"]["supportedContentTypes"], json!(["application/json"]));
        assert_eq!(body["errorDetails"]["acceptedContentTypes"], json!(["text/xml"]));
    }

    #[tokio::test]
    async fn test_element_round_trip() {
        let widgets = Widgets::default();

        let create = Request::builder()
            .method(Method::PUT)
            .uri("/lamp%20shade")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"name": "lamp shade", "color": "teal"}"#))
            .unwrap();
        let response = app(&widgets).oneshot(create).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = app(&widgets)
            .oneshot(request(Method::GET, "/lamp%20shade/"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["color"], "teal");
    }

    #[tokio::test]
    async fn test_delete_missing_element() {
        let widgets = many(1);
        let response = app(&widgets)
            .oneshot(request(Method::DELETE, "/42"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(widgets.removals(), 0);
        let body = body_json(response).await;
        assert_eq!(body["errorDetails"], json!({"identifier": "42"}));
    }

    #[tokio::test]
    async fn test_post_without_content_type() {
        let post = Request::builder()
            .method(Method::POST)
            .uri("/")
            .body(Body::from("{}"))
            .unwrap();
        let response = app(&Widgets::default()).oneshot(post).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[tokio::test]
    async fn test_oversized_body_is_rejected() {
        let app = ResourceTree::new(
            Capability::collection(Widgets::default()),
            ResourceRegistry::default(),
        )
        .with_body_limit(8)
        .router();

        let post = Request::builder()
            .method(Method::POST)
            .uri("/")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"name": "far too long for the limit"}"#))
            .unwrap();
        let response = app.oneshot(post).await.unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_method_not_allowed_has_error_body() {
        let response = app(&many(1))
            .oneshot(request(Method::PATCH, "/"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers().get(header::ALLOW).unwrap(), "GET, POST, OPTIONS");
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        let body = body_json(response).await;
        assert_eq!(
            body,
            json!({
                "errorMessage": "method not allowed",
                "errorDetails": {"allowedMethods": ["GET", "POST", "OPTIONS"]},
            })
        );

        let response = app(&many(1))
            .oneshot(request(Method::POST, "/w00"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        let body = body_json(response).await;
        assert_eq!(body["errorDetails"]["allowedMethods"], json!(["GET", "PUT"]));
    }

    #[tokio::test]
    async fn test_undecodable_path_is_rendered_as_error_body() {
        let response = app(&many(1))
            .oneshot(request(Method::GET, "/%FF"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        let body = body_json(response).await;
        assert!(body["errorMessage"].is_string());
        assert_eq!(body["errorDetails"], json!({}));
    }

    #[tokio::test]
    async fn test_links_use_uri_authority_without_host_header() {
        let get = Request::builder()
            .method(Method::GET)
            .uri("http://example.org/?stop=2")
            .body(Body::empty())
            .unwrap();
        let response = app(&many(5)).oneshot(get).await.unwrap();

        let body = body_json(response).await;
        assert_eq!(body["next"], "http://example.org/?start=2&stop=4");
    }
}
