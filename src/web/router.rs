//! Router configuration for the HTTP API.

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};
use std::path::Path;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use super::handlers::{
    create_collection, delete_node, get_collection, get_file, insert_node, list_collections,
    resolve_node, save_file, tag_suggestions, update_file, update_file_icon, update_file_tags,
    upload_image, AppState,
};
use super::middleware::create_cors_layer;
use crate::file::DEFAULT_MAX_UPLOAD_SIZE;

/// Room for multipart framing on top of the image itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Create the main API router.
///
/// Uploaded images are served under the storage's public prefix when
/// uploads are enabled.
pub fn create_router(app_state: Arc<AppState>, cors_origins: &[String]) -> Router {
    let max_upload = app_state
        .uploads
        .as_ref()
        .map_or(DEFAULT_MAX_UPLOAD_SIZE, |s| s.max_size());
    let body_limit = usize::try_from(max_upload)
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_OVERHEAD);

    let collection_routes = Router::new()
        .route("/", get(list_collections).post(create_collection))
        .route("/:id", get(get_collection))
        .route("/:id/resolve", get(resolve_node))
        .route("/:id/nodes", post(insert_node).delete(delete_node));

    let file_routes = Router::new()
        .route("/", post(save_file))
        .route("/:id", get(get_file).put(update_file))
        .route("/:id/icon", put(update_file_icon))
        .route("/:id/tags", put(update_file_tags));

    let api_routes = Router::new()
        .nest("/collections", collection_routes)
        .nest("/files", file_routes)
        .route("/tags/suggestions", get(tag_suggestions))
        .route(
            "/uploads",
            post(upload_image).layer(DefaultBodyLimit::max(body_limit)),
        );

    let mut router = Router::new().nest("/api", api_routes);

    if let Some(storage) = app_state.uploads.as_ref() {
        router = router.nest_service(
            storage.public_prefix(),
            ServeDir::new(storage.base_path()),
        );
    }

    router
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(cors_origins)),
        )
        .with_state(app_state)
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}

/// Create a router serving a built frontend, if `path` exists.
pub fn create_static_router(path: &str) -> Option<Router> {
    if !Path::new(path).is_dir() {
        tracing::warn!(path, "Static directory not found, not serving frontend");
        return None;
    }
    Some(Router::new().fallback_service(ServeDir::new(path)))
}
