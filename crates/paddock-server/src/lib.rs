//! HTTP server wiring for Paddock: configuration, backend selection and the
//! top-level router (JSON API plus the static single-page client).

pub mod backend;
pub mod settings;

use std::{path::Path, sync::Arc};

use axum::Router;
use paddock_core::{Registry, store::PostStore};
use tower_http::{
  services::{ServeDir, ServeFile},
  trace::TraceLayer,
};

pub use backend::{Backend, BackendError, MigrateOutcome, StoreUrl};
pub use settings::ServerConfig;

/// Build the full application router.
///
/// - `/api/posts…` — the JSON API
/// - `/` — `index.html` from `static_dir`
/// - `/static/*` — everything else in `static_dir`
pub fn app<S>(registry: Arc<Registry<S>>, static_dir: &Path) -> Router
where
  S: PostStore + 'static,
{
  Router::new()
    .nest("/api", paddock_api::api_router(registry))
    .route_service("/", ServeFile::new(static_dir.join("index.html")))
    .nest_service("/static", ServeDir::new(static_dir))
    .layer(TraceLayer::new_for_http())
}
