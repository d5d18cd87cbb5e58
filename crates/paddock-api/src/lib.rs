//! JSON REST API for Paddock.
//!
//! Exposes an axum [`Router`] backed by a [`Registry`] over any
//! [`PostStore`]. Static assets, tracing and transport are the caller's
//! responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", paddock_api::api_router(registry.clone()))
//! ```

pub mod error;
pub mod posts;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, put},
};
use paddock_core::{Registry, store::PostStore};

pub use error::ApiError;

/// Build the `/posts` router for `registry`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(registry: Arc<Registry<S>>) -> Router<()>
where
  S: PostStore + 'static,
{
  Router::new()
    .route("/posts", get(posts::list::<S>).post(posts::create::<S>))
    .route("/posts/{id}", put(posts::update::<S>).delete(posts::delete::<S>))
    .with_state(registry)
}
