//! Handlers for `/posts` endpoints.
//!
//! | Method   | Path          | Notes |
//! |----------|---------------|-------|
//! | `GET`    | `/posts`      | Sweeps expired posts, then lists in race order |
//! | `POST`   | `/posts`      | Body: [`PostBody`]; returns 201 + stored post |
//! | `PUT`    | `/posts/{id}` | Body: [`PostBody`]; 403 on wrong password, 404 if unknown |
//! | `DELETE` | `/posts/{id}` | Body: `{"password":"..."}` |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use paddock_core::{
  Registry,
  post::{Post, PostFields, PostId},
  store::PostStore,
};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::error::ApiError;

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /posts`
pub async fn list<S>(
  State(registry): State<Arc<Registry<S>>>,
) -> Result<Json<Vec<Post>>, ApiError>
where
  S: PostStore,
{
  Ok(Json(registry.list().await?))
}

// ─── Create / update ──────────────────────────────────────────────────────────

/// JSON body accepted by `POST /posts` and `PUT /posts/{id}`: every
/// descriptive field plus the post password.
#[derive(Debug, Deserialize)]
pub struct PostBody {
  #[serde(flatten)]
  pub fields:   PostFields,
  pub password: String,
}

/// `POST /posts` — returns 201 + the stored [`Post`].
pub async fn create<S>(
  State(registry): State<Arc<Registry<S>>>,
  Json(body): Json<PostBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: PostStore,
{
  let post = registry.create(body.fields, body.password).await?;
  Ok((StatusCode::CREATED, Json(post)))
}

/// `PUT /posts/{id}` — replaces all descriptive fields.
pub async fn update<S>(
  State(registry): State<Arc<Registry<S>>>,
  Path(id): Path<PostId>,
  Json(body): Json<PostBody>,
) -> Result<Json<Post>, ApiError>
where
  S: PostStore,
{
  Ok(Json(registry.update(id, body.fields, body.password).await?))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct DeleteBody {
  pub password: String,
}

/// `DELETE /posts/{id}` — body: `{"password":"..."}`.
pub async fn delete<S>(
  State(registry): State<Arc<Registry<S>>>,
  Path(id): Path<PostId>,
  Json(body): Json<DeleteBody>,
) -> Result<Json<Value>, ApiError>
where
  S: PostStore,
{
  registry.delete(id, body.password).await?;
  Ok(Json(json!({ "message": "Post deleted successfully" })))
}
