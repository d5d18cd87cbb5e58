//! PostgreSQL backend for the Paddock post store.
//!
//! Uses an [`sqlx`] connection pool. Queries are built at runtime so the crate
//! compiles without a live database.

mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::PostgresStore;
