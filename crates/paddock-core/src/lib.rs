//! Core types and trait definitions for the Paddock race-entry board.
//!
//! This crate is deliberately free of HTTP and database dependencies. The
//! storage backends implement [`store::PostStore`]; the API layer talks to
//! posts only through [`registry::Registry`].

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod password;
pub mod post;
pub mod registry;
pub mod retention;
pub mod store;

pub use error::{Error, Result};
pub use registry::{AdminSecret, Registry, RegistryConfig};
