//! Data-plane building blocks for Lookout searches.
//!
//! This crate provides the three leaves of the search pipeline:
//!
//! - [`fetcher`] - best-effort HTTP GET against upstream data APIs
//! - [`normalize`] - arbitrary payload to ordered flat field map
//! - [`render`] - category-aware bounded report text
//!
//! None of these know about users, credits, or conversations; the
//! orchestrator composes them.

pub mod fetcher;
pub mod normalize;
pub mod render;

pub use fetcher::{Fetch, HttpFetcher};
pub use normalize::{flatten, normalize, parse_payload, FlatFields};
pub use render::render;
