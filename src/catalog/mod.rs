//! Catalog access layer.
//!
//! This module defines the [`CatalogSource`] trait and the item types the
//! rest of the application consumes.  The HTTP implementation lives in
//! [`http`]; tests substitute an in-memory catalog.
//!
//! ## For contributors — pointing at a different catalog
//!
//! If the new API uses the same envelope, `--api-url` is all you need.
//! Otherwise implement [`CatalogSource`] for a new struct, convert its
//! payload into [`PageResult`], and construct it in `main.rs`.  The
//! worker, detector and UI are catalog-agnostic.

mod error;
mod http;
mod item;

pub use error::FetchError;
pub use http::{HttpCatalog, DEFAULT_API_URL};
pub use item::{Author, PageInfo, PageResult, ScriptItem};

#[cfg(test)]
pub(crate) use item::tests::{at, make_item};

use async_trait::async_trait;

/// Source text prepared for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceView {
    pub text: String,
    /// Whether `text` was cut at the display limit (15,000 characters).
    pub truncated: bool,
}

/// Trait every catalog backend implements.
///
/// The worker calls these from tokio tasks, possibly several at once, so
/// implementations must be [`Send`] + [`Sync`].
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetch one page of items, newest first.  Pages are 1-based.
    async fn fetch_page(&self, page: u32) -> Result<PageResult, FetchError>;

    /// Fetch the raw source behind an item's `raw_url`.
    async fn fetch_source(&self, raw_url: &str) -> Result<SourceView, FetchError>;
}
