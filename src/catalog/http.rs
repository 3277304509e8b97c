//! HTTP catalog implementation.
//!
//! Talks to the remote catalog over [`reqwest`].  Request building and
//! response parsing are split so that tests can exercise the parsing
//! (status handling, payload shape, source truncation) without a server.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{StatusCode, Url};

use super::item::WireEnvelope;
use super::{CatalogSource, FetchError, PageResult, SourceView};

/// Default catalog endpoint.
pub const DEFAULT_API_URL: &str = "https://rscripts.net/api/v2/scripts";

/// Maximum number of characters of source shown for one item.
pub const SOURCE_DISPLAY_LIMIT: usize = 15_000;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// A catalog reached over HTTP.
pub struct HttpCatalog {
    base: Url,
    client: reqwest::Client,
}

impl HttpCatalog {
    /// Create a catalog client rooted at `base` (the list endpoint).
    ///
    /// Fails when the HTTP client cannot be built (e.g. no TLS backend).
    pub fn new(base: Url) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { base, client })
    }

    /// The list URL for `page`, newest first.
    pub fn page_url(&self, page: u32) -> Url {
        let mut url = self.base.clone();
        url.query_pairs_mut()
            .append_pair("page", &page.max(1).to_string())
            .append_pair("orderBy", "date")
            .append_pair("sort", "desc");
        url
    }

    /// Resolve an item's raw-source reference against the API base.
    pub fn source_url(&self, raw: &str) -> Result<Url, FetchError> {
        self.base
            .join(raw)
            .map_err(|e| FetchError::Url(format!("{raw}: {e}")))
    }
}

/// Turn a list response into a page.
///
/// This is a pure function (no I/O): a non-success status, an unparseable
/// body and a body without an item list each map to their own error.
pub fn parse_page(status: StatusCode, body: &[u8]) -> Result<PageResult, FetchError> {
    if !status.is_success() {
        return Err(FetchError::Status(status));
    }
    let envelope: WireEnvelope = serde_json::from_slice(body)?;
    envelope.into_page().ok_or(FetchError::MissingItems)
}

/// Cap source text at [`SOURCE_DISPLAY_LIMIT`] characters.
pub fn truncate_source(text: &str) -> SourceView {
    match text.char_indices().nth(SOURCE_DISPLAY_LIMIT) {
        Some((cut, _)) => SourceView {
            text: text[..cut].to_string(),
            truncated: true,
        },
        None => SourceView {
            text: text.to_string(),
            truncated: false,
        },
    }
}

#[async_trait]
impl CatalogSource for HttpCatalog {
    async fn fetch_page(&self, page: u32) -> Result<PageResult, FetchError> {
        let url = self.page_url(page);
        tracing::debug!(%url, "fetching catalog page");

        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        parse_page(status, &body)
    }

    async fn fetch_source(&self, raw_url: &str) -> Result<SourceView, FetchError> {
        let url = self.source_url(raw_url)?;
        tracing::debug!(%url, "fetching script source");

        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }
        let text = response.text().await?;
        Ok(truncate_source(&text))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
