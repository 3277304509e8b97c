//! The core data types shared by the fetcher, the detector and the UI.
//!
//! The catalog speaks JSON; this module owns both the wire shape
//! (`Wire*` structs, private) and the normalised [`ScriptItem`] /
//! [`PageResult`] values the rest of the application works with.
//!
//! ## For contributors
//!
//! If the upstream API grows a field you want to display, add it to
//! [`WireItem`] as an `Option` (the API omits fields freely) and carry it
//! through [`ScriptItem::from_wire`].

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// A script entry, normalised from the catalog payload.
///
/// Items are immutable snapshots: nothing in the application edits them
/// after they are received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptItem {
    /// Catalog identifier, used to key reveal state and loaded source.
    pub id: String,

    /// Human-readable headline.
    pub title: String,

    /// Optional longer description.
    pub description: Option<String>,

    /// Reference to the creating account, as the API provides it.
    pub creator: Option<String>,

    /// Explicit author attribution, when the API provides one.
    pub author: Option<Author>,

    /// Publication time, falling back to creation time.
    ///
    /// `None` when the API sent neither or the string did not parse as
    /// RFC 3339.  The update detector treats such items as never new.
    pub published: Option<DateTime<Utc>>,

    /// Thumbnail image URI.
    pub thumbnail: Option<String>,

    /// URI of the raw source text (absolute or relative to the API base).
    pub raw_url: Option<String>,

    /// Language tag, e.g. `lua`.
    pub language: Option<String>,
}

/// Author attribution attached to an item.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Author {
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
}

impl ScriptItem {
    /// Name shown on the card: the author's name, then the creator
    /// reference, then a placeholder.
    pub fn byline(&self) -> &str {
        self.author
            .as_ref()
            .map(|a| a.name.as_str())
            .or(self.creator.as_deref())
            .unwrap_or("unknown")
    }

    /// Convert one wire record.  Pure so that tests can build items from
    /// JSON without a server.
    fn from_wire(wire: WireItem) -> Self {
        // Prefer publication time; degrade to creation time, then None.
        let published = wire
            .published_at
            .as_deref()
            .and_then(parse_timestamp)
            .or_else(|| wire.created_at.as_deref().and_then(parse_timestamp));

        Self {
            id: wire.id,
            title: wire
                .title
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| "(untitled)".to_string()),
            description: wire.description.filter(|d| !d.trim().is_empty()),
            creator: wire.creator,
            author: wire.author,
            published,
            thumbnail: wire.image,
            raw_url: wire.raw_script,
            language: wire.language,
        }
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Pagination metadata reported alongside a page.
///
/// Both fields are optional: the API may omit them or send `null`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageInfo {
    pub current: Option<u32>,
    pub max: Option<u32>,
}

/// One fetched batch of items plus its pagination metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageResult {
    /// Items in upstream order (newest first, by contract with the API).
    pub items: Vec<ScriptItem>,
    pub info: PageInfo,
}

impl PageResult {
    /// The uniform "nothing" value: no items, no metadata.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Collapse a fetch outcome into a page, logging and discarding any
    /// error.  Used where "failed" and "nothing there" are handled alike.
    pub fn or_empty<E: std::fmt::Display>(result: Result<Self, E>) -> Self {
        result.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "catalog fetch failed; treating page as empty");
            Self::empty()
        })
    }
}

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(super) struct WireEnvelope {
    #[serde(default)]
    info: Option<WireInfo>,
    #[serde(default)]
    scripts: Option<Vec<WireItem>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireInfo {
    #[serde(default)]
    current_page: Option<u32>,
    #[serde(default)]
    max_pages: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct WireItem {
    #[serde(rename = "_id", alias = "id")]
    id: String,
    title: Option<String>,
    description: Option<String>,
    creator: Option<String>,
    author: Option<Author>,
    published_at: Option<String>,
    created_at: Option<String>,
    image: Option<String>,
    raw_script: Option<String>,
    language: Option<String>,
}

impl WireEnvelope {
    /// Normalise the envelope.  Returns `None` when the item list is
    /// missing, which callers report as a malformed payload.
    pub(super) fn into_page(self) -> Option<PageResult> {
        let scripts = self.scripts?;
        let info = self.info.unwrap_or_default();
        Some(PageResult {
            items: scripts.into_iter().map(ScriptItem::from_wire).collect(),
            info: PageInfo {
                current: info.current_page,
                max: info.max_pages,
            },
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
