use reqwest::StatusCode;

/// Why a catalog request produced no usable data.
///
/// Distinguishes "the request failed" from "the catalog is empty", which
/// an empty [`PageResult`](super::PageResult) alone cannot express.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("catalog returned HTTP {0}")]
    Status(StatusCode),

    #[error("malformed payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("payload has no item list")]
    MissingItems,

    #[error("invalid URL: {0}")]
    Url(String),
}
