use thiserror::Error;

/// Errors surfaced by playlist loading and parsing.
///
/// Attribute parsing and episode extraction never fail; malformed entries
/// degrade to partial data instead of rejecting the playlist wholesale.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The playlist text did not carry an `#EXTM3U` header where the
    /// configured policy expects it. Fatal for that parse call.
    #[error("invalid playlist format (missing #EXTM3U header)")]
    InvalidHeader,

    /// Network or HTTP failure while fetching the playlist. Kept distinct
    /// from parse errors so callers can tell "no content" from
    /// "failed to load".
    #[error("failed to fetch playlist {url}: {message}")]
    Fetch { url: String, message: String },

    /// A resume token could not be serialized or deserialized.
    #[error("invalid load token: {0}")]
    InvalidToken(#[from] serde_json::Error),
}

impl CatalogError {
    pub fn fetch(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Fetch {
            url: url.into(),
            message: message.into(),
        }
    }
}
