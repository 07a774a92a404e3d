use std::path::PathBuf;

use thiserror::Error;

/// Failure to decode the persisted station markup.
#[derive(Debug, Error)]
pub enum MarkupError {
    #[error("malformed station markup: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("station markup ended inside <{0}>")]
    Truncated(String),
    #[error("station markup is not valid UTF-8")]
    Encoding,
}

/// Failure to parse a downloaded playlist document.
#[derive(Debug, Error)]
pub enum PlaylistParseError {
    #[error("malformed XML playlist: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("malformed XML playlist: bad attribute: {0}")]
    Attribute(#[from] quick_xml::events::attributes::AttrError),
    #[error("XML playlist ended inside <{0}>")]
    Truncated(String),
    #[error("malformed key file at line {line}: {reason}")]
    KeyFile { line: usize, reason: &'static str },
}

/// Terminal failure of one playlist resolution.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("failed to download playlist ({}): {reason}", status.map(|s| s.to_string()).unwrap_or_else(|| "no status".to_string()))]
    Transport { status: Option<u16>, reason: String },
    #[error("empty playlist")]
    Empty,
    #[error("no parser for playlist format of '{0}'")]
    UnsupportedFormat(String),
    #[error("failed to parse playlist: {0}")]
    Parse(#[from] PlaylistParseError),
    #[error("playlist contains no stream")]
    NoEntries,
}

/// File I/O failure from a [`crate::store::StationStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum CollectionError {
    /// The embedded default station set failed to decode. Not recoverable.
    #[error("default station list is invalid: {0}")]
    DefaultStations(#[source] MarkupError),
    #[error("failed to save station list: {0}")]
    Save(#[from] StoreError),
}
