//! Stream URI extraction for the playlist formats radio stations publish:
//! M3U (and RAM), PLS, ASX and XSPF.
//!
//! Every parser is a pure function from the full document bytes to the stream
//! URIs it lists, in document order. `Ok` with an empty list and `Err` are
//! distinct outcomes: the former is a well-formed playlist that lists nothing.

mod asx;
mod m3u;
mod pls;
mod xspf;

pub use asx::parse as parse_asx;
pub use m3u::parse as parse_m3u;
pub use pls::parse as parse_pls;
pub use xspf::parse as parse_xspf;

use reqwest::Url;
use tracing::info;

use crate::error::PlaylistParseError;

pub type Parser = fn(&[u8]) -> Result<Vec<String>, PlaylistParseError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaylistFormat {
    M3u,
    Pls,
    Asx,
    Xspf,
    Unknown,
}

impl PlaylistFormat {
    /// Guess the format from the extension of the URI path. The server's
    /// content type is never consulted.
    pub fn from_uri(uri: &str) -> Self {
        let url = match Url::parse(uri) {
            Ok(url) => url,
            Err(e) => {
                info!("Invalid uri '{}': {}", uri, e);
                return Self::Unknown;
            }
        };

        match url.path().rfind('.') {
            Some(idx) => Self::from_extension(&url.path()[idx + 1..]),
            None => Self::Unknown,
        }
    }

    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "m3u" | "ram" => Self::M3u,
            "pls" => Self::Pls,
            "asx" => Self::Asx,
            "xspf" => Self::Xspf,
            _ => Self::Unknown,
        }
    }

    pub fn parser(self) -> Option<Parser> {
        match self {
            Self::M3u => Some(parse_m3u),
            Self::Pls => Some(parse_pls),
            Self::Asx => Some(parse_asx),
            Self::Xspf => Some(parse_xspf),
            Self::Unknown => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::M3u => "m3u",
            Self::Pls => "pls",
            Self::Asx => "asx",
            Self::Xspf => "xspf",
            Self::Unknown => "unknown",
        }
    }
}

/// A document that ends with elements still open is malformed.
fn check_closed(open: Vec<String>) -> Result<(), PlaylistParseError> {
    match open.into_iter().last() {
        Some(name) => Err(PlaylistParseError::Truncated(name)),
        None => Ok(()),
    }
}
