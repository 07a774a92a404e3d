//! Radio station list management and playlist resolution.
//!
//! [`StationCollection`] owns the ordered station list, persists it through a
//! [`StationStore`] and reports changes as [`CollectionEvent`]s.
//! [`PlaylistResolver`] downloads M3U, PLS, ASX and XSPF playlists and returns
//! the stream URIs they list.

pub mod collection;
pub mod config;
pub mod debounce;
pub mod error;
pub mod events;
pub mod markup;
pub mod platform;
pub mod playlist;
pub mod resolver;
pub mod station;
pub mod store;

pub use collection::{Snapshot, StationCollection, DEFAULT_STATIONS};
pub use config::{Config, ResolverConfig, StationPaths, StationsConfig};
pub use error::{CollectionError, MarkupError, PlaylistParseError, ResolveError, StoreError};
pub use events::{CollectionEvent, EventBus, Subscription};
pub use playlist::PlaylistFormat;
pub use resolver::{FetchedDocument, PlaylistResolver};
pub use station::Station;
pub use store::{FsStore, StationStore};
