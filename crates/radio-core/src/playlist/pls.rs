//! PLS playlists are INI style documents with a single `[playlist]` group.
//!
//! ```text
//! [playlist]
//! NumberOfEntries=2
//! File1=http://a
//! Title1=First
//! File2=http://b
//! ```
//!
//! <https://en.wikipedia.org/wiki/PLS_(file_format)>

use tracing::{debug, warn};

use crate::error::PlaylistParseError;

const GROUP: &str = "playlist";

/// Spellings seen in the wild for the entry count, tried in order.
const COUNT_KEYS: [&str; 4] = [
    "NumberOfEntries",
    "numberofentries",
    "NumberOfEvents",
    "numberofevents",
];

pub fn parse(data: &[u8]) -> Result<Vec<String>, PlaylistParseError> {
    let text = String::from_utf8_lossy(data);
    let keyfile = KeyFile::parse(&text)?;

    // The announced count comes from the server, never read past the last
    // `FileN` key actually present.
    let count = entry_count(&keyfile);
    let last = count.min(last_file_index(&keyfile));
    if last < count {
        debug!("pls playlist announces {} entries, lists at most {}", count, last);
    }

    let mut uris = Vec::new();
    for idx in 1..=last {
        let key = format!("File{idx}");
        match keyfile.get(GROUP, &key) {
            Some(value) => uris.push(value.to_owned()),
            None => warn!("Failed to get '{}': key not found in pls playlist", key),
        }
    }

    Ok(uris)
}

fn last_file_index(keyfile: &KeyFile) -> u32 {
    keyfile
        .keys(GROUP)
        .filter_map(|key| key.strip_prefix("File")?.parse::<u32>().ok())
        .max()
        .unwrap_or(0)
}

fn entry_count(keyfile: &KeyFile) -> u32 {
    let Some((key, value)) = COUNT_KEYS
        .iter()
        .find_map(|key| keyfile.get(GROUP, key).map(|value| (key, value)))
    else {
        warn!("Failed to get the number of items in pls playlist");
        return 0;
    };

    match value.parse::<u32>() {
        Ok(n) => n,
        Err(e) => {
            warn!("Failed to get key '{}': invalid integer {:?}: {}", key, value, e);
            0
        }
    }
}

/// Minimal desktop-entry / INI reader: groups of `key=value` pairs.
#[derive(Debug, Default)]
struct KeyFile {
    groups: Vec<(String, Vec<(String, String)>)>,
}

impl KeyFile {
    fn parse(text: &str) -> Result<Self, PlaylistParseError> {
        let mut keyfile = Self::default();

        for (idx, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }

            if let Some(name) = line.strip_prefix('[') {
                let Some(name) = name.strip_suffix(']') else {
                    return Err(PlaylistParseError::KeyFile {
                        line: idx + 1,
                        reason: "unterminated group header",
                    });
                };
                keyfile.groups.push((name.to_owned(), Vec::new()));
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                return Err(PlaylistParseError::KeyFile {
                    line: idx + 1,
                    reason: "not a key-value pair, group, or comment",
                });
            };
            let Some((_, entries)) = keyfile.groups.last_mut() else {
                return Err(PlaylistParseError::KeyFile {
                    line: idx + 1,
                    reason: "key file does not start with a group",
                });
            };
            entries.push((key.trim_end().to_owned(), value.trim_start().to_owned()));
        }

        Ok(keyfile)
    }

    fn keys<'a>(&'a self, group: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.groups
            .iter()
            .filter(move |(name, _)| name == group)
            .flat_map(|(_, entries)| entries.iter())
            .map(|(k, _)| k.as_str())
    }

    /// Last value for `key` across all groups named `group`.
    fn get(&self, group: &str, key: &str) -> Option<&str> {
        self.groups
            .iter()
            .filter(|(name, _)| name == group)
            .flat_map(|(_, entries)| entries.iter())
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .last()
    }
}
