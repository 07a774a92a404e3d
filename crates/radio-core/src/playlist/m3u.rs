use crate::error::PlaylistParseError;

/// M3U is one entry per line, `#` starting a comment or an `#EXT` directive.
/// Only lines that look like absolute URIs are kept.
///
/// <https://en.wikipedia.org/wiki/M3U>
pub fn parse(data: &[u8]) -> Result<Vec<String>, PlaylistParseError> {
    let text = String::from_utf8_lossy(data);

    // One terminator for the whole document. Stray `\n` left over in a
    // mixed-terminator document still separate lines.
    let eol = if text.contains("\r\n") { "\r\n" } else { "\n" };

    let uris = text
        .split(eol)
        .flat_map(|chunk| chunk.split('\n'))
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter(|line| line.contains("://"))
        .map(str::to_owned)
        .collect();

    Ok(uris)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mixed_terminators_and_comments() {
        let uris = parse(b"http://a\n# c\n\nhttp://b\r\n").unwrap();
        assert_eq!(uris, vec!["http://a", "http://b"]);
    }

    #[test]
    fn test_extended_m3u() {
        let text = "#EXTM3U\r\n\
                    #EXTINF:-1,Swiss Internet Radio Classical\r\n\
                    http://streaming.swisstxt.ch/m/drs3/mp3_128\r\n\
                    \r\n\
                    #EXTINF:-1,Backup\r\n\
                      https://backup.example.org/stream.mp3  \r\n";
        let uris = parse(text.as_bytes()).unwrap();
        assert_eq!(
            uris,
            vec![
                "http://streaming.swisstxt.ch/m/drs3/mp3_128",
                "https://backup.example.org/stream.mp3"
            ]
        );
    }

    #[test]
    fn test_relative_and_local_entries_are_skipped() {
        let uris = parse(b"/some/absolute/unix/path.mp3\nrelative.mp3\nmms://x/y\n").unwrap();
        assert_eq!(uris, vec!["mms://x/y"]);
    }

    #[test]
    fn test_nothing_usable_is_empty_not_error() {
        assert_eq!(parse(b"# only a comment\n").unwrap(), Vec::<String>::new());
        assert_eq!(parse(b"").unwrap(), Vec::<String>::new());
    }
}
