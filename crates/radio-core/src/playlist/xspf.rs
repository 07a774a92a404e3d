use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::warn;

use super::check_closed;
use crate::error::PlaylistParseError;

/// XSPF ("XML Shareable Playlist Format"): the text of every `<location>`
/// element is a stream.
///
/// A malformed document yields an error, never a partial list.
///
/// <https://www.xspf.org/spec>
pub fn parse(data: &[u8]) -> Result<Vec<String>, PlaylistParseError> {
    let text = String::from_utf8_lossy(data);
    decode(&text).inspect_err(|e| warn!("Failed to parse xspf playlist: {}", e))
}

fn decode(text: &str) -> Result<Vec<String>, PlaylistParseError> {
    let mut reader = Reader::from_str(text);
    // Locations are URIs: surrounding whitespace is dropped and a blank
    // location lists nothing.
    reader.config_mut().trim_text(true);

    let mut uris = Vec::new();
    let mut open: Vec<String> = Vec::with_capacity(4);

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                open.push(String::from_utf8_lossy(e.name().as_ref()).into_owned());
            }
            Event::End(_) => {
                open.pop();
            }
            Event::Text(t) if in_location(&open) => uris.push(t.unescape()?.into_owned()),
            Event::CData(c) if in_location(&open) => {
                uris.push(String::from_utf8_lossy(&c).trim().to_owned());
            }
            Event::Eof => break,
            _ => (),
        }
    }

    check_closed(open)?;
    Ok(uris)
}

fn in_location(open: &[String]) -> bool {
    open.last()
        .is_some_and(|name| name.eq_ignore_ascii_case("location"))
}
