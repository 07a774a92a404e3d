use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::warn;

use super::check_closed;
use crate::error::PlaylistParseError;

/// ASX ("Advanced Stream Redirector") is Microsoft's XML playlist format.
/// Every `<ref href="...">` anywhere in the document is a stream, names are
/// matched case-insensitively.
///
/// A malformed document yields an error, never a partial list.
///
/// <https://en.wikipedia.org/wiki/Advanced_Stream_Redirector>
pub fn parse(data: &[u8]) -> Result<Vec<String>, PlaylistParseError> {
    let text = String::from_utf8_lossy(data);
    decode(&text).inspect_err(|e| warn!("Failed to parse asx playlist: {}", e))
}

fn decode(text: &str) -> Result<Vec<String>, PlaylistParseError> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut uris = Vec::new();
    let mut open = Vec::with_capacity(3);

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                uris.extend(ref_href(&e)?);
                open.push(String::from_utf8_lossy(e.name().as_ref()).into_owned());
            }
            Event::Empty(e) => uris.extend(ref_href(&e)?),
            Event::End(_) => {
                open.pop();
            }
            Event::Eof => break,
            _ => (), // text, comments and processing instructions carry no stream
        }
    }

    check_closed(open)?;
    Ok(uris)
}

fn ref_href(e: &BytesStart<'_>) -> Result<Option<String>, PlaylistParseError> {
    if !e.name().as_ref().eq_ignore_ascii_case(b"ref") {
        return Ok(None);
    }

    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.as_ref().eq_ignore_ascii_case(b"href") {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }

    Ok(None)
}
