//! Station list persistence format.
//!
//! ```xml
//! <Stations>
//!   <Station>
//!     <uri>http://direct.fipradio.fr/live/fip-midfi.mp3</uri>
//!     <name>FIP Paris</name>
//!   </Station>
//! </Stations>
//! ```
//!
//! Decoding is lenient about content (unknown elements are skipped, stations
//! without a uri are dropped) but strict about well-formedness.

use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::{debug, warn};

use crate::error::MarkupError;
use crate::station::Station;

const ROOT: &str = "Stations";
const STATION: &str = "Station";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Name,
    Uri,
    UserAgent,
}

impl Field {
    fn from_element(name: &str) -> Option<Self> {
        match name {
            "name" => Some(Self::Name),
            "uri" => Some(Self::Uri),
            "user-agent" => Some(Self::UserAgent),
            _ => None,
        }
    }
}

/// Fields collected while inside a `<Station>` element.
#[derive(Debug, Default)]
struct PendingStation {
    name: Option<String>,
    uri: Option<String>,
    user_agent: Option<String>,
}

impl PendingStation {
    fn slot(&mut self, field: Field) -> &mut Option<String> {
        match field {
            Field::Name => &mut self.name,
            Field::Uri => &mut self.uri,
            Field::UserAgent => &mut self.user_agent,
        }
    }

    fn finish(self) -> Option<Station> {
        let uri = match self.uri {
            Some(uri) if !uri.is_empty() => uri,
            _ => {
                debug!("Encountered station without uri (named {:?})", self.name);
                return None;
            }
        };
        let mut station = Station::new(self.name, uri);
        station.user_agent = self.user_agent;
        Some(station)
    }
}

/// Decode a station list document. Fresh uids are assigned to every station.
pub fn decode(data: &[u8]) -> Result<Vec<Station>, MarkupError> {
    let text = std::str::from_utf8(data).map_err(|_| MarkupError::Encoding)?;
    decode_str(text)
}

pub fn decode_str(text: &str) -> Result<Vec<Station>, MarkupError> {
    // Field text is kept verbatim, whitespace included; text outside
    // fields is ignored by `append_text`.
    let mut reader = Reader::from_str(text);

    let mut stations = Vec::new();
    let mut open: Vec<String> = Vec::with_capacity(3);
    let mut pending: Option<PendingStation> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name = element_name(&e)?;
                start_element(&name, &mut pending);
                open.push(name);
            }
            Event::Empty(e) => {
                let name = element_name(&e)?;
                start_element(&name, &mut pending);
                if name == STATION {
                    stations.extend(pending.take().and_then(PendingStation::finish));
                }
            }
            Event::End(_) => {
                if open.pop().as_deref() == Some(STATION) {
                    stations.extend(pending.take().and_then(PendingStation::finish));
                }
            }
            Event::Text(t) => {
                let text = t.unescape()?;
                append_text(&open, &mut pending, &text);
            }
            Event::CData(c) => {
                let text = String::from_utf8_lossy(&c).into_owned();
                append_text(&open, &mut pending, &text);
            }
            Event::Eof => break,
            _ => (),
        }
    }

    if let Some(name) = open.pop() {
        return Err(MarkupError::Truncated(name));
    }

    Ok(stations)
}

fn element_name(e: &BytesStart<'_>) -> Result<String, MarkupError> {
    std::str::from_utf8(e.name().as_ref())
        .map(str::to_owned)
        .map_err(|_| MarkupError::Encoding)
}

fn start_element(name: &str, pending: &mut Option<PendingStation>) {
    match name {
        ROOT => (),
        STATION => {
            if pending.is_some() {
                warn!("Nested <{}> element, discarding the outer one", STATION);
            }
            *pending = Some(PendingStation::default());
        }
        _ if Field::from_element(name).is_some() => (),
        _ => warn!("Unexpected element: '{}'", name),
    }
}

fn append_text(open: &[String], pending: &mut Option<PendingStation>, text: &str) {
    let (Some(element), Some(pending)) = (open.last(), pending.as_mut()) else {
        return;
    };
    if let Some(field) = Field::from_element(element) {
        pending.slot(field).get_or_insert_with(String::new).push_str(text);
    }
}

/// Encode stations in order. Stations without a uri are skipped.
pub fn encode<'a>(stations: impl IntoIterator<Item = &'a Station>) -> String {
    let mut out = String::from("<Stations>\n");

    for station in stations {
        if station.uri().is_empty() {
            warn!("Station ({}) has no uri, not saving it", station.name_or_uri());
            continue;
        }

        out.push_str("  <Station>\n");
        push_tag(&mut out, "uri", station.uri());
        if let Some(name) = station.name() {
            push_tag(&mut out, "name", name);
        }
        if let Some(user_agent) = station.user_agent() {
            push_tag(&mut out, "user-agent", user_agent);
        }
        out.push_str("  </Station>\n");
    }

    out.push_str("</Stations>");
    out
}

fn push_tag(out: &mut String, tag: &str, value: &str) {
    out.push_str(&format!("    <{tag}>{}</{tag}>\n", escape(value)));
}
