//! The ordered station list: membership, ordering, navigation and debounced
//! persistence.
//!
//! The collection is the single owner of its stations. Outside code refers to
//! members by uid and receives borrowed views or owned snapshots. Every
//! structural change and every `name`/`uri` edit re-arms one save deadline;
//! the owner's event loop waits on [`StationCollection::save_due`] and then
//! calls [`StationCollection::run_pending_save`]. A save still pending when the
//! collection is dropped is written immediately.

use std::time::Duration;

use rand::seq::SliceRandom;
use reqwest::Url;
use tracing::{debug, error, info, warn};

use crate::config::StationPaths;
use crate::debounce::Debouncer;
use crate::error::CollectionError;
use crate::events::{CollectionEvent, EventBus, Subscription};
use crate::markup;
use crate::station::{Similarity, Station};
use crate::store::{FsStore, StationStore};

/// Loaded when none of the candidate files can be used.
pub const DEFAULT_STATIONS: &str = "<Stations>\
    <Station>\
      <name>FIP Paris</name>\
      <uri>http://direct.fipradio.fr/live/fip-midfi.mp3</uri>\
    </Station>\
    <Station>\
      <name>FIP Autour du Rock</name>\
      <uri>http://direct.fipradio.fr/live/fip-webradio1.mp3</uri>\
    </Station>\
    <Station>\
      <name>FIP Autour du Jazz</name>\
      <uri>http://direct.fipradio.fr/live/fip-webradio2.mp3</uri>\
    </Station>\
    <Station>\
      <name>FIP Autour du Groove</name>\
      <uri>http://direct.fipradio.fr/live/fip-webradio3.mp3</uri>\
    </Station>\
    <Station>\
      <name>FIP Autour du Monde</name>\
      <uri>http://direct.fipradio.fr/live/fip-webradio4.mp3</uri>\
    </Station>\
    <Station>\
      <name>FIP Tout nouveau, tout FIP</name>\
      <uri>http://direct.fipradio.fr/live/fip-webradio5.mp3</uri>\
    </Station>\
    <Station>\
      <name>FIP Evenementielle</name>\
      <uri>http://direct.fipradio.fr/live/fip-webradio6.mp3</uri>\
    </Station>\
    <Station>\
      <name>Nova</name>\
      <uri>http://broadcast.infomaniak.net/radionova-high.mp3</uri>\
    </Station>\
    <Station>\
      <name>Radio Grenouille</name>\
      <uri>http://live.radiogrenouille.com/live</uri>\
    </Station>\
    </Stations>";

/// Schemes accepted when guessing whether user input is a uri.
const URI_SCHEMES: [&str; 2] = ["http", "https"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Next,
    Prev,
}

impl Direction {
    /// Where navigation starts, and where it wraps to.
    fn boundary(self, len: usize) -> usize {
        match self {
            Direction::Next => 0,
            Direction::Prev => len - 1,
        }
    }

    fn neighbour(self, idx: usize, len: usize) -> Option<usize> {
        match self {
            Direction::Next => (idx + 1 < len).then_some(idx + 1),
            Direction::Prev => idx.checked_sub(1),
        }
    }
}

/// Where an inserted or moved station lands in the primary order.
#[derive(Debug, Clone, Copy)]
enum Target<'a> {
    /// Final index, past-the-end appends
    Index(usize),
    /// Before the referenced member, appended when missing
    Before(Option<&'a str>),
    /// After the referenced member, prepended when missing
    After(Option<&'a str>),
}

pub struct StationCollection<S: StationStore = FsStore> {
    stations: Vec<Station>,
    /// Uids of `stations` in random order, built on demand.
    shuffled: Option<Vec<String>>,
    paths: StationPaths,
    store: S,
    saver: Debouncer,
    events: EventBus,
    loaded: bool,
}

impl StationCollection<FsStore> {
    pub fn with_fs(paths: StationPaths, save_delay: Duration) -> Self {
        Self::new(paths, save_delay, FsStore)
    }
}

impl<S: StationStore> StationCollection<S> {
    pub fn new(paths: StationPaths, save_delay: Duration, store: S) -> Self {
        Self {
            stations: Vec::new(),
            shuffled: None,
            paths,
            store,
            saver: Debouncer::new(save_delay),
            events: EventBus::new(),
            loaded: false,
        }
    }

    pub fn subscribe(&self) -> Subscription {
        self.events.subscribe()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // ── Load / save ──────────────────────────────────────────────────────────

    /// Populate the collection from the first candidate file that reads and
    /// decodes, falling back to [`DEFAULT_STATIONS`].
    ///
    /// The only error is a default list that fails to decode.
    pub fn load(&mut self) -> Result<(), CollectionError> {
        if self.loaded {
            warn!("Station list already loaded, ignoring");
            return Ok(());
        }

        let mut found = None;
        for path in &self.paths.load_paths {
            let data = match self.store.read(path) {
                Ok(data) => data,
                Err(e) => {
                    warn!("{}", e);
                    continue;
                }
            };
            match markup::decode(&data) {
                Ok(stations) => {
                    found = Some((path.clone(), stations));
                    break;
                }
                Err(e) => warn!("Failed to parse '{}': {}", path.display(), e),
            }
        }

        self.stations = match found {
            Some((path, stations)) => {
                info!("Station list loaded from file '{}'", path.display());
                stations
            }
            None => {
                info!("No valid station list file found, using hard-coded default");
                markup::decode_str(DEFAULT_STATIONS).map_err(|e| {
                    error!("Default station list is invalid: {}", e);
                    CollectionError::DefaultStations(e)
                })?
            }
        };
        self.loaded = true;

        debug!("Station list has {} stations", self.stations.len());
        self.events.emit(CollectionEvent::Loaded);
        Ok(())
    }

    /// Encode and write the list now. Failures are logged and reported to
    /// subscribers as [`CollectionEvent::Error`].
    pub fn save(&mut self) -> Result<(), CollectionError> {
        self.saver.cancel();

        let text = markup::encode(&self.stations);
        match self.store.write(&self.paths.save_path, text.as_bytes()) {
            Ok(()) => {
                info!("Station list saved to '{}'", self.paths.save_path.display());
                Ok(())
            }
            Err(e) => {
                warn!("Failed to save station list: {}", e);
                self.events
                    .emit(CollectionEvent::Error(format!("Failed to save station list: {e}")));
                Err(e.into())
            }
        }
    }

    /// Resolves when the debounced save is due. Pending forever when no save
    /// is scheduled.
    pub async fn save_due(&self) {
        self.saver.due().await
    }

    pub fn has_pending_save(&self) -> bool {
        self.saver.is_pending()
    }

    /// Run the debounced save if its deadline has passed. Returns whether a
    /// save was attempted.
    pub fn run_pending_save(&mut self) -> bool {
        if !self.saver.take_due() {
            return false;
        }
        let _ = self.save();
        true
    }

    fn save_delayed(&mut self) {
        self.saver.schedule();
    }

    // ── Membership ───────────────────────────────────────────────────────────

    /// Insert at `position`; positions past the end append.
    ///
    /// Refused, with only a log line, when a similar station is already a
    /// member: same uid, same name, or same uri.
    pub fn insert(&mut self, station: Station, position: usize) {
        self.insert_at(station, Target::Index(position));
    }

    /// Insert before `before`, or append when it is `None` or not a member.
    pub fn insert_before(&mut self, station: Station, before: Option<&str>) {
        self.insert_at(station, Target::Before(before));
    }

    /// Insert after `after`, or prepend when it is `None` or not a member.
    pub fn insert_after(&mut self, station: Station, after: Option<&str>) {
        self.insert_at(station, Target::After(after));
    }

    pub fn prepend(&mut self, station: Station) {
        self.insert_after(station, None);
    }

    pub fn append(&mut self, station: Station) {
        self.insert_before(station, None);
    }

    fn insert_at(&mut self, station: Station, target: Target<'_>) {
        info!("Inserting station '{}'", station.name_or_uri());

        if let Some(existing) = self.find_similar(&station) {
            match existing.similarity(&station) {
                Some(Similarity::Uid) => warn!(
                    "Station '{}' has the same uid '{}' as a member",
                    station.name_or_uri(),
                    station.uid()
                ),
                Some(Similarity::Name) => debug!(
                    "Station '{}' has the same name as a member, not inserting",
                    station.name_or_uri()
                ),
                _ => debug!(
                    "Station '{}' has the same uri '{}' as a member, not inserting",
                    station.name_or_uri(),
                    station.uri()
                ),
            }
            return;
        }

        let idx = self.resolve_target(target, None);
        self.stations.insert(idx, station.clone());
        self.shuffled = None;

        self.events.emit(CollectionEvent::StationAdded(station));
        self.save_delayed();
    }

    fn find_similar(&self, station: &Station) -> Option<&Station> {
        self.stations
            .iter()
            .find(|member| member.similarity(station).is_some())
    }

    /// Remove a member and hand it back. Unknown uids are logged and ignored.
    pub fn remove(&mut self, uid: &str) -> Option<Station> {
        let Some(idx) = self.position(uid) else {
            warn!("Station '{}' not found in list", uid);
            return None;
        };

        let station = self.stations.remove(idx);
        info!("Removing station '{}'", station.name_or_uri());
        self.shuffled = None;

        self.events
            .emit(CollectionEvent::StationRemoved(station.clone()));
        self.save_delayed();
        Some(station)
    }

    // ── Ordering ─────────────────────────────────────────────────────────────

    /// Move a member to the final index `position`; positions past the end
    /// move it last.
    pub fn move_to(&mut self, uid: &str, position: usize) {
        self.relocate(uid, Target::Index(position));
    }

    /// Move before `before`, or last when it is `None` or not a member.
    pub fn move_before(&mut self, uid: &str, before: Option<&str>) {
        self.relocate(uid, Target::Before(before));
    }

    /// Move after `after`, or first when it is `None` or not a member.
    pub fn move_after(&mut self, uid: &str, after: Option<&str>) {
        self.relocate(uid, Target::After(after));
    }

    pub fn move_first(&mut self, uid: &str) {
        self.move_after(uid, None);
    }

    pub fn move_last(&mut self, uid: &str) {
        self.move_before(uid, None);
    }

    // The shuffled order is left alone: membership did not change.
    fn relocate(&mut self, uid: &str, target: Target<'_>) {
        let Some(from) = self.position(uid) else {
            warn!("Station '{}' not found in list", uid);
            return;
        };

        let station = self.stations.remove(from);
        let to = self.resolve_target(target, Some((uid, from)));
        self.stations.insert(to, station);
        debug!("Moved station '{}' from {} to {}", uid, from, to);

        self.events
            .emit(CollectionEvent::StationMoved(self.stations[to].clone()));
        self.save_delayed();
    }

    /// Index at which to insert into the current `stations`. `moving` is the
    /// uid and former index of a station already taken out of the list; a
    /// reference to that station itself puts it back in place.
    fn resolve_target(&self, target: Target<'_>, moving: Option<(&str, usize)>) -> usize {
        let len = self.stations.len();
        let reference = |r: Option<&str>| -> Result<Option<usize>, usize> {
            match (r, moving) {
                (Some(r), Some((uid, from))) if r == uid => Err(from),
                (Some(r), _) => Ok(self.position(r)),
                (None, _) => Ok(None),
            }
        };

        match target {
            Target::Index(idx) => idx.min(len),
            Target::Before(r) => match reference(r) {
                Err(from) => from,
                Ok(found) => found.unwrap_or(len),
            },
            Target::After(r) => match reference(r) {
                Err(from) => from,
                Ok(found) => found.map_or(0, |idx| idx + 1),
            },
        }
    }

    // ── Navigation ───────────────────────────────────────────────────────────

    /// The station after `current`, or the first one when `current` is `None`.
    ///
    /// With `shuffle`, the order is a cached random permutation of the members.
    /// Past the end: `None` without `repeat`; with it, the first station, after
    /// a reshuffle in shuffled mode that never hands back `current` itself
    /// when there is a choice.
    pub fn next(&mut self, current: Option<&str>, repeat: bool, shuffle: bool) -> Option<&Station> {
        let idx = self.navigate(current, repeat, shuffle, Direction::Next)?;
        self.stations.get(idx)
    }

    /// Mirror image of [`StationCollection::next`].
    pub fn prev(&mut self, current: Option<&str>, repeat: bool, shuffle: bool) -> Option<&Station> {
        let idx = self.navigate(current, repeat, shuffle, Direction::Prev)?;
        self.stations.get(idx)
    }

    fn navigate(
        &mut self,
        current: Option<&str>,
        repeat: bool,
        shuffle: bool,
        dir: Direction,
    ) -> Option<usize> {
        if !shuffle {
            // stale as soon as we leave shuffled mode
            self.shuffled = None;

            let len = self.stations.len();
            if len == 0 {
                return None;
            }
            let Some(current) = current else {
                return Some(dir.boundary(len));
            };
            let idx = self.position(current)?;
            if let Some(neighbour) = dir.neighbour(idx, len) {
                return Some(neighbour);
            }
            return repeat.then(|| dir.boundary(len));
        }

        let stations = &self.stations;
        let order = self.shuffled.get_or_insert_with(|| shuffled_uids(stations));
        let len = order.len();
        if len == 0 {
            return None;
        }

        let uid = match current {
            None => order[dir.boundary(len)].clone(),
            Some(current) => {
                let idx = order.iter().position(|u| u == current)?;
                match dir.neighbour(idx, len) {
                    Some(neighbour) => order[neighbour].clone(),
                    None if !repeat => return None,
                    None => {
                        order.shuffle(&mut rand::thread_rng());
                        let boundary = dir.boundary(len);
                        if len > 1 && order[boundary] == current {
                            match dir {
                                Direction::Next => order.rotate_left(1),
                                Direction::Prev => order.rotate_right(1),
                            }
                        }
                        order[boundary].clone()
                    }
                }
            }
        };

        self.position(&uid)
    }

    /// Current shuffled order, if one has been built.
    pub fn shuffled_uids(&self) -> Option<&[String]> {
        self.shuffled.as_deref()
    }

    // ── Lookup ───────────────────────────────────────────────────────────────

    pub fn first(&self) -> Option<&Station> {
        self.stations.first()
    }

    pub fn last(&self) -> Option<&Station> {
        self.stations.last()
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    pub fn position(&self, uid: &str) -> Option<usize> {
        self.stations.iter().position(|s| s.uid() == uid)
    }

    pub fn contains(&self, uid: &str) -> bool {
        self.position(uid).is_some()
    }

    pub fn get(&self, idx: usize) -> Option<&Station> {
        self.stations.get(idx)
    }

    pub fn find_by_uid(&self, uid: &str) -> Option<&Station> {
        self.stations.iter().find(|s| s.uid() == uid)
    }

    /// Exact name match. Empty names never match.
    pub fn find_by_name(&self, name: &str) -> Option<&Station> {
        if name.is_empty() {
            return None;
        }
        self.stations.iter().find(|s| s.name() == Some(name))
    }

    pub fn find_by_uri(&self, uri: &str) -> Option<&Station> {
        self.stations.iter().find(|s| s.uri() == uri)
    }

    /// Look `text` up as a uri when it looks like one, as a name otherwise.
    pub fn find_by_guessing(&self, text: &str) -> Option<&Station> {
        if looks_like_uri(text) {
            self.find_by_uri(text)
        } else {
            self.find_by_name(text)
        }
    }

    /// Owned, ordered copy of the current members. Later changes to the
    /// collection do not affect it.
    pub fn iter(&self) -> Snapshot {
        Snapshot(self.stations.clone().into_iter())
    }

    // ── Edits ────────────────────────────────────────────────────────────────

    pub fn set_name(&mut self, uid: &str, name: Option<String>) -> bool {
        self.modify(uid, true, |s| {
            let changed = s.name != name;
            s.name = name;
            changed
        })
    }

    pub fn set_uri(&mut self, uid: &str, uri: String) -> bool {
        self.modify(uid, true, |s| {
            let changed = s.uri != uri;
            s.uri = uri;
            changed
        })
    }

    /// User agent edits are announced but do not schedule a save by
    /// themselves; they are written with the next one.
    pub fn set_user_agent(&mut self, uid: &str, user_agent: Option<String>) -> bool {
        self.modify(uid, false, |s| {
            let changed = s.user_agent != user_agent;
            s.user_agent = user_agent;
            changed
        })
    }

    /// Apply `edit` to a member. Returns false when `uid` is not a member.
    fn modify(&mut self, uid: &str, persist: bool, edit: impl FnOnce(&mut Station) -> bool) -> bool {
        let Some(station) = self.stations.iter_mut().find(|s| s.uid() == uid) else {
            warn!("Station '{}' not found in list", uid);
            return false;
        };

        if !edit(station) {
            return true;
        }
        let snapshot = station.clone();

        if persist {
            self.save_delayed();
        }
        self.events.emit(CollectionEvent::StationModified(snapshot));
        true
    }
}

impl<S: StationStore> Drop for StationCollection<S> {
    fn drop(&mut self) {
        if self.saver.cancel() {
            debug!("Flushing pending station list save");
            let _ = self.save();
        }
    }
}

impl<S: StationStore> std::fmt::Debug for StationCollection<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StationCollection")
            .field("stations", &self.stations)
            .field("paths", &self.paths)
            .field("save_pending", &self.saver.is_pending())
            .finish()
    }
}

/// Iterator over an owned copy of the members, see [`StationCollection::iter`].
#[derive(Debug, Clone)]
pub struct Snapshot(std::vec::IntoIter<Station>);

impl Iterator for Snapshot {
    type Item = Station;

    fn next(&mut self) -> Option<Station> {
        self.0.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl ExactSizeIterator for Snapshot {}

fn shuffled_uids(stations: &[Station]) -> Vec<String> {
    let mut uids: Vec<String> = stations.iter().map(|s| s.uid().to_owned()).collect();
    uids.shuffle(&mut rand::thread_rng());
    uids
}

fn looks_like_uri(text: &str) -> bool {
    Url::parse(text).is_ok_and(|url| URI_SCHEMES.contains(&url.scheme()))
}
