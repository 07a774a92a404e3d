use radio_core::{
    CollectionEvent, FsStore, PlaylistResolver, ResolveError, Station, StationCollection,
    Subscription,
};
use tokio::io::{AsyncBufRead, Lines};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::command::{Command, HELP};

/// Completions delivered back onto the event loop.
#[derive(Debug)]
pub enum DaemonEvent {
    Resolved {
        uri: String,
        result: Result<Vec<String>, ResolveError>,
    },
}

enum Flow {
    Continue,
    Quit,
}

pub struct DaemonCore {
    collection: StationCollection<FsStore>,
    resolver: PlaylistResolver,
    insecure: bool,
    /// Uid of the selected station.
    current: Option<String>,
    event_tx: mpsc::Sender<DaemonEvent>,
}

impl DaemonCore {
    pub fn new(
        collection: StationCollection<FsStore>,
        resolver: PlaylistResolver,
        event_tx: mpsc::Sender<DaemonEvent>,
    ) -> Self {
        let insecure = resolver.config().insecure;
        Self {
            collection,
            resolver,
            insecure,
            current: None,
            event_tx,
        }
    }

    /// Serve commands from `lines` until `quit`, end of input or Ctrl-C. The
    /// collection is dropped on return, which writes any pending save.
    pub async fn run<R>(
        mut self,
        mut lines: Lines<R>,
        mut event_rx: mpsc::Receiver<DaemonEvent>,
    ) -> anyhow::Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        info!("Starting radio daemon with {} stations", self.collection.len());

        loop {
            tokio::select! {
                _ = self.collection.save_due() => {
                    self.collection.run_pending_save();
                }

                line = lines.next_line() => match line {
                    Ok(Some(line)) => {
                        if let Flow::Quit = self.handle_line(&line) {
                            info!("Quit requested");
                            break;
                        }
                    }
                    Ok(None) => {
                        info!("Input closed, shutting down");
                        break;
                    }
                    Err(e) => {
                        error!("Failed to read command: {}", e);
                        break;
                    }
                },

                Some(event) = event_rx.recv() => {
                    self.handle_event(event);
                }

                _ = tokio::signal::ctrl_c() => {
                    info!("Interrupted, shutting down");
                    break;
                }
            }
        }

        Ok(())
    }

    fn handle_line(&mut self, line: &str) -> Flow {
        match Command::parse(line) {
            Ok(Some(cmd)) => {
                debug!("Processing command: {:?}", cmd);
                self.handle_command(cmd)
            }
            Ok(None) => Flow::Continue,
            Err(message) => {
                println!("{message}");
                Flow::Continue
            }
        }
    }

    fn handle_command(&mut self, cmd: Command) -> Flow {
        match cmd {
            Command::List => self.list(),
            Command::Add { uri, name } => {
                let station = Station::new(name, uri);
                let uid = station.uid().to_owned();
                self.collection.append(station);
                if self.collection.contains(&uid) {
                    println!("added {uid}");
                } else {
                    println!("not added: a station with that name or uri exists");
                }
            }
            Command::Remove { station } => {
                if let Some(uid) = self.lookup(&station) {
                    if let Some(removed) = self.collection.remove(&uid) {
                        if self.current.as_deref() == Some(removed.uid()) {
                            self.current = None;
                        }
                        println!("removed {}", removed.name_or_uri());
                    }
                }
            }
            Command::Up { station } => {
                if let Some((uid, pos)) = self.lookup_with_position(&station) {
                    self.collection.move_to(&uid, pos.saturating_sub(1));
                }
            }
            Command::Down { station } => {
                if let Some((uid, pos)) = self.lookup_with_position(&station) {
                    self.collection.move_to(&uid, pos + 1);
                }
            }
            Command::First { station } => {
                if let Some(uid) = self.lookup(&station) {
                    self.collection.move_first(&uid);
                }
            }
            Command::Last { station } => {
                if let Some(uid) = self.lookup(&station) {
                    self.collection.move_last(&uid);
                }
            }
            Command::Next { repeat, shuffle } => {
                let next = self
                    .collection
                    .next(self.current.as_deref(), repeat, shuffle)
                    .cloned();
                self.select(next);
            }
            Command::Prev { repeat, shuffle } => {
                let prev = self
                    .collection
                    .prev(self.current.as_deref(), repeat, shuffle)
                    .cloned();
                self.select(prev);
            }
            Command::Rename { station, name } => {
                if let Some(uid) = self.lookup(&station) {
                    self.collection.set_name(&uid, name);
                }
            }
            Command::UserAgent {
                station,
                user_agent,
            } => {
                if let Some(uid) = self.lookup(&station) {
                    self.collection.set_user_agent(&uid, user_agent);
                }
            }
            Command::Resolve { target } => self.spawn_resolve(&target),
            Command::Save => {
                if let Err(e) = self.collection.save() {
                    println!("{e}");
                }
            }
            Command::Help => println!("{HELP}"),
            Command::Quit => return Flow::Quit,
        }
        Flow::Continue
    }

    fn handle_event(&mut self, event: DaemonEvent) {
        match event {
            DaemonEvent::Resolved { uri, result } => match result {
                Ok(streams) => {
                    println!("{uri}:");
                    for stream in streams {
                        println!("  {stream}");
                    }
                }
                Err(e) => println!("{uri}: {e}"),
            },
        }
    }

    fn list(&self) {
        for (idx, station) in self.collection.iter().enumerate() {
            let marker = if self.current.as_deref() == Some(station.uid()) {
                '*'
            } else {
                ' '
            };
            println!(
                "{marker}{idx:>3}  {}  {:<28}  {}",
                station.uid(),
                station.name().unwrap_or("-"),
                station.uri()
            );
        }
    }

    fn select(&mut self, station: Option<Station>) {
        match station {
            Some(station) => {
                println!("> {} ({})", station.name_or_uri(), station.uri());
                self.current = Some(station.uid().to_owned());
            }
            None => println!("end of list"),
        }
    }

    /// Uid of the station designated by `text`: a uid, a name or a uri.
    fn lookup(&self, text: &str) -> Option<String> {
        let found = if self.collection.contains(text) {
            Some(text.to_owned())
        } else {
            self.collection
                .find_by_guessing(text)
                .map(|s| s.uid().to_owned())
        };
        if found.is_none() {
            println!("no station matches '{text}'");
        }
        found
    }

    fn lookup_with_position(&self, text: &str) -> Option<(String, usize)> {
        let uid = self.lookup(text)?;
        let pos = self.collection.position(&uid)?;
        Some((uid, pos))
    }

    /// Start a download in the background. A member's own user agent is used
    /// when `target` designates one.
    fn spawn_resolve(&self, target: &str) {
        let member = if self.collection.contains(target) {
            self.collection.find_by_uid(target)
        } else {
            self.collection.find_by_guessing(target)
        };
        let (uri, user_agent) = match member {
            Some(station) => (
                station.uri().to_owned(),
                station.user_agent().map(str::to_owned),
            ),
            None => (target.to_owned(), None),
        };

        let resolver = self.resolver.clone();
        let insecure = self.insecure;
        let event_tx = self.event_tx.clone();
        tokio::spawn(async move {
            let result = resolver
                .resolve(&uri, insecure, user_agent.as_deref())
                .await;
            // the loop may already be gone, the result is then discarded
            let _ = event_tx.send(DaemonEvent::Resolved { uri, result }).await;
        });
    }
}

/// Log collection events until the collection goes away.
pub async fn log_collection_events(mut events: Subscription) {
    loop {
        match events.recv().await {
            Ok(CollectionEvent::Loaded) => debug!("Station list loaded"),
            Ok(event) => debug!("Station list event: {:?}", event),
            Err(RecvError::Lagged(missed)) => warn!("Missed {} station list events", missed),
            Err(RecvError::Closed) => break,
        }
    }
}
