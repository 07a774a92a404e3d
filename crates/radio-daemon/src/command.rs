/// One line of input on the daemon's stdin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List,
    Add { uri: String, name: Option<String> },
    Remove { station: String },
    Up { station: String },
    Down { station: String },
    First { station: String },
    Last { station: String },
    Next { repeat: bool, shuffle: bool },
    Prev { repeat: bool, shuffle: bool },
    Rename { station: String, name: Option<String> },
    UserAgent { station: String, user_agent: Option<String> },
    Resolve { target: String },
    Save,
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  list                           show the station list
  add <uri> [name]               append a station
  remove <station>               remove a station
  up|down|first|last <station>   reorder a station
  next|prev [repeat] [shuffle]   select the next/previous station
  rename <station> [name]        rename a station, no name clears it
  ua <station> [user-agent]      set or clear a station's user agent
  resolve <station|uri>          download a playlist and list its streams
  save                           write the station list now
  quit                           save pending changes and exit
<station> is a uid, a name or a uri";

impl Command {
    /// Parse a command line. Blank lines yield `Ok(None)`.
    pub fn parse(line: &str) -> Result<Option<Self>, String> {
        let line = line.trim();
        let Some((verb, rest)) = split_word(line) else {
            return Ok(None);
        };

        let cmd = match verb {
            "list" | "ls" => Self::List,
            "add" => {
                let (uri, name) = split_word(rest).ok_or("usage: add <uri> [name]")?;
                Self::Add {
                    uri: uri.to_string(),
                    name: non_empty(name),
                }
            }
            "remove" | "rm" => Self::Remove {
                station: required(rest, "usage: remove <station>")?,
            },
            "up" => Self::Up {
                station: required(rest, "usage: up <station>")?,
            },
            "down" => Self::Down {
                station: required(rest, "usage: down <station>")?,
            },
            "first" => Self::First {
                station: required(rest, "usage: first <station>")?,
            },
            "last" => Self::Last {
                station: required(rest, "usage: last <station>")?,
            },
            "next" | "prev" => {
                let mut repeat = false;
                let mut shuffle = false;
                for flag in rest.split_whitespace() {
                    match flag {
                        "repeat" => repeat = true,
                        "shuffle" => shuffle = true,
                        other => return Err(format!("unknown flag '{other}'")),
                    }
                }
                if verb == "next" {
                    Self::Next { repeat, shuffle }
                } else {
                    Self::Prev { repeat, shuffle }
                }
            }
            "rename" => {
                let (station, name) = split_word(rest).ok_or("usage: rename <station> [name]")?;
                Self::Rename {
                    station: station.to_string(),
                    name: non_empty(name),
                }
            }
            "ua" => {
                let (station, ua) = split_word(rest).ok_or("usage: ua <station> [user-agent]")?;
                Self::UserAgent {
                    station: station.to_string(),
                    user_agent: non_empty(ua),
                }
            }
            "resolve" => Self::Resolve {
                target: required(rest, "usage: resolve <station|uri>")?,
            },
            "save" => Self::Save,
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            other => return Err(format!("unknown command '{other}', try 'help'")),
        };
        Ok(Some(cmd))
    }
}

/// First whitespace separated word and the trimmed remainder.
fn split_word(text: &str) -> Option<(&str, &str)> {
    let text = text.trim_start();
    if text.is_empty() {
        return None;
    }
    match text.split_once(char::is_whitespace) {
        Some((word, rest)) => Some((word, rest.trim())),
        None => Some((text, "")),
    }
}

fn required(rest: &str, usage: &str) -> Result<String, String> {
    non_empty(rest).ok_or_else(|| usage.to_string())
}

fn non_empty(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_line() {
        assert_eq!(Command::parse("   ").unwrap(), None);
    }

    #[test]
    fn test_add_keeps_spaces_in_name() {
        assert_eq!(
            Command::parse("add http://a/live  Radio  Grenouille ").unwrap(),
            Some(Command::Add {
                uri: "http://a/live".into(),
                name: Some("Radio  Grenouille".into()),
            })
        );
        assert_eq!(
            Command::parse("add http://a/live").unwrap(),
            Some(Command::Add {
                uri: "http://a/live".into(),
                name: None,
            })
        );
        assert!(Command::parse("add").is_err());
    }

    #[test]
    fn test_navigation_flags() {
        assert_eq!(
            Command::parse("next shuffle repeat").unwrap(),
            Some(Command::Next {
                repeat: true,
                shuffle: true,
            })
        );
        assert_eq!(
            Command::parse("prev").unwrap(),
            Some(Command::Prev {
                repeat: false,
                shuffle: false,
            })
        );
        assert!(Command::parse("next loop").is_err());
    }

    #[test]
    fn test_station_argument_is_the_rest_of_line() {
        assert_eq!(
            Command::parse("remove FIP Autour du Jazz").unwrap(),
            Some(Command::Remove {
                station: "FIP Autour du Jazz".into(),
            })
        );
        assert!(Command::parse("up").is_err());
    }

    #[test]
    fn test_rename_without_name_clears_it() {
        assert_eq!(
            Command::parse("rename 0123abcd").unwrap(),
            Some(Command::Rename {
                station: "0123abcd".into(),
                name: None,
            })
        );
    }

    #[test]
    fn test_unknown_command() {
        let err = Command::parse("play 1").unwrap_err();
        assert!(err.contains("play"));
    }
}
