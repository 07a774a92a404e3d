/// A playable radio entry.
///
/// The `uid` is assigned once at construction and never changes. Everything
/// else is mutable, but once a station is a member of a
/// [`StationCollection`](crate::collection::StationCollection) it is mutated
/// through the collection so that changes are observed and persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Station {
    uid: String,
    pub name: Option<String>,
    pub uri: String,
    /// Overrides the default user agent when fetching this station
    pub user_agent: Option<String>,
}

impl Station {
    pub fn new(name: Option<String>, uri: impl Into<String>) -> Self {
        Self {
            uid: make_uid(),
            name,
            uri: uri.into(),
            user_agent: None,
        }
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn user_agent(&self) -> Option<&str> {
        self.user_agent.as_deref()
    }

    /// Display label: the name when there is one, the uri otherwise.
    pub fn name_or_uri(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => &self.uri,
        }
    }

    /// Whether `other` should be refused as a duplicate of `self`.
    ///
    /// Rules are checked in order: same uid (a programming error), same
    /// non-empty name on both sides, same uri.
    pub(crate) fn similarity(&self, other: &Station) -> Option<Similarity> {
        if self.uid == other.uid {
            return Some(Similarity::Uid);
        }
        if let (Some(a), Some(b)) = (self.name.as_deref(), other.name.as_deref()) {
            if a == b {
                return Some(Similarity::Name);
            }
        }
        if self.uri == other.uri {
            return Some(Similarity::Uri);
        }
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Similarity {
    Uid,
    Name,
    Uri,
}

/// Random 64-bit identifier rendered as 16 hex chars.
fn make_uid() -> String {
    format!("{:016x}", rand::random::<u64>())
}
