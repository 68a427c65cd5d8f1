/// Live session lookup
///
/// Players currently connected to the host already carry a signed skin.
/// Resolution consults them before any cache or network call.
use crate::skin::{canonical_id, name_key, Skin};
use dashmap::DashMap;

/// Subject of a live lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subject<'a> {
    Name(&'a str),
    Id(&'a str),
}

/// Synchronous access to skins of sessions active in the host
pub trait LiveSessions: Send + Sync {
    /// Return the skin of a matching active session, if any
    fn try_local_skin(&self, subject: Subject<'_>) -> Option<Skin>;
}

/// Host without live sessions
#[derive(Debug, Default, Clone, Copy)]
pub struct NoLiveSessions;

impl LiveSessions for NoLiveSessions {
    fn try_local_skin(&self, _subject: Subject<'_>) -> Option<Skin> {
        None
    }
}

/// In-memory registry of active sessions
///
/// Hosts call `join` and `leave` as players connect and disconnect.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    by_id: DashMap<String, Skin>,
    names: DashMap<String, String>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an active session
    pub fn join(&self, name: &str, id: &str, skin: Skin) {
        let id = canonical_id(id);
        self.names.insert(name_key(name), id.clone());
        self.by_id.insert(id, skin);
    }

    /// Replace the skin of an active session
    ///
    /// Returns false if no session with this id is registered.
    pub fn update_skin(&self, id: &str, skin: Skin) -> bool {
        match self.by_id.get_mut(&canonical_id(id)) {
            Some(mut current) => {
                *current = skin;
                true
            }
            None => false,
        }
    }

    /// Remove a session by id
    pub fn leave(&self, id: &str) {
        let id = canonical_id(id);
        self.by_id.remove(&id);
        self.names.retain(|_, session_id| *session_id != id);
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

impl LiveSessions for SessionRegistry {
    fn try_local_skin(&self, subject: Subject<'_>) -> Option<Skin> {
        let id = match subject {
            Subject::Id(id) => canonical_id(id),
            Subject::Name(name) => self.names.get(&name_key(name))?.value().clone(),
        };
        self.by_id.get(&id).map(|skin| skin.value().clone())
    }
}
