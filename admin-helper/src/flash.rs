//! FlashStore: session-scoped, read-once error and note buffers.
//!
//! One request writes, the next one reads. Every take clears what it
//! returns, so each message is delivered at most once. Takes run under the
//! session's shard lock, making concurrent readers of one session see each
//! message exactly once between them.

use std::fmt;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Identifies the session (or actor) flash messages belong to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Errors and notes delivered to the user on one page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashMessages {
    pub errors: Vec<String>,
    pub notes: Vec<String>,
}

impl FlashMessages {
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.notes.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct FlashStore {
    buffers: DashMap<SessionId, FlashMessages>,
}

impl FlashStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append errors after any unread ones.
    pub fn add_errors<I, S>(&self, session: &SessionId, errors: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let errors: Vec<String> = errors.into_iter().map(Into::into).collect();
        if errors.is_empty() {
            return;
        }
        trace!(%session, count = errors.len(), "flash errors added");
        self.buffers
            .entry(session.clone())
            .or_default()
            .errors
            .extend(errors);
    }

    /// Append notes after any unread ones.
    pub fn add_notes<I, S>(&self, session: &SessionId, notes: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let notes: Vec<String> = notes.into_iter().map(Into::into).collect();
        if notes.is_empty() {
            return;
        }
        trace!(%session, count = notes.len(), "flash notes added");
        self.buffers
            .entry(session.clone())
            .or_default()
            .notes
            .extend(notes);
    }

    /// Read and clear the session's errors.
    pub fn take_errors(&self, session: &SessionId) -> Vec<String> {
        let errors = self
            .buffers
            .get_mut(session)
            .map(|mut buffer| std::mem::take(&mut buffer.errors))
            .unwrap_or_default();
        self.forget_if_empty(session);
        errors
    }

    /// Read and clear the session's notes.
    pub fn take_notes(&self, session: &SessionId) -> Vec<String> {
        let notes = self
            .buffers
            .get_mut(session)
            .map(|mut buffer| std::mem::take(&mut buffer.notes))
            .unwrap_or_default();
        self.forget_if_empty(session);
        notes
    }

    /// Read and clear errors and notes together.
    pub fn take(&self, session: &SessionId) -> FlashMessages {
        self.buffers
            .remove(session)
            .map(|(_, messages)| messages)
            .unwrap_or_default()
    }

    /// Unread errors without clearing them.
    pub fn peek_errors(&self, session: &SessionId) -> Vec<String> {
        self.buffers
            .get(session)
            .map(|buffer| buffer.errors.clone())
            .unwrap_or_default()
    }

    pub fn has_errors(&self, session: &SessionId) -> bool {
        self.buffers
            .get(session)
            .is_some_and(|buffer| !buffer.errors.is_empty())
    }

    /// Sessions holding unread messages.
    pub fn session_count(&self) -> usize {
        self.buffers.len()
    }

    fn forget_if_empty(&self, session: &SessionId) {
        self.buffers.remove_if(session, |_, buffer| buffer.is_empty());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn write_then_read_once() {
        let store = FlashStore::new();
        let session = SessionId::new("s1");
        store.add_errors(&session, ["NAME required"]);

        assert_eq!(store.take_errors(&session), vec!["NAME required"]);
        assert!(store.take_errors(&session).is_empty());
    }

    #[test]
    fn appends_never_overwrite_unread_entries() {
        let store = FlashStore::new();
        let session = SessionId::new("s1");
        store.add_notes(&session, ["saved"]);
        store.add_notes(&session, vec!["indexed".to_string(), "mailed".to_string()]);

        assert_eq!(store.take_notes(&session), vec!["saved", "indexed", "mailed"]);
        assert!(store.take_notes(&session).is_empty());
    }

    #[test]
    fn sessions_are_isolated() {
        let store = FlashStore::new();
        let alice = SessionId::new("alice");
        let bob = SessionId::new("bob");
        store.add_errors(&alice, ["denied"]);

        assert!(store.take_errors(&bob).is_empty());
        assert_eq!(store.take_errors(&alice), vec!["denied"]);
    }

    #[test]
    fn taking_errors_leaves_notes() {
        let store = FlashStore::new();
        let session = SessionId::new("s1");
        store.add_errors(&session, ["bad"]);
        store.add_notes(&session, ["fyi"]);

        assert_eq!(store.take_errors(&session), vec!["bad"]);
        assert!(store.has_errors(&session) == false);
        let rest = store.take(&session);
        assert!(rest.errors.is_empty());
        assert_eq!(rest.notes, vec!["fyi"]);
        assert!(store.take(&session).is_empty());
    }

    #[test]
    fn drained_sessions_are_forgotten() {
        let store = FlashStore::new();
        let session = SessionId::new("s1");
        store.add_errors(&session, ["bad"]);
        store.add_notes(&session, ["fyi"]);

        store.take_errors(&session);
        assert_eq!(store.session_count(), 1);
        store.take_notes(&session);
        assert_eq!(store.session_count(), 0);

        store.take_errors(&SessionId::new("never-wrote"));
        assert_eq!(store.session_count(), 0);
    }

    #[test]
    fn peek_does_not_clear() {
        let store = FlashStore::new();
        let session = SessionId::new("s1");
        store.add_errors(&session, ["bad"]);
        assert_eq!(store.peek_errors(&session), vec!["bad"]);
        assert!(store.has_errors(&session));
        assert_eq!(store.take_errors(&session), vec!["bad"]);
    }

    #[test]
    fn empty_additions_are_ignored() {
        let store = FlashStore::new();
        let session = SessionId::new("s1");
        store.add_errors(&session, Vec::<String>::new());
        assert!(store.take(&session).is_empty());
    }

    #[test]
    fn concurrent_takes_deliver_each_message_once() {
        let store = Arc::new(FlashStore::new());
        let session = SessionId::new("shared");
        store.add_errors(&session, (0..100).map(|i| format!("e{i}")));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                let session = session.clone();
                std::thread::spawn(move || store.take_errors(&session))
            })
            .collect();

        let delivered: usize = handles.into_iter().map(|h| h.join().unwrap().len()).sum();
        assert_eq!(delivered, 100);
    }
}
