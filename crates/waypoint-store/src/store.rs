//! Session store capability

use crate::Result;

/// String key/value storage scoped to the current browsing session.
///
/// Implementations back onto whatever the host platform offers
/// (web `sessionStorage`, an app-shell preference table, plain memory).
/// Values persist across a page reload within the same session and are
/// discarded when the session ends.
pub trait SessionStore {
    /// Read a value. `Ok(None)` means the key has never been written
    /// this session.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value, replacing any previous one. The write must be
    /// visible to any reader of the same session before this returns.
    fn set(&self, key: &str, value: &str) -> Result<()>;
}
