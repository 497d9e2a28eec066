//! In-memory host simulator

use parking_lot::RwLock;
use std::collections::VecDeque;
use std::sync::Arc;

use crate::history::{EntryPayload, HostHistory};
use crate::location::HostLocation;

#[derive(Debug, Clone)]
struct Entry {
    location: HostLocation,
    payload: Option<EntryPayload>,
}

#[derive(Debug)]
struct Inner {
    entries: Vec<Entry>,
    current: usize,
    /// Change notifications not yet delivered, oldest first. Each item
    /// is the payload of the entry that became current.
    pending: VecDeque<Option<EntryPayload>>,
}

/// In-process `HostHistory` with explicit, pumpable notifications.
///
/// Host-driven moves queue a notification instead of invoking a callback;
/// the embedder drains them with [`take_notification`] and feeds each one
/// to the driver. That reproduces the platform's asynchronous delivery in
/// a single-threaded, deterministic way.
///
/// Clones share the same history, so a driver and the code steering the
/// simulation can each hold a handle.
///
/// [`take_notification`]: MemoryHost::take_notification
pub struct MemoryHost {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryHost {
    /// A host with a single untagged entry at `/`, like a fresh tab.
    pub fn new() -> Self {
        Self::with_location(HostLocation::root())
    }

    pub fn with_location(location: HostLocation) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner {
                entries: vec![Entry {
                    location,
                    payload: None,
                }],
                current: 0,
                pending: VecDeque::new(),
            })),
        }
    }

    /// Move forward one entry, queueing a notification. No-op at the
    /// newest entry.
    pub fn navigate_forward(&self) {
        let mut inner = self.inner.write();
        if inner.current + 1 < inner.entries.len() {
            inner.current += 1;
            let payload = inner.entries[inner.current].payload.clone();
            inner.pending.push_back(payload);
        }
    }

    /// Simulate the user editing the address bar: an untagged entry is
    /// created, becomes current, and a notification is queued.
    pub fn visit_untagged(&self, locator: &str) {
        let mut inner = self.inner.write();
        let location = inner.entries[inner.current].location.with_locator(locator);
        let keep = inner.current + 1;
        inner.entries.truncate(keep);
        inner.entries.push(Entry {
            location,
            payload: None,
        });
        inner.current += 1;
        inner.pending.push_back(None);
        tracing::debug!(locator = %locator, "Untagged visit");
    }

    /// Pop the oldest undelivered change notification. `None` means the
    /// queue is empty; `Some(None)` is a notification for an entry that
    /// carries no payload.
    pub fn take_notification(&self) -> Option<Option<EntryPayload>> {
        self.inner.write().pending.pop_front()
    }

    pub fn entry_count(&self) -> usize {
        self.inner.read().entries.len()
    }

    pub fn current_index(&self) -> usize {
        self.inner.read().current
    }

    /// Payload of the current entry, for assertions.
    pub fn current_payload(&self) -> Option<EntryPayload> {
        let inner = self.inner.read();
        inner.entries[inner.current].payload.clone()
    }
}

impl HostHistory for MemoryHost {
    fn current_location(&self) -> HostLocation {
        let inner = self.inner.read();
        inner.entries[inner.current].location.clone()
    }

    fn create_entry(&self, payload: EntryPayload, locator: &str) {
        let mut inner = self.inner.write();
        let location = inner.entries[inner.current].location.with_locator(locator);
        let keep = inner.current + 1;
        inner.entries.truncate(keep);
        inner.entries.push(Entry {
            location,
            payload: Some(payload),
        });
        inner.current += 1;
    }

    fn mutate_current_entry(&self, payload: EntryPayload, locator: &str) {
        let mut inner = self.inner.write();
        let index = inner.current;
        let location = inner.entries[index].location.with_locator(locator);
        inner.entries[index] = Entry {
            location,
            payload: Some(payload),
        };
    }

    fn navigate_back(&self) {
        let mut inner = self.inner.write();
        if inner.current > 0 {
            inner.current -= 1;
            let payload = inner.entries[inner.current].payload.clone();
            inner.pending.push_back(payload);
        }
    }
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for MemoryHost {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}
