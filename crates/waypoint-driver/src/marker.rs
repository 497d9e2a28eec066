//! Marker minting and persistence
//!
//! Markers count entries created, not stack depth: the counter never
//! goes down, even when navigation moves backward. Each mint is
//! persisted to session storage before it is handed out, so a reload
//! that happens right after a mint still sees the new floor and can
//! never re-issue an id already embedded in a host entry.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

use waypoint_store::SessionStore;

use crate::Result;

/// Session-store key holding the decimal form of the last minted id.
pub const COUNTER_KEY: &str = "waypoint.marker.id";

/// Identifier embedded in a host history entry. The sole signal for
/// telling entries apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Marker {
    pub id: u64,
}

/// Mints strictly increasing markers for one browsing session.
pub struct MarkerMinter<S: SessionStore> {
    store: S,
    last: AtomicU64,
}

impl<S: SessionStore> MarkerMinter<S> {
    /// Reads the persisted counter exactly once. A missing, unreadable,
    /// or unparseable value means "no prior value", not an error.
    pub fn new(store: S) -> Self {
        let last = match store.get(COUNTER_KEY) {
            Ok(Some(raw)) => match raw.trim().parse::<u64>() {
                Ok(value) => value,
                Err(_) => {
                    tracing::warn!(value = %raw, "Discarding unparseable marker counter");
                    0
                }
            },
            Ok(None) => 0,
            Err(e) => {
                tracing::warn!(error = %e, "Marker counter unreadable, starting from zero");
                0
            }
        };

        Self {
            store,
            last: AtomicU64::new(last),
        }
    }

    /// Mint the next marker and persist the new floor before returning.
    ///
    /// The in-memory counter advances even when the write fails, so ids
    /// stay strictly increasing for this process either way.
    pub fn next(&self) -> Result<Marker> {
        let id = self.last.fetch_add(1, Ordering::SeqCst) + 1;
        self.store.set(COUNTER_KEY, &id.to_string())?;
        Ok(Marker { id })
    }

    /// The most recently minted id, `0` if nothing was minted this
    /// session.
    pub fn last(&self) -> u64 {
        self.last.load(Ordering::SeqCst)
    }
}
