//! Waypoint Navigation Driver
//!
//! Reconciles an application's logical navigation stack with a host
//! history that offers only an opaque per-entry state slot, a
//! back/forward primitive, and asynchronous change notifications — no
//! entry identifiers and no signal for which direction was taken.
//!
//! The driver tags every entry it creates with a monotonically
//! increasing marker, persisted in session storage so the sequence
//! survives a reload. When the host later reports a location change,
//! the direction is recovered by comparing the notified entry's marker
//! against the last one seen: a larger marker means forward, anything
//! else means backward, and a missing marker means the entry was not
//! ours and is adopted as a fresh forward navigation.

mod addressing;
mod driver;
mod error;
mod events;
mod marker;

pub use addressing::AddressingMode;
pub use driver::{HistoryDriver, NavigationPayload};
pub use error::DriverError;
pub use events::{ActionKind, RouteEvents, RouteRecord, Subscription};
pub use marker::{Marker, MarkerMinter, COUNTER_KEY};

pub type Result<T> = std::result::Result<T, DriverError>;
