//! Waypoint Session Storage
//!
//! Session-scoped string storage for driver state that must survive a
//! page reload but not the end of the browsing session. The driver keeps
//! exactly one key here: the decimal form of the last minted marker id.
//!
//! The store is a capability injected by the host integration;
//! `MemoryStore` is the in-process implementation used by the host
//! simulator and by tests.

mod error;
mod memory;
mod store;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use store::SessionStore;

pub type Result<T> = std::result::Result<T, StoreError>;
