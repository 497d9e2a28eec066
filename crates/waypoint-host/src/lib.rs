//! Waypoint Host Abstraction
//!
//! The platform's browsing history, reduced to the four primitives the
//! driver actually needs: read the current location, push an entry with
//! an opaque payload, overwrite the current entry, and request a
//! backward navigation. Back/forward moves are acknowledged only through
//! an asynchronous change notification that carries the target entry's
//! payload — the host never says which direction was taken.
//!
//! `MemoryHost` is an in-process simulation of that contract, used to
//! run the driver headless and to test it without a real browser.

mod history;
mod location;
mod memory;

pub use history::{EntryPayload, HostHistory};
pub use location::HostLocation;
pub use memory::MemoryHost;
