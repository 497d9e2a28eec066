//! Host history capability

use crate::location::HostLocation;

/// Opaque per-entry state slot. The host stores and returns it verbatim
/// and never interprets it.
pub type EntryPayload = serde_json::Value;

/// The navigation primitives a host platform must provide.
///
/// `create_entry` and `mutate_current_entry` complete synchronously and
/// do NOT fire a change notification — only host-driven moves (back,
/// forward, an out-of-band entry becoming current) do, and those arrive
/// asynchronously with the now-current entry's payload attached.
pub trait HostHistory {
    /// The host's effective location right now.
    fn current_location(&self) -> HostLocation;

    /// Push a new entry carrying `payload` at `locator`. Any entries
    /// forward of the current one are discarded, as browsers do.
    fn create_entry(&self, payload: EntryPayload, locator: &str);

    /// Overwrite the current entry's payload and locator in place.
    /// The history length does not change.
    fn mutate_current_entry(&self, payload: EntryPayload, locator: &str);

    /// Request a one-entry backward move. Fire-and-forget: the outcome
    /// is observable only through a later change notification, and a
    /// request at the oldest entry may resolve to nothing at all.
    fn navigate_back(&self);
}
