//! Navigation driver and direction classifier
//!
//! The host reports "the location changed" without saying how it
//! changed. The driver recovers the direction from the marker embedded
//! in the notified entry: a marker above the last known id is a forward
//! move, a marker at or below it is a backward move, and a missing
//! marker means the entry was created outside this driver (typed-in
//! URL, pre-session entry) and gets adopted as a fresh forward
//! navigation. `current_id` changes only through a driver-issued write
//! or a classified notification, never speculatively.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};

use waypoint_host::{EntryPayload, HostHistory};
use waypoint_store::SessionStore;

use crate::addressing::AddressingMode;
use crate::events::{ActionKind, RouteEvents, RouteRecord, Subscription};
use crate::marker::{Marker, MarkerMinter};
use crate::Result;

/// Everything the driver writes into a host entry's opaque slot. The
/// `state` field is consumer-supplied and never inspected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigationPayload {
    pub marker: Marker,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<Value>,
}

impl NavigationPayload {
    fn marker_only(marker: Marker) -> Self {
        Self {
            marker,
            state: None,
        }
    }
}

/// Orchestrates writes to host history and classifies host change
/// notifications into normalized route records.
///
/// The addressing mode is fixed at construction. All operations run to
/// completion synchronously; `pop` is the one command whose effect
/// arrives later, through [`handle_host_change`].
///
/// [`handle_host_change`]: HistoryDriver::handle_host_change
pub struct HistoryDriver<H: HostHistory, S: SessionStore> {
    host: H,
    minter: MarkerMinter<S>,
    mode: AddressingMode,
    current_id: AtomicU64,
    events: RouteEvents,
}

impl<H: HostHistory, S: SessionStore> HistoryDriver<H, S> {
    /// Driver in fragment addressing mode, the reference default.
    pub fn new(host: H, store: S) -> Self {
        Self::with_mode(host, store, AddressingMode::Fragment)
    }

    pub fn with_mode(host: H, store: S, mode: AddressingMode) -> Self {
        Self {
            host,
            minter: MarkerMinter::new(store),
            mode,
            current_id: AtomicU64::new(0),
            events: RouteEvents::new(),
        }
    }

    pub fn mode(&self) -> AddressingMode {
        self.mode
    }

    /// Id of the most recently classified route record.
    pub fn current_id(&self) -> u64 {
        self.current_id.load(Ordering::SeqCst)
    }

    pub fn on_route_change(
        &self,
        listener: impl Fn(&RouteRecord) + Send + Sync + 'static,
    ) -> Subscription {
        self.events.subscribe(listener)
    }

    pub fn unsubscribe(&self, subscription: Subscription) -> bool {
        self.events.unsubscribe(subscription)
    }

    /// Tag the entry that is current at startup and report where we are.
    ///
    /// Must run before host notifications are wired up, so the driver's
    /// first observation of the location is self-consistent. Overwrites
    /// the current entry in place even though no navigation occurred;
    /// each call mints a fresh id but always emits [`ActionKind::None`].
    pub fn initialize(&self) -> Result<()> {
        let mut path = self.current_virtual_path();
        if path.is_empty() {
            path = "/".to_string();
        }

        let marker = self.minter.next()?;
        let payload = serde_json::to_value(NavigationPayload::marker_only(marker))?;
        self.host.mutate_current_entry(payload, &self.mode.to_locator(&path));

        tracing::info!(id = marker.id, path = %path, "Driver initialized");
        self.finish(ActionKind::None, marker.id, path, None);
        Ok(())
    }

    /// Create a new tagged host entry at `path` and report it
    /// synchronously. Pushing does not trigger a host notification, so
    /// the record is command-driven.
    pub fn push(&self, path: &str, state: Option<Value>) -> Result<()> {
        let marker = self.minter.next()?;
        let payload = serde_json::to_value(NavigationPayload {
            marker,
            state: state.clone(),
        })?;
        self.host.create_entry(payload, &self.mode.to_locator(path));

        tracing::debug!(id = marker.id, path = %path, "Pushed entry");
        self.finish(ActionKind::Push, marker.id, path.to_string(), state);
        Ok(())
    }

    /// Overwrite the current host entry in place. Same contract as
    /// [`push`](HistoryDriver::push), different host mutation.
    pub fn replace(&self, path: &str, state: Option<Value>) -> Result<()> {
        let marker = self.minter.next()?;
        let payload = serde_json::to_value(NavigationPayload {
            marker,
            state: state.clone(),
        })?;
        self.host.mutate_current_entry(payload, &self.mode.to_locator(path));

        tracing::debug!(id = marker.id, path = %path, "Replaced entry");
        self.finish(ActionKind::Replace, marker.id, path.to_string(), state);
        Ok(())
    }

    /// Request a one-entry backward move. Fire-and-forget: the record
    /// arrives later through [`handle_host_change`], with no ordering or
    /// timing guarantee, and rapid repeated calls are not debounced.
    ///
    /// [`handle_host_change`]: HistoryDriver::handle_host_change
    pub fn pop(&self) {
        tracing::debug!(current_id = self.current_id(), "Requested back navigation");
        self.host.navigate_back();
    }

    /// Classify a host change notification.
    ///
    /// `payload` is the opaque slot of the entry that became current,
    /// absent when the entry carries none. A payload without a readable
    /// marker is treated the same as no payload at all.
    pub fn handle_host_change(&self, payload: Option<EntryPayload>) -> Result<()> {
        let tagged =
            payload.and_then(|value| serde_json::from_value::<NavigationPayload>(value).ok());

        match tagged {
            Some(NavigationPayload { marker, state }) => {
                let path = self.current_virtual_path();
                // Equality resolves to Pop: a duplicate notification for
                // the current entry reports as backward.
                let kind = if marker.id > self.current_id() {
                    ActionKind::Push
                } else {
                    ActionKind::Pop
                };
                tracing::debug!(id = marker.id, path = %path, kind = ?kind, "Classified notification");
                self.finish(kind, marker.id, path, state);
            }
            None => {
                // Entry we did not create. Tag it and treat it as a
                // brand-new forward navigation; there is no basis for
                // relating it to prior entries.
                let path = self.current_virtual_path();
                let marker = self.minter.next()?;
                let payload = serde_json::to_value(NavigationPayload::marker_only(marker))?;
                self.host.mutate_current_entry(payload, &self.mode.to_locator(&path));

                tracing::info!(id = marker.id, path = %path, "Adopted untagged entry");
                self.finish(ActionKind::Push, marker.id, path, None);
            }
        }
        Ok(())
    }

    fn current_virtual_path(&self) -> String {
        let location = self.host.current_location();
        match self.mode.virtual_path(&location) {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!(error = %e, "Unparseable location, defaulting to /");
                "/".to_string()
            }
        }
    }

    fn finish(&self, kind: ActionKind, id: u64, path: String, state: Option<Value>) {
        self.current_id.store(id, Ordering::SeqCst);
        let record = RouteRecord {
            id: id.to_string(),
            path,
            state,
            kind,
        };
        self.events.publish(&record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use serde_json::json;
    use std::sync::Arc;
    use waypoint_host::{HostLocation, MemoryHost};
    use waypoint_store::{MemoryStore, SessionStore};

    use crate::marker::COUNTER_KEY;

    type TestDriver = HistoryDriver<MemoryHost, MemoryStore>;

    fn setup(mode: AddressingMode) -> (TestDriver, MemoryHost, MemoryStore) {
        let host = MemoryHost::new();
        let store = MemoryStore::new();
        let driver = HistoryDriver::with_mode(host.clone(), store.clone(), mode);
        (driver, host, store)
    }

    fn recording(driver: &TestDriver) -> Arc<Mutex<Vec<RouteRecord>>> {
        let records = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&records);
        driver.on_route_change(move |record| sink.lock().push(record.clone()));
        records
    }

    /// Deliver every queued host notification, oldest first.
    fn pump(host: &MemoryHost, driver: &TestDriver) {
        while let Some(payload) = host.take_notification() {
            driver.handle_host_change(payload).unwrap();
        }
    }

    #[test]
    fn test_initialize_tags_current_entry() {
        let (driver, host, store) = setup(AddressingMode::Direct);
        let records = recording(&driver);

        driver.initialize().unwrap();

        let records = records.lock();
        assert_eq!(
            records[0],
            RouteRecord {
                id: "1".to_string(),
                path: "/".to_string(),
                state: None,
                kind: ActionKind::None,
            }
        );
        assert_eq!(store.get(COUNTER_KEY).unwrap(), Some("1".to_string()));
        // No new entry was pushed, the existing one was tagged in place
        assert_eq!(host.entry_count(), 1);
        assert_eq!(host.current_payload(), Some(json!({"marker": {"id": 1}})));
    }

    #[test]
    fn test_repeated_initialize_mints_fresh_ids() {
        let (driver, _host, _store) = setup(AddressingMode::Direct);
        let records = recording(&driver);

        driver.initialize().unwrap();
        driver.initialize().unwrap();

        let records = records.lock();
        assert_eq!(records[0].kind, ActionKind::None);
        assert_eq!(records[1].kind, ActionKind::None);
        assert_eq!(records[0].id, "1");
        assert_eq!(records[1].id, "2");
    }

    #[test]
    fn test_push_creates_tagged_entry_and_emits_synchronously() {
        let (driver, host, _store) = setup(AddressingMode::Direct);
        let records = recording(&driver);
        driver.initialize().unwrap();

        driver.push("/detail", Some(json!({"a": 1}))).unwrap();

        let records = records.lock();
        assert_eq!(
            records[1],
            RouteRecord {
                id: "2".to_string(),
                path: "/detail".to_string(),
                state: Some(json!({"a": 1})),
                kind: ActionKind::Push,
            }
        );
        assert_eq!(host.entry_count(), 2);
        assert_eq!(
            host.current_payload(),
            Some(json!({"marker": {"id": 2}, "state": {"a": 1}}))
        );
        // Command-driven emission, nothing was queued by the host
        assert!(host.take_notification().is_none());
    }

    #[test]
    fn test_replace_overwrites_in_place() {
        let (driver, host, _store) = setup(AddressingMode::Direct);
        let records = recording(&driver);
        driver.initialize().unwrap();
        driver.push("/a", None).unwrap();

        driver.replace("/b", Some(json!({"kept": true}))).unwrap();

        let records = records.lock();
        assert_eq!(records[2].kind, ActionKind::Replace);
        assert_eq!(records[2].id, "3");
        assert_eq!(records[2].path, "/b");
        assert_eq!(host.entry_count(), 2);
        assert_eq!(host.current_location().path, "/b");
    }

    #[test]
    fn test_back_notification_classifies_pop() {
        let (driver, host, _store) = setup(AddressingMode::Direct);
        let records = recording(&driver);
        driver.initialize().unwrap();
        driver.push("/detail", Some(json!({"a": 1}))).unwrap();

        host.navigate_back();
        pump(&host, &driver);

        let records = records.lock();
        assert_eq!(
            records[2],
            RouteRecord {
                id: "1".to_string(),
                path: "/".to_string(),
                state: None,
                kind: ActionKind::Pop,
            }
        );
        assert_eq!(driver.current_id(), 1);
    }

    #[test]
    fn test_forward_notification_classifies_push() {
        let (driver, host, _store) = setup(AddressingMode::Direct);
        let records = recording(&driver);
        driver.initialize().unwrap();
        driver.push("/detail", Some(json!({"a": 1}))).unwrap();

        host.navigate_back();
        pump(&host, &driver);
        host.navigate_forward();
        pump(&host, &driver);

        let records = records.lock();
        let last = records.last().unwrap();
        assert_eq!(last.id, "2");
        assert_eq!(last.path, "/detail");
        assert_eq!(last.state, Some(json!({"a": 1})));
        assert_eq!(last.kind, ActionKind::Push);
    }

    #[test]
    fn test_duplicate_notification_classifies_pop() {
        let (driver, host, _store) = setup(AddressingMode::Direct);
        let records = recording(&driver);
        driver.initialize().unwrap();

        // Same marker delivered again: equality resolves to Pop
        let payload = host.current_payload();
        driver.handle_host_change(payload).unwrap();

        let records = records.lock();
        assert_eq!(records[1].id, "1");
        assert_eq!(records[1].kind, ActionKind::Pop);
    }

    #[test]
    fn test_untagged_entry_adopted_as_push() {
        let (driver, host, _store) = setup(AddressingMode::Direct);
        let records = recording(&driver);
        driver.initialize().unwrap();
        driver.push("/detail", None).unwrap();
        host.navigate_back();
        pump(&host, &driver);
        assert_eq!(driver.current_id(), 1);

        host.visit_untagged("/typed");
        pump(&host, &driver);

        let records = records.lock();
        let last = records.last().unwrap();
        assert_eq!(
            *last,
            RouteRecord {
                id: "3".to_string(),
                path: "/typed".to_string(),
                state: None,
                kind: ActionKind::Push,
            }
        );
        // The entry is tagged now; a reload would find a marker
        assert_eq!(host.current_payload(), Some(json!({"marker": {"id": 3}})));
        assert_eq!(driver.current_id(), 3);
    }

    #[test]
    fn test_payload_without_marker_treated_as_untagged() {
        let (driver, _host, _store) = setup(AddressingMode::Direct);
        let records = recording(&driver);
        driver.initialize().unwrap();

        driver
            .handle_host_change(Some(json!({"someone": "else"})))
            .unwrap();

        let records = records.lock();
        assert_eq!(records[1].kind, ActionKind::Push);
        assert_eq!(records[1].id, "2");
        assert_eq!(records[1].state, None);
    }

    #[test]
    fn test_pop_is_fire_and_forget() {
        let (driver, host, _store) = setup(AddressingMode::Direct);
        let records = recording(&driver);
        driver.initialize().unwrap();
        driver.push("/a", None).unwrap();

        driver.pop();
        assert_eq!(records.lock().len(), 2);

        pump(&host, &driver);
        assert_eq!(records.lock().len(), 3);
        assert_eq!(records.lock()[2].kind, ActionKind::Pop);
    }

    #[test]
    fn test_rapid_pops_resolve_in_order() {
        let (driver, host, _store) = setup(AddressingMode::Direct);
        let records = recording(&driver);
        driver.initialize().unwrap();
        driver.push("/a", None).unwrap();
        driver.push("/b", None).unwrap();

        // No debounce: both requests queue, both resolve
        driver.pop();
        driver.pop();
        pump(&host, &driver);

        let records = records.lock();
        assert_eq!(records[3].id, "2");
        assert_eq!(records[3].kind, ActionKind::Pop);
        assert_eq!(records[4].id, "1");
        assert_eq!(records[4].kind, ActionKind::Pop);
        assert_eq!(driver.current_id(), 1);
    }

    #[test]
    fn test_reload_resumes_counter() {
        let host = MemoryHost::new();
        let store = MemoryStore::new();

        let driver = HistoryDriver::with_mode(host.clone(), store.clone(), AddressingMode::Direct);
        driver.initialize().unwrap();
        driver.push("/a", None).unwrap();
        drop(driver);

        // Reload: host entries and session store survive, driver state
        // does not
        let reloaded = HistoryDriver::with_mode(host, store, AddressingMode::Direct);
        let records = recording(&reloaded);
        reloaded.initialize().unwrap();

        let records = records.lock();
        assert_eq!(records[0].id, "3");
        assert_eq!(records[0].kind, ActionKind::None);
    }

    #[test]
    fn test_fragment_mode_flow() {
        let host = MemoryHost::with_location(HostLocation::new("/index.html", ""));
        let store = MemoryStore::new();
        let driver = HistoryDriver::new(host.clone(), store);
        let records = recording(&driver);

        driver.initialize().unwrap();
        assert_eq!(records.lock()[0].path, "/");
        assert_eq!(host.current_location().fragment, "/");
        assert_eq!(host.current_location().path, "/index.html");

        driver.push("/a/b?x=1", None).unwrap();
        assert_eq!(records.lock()[1].path, "/a/b?x=1");
        assert_eq!(host.current_location().fragment, "/a/b?x=1");

        host.navigate_back();
        pump(&host, &driver);

        let records = records.lock();
        assert_eq!(records[2].path, "/");
        assert_eq!(records[2].kind, ActionKind::Pop);
    }

    #[test]
    fn test_malformed_fragment_defaults_to_root() {
        let host = MemoryHost::with_location(HostLocation::new("/index.html", "//x:not-a-port"));
        let driver = HistoryDriver::new(host.clone(), MemoryStore::new());
        let records = recording(&driver);

        driver.initialize().unwrap();

        let records = records.lock();
        assert_eq!(records[0].path, "/");
        assert_eq!(records[0].kind, ActionKind::None);
        // The entry was re-tagged at the fallback path
        assert_eq!(host.current_location().fragment, "/");
    }

    #[test]
    fn test_ids_monotonic_across_operations() {
        let (driver, host, _store) = setup(AddressingMode::Direct);
        let records = recording(&driver);

        driver.initialize().unwrap();
        driver.push("/a", None).unwrap();
        driver.replace("/b", None).unwrap();
        host.visit_untagged("/c");
        pump(&host, &driver);
        driver.initialize().unwrap();

        let ids: Vec<u64> = records
            .lock()
            .iter()
            .map(|r| r.id.parse().unwrap())
            .collect();
        for pair in ids.windows(2) {
            assert!(pair[1] > pair[0], "ids must be strictly increasing: {ids:?}");
        }
    }
}
