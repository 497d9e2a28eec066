//! Headless walkthrough of the driver over the in-memory host.
//!
//! Run with `RUST_LOG=debug cargo run --example walkthrough` to see the
//! driver's own tracing alongside the emitted records.

use serde_json::json;
use waypoint_driver::{AddressingMode, HistoryDriver};
use waypoint_host::MemoryHost;
use waypoint_store::MemoryStore;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let host = MemoryHost::new();
    let store = MemoryStore::new();
    let driver = HistoryDriver::with_mode(host.clone(), store, AddressingMode::Direct);

    driver.on_route_change(|record| {
        println!(
            "[{:?}] id={} path={} state={:?}",
            record.kind, record.id, record.path, record.state
        );
    });

    driver.initialize()?;
    driver.push("/inbox", None)?;
    driver.push("/inbox/42", Some(json!({"scroll": 180})))?;
    driver.replace("/inbox/42?expanded=1", Some(json!({"scroll": 180})))?;

    // Backward moves resolve asynchronously; pump the queued
    // notifications the way a host event loop would.
    driver.pop();
    driver.pop();
    while let Some(payload) = host.take_notification() {
        driver.handle_host_change(payload)?;
    }

    // The user types a URL by hand: an untagged entry appears and is
    // adopted as a forward navigation.
    host.visit_untagged("/settings");
    while let Some(payload) = host.take_notification() {
        driver.handle_host_change(payload)?;
    }

    Ok(())
}
