//! Route change publication

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// How a classified navigation moved through the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    /// Initial load; no navigation occurred.
    None,
    Push,
    Pop,
    Replace,
}

/// Normalized route change handed to subscribers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteRecord {
    /// Decimal form of the entry's marker id.
    pub id: String,
    /// Virtual path of the now-current entry.
    pub path: String,
    /// Consumer-supplied state carried by the entry, if any.
    pub state: Option<serde_json::Value>,
    #[serde(rename = "type")]
    pub kind: ActionKind,
}

type Listener = Arc<dyn Fn(&RouteRecord) + Send + Sync>;

/// Handle returned by [`RouteEvents::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subscription(u64);

/// Typed publish/subscribe channel for route changes.
pub struct RouteEvents {
    inner: Arc<RwLock<Inner>>,
}

struct Inner {
    listeners: Vec<(u64, Listener)>,
    next_token: u64,
}

impl RouteEvents {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner {
                listeners: Vec::new(),
                next_token: 0,
            })),
        }
    }

    pub fn subscribe(
        &self,
        listener: impl Fn(&RouteRecord) + Send + Sync + 'static,
    ) -> Subscription {
        let mut inner = self.inner.write();
        inner.next_token += 1;
        let token = inner.next_token;
        inner.listeners.push((token, Arc::new(listener)));
        Subscription(token)
    }

    /// Returns false when the subscription was already removed.
    pub fn unsubscribe(&self, subscription: Subscription) -> bool {
        let mut inner = self.inner.write();
        let before = inner.listeners.len();
        inner.listeners.retain(|(token, _)| *token != subscription.0);
        inner.listeners.len() != before
    }

    /// Deliver `record` to every listener, in subscription order.
    /// Listeners are invoked outside the lock, so they may subscribe or
    /// unsubscribe reentrantly.
    pub fn publish(&self, record: &RouteRecord) {
        let listeners: Vec<Listener> = self
            .inner
            .read()
            .listeners
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        for listener in listeners {
            listener(record);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.inner.read().listeners.len()
    }
}

impl Default for RouteEvents {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for RouteEvents {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}
