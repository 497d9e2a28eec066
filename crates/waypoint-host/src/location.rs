//! Host location representation

use serde::{Deserialize, Serialize};

/// The host's effective location, split the way the driver consumes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostLocation {
    /// Path plus query, e.g. `/inbox?folder=spam`
    pub path: String,
    /// Fragment identifier without the leading `#`
    pub fragment: String,
}

impl HostLocation {
    pub fn new(path: impl Into<String>, fragment: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            fragment: fragment.into(),
        }
    }

    /// Location of a fresh tab: root path, no fragment.
    pub fn root() -> Self {
        Self::new("/", "")
    }

    /// Apply a locator string the way a browser applies a `pushState`
    /// URL argument: a locator starting with `#` only swaps the
    /// fragment, anything else replaces path (and fragment, when the
    /// locator carries one).
    pub fn with_locator(&self, locator: &str) -> Self {
        if let Some(fragment) = locator.strip_prefix('#') {
            return Self::new(self.path.clone(), fragment);
        }

        match locator.split_once('#') {
            Some((path, fragment)) => Self::new(path, fragment),
            None => Self::new(locator, ""),
        }
    }
}
