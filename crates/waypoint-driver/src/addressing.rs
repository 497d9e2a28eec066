//! Virtual path addressing
//!
//! The application reasons about a "virtual path" — path plus query —
//! that the host represents either directly or inside the fragment
//! identifier. The mode is chosen at driver construction and never
//! changes.

use url::Url;
use waypoint_host::HostLocation;

use crate::error::DriverError;
use crate::Result;

/// Scheme prefix used to parse a fragment as a self-contained URL.
const FRAGMENT_BASE: &str = "wp:";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressingMode {
    /// The virtual path is the host's path plus query, unmodified.
    Direct,
    /// The virtual path lives in the fragment identifier, itself a
    /// self-contained path plus query.
    Fragment,
}

impl AddressingMode {
    /// Extract the virtual path from a host location. Deterministic and
    /// side-effect-free; an empty location yields an empty string, which
    /// callers may default as they see fit.
    pub fn virtual_path(&self, location: &HostLocation) -> Result<String> {
        match self {
            Self::Direct => Ok(location.path.clone()),
            Self::Fragment => {
                if location.fragment.is_empty() {
                    return Ok(String::new());
                }

                let url = Url::parse(&format!("{FRAGMENT_BASE}{}", location.fragment)).map_err(
                    |source| DriverError::MalformedFragment {
                        fragment: location.fragment.clone(),
                        source,
                    },
                )?;

                let mut path = url.path().to_string();
                if let Some(query) = url.query() {
                    path.push('?');
                    path.push_str(query);
                }
                Ok(path)
            }
        }
    }

    /// Render a virtual path as the locator handed to the host.
    pub fn to_locator(&self, path: &str) -> String {
        match self {
            Self::Direct => path.to_string(),
            Self::Fragment => format!("#{path}"),
        }
    }
}
