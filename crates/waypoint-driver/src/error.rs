//! Driver error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DriverError {
    #[error("Malformed fragment {fragment:?}: {source}")]
    MalformedFragment {
        fragment: String,
        source: url::ParseError,
    },

    #[error("Storage error: {0}")]
    Store(#[from] waypoint_store::StoreError),

    #[error("Payload serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
