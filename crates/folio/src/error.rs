//! Error types

use folio_dom::DomError;

/// Behavior-layer error
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Element not found: {0}")]
    MissingElement(&'static str),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("Transport failed: {0}")]
    Transport(#[from] TransportError),

    #[error("Invalid navigation target {url}: {source}")]
    Navigation {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error(transparent)]
    Dom(#[from] DomError),
}

/// Failure reported by a submission transport
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("Request rejected with status {0}")]
    Status(u16),

    #[error("Network unavailable")]
    Offline,

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;
