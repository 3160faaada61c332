//! Common error types for Switchboard components.

use std::fmt;

/// A specialized Result type for Switchboard operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for Switchboard operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Probe error: {0}")]
    Probe(String),

    #[error("Channel list error: {0}")]
    Channels(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Server error: {0}")]
    Server(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unknown error: {0}")]
    Other(String),
}

impl Error {
    /// Create a new probe error.
    pub fn probe(msg: impl fmt::Display) -> Self {
        Error::Probe(msg.to_string())
    }

    /// Create a new channel list error.
    pub fn channels(msg: impl fmt::Display) -> Self {
        Error::Channels(msg.to_string())
    }

    /// Create a new configuration error.
    pub fn config(msg: impl fmt::Display) -> Self {
        Error::Config(msg.to_string())
    }

    /// Create a new server error.
    pub fn server(msg: impl fmt::Display) -> Self {
        Error::Server(msg.to_string())
    }

    /// Create a new other error.
    pub fn other(msg: impl fmt::Display) -> Self {
        Error::Other(msg.to_string())
    }
}
