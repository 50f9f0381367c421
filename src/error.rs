// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Error types for auto-csp

use thiserror::Error;

/// Result type alias for auto-csp operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for auto-csp
///
/// This covers genuine Rust-level failures only. The spec's own in-band
/// error categories (malformed tokens, unrecognized directives, unhandled
/// `blockedUri` forms, violations for untracked directives) are not errors
/// here — they are silently-handled branches logged via `tracing`.
#[derive(Error, Debug)]
pub enum Error {
    /// Upstream HTTP request failed (proxy's fetch to the target origin)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A server (proxy or report endpoint) failed to bind its listener
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// The embedded HTTP server layer exited with an error
    #[error("server error: {0}")]
    Server(String),

    /// The browser driver reported a fatal failure
    #[error("browser driver error: {0}")]
    Driver(String),

    /// I/O error (log file rotation, CLI startup)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Violation-report JSON failed to decode
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Create a new server error
    pub fn server<S: Into<String>>(msg: S) -> Self {
        Error::Server(msg.into())
    }

    /// Create a new driver error
    pub fn driver<S: Into<String>>(msg: S) -> Self {
        Error::Driver(msg.into())
    }
}
