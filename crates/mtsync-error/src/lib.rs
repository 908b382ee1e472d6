//! Shared error type for the mtsync workspace.
//!
//! One flat enum, one variant per error kind named in the reconciliation
//! design: malformed input, invalid settings, transport failure, a device
//! rejecting a request, and an invariant violated by the reconciler itself.
//! Library code returns [`Result<T>`] and propagates with `?`; the binary
//! logs the error and exits non-zero.

use thiserror::Error;

pub type Result<T, E = MtsyncError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum MtsyncError {
    /// The desired document, or a subtree of it, did not have the shape
    /// analysis expects (e.g. a list where a mapping was required).
    #[error("malformed input: {context}")]
    InputMalformed { context: String },

    /// `hostname`/`username` are empty after every settings layer has been
    /// applied. Raised before any network I/O.
    #[error("invalid settings: hostname empty = {hostname_empty}, username empty = {username_empty}")]
    SettingsInvalid {
        hostname_empty: bool,
        username_empty: bool,
    },

    /// The HTTP layer itself failed (DNS, TLS, connection reset, timeout, ...).
    #[error("network request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The device's response body was a JSON object containing `error`.
    #[error("device rejected request to {path}: {detail:?}")]
    DeviceError {
        path: String,
        detail: Option<String>,
    },

    /// A precondition the reconciler itself is supposed to guarantee did
    /// not hold (e.g. the greedy pairing loop picked a null pair, or a
    /// `move` could not locate its source/destination id). Indicates a bug.
    #[error("invariant violated: {message}")]
    Invariant { message: String },
}

impl MtsyncError {
    pub fn invariant(message: impl Into<String>) -> Self {
        MtsyncError::Invariant {
            message: message.into(),
        }
    }

    pub fn input_malformed(context: impl Into<String>) -> Self {
        MtsyncError::InputMalformed {
            context: context.into(),
        }
    }
}
