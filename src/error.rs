//! Error types for status acquisition.
//!
//! Only structural failures surface here: a failed handshake, a transport
//! failure, an undecodable envelope or table. A single malformed cell is
//! never an error; parsers absorb it as a zero value.

/// The error type for all modem operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Network, TLS, timeout or non-2xx HTTP failure.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The caller's cancellation token fired while a request was in flight.
    #[error("operation cancelled")]
    Cancelled,

    /// The HNAP handshake failed or the login was rejected.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The response envelope or a status table could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// A configured address could not be turned into a URL.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// No registered model recognized the target.
    #[error("no supported modem found")]
    NoMatch,

    /// Reading a fixture file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Returns true for cancellation, so callers can tell an aborted poll
    /// apart from a failed one.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }
}

/// A convenience `Result` alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;
