//! Client-side failure taxonomy.
//!
//! [`ClientError::Host`] reports a failure inside the host application and
//! leaves the connection usable. Every other variant is a transport-level
//! fault; the client drops its link and reconnects on the next command.

use std::io;

use thiserror::Error;

use crate::frame;

/// Failures surfaced by [`BridgeClient`](crate::client::BridgeClient).
#[derive(Debug, Error)]
pub enum ClientError {
    /// Socket-level failure while talking to the host.
    #[error("connection error: {0}")]
    Io(#[from] io::Error),
    /// No response arrived within the command's deadline.
    #[error("timed out waiting for response")]
    Timeout,
    /// Every connection attempt failed.
    #[error("could not connect to host after {attempts} attempts")]
    ConnectFailed {
        /// How many attempts were made.
        attempts: u32,
    },
    /// The host executed the command and reported an error.
    #[error("host error: {0}")]
    Host(String),
    /// The response bytes never became valid JSON.
    #[error("undecodable response ({source}): {snippet}")]
    Decode {
        /// The final parse failure.
        #[source]
        source: serde_json::Error,
        /// Leading bytes of the offending payload.
        snippet: String,
    },
}

impl ClientError {
    /// Build a [`ClientError::Decode`] carrying a bounded payload excerpt.
    #[must_use]
    pub(crate) fn decode(source: serde_json::Error, payload: &[u8]) -> Self {
        Self::Decode {
            source,
            snippet: frame::snippet(payload),
        }
    }

    /// Whether this failure invalidates the underlying connection.
    #[must_use]
    pub fn is_connection_fault(&self) -> bool {
        !matches!(self, Self::Host(_))
    }
}
