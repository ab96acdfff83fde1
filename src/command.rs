//! Wire types for the bridge protocol.
//!
//! Every request is a single JSON object naming a command `type` and a
//! `params` mapping; every response carries a `status` discriminant plus
//! either a `result` value or an error `message`. The shapes are part of the
//! external contract and must not change.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A decoded request from the wire.
///
/// `params` defaults to an empty mapping when absent, so
/// `{"type":"start_playback"}` and `{"type":"start_playback","params":{}}`
/// decode identically.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Command {
    /// Name of the command, looked up in the command table. A request that
    /// omits it routes as the empty name and earns an unknown-command error
    /// rather than tearing down the connection.
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Named arguments; defaults applied per command by the table entry.
    #[serde(default)]
    pub params: Map<String, Value>,
}

impl Command {
    /// Build a command with no parameters.
    #[must_use]
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            params: Map::new(),
        }
    }

    /// Build a command carrying the given parameters.
    #[must_use]
    pub fn with_params(kind: impl Into<String>, params: Map<String, Value>) -> Self {
        Self {
            kind: kind.into(),
            params,
        }
    }
}

/// The single reply produced for each [`Command`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Response {
    /// The command ran; `result` holds whatever the host operation returned.
    Success {
        /// Result payload, `{}` when the operation produced no data.
        result: Value,
    },
    /// The command failed; the connection remains usable.
    Error {
        /// Human-readable description of the failure.
        message: String,
    },
}

impl Response {
    /// Build a success response.
    #[must_use]
    pub fn success(result: Value) -> Self { Self::Success { result } }

    /// Build an error response.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    /// Whether this response reports a failure.
    #[must_use]
    pub fn is_error(&self) -> bool { matches!(self, Self::Error { .. }) }
}
