//! Server lifecycle errors.

use std::io;

use thiserror::Error;

/// Failures surfaced while standing up or running the listener.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The listen socket could not be bound.
    #[error("failed to bind listener: {0}")]
    Bind(#[source] io::Error),
    /// The bound address could not be read back from the listener.
    #[error("failed to read local address: {0}")]
    LocalAddr(#[source] io::Error),
}
