//! Client connection to a running bridge host.
//!
//! [`BridgeClient`] connects lazily: no socket exists until the first
//! command, and a link found dead is silently replaced by a fresh one
//! before the command is sent. Commands are strictly sequential per
//! client; there is no pipelining on the wire.

mod error;

use std::time::Duration;

use bytes::BytesMut;
use log::{debug, info, warn};
use serde_json::{Map, Value};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpStream,
    time::timeout,
};

pub use self::error::ClientError;
use crate::{
    command::{Command, Response},
    commands,
    config::ClientConfig,
};

/// Client for the bridge protocol.
pub struct BridgeClient {
    config: ClientConfig,
    link: Option<ClientLink>,
}

impl BridgeClient {
    /// Build a client from `config`. Does not connect.
    #[must_use]
    pub fn new(config: ClientConfig) -> Self {
        Self { config, link: None }
    }

    /// Whether a (possibly stale) link currently exists.
    #[must_use]
    pub fn is_connected(&self) -> bool { self.link.is_some() }

    /// Send one command and wait for its response.
    ///
    /// Mutating commands get a longer deadline and a settle pause on either
    /// side, absorbing the host's scheduling latency. A host-reported error
    /// becomes [`ClientError::Host`] and leaves the link intact; transport
    /// failures invalidate the link so the next call reconnects.
    ///
    /// # Errors
    /// Any [`ClientError`] variant, per the taxonomy on that type.
    pub async fn send_command(
        &mut self,
        kind: &str,
        params: Map<String, Value>,
    ) -> Result<Value, ClientError> {
        let mut link = self.take_link().await?;

        let mutating = commands::is_mutating(kind);
        let deadline = if mutating {
            self.config.mutate_timeout
        } else {
            self.config.read_timeout
        };

        if mutating {
            tokio::time::sleep(self.config.settle_delay).await;
        }
        let command = Command::with_params(kind, params);
        let outcome = link.round_trip(&command, deadline).await;
        if mutating && outcome.is_ok() {
            tokio::time::sleep(self.config.settle_delay).await;
        }

        match outcome {
            Ok(Response::Success { result }) => {
                self.link = Some(link);
                Ok(result)
            }
            Ok(Response::Error { message }) => {
                // The host failed the command; the connection itself is fine.
                self.link = Some(link);
                Err(ClientError::Host(message))
            }
            Err(e) => {
                if e.is_connection_fault() {
                    warn!("dropping link after transport fault: error={e}");
                } else {
                    self.link = Some(link);
                }
                Err(e)
            }
        }
    }

    /// Drop the current link, if any. The next command reconnects.
    pub fn disconnect(&mut self) {
        self.link = None;
    }

    /// Take a healthy link out of the client, probing any cached one first
    /// and connecting when none survives. The caller puts it back unless
    /// the command hit a transport fault.
    async fn take_link(&mut self) -> Result<ClientLink, ClientError> {
        if let Some(mut link) = self.link.take() {
            if link.probe() {
                return Ok(link);
            }
            debug!("existing link is stale, reconnecting");
        }
        self.establish().await
    }

    /// Connect with retries, validating each candidate socket with a real
    /// round trip before accepting it.
    async fn establish(&self) -> Result<ClientLink, ClientError> {
        for attempt in 1..=self.config.connect_attempts {
            match ClientLink::connect(&self.config).await {
                Ok(mut link) => {
                    let hello = Command::new("get_session_info");
                    match link.round_trip(&hello, self.config.read_timeout).await {
                        Ok(Response::Success { .. }) => {
                            info!("connected to host: addr={}", self.config.addr);
                            return Ok(link);
                        }
                        Ok(Response::Error { message }) => {
                            warn!(
                                "host rejected validation round trip: attempt={attempt}, \
                                 error={message}"
                            );
                        }
                        Err(e) => {
                            warn!("validation round trip failed: attempt={attempt}, error={e}");
                        }
                    }
                }
                Err(e) => {
                    warn!("connect failed: attempt={attempt}, error={e}");
                }
            }
            if attempt < self.config.connect_attempts {
                tokio::time::sleep(self.config.connect_retry_delay).await;
            }
        }
        Err(ClientError::ConnectFailed {
            attempts: self.config.connect_attempts,
        })
    }
}

/// One live socket plus its receive state.
struct ClientLink {
    stream: TcpStream,
    recv_buffer: usize,
}

impl ClientLink {
    async fn connect(config: &ClientConfig) -> Result<Self, ClientError> {
        let stream = TcpStream::connect(config.addr).await?;
        Ok(Self {
            stream,
            recv_buffer: config.recv_buffer,
        })
    }

    /// Cheap liveness check on an idle link.
    ///
    /// An idle, healthy socket has nothing to read, so `WouldBlock` is the
    /// healthy answer. A clean EOF means the host closed on us. Readable
    /// bytes on an idle link are a desync (an orphaned response from an
    /// earlier timeout); the link cannot be trusted either way.
    fn probe(&mut self) -> bool {
        let mut scratch = [0_u8; 32];
        match self.stream.try_read(&mut scratch) {
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => true,
            Ok(0) => {
                debug!("probe saw EOF, link is dead");
                false
            }
            Ok(n) => {
                debug!("probe saw {n} unexpected bytes, link is desynced");
                false
            }
            Err(e) => {
                debug!("probe failed: error={e}");
                false
            }
        }
    }

    /// Send `command` and reassemble its single response.
    async fn round_trip(
        &mut self,
        command: &Command,
        deadline: Duration,
    ) -> Result<Response, ClientError> {
        let payload = serde_json::to_vec(command).map_err(std::io::Error::from)?;
        self.stream.write_all(&payload).await?;
        self.stream.flush().await?;
        self.receive(deadline).await
    }

    /// Accumulate chunks until the buffer parses as a complete response.
    ///
    /// Each parse failure is treated as "not enough bytes yet" and the read
    /// continues; only the deadline decides the payload is truly broken, at
    /// which point the last parse error and a payload snippet are reported.
    async fn receive(&mut self, deadline: Duration) -> Result<Response, ClientError> {
        let mut buf = BytesMut::with_capacity(self.recv_buffer);
        let started = tokio::time::Instant::now();

        loop {
            // Whichever await notices the deadline, partial data gets the
            // same final-parse treatment.
            let Some(remaining) = deadline.checked_sub(started.elapsed()) else {
                return Self::at_deadline(&buf);
            };
            let read = match timeout(remaining, self.stream.read_buf(&mut buf)).await {
                Ok(read) => read?,
                Err(_elapsed) => return Self::at_deadline(&buf),
            };
            if read == 0 {
                return Err(ClientError::Io(std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    "host closed the connection mid-response",
                )));
            }
            match serde_json::from_slice::<Response>(&buf) {
                Ok(response) => return Ok(response),
                Err(e) => {
                    debug!("response incomplete after {} bytes: {e}", buf.len());
                }
            }
        }
    }

    /// Verdict once the deadline is spent: a bare timeout when nothing
    /// arrived, otherwise the final parse of whatever did.
    fn at_deadline(buf: &[u8]) -> Result<Response, ClientError> {
        if buf.is_empty() {
            return Err(ClientError::Timeout);
        }
        match serde_json::from_slice::<Response>(buf) {
            Ok(response) => Ok(response),
            Err(source) => Err(ClientError::decode(source, buf)),
        }
    }
}
