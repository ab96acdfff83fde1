//! Fixed configuration for the bridge server and client.
//!
//! The protocol's well-known constants live here: the loopback listen
//! address, receive chunk size, the scheduler's wait ceiling, and the
//! client's retry and settle timings. Fields are plain and public; both
//! structs are cheap to copy.

use std::{
    net::{Ipv4Addr, SocketAddr, SocketAddrV4},
    time::Duration,
};

/// Well-known port the host listens on.
pub const DEFAULT_PORT: u16 = 9877;

/// Standard bounded wait for a marshalled command's outcome, used by
/// [`UiThreadScheduler::with_default_ceiling`](crate::scheduler::UiThreadScheduler::with_default_ceiling).
pub const DEFAULT_SCHEDULE_CEILING: Duration = Duration::from_secs(10);

/// Loopback address with the well-known port.
#[must_use]
pub fn default_addr() -> SocketAddr {
    SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::LOCALHOST, DEFAULT_PORT))
}

/// Server-side tunables.
#[derive(Clone, Copy, Debug)]
pub struct ServerConfig {
    /// Address to bind the listener to.
    pub listen_addr: SocketAddr,
    /// Read chunk size per connection.
    pub recv_buffer: usize,
    /// Pause after a failed accept before trying again.
    pub accept_retry_delay: Duration,
    /// How long shutdown waits for live connection handlers before
    /// abandoning them.
    pub shutdown_grace: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_addr(),
            recv_buffer: 8192,
            accept_retry_delay: Duration::from_millis(500),
            shutdown_grace: Duration::from_secs(1),
        }
    }
}

/// Client-side tunables.
#[derive(Clone, Copy, Debug)]
pub struct ClientConfig {
    /// Address of the host's listener.
    pub addr: SocketAddr,
    /// Connection attempts before giving up.
    pub connect_attempts: u32,
    /// Delay between connection attempts.
    pub connect_retry_delay: Duration,
    /// Response timeout for read-only commands.
    pub read_timeout: Duration,
    /// Response timeout for mutating commands; longer, because they wait on
    /// the host's privileged thread.
    pub mutate_timeout: Duration,
    /// Pause before and after a mutating command to absorb host-side
    /// scheduling latency.
    pub settle_delay: Duration,
    /// Read chunk size during response reassembly.
    pub recv_buffer: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            addr: default_addr(),
            connect_attempts: 3,
            connect_retry_delay: Duration::from_secs(1),
            read_timeout: Duration::from_secs(10),
            mutate_timeout: Duration::from_secs(15),
            settle_delay: Duration::from_millis(100),
            recv_buffer: 8192,
        }
    }
}

impl ClientConfig {
    /// Config pointed at `addr` with every other field defaulted.
    #[must_use]
    pub fn for_addr(addr: SocketAddr) -> Self {
        Self {
            addr,
            ..Self::default()
        }
    }
}

impl ServerConfig {
    /// Config listening on `addr` with every other field defaulted.
    #[must_use]
    pub fn for_addr(listen_addr: SocketAddr) -> Self {
        Self {
            listen_addr,
            ..Self::default()
        }
    }
}
