//! Livebridge: a TCP request/response bridge into a live creative
//! application's object graph.
//!
//! The host side embeds a [`BridgeServer`] next to the application and
//! exposes a fixed table of named commands over newline-free, whole-buffer
//! JSON framing. Read-only commands execute directly on the connection
//! task; state-mutating commands are marshalled onto the application's
//! single privileged thread through a [`scheduler::UiThreadScheduler`].
//! The remote side uses [`BridgeClient`], which connects lazily, validates
//! new links with a real round trip, and reconnects transparently after
//! transport faults.
//!
//! The application itself sits behind the [`HostModel`] trait; everything
//! in this crate is host-agnostic plumbing around that seam.

pub mod client;
pub mod command;
pub mod commands;
pub mod config;
pub mod frame;
pub mod host;
pub mod panic;
pub mod params;
pub mod router;
pub mod scheduler;
pub mod server;

pub use client::{BridgeClient, ClientError};
pub use command::{Command, Response};
pub use commands::{CommandError, ExecClass};
pub use config::{ClientConfig, DEFAULT_PORT, DEFAULT_SCHEDULE_CEILING, ServerConfig, default_addr};
pub use frame::{FrameError, FramedReader};
pub use host::{HostError, HostModel, HostResult};
pub use params::{ParamError, Params};
pub use router::CommandRouter;
pub use scheduler::{CommandScheduler, InlineScheduler, ScheduleError, UiThreadScheduler, WorkQueue};
pub use server::{BridgeServer, ConnectionId, ServerError};
