//! The fixed table of remote-invocable commands.
//!
//! Every command name maps to a [`CommandSpec`]: its execution class and a
//! handler that extracts named parameters (applying the table's defaults)
//! and calls through the [`HostModel`] seam. The table is built once; both
//! the server router and the client consult it, so the two sides can never
//! disagree about which commands mutate host state.
//!
//! Parameter defaults and result shapes are an external contract inherited
//! verbatim; nothing here redesigns them.

use std::{collections::HashMap, sync::OnceLock};

use serde_json::Value;
use thiserror::Error;

use crate::{
    host::{HostError, HostModel},
    params::{ParamError, Params},
};

mod application;
mod browser;
mod clips;
mod devices;
mod session;
mod tracks;
mod transport;

/// Where a command is allowed to execute.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecClass {
    /// Read-only; runs synchronously on the connection task.
    Direct,
    /// Mutates host state; must be marshalled onto the privileged thread.
    Marshalled,
}

/// Failure of a command body: either parameter extraction or the host
/// operation itself. Both become an error response with the underlying
/// message; neither terminates the connection.
#[derive(Debug, Error)]
pub enum CommandError {
    /// A parameter was missing or mistyped.
    #[error(transparent)]
    Param(#[from] ParamError),
    /// The host operation failed.
    #[error(transparent)]
    Host(#[from] HostError),
}

/// Handler signature shared by every table entry.
pub type Handler = for<'a> fn(&'a dyn HostModel, &'a Params) -> Result<Value, CommandError>;

/// One table entry.
pub struct CommandSpec {
    /// Execution class of the command.
    pub class: ExecClass,
    /// Extraction-plus-execution body.
    pub run: Handler,
}

impl CommandSpec {
    pub(crate) const fn direct(run: Handler) -> Self {
        Self {
            class: ExecClass::Direct,
            run,
        }
    }

    pub(crate) const fn marshalled(run: Handler) -> Self {
        Self {
            class: ExecClass::Marshalled,
            run,
        }
    }
}

pub(crate) type Registry = HashMap<&'static str, CommandSpec>;

/// The process-wide command table.
pub(crate) fn registry() -> &'static Registry {
    static REGISTRY: OnceLock<Registry> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        let mut table = Registry::new();
        session::register(&mut table);
        tracks::register(&mut table);
        clips::register(&mut table);
        transport::register(&mut table);
        devices::register(&mut table);
        browser::register(&mut table);
        application::register(&mut table);
        table
    })
}

/// Look up a command by name.
#[must_use]
pub fn lookup(kind: &str) -> Option<&'static CommandSpec> { registry().get(kind) }

/// Execution class of a registered command.
#[must_use]
pub fn execution_class(kind: &str) -> Option<ExecClass> {
    lookup(kind).map(|spec| spec.class)
}

/// Whether `kind` is registered as a state-mutating command. Unregistered
/// names are treated as read-only.
#[must_use]
pub fn is_mutating(kind: &str) -> bool {
    matches!(execution_class(kind), Some(ExecClass::Marshalled))
}
