//! Command lookup and dispatch.
//!
//! One router instance serves every connection. It owns the host seam and
//! the injected scheduler; all command failures — unknown name, parameter
//! extraction, host errors, even handler panics — are converted into error
//! responses here and never terminate the connection.

use std::{
    panic::{AssertUnwindSafe, catch_unwind},
    sync::Arc,
};

use log::debug;

use crate::{
    command::{Command, Response},
    commands::{self, ExecClass},
    host::HostModel,
    panic::payload_message,
    params::Params,
    scheduler::{CommandScheduler, Work},
};

/// Routes decoded commands to their table entry and execution class.
pub struct CommandRouter {
    host: Arc<dyn HostModel>,
    scheduler: Arc<dyn CommandScheduler>,
}

impl CommandRouter {
    /// Build a router over the given host seam and scheduler.
    #[must_use]
    pub fn new(host: Arc<dyn HostModel>, scheduler: Arc<dyn CommandScheduler>) -> Self {
        Self { host, scheduler }
    }

    /// Execute one command and produce its single response.
    pub async fn dispatch(&self, command: &Command) -> Response {
        let Some(spec) = commands::lookup(&command.kind) else {
            return Response::error(format!("Unknown command: {}", command.kind));
        };
        let params = Params::from(command.params.clone());

        match spec.class {
            ExecClass::Direct => {
                let run = spec.run;
                let outcome = catch_unwind(AssertUnwindSafe(|| run(self.host.as_ref(), &params)));
                match outcome {
                    Ok(Ok(result)) => Response::success(result),
                    Ok(Err(e)) => Response::error(e.to_string()),
                    Err(payload) => {
                        let message = payload_message(payload.as_ref());
                        debug!("direct handler for {} panicked: {message}", command.kind);
                        Response::error(message)
                    }
                }
            }
            ExecClass::Marshalled => {
                let host = Arc::clone(&self.host);
                let run = spec.run;
                let work: Work = Box::new(move || run(host.as_ref(), &params));
                match self.scheduler.submit(work).await {
                    Ok(result) => Response::success(result),
                    Err(e) => Response::error(e.to_string()),
                }
            }
        }
    }
}
