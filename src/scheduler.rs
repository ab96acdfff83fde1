//! Hand-off of mutating work onto the host's privileged thread.
//!
//! The host permits state mutation from exactly one thread. Connection
//! tasks therefore never run a marshalled command themselves: they wrap it
//! as a unit of [`Work`], submit it through a [`CommandScheduler`], and
//! block on the outcome with a bounded wait. The privileged thread drains
//! the queue strictly in submission order, exactly once each.
//!
//! A submitter whose ceiling elapses reports a timeout and walks away; the
//! orphaned work is neither cancelled nor retried. It may still run and
//! mutate host state later — its late completion is logged at debug level
//! and discarded.

use std::{
    panic::{AssertUnwindSafe, catch_unwind},
    sync::{Arc, OnceLock},
    thread::{self, ThreadId},
    time::Duration,
};

use async_trait::async_trait;
use log::debug;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

use crate::{commands::CommandError, panic::payload_message};

/// A marshalled command body: parameters already captured, ready to run
/// against the host.
pub type Work = Box<dyn FnOnce() -> Result<Value, CommandError> + Send + 'static>;

/// Failure of a submitted invocation.
///
/// A failing work item and an infrastructure failure are not distinguished
/// here; both surface as [`Failed`](ScheduleError::Failed). Only the
/// timeout is its own variant, because it does not imply the work never
/// ran.
#[derive(Debug, Error)]
pub enum ScheduleError {
    /// The result slot was not filled within the submitter's ceiling.
    #[error("Timeout waiting for operation to complete")]
    Timeout,
    /// The work ran and failed, or could not be delivered at all.
    #[error("{0}")]
    Failed(String),
}

/// Seam through which marshalled commands reach the privileged thread.
///
/// Constructed once at startup and injected into every component that needs
/// it; tests substitute [`InlineScheduler`].
#[async_trait]
pub trait CommandScheduler: Send + Sync {
    /// Run `work` on the privileged thread and return its outcome.
    ///
    /// # Errors
    ///
    /// [`ScheduleError::Timeout`] when the outcome was not observed in
    /// time; [`ScheduleError::Failed`] when the work failed or the
    /// privileged thread is gone.
    async fn submit(&self, work: Work) -> Result<Value, ScheduleError>;
}

/// One queued unit: the work plus its single-use result slot.
struct Invocation {
    work: Work,
    reply: oneshot::Sender<Result<Value, CommandError>>,
}

/// Production scheduler: forwards invocations over an unbounded channel to
/// the [`WorkQueue`] owned by the privileged thread.
pub struct UiThreadScheduler {
    tx: mpsc::UnboundedSender<Invocation>,
    privileged: Arc<OnceLock<ThreadId>>,
    ceiling: Duration,
}

impl UiThreadScheduler {
    /// Create a scheduler and the queue half the privileged thread must
    /// drive.
    #[must_use]
    pub fn new(ceiling: Duration) -> (Self, WorkQueue) {
        let (tx, rx) = mpsc::unbounded_channel();
        let privileged = Arc::new(OnceLock::new());
        let scheduler = Self {
            tx,
            privileged: Arc::clone(&privileged),
            ceiling,
        };
        (scheduler, WorkQueue { rx, privileged })
    }

    /// Scheduler using the protocol's standard wait ceiling,
    /// [`DEFAULT_SCHEDULE_CEILING`](crate::config::DEFAULT_SCHEDULE_CEILING).
    #[must_use]
    pub fn with_default_ceiling() -> (Self, WorkQueue) {
        Self::new(crate::config::DEFAULT_SCHEDULE_CEILING)
    }

    fn on_privileged_thread(&self) -> bool {
        self.privileged
            .get()
            .is_some_and(|id| *id == thread::current().id())
    }
}

#[async_trait]
impl CommandScheduler for UiThreadScheduler {
    async fn submit(&self, work: Work) -> Result<Value, ScheduleError> {
        // Re-entrant submission from the privileged thread itself would
        // deadlock against the queue; run in place instead.
        if self.on_privileged_thread() {
            return run_work(work).map_err(|e| ScheduleError::Failed(e.to_string()));
        }

        let (reply_tx, reply_rx) = oneshot::channel();
        let invocation = Invocation {
            work,
            reply: reply_tx,
        };
        self.tx
            .send(invocation)
            .map_err(|_| ScheduleError::Failed("privileged thread is gone".into()))?;

        match tokio::time::timeout(self.ceiling, reply_rx).await {
            Err(_) => Err(ScheduleError::Timeout),
            Ok(Err(_)) => Err(ScheduleError::Failed(
                "privileged thread dropped the invocation".into(),
            )),
            Ok(Ok(outcome)) => outcome.map_err(|e| ScheduleError::Failed(e.to_string())),
        }
    }
}

/// Receiving half of [`UiThreadScheduler`], driven by the host.
pub struct WorkQueue {
    rx: mpsc::UnboundedReceiver<Invocation>,
    privileged: Arc<OnceLock<ThreadId>>,
}

impl WorkQueue {
    /// Claim the current thread as privileged and execute invocations until
    /// every scheduler handle has been dropped.
    pub fn run(mut self) {
        self.claim();
        while let Some(invocation) = self.rx.blocking_recv() {
            Self::execute(invocation);
        }
    }

    /// Execute everything currently queued without blocking, for hosts that
    /// drive their own event loop. The first call claims the calling thread
    /// as privileged.
    pub fn pump(&mut self) {
        self.claim();
        while let Ok(invocation) = self.rx.try_recv() {
            Self::execute(invocation);
        }
    }

    fn claim(&self) {
        let _ = self.privileged.set(thread::current().id());
    }

    fn execute(invocation: Invocation) {
        let outcome = run_work(invocation.work);
        if invocation.reply.send(outcome).is_err() {
            debug!("discarding late completion of a timed-out invocation");
        }
    }
}

/// Synchronous scheduler for tests and single-threaded embeddings: work
/// runs immediately on the calling task.
#[derive(Clone, Copy, Debug, Default)]
pub struct InlineScheduler;

#[async_trait]
impl CommandScheduler for InlineScheduler {
    async fn submit(&self, work: Work) -> Result<Value, ScheduleError> {
        run_work(work).map_err(|e| ScheduleError::Failed(e.to_string()))
    }
}

fn run_work(work: Work) -> Result<Value, CommandError> {
    catch_unwind(AssertUnwindSafe(work)).unwrap_or_else(|payload| {
        Err(CommandError::from(crate::host::HostError::new(
            payload_message(payload.as_ref()),
        )))
    })
}
