//! One-shot background work with exactly-once completion
//!
//! Tasks run on the runtime's blocking pool. Each one sends exactly one
//! [`WorkerCompletion`] back to the coordinating loop, including when the
//! task panics. The dispatcher keeps every outstanding task, with the
//! context captured at submission, until its completion is consumed.

use std::any::Any;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorkerError {
    #[error("Worker task panicked: {0}")]
    Panicked(String),
}

/// Outcome of one task, marshaled back to the coordinating loop
#[derive(Debug)]
pub struct WorkerCompletion<T> {
    pub id: TaskId,
    pub outcome: Result<T, WorkerError>,
}

struct Outstanding<C> {
    context: C,
    join: JoinHandle<()>,
    submitted: Instant,
}

pub struct WorkerDispatcher<T, C> {
    runtime: Handle,
    completions: mpsc::UnboundedSender<WorkerCompletion<T>>,
    outstanding: HashMap<TaskId, Outstanding<C>>,
    next_id: u64,
}

impl<T: Send + 'static, C> WorkerDispatcher<T, C> {
    pub fn new(runtime: Handle, completions: mpsc::UnboundedSender<WorkerCompletion<T>>) -> Self {
        Self {
            runtime,
            completions,
            outstanding: HashMap::new(),
            next_id: 1,
        }
    }

    /// Run `task` on a worker thread. `context` is handed back with the
    /// outcome once the completion is consumed.
    pub fn submit<F>(&mut self, context: C, task: F) -> TaskId
    where
        F: FnOnce() -> T + Send + 'static,
    {
        let id = TaskId(self.next_id);
        self.next_id += 1;

        let completions = self.completions.clone();
        let join = self.runtime.spawn_blocking(move || {
            let outcome = panic::catch_unwind(AssertUnwindSafe(task))
                .map_err(|payload| WorkerError::Panicked(panic_message(&*payload)));
            if completions.send(WorkerCompletion { id, outcome }).is_err() {
                tracing::debug!("Completion of {:?} dropped; bridge has stopped", id);
            }
        });

        self.outstanding.insert(
            id,
            Outstanding {
                context,
                join,
                submitted: Instant::now(),
            },
        );
        tracing::debug!("Submitted worker task {:?}", id);
        id
    }

    /// Release the task a completion belongs to.
    ///
    /// Returns the submission context and the outcome, or `None` for a
    /// completion whose task was already released.
    pub fn complete(&mut self, completion: WorkerCompletion<T>) -> Option<(C, Result<T, WorkerError>)> {
        let Some(task) = self.outstanding.remove(&completion.id) else {
            tracing::warn!("Ignoring completion for unknown task {:?}", completion.id);
            return None;
        };

        let elapsed = task.submitted.elapsed();
        match &completion.outcome {
            Ok(_) => tracing::debug!("Worker task {:?} finished in {:?}", completion.id, elapsed),
            Err(e) => tracing::error!("Worker task {:?} failed after {:?}: {}", completion.id, elapsed, e),
        }
        Some((task.context, completion.outcome))
    }

    pub fn outstanding(&self) -> usize {
        self.outstanding.len()
    }

    /// Whether the task's thread is still running. Released tasks report
    /// `false`.
    pub fn is_running(&self, id: TaskId) -> bool {
        self.outstanding
            .get(&id)
            .is_some_and(|task| !task.join.is_finished())
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
