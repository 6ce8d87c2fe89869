//! Task manager for store requests
//!
//! Every request runs as a tokio task that resolves to a result action and
//! sends it back on the store's channel. Two scheduling modes:
//!
//! - [`spawn`](TaskManager::spawn): run immediately, concurrently with
//!   everything else (list fetches).
//! - [`enqueue`](TaskManager::enqueue): run in a per-key FIFO lane, so at
//!   most one task per key is in flight (mutations of one resource).
//!
//! ```ignore
//! let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
//! let mut tasks = TaskManager::new(tx);
//!
//! tasks.enqueue("mutate:Users", async { StoreAction::RecordDidCreate { .. } });
//! tasks.enqueue("mutate:Users", async { StoreAction::RecordDidDelete { .. } });
//! // the delete starts only after the create has finished
//!
//! tasks.cancel_all();
//! ```

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use tokio::sync::mpsc;
use tokio::task::AbortHandle;

use crate::Action;

type Job<A> = Pin<Box<dyn Future<Output = A> + Send + 'static>>;

/// Identifies a FIFO lane.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct TaskKey(String);

impl TaskKey {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for TaskKey {
    fn from(s: &'static str) -> Self {
        Self::new(s)
    }
}

impl From<String> for TaskKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

struct Lane<A> {
    jobs: mpsc::UnboundedSender<Job<A>>,
    worker: AbortHandle,
}

/// Runs request futures and forwards their result actions.
///
/// Dropping the manager aborts everything still running.
pub struct TaskManager<A> {
    running: Vec<AbortHandle>,
    lanes: HashMap<TaskKey, Lane<A>>,
    action_tx: mpsc::UnboundedSender<A>,
}

impl<A> TaskManager<A>
where
    A: Action,
{
    /// `action_tx` receives the action each task resolves to.
    pub fn new(action_tx: mpsc::UnboundedSender<A>) -> Self {
        Self {
            running: Vec::new(),
            lanes: HashMap::new(),
            action_tx,
        }
    }

    /// Run a task right away.
    pub fn spawn<F>(&mut self, future: F) -> &mut Self
    where
        F: Future<Output = A> + Send + 'static,
    {
        self.running.retain(|handle| !handle.is_finished());

        let tx = self.action_tx.clone();
        let handle = tokio::spawn(async move {
            let action = future.await;
            let _ = tx.send(action);
        });
        self.running.push(handle.abort_handle());
        self
    }

    /// Queue a task behind every earlier task with the same key.
    pub fn enqueue<F>(&mut self, key: impl Into<TaskKey>, future: F) -> &mut Self
    where
        F: Future<Output = A> + Send + 'static,
    {
        let key = key.into();
        let mut job: Job<A> = Box::pin(future);

        if let Some(lane) = self.lanes.get(&key) {
            match lane.jobs.send(job) {
                Ok(()) => return self,
                // Worker is gone; start a fresh lane below.
                Err(mpsc::error::SendError(returned)) => job = returned,
            }
        }

        let (jobs, mut queue) = mpsc::unbounded_channel::<Job<A>>();
        let tx = self.action_tx.clone();
        let worker = tokio::spawn(async move {
            while let Some(job) = queue.recv().await {
                let action = job.await;
                if tx.send(action).is_err() {
                    break;
                }
            }
        });

        // The receiver lives in the worker we just spawned.
        let _ = jobs.send(job);
        self.lanes.insert(
            key,
            Lane {
                jobs,
                worker: worker.abort_handle(),
            },
        );
        self
    }

    /// Abort every running and queued task. Nothing they would have sent
    /// arrives afterwards.
    pub fn cancel_all(&mut self) {
        for handle in self.running.drain(..) {
            handle.abort();
        }
        for (_, lane) in self.lanes.drain() {
            lane.worker.abort();
        }
    }

    /// Number of lanes created so far.
    pub fn lane_count(&self) -> usize {
        self.lanes.len()
    }

    /// Whether a lane exists for `key`.
    pub fn has_lane(&self, key: &TaskKey) -> bool {
        self.lanes.contains_key(key)
    }
}

impl<A> Drop for TaskManager<A> {
    fn drop(&mut self) {
        for handle in self.running.drain(..) {
            handle.abort();
        }
        for (_, lane) in self.lanes.drain() {
            lane.worker.abort();
        }
    }
}
