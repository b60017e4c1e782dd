//! Traits used by the task store to talk to a remote collection

use std::error::Error;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::task::{NewTask, Task, TaskId, TaskPatch};

/// An error returned by a remote collection (transport or permission error, for instance)
pub type RemoteError = Box<dyn Error + Send + Sync>;

/// A full, point-in-time copy of a remote collection, ordered by creation time (oldest first)
pub type Snapshot = Vec<Task>;


/// A remote collection of tasks, that can be observed live
#[async_trait]
pub trait RemoteCollection: Send + Sync {
    /// Start receiving full snapshots of the collection, ordered by creation time.
    ///
    /// A first snapshot is delivered as soon as possible, then a new one every time the collection changes.
    /// Dropping the returned [`Subscription`] cancels it.
    async fn subscribe(&self) -> Result<Subscription, RemoteError>;

    /// Create a task. The remote store assigns its ID and its creation timestamp.
    async fn create(&self, task: NewTask) -> Result<TaskId, RemoteError>;

    /// Apply a partial update to an existing task
    async fn update(&self, id: &TaskId, patch: TaskPatch) -> Result<(), RemoteError>;

    /// Delete a task
    async fn delete(&self, id: &TaskId) -> Result<(), RemoteError>;
}


/// An ordered stream of snapshots.
///
/// Some collections need a background task to produce the snapshots. This task is aborted when the subscription is dropped.
#[derive(Debug)]
pub struct Subscription {
    receiver: mpsc::UnboundedReceiver<Snapshot>,
    producer: Option<JoinHandle<()>>,
}

impl Subscription {
    pub fn new(receiver: mpsc::UnboundedReceiver<Snapshot>) -> Self {
        Self { receiver, producer: None }
    }

    /// A subscription whose snapshots are produced by a background task
    pub fn with_producer(receiver: mpsc::UnboundedReceiver<Snapshot>, producer: JoinHandle<()>) -> Self {
        Self { receiver, producer: Some(producer) }
    }

    /// Wait for the next snapshot. Returns `None` once the remote side has closed the subscription.
    pub async fn next(&mut self) -> Option<Snapshot> {
        self.receiver.recv().await
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.receiver.close();
        if let Some(producer) = self.producer.take() {
            producer.abort();
        }
    }
}
