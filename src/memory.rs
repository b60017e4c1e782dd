//! This module provides an in-memory remote collection
//!
//! It behaves like a live document store (ordered snapshots pushed to every subscriber after each change), but lives in the current process.
//! Its failures can be scripted with a [`MockBehaviour`], which makes it suited for tests.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::mpsc;

use crate::mock_behaviour::MockBehaviour;
use crate::task::{NewTask, Task, TaskId, TaskPatch};
use crate::traits::{RemoteCollection, RemoteError, Snapshot, Subscription};


/// A remote collection that is stored in memory
#[derive(Debug, Default)]
pub struct MemoryCollection {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    /// Always sorted by creation date
    tasks: Vec<Task>,
    subscribers: Vec<mpsc::UnboundedSender<Snapshot>>,
    behaviour: MockBehaviour,

    /// Whether snapshot deliveries are currently held back
    deliveries_held: bool,
    has_pending_delivery: bool,

    last_timestamp: Option<DateTime<Utc>>,
    mutation_requests: usize,
}

impl MemoryCollection {
    /// Create an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a collection that already contains some tasks
    pub fn with_tasks(mut tasks: Vec<Task>) -> Self {
        tasks.sort_by(|a, b| a.created_at().cmp(b.created_at()));
        let last_timestamp = tasks.last().map(|t| *t.created_at());
        Self {
            inner: Mutex::new(Inner {
                tasks,
                last_timestamp,
                ..Inner::default()
            }),
        }
    }

    fn inner(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Change how this collection will behave from now on
    pub fn set_mock_behaviour(&self, behaviour: MockBehaviour) {
        self.inner().behaviour = behaviour;
    }

    /// Keep applying mutations, but stop delivering snapshots until [`Self::release_deliveries`] is called
    pub fn hold_deliveries(&self) {
        self.inner().deliveries_held = true;
    }

    /// Deliver the current content (if it changed while deliveries were held), and resume deliveries
    pub fn release_deliveries(&self) {
        let mut inner = self.inner();
        inner.deliveries_held = false;
        if inner.has_pending_delivery {
            inner.broadcast();
        }
    }

    /// The current content of this collection
    pub fn tasks(&self) -> Snapshot {
        self.inner().tasks.clone()
    }

    /// How many create/update/delete requests have been received (whether they succeeded or not)
    pub fn mutation_requests(&self) -> usize {
        self.inner().mutation_requests
    }

    /// How many subscriptions are still alive
    pub fn subscriber_count(&self) -> usize {
        let mut inner = self.inner();
        inner.subscribers.retain(|sender| sender.is_closed() == false);
        inner.subscribers.len()
    }
}

impl Inner {
    /// Push the current content to every subscriber, and forget about the subscribers that have gone away
    fn broadcast(&mut self) {
        if self.deliveries_held {
            self.has_pending_delivery = true;
            return;
        }
        self.has_pending_delivery = false;

        let snapshot = self.tasks.clone();
        let before = self.subscribers.len();
        self.subscribers.retain(|sender| sender.send(snapshot.clone()).is_ok());
        if self.subscribers.len() != before {
            log::debug!("Dropped {} closed subscription(s)", before - self.subscribers.len());
        }
        log::trace!("Delivered a snapshot of {} tasks to {} subscriber(s)", snapshot.len(), self.subscribers.len());
    }

    /// A creation timestamp that is strictly greater than every previous one
    fn next_timestamp(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let timestamp = match self.last_timestamp {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_timestamp = Some(timestamp);
        timestamp
    }

    fn position(&self, id: &TaskId) -> Result<usize, RemoteError> {
        self.tasks.iter()
            .position(|t| t.id() == id)
            .ok_or_else(|| format!("No task with ID {}", id).into())
    }
}

#[async_trait]
impl RemoteCollection for MemoryCollection {
    async fn subscribe(&self) -> Result<Subscription, RemoteError> {
        let mut inner = self.inner();
        inner.behaviour.can_subscribe()?;

        let (sender, receiver) = mpsc::unbounded_channel();
        if inner.deliveries_held {
            inner.has_pending_delivery = true;
        } else {
            // A closed receiver is not possible here, we own it
            let _ = sender.send(inner.tasks.clone());
        }
        inner.subscribers.push(sender);
        log::debug!("New subscription ({} alive)", inner.subscribers.len());
        Ok(Subscription::new(receiver))
    }

    async fn create(&self, task: NewTask) -> Result<TaskId, RemoteError> {
        let mut inner = self.inner();
        inner.mutation_requests += 1;
        inner.behaviour.can_create()?;

        let id = TaskId::random();
        let created_at = inner.next_timestamp();
        log::debug!("Creating task {} on {}", id, task.date);
        inner.tasks.push(task.into_task(id.clone(), created_at));
        inner.broadcast();
        Ok(id)
    }

    async fn update(&self, id: &TaskId, patch: TaskPatch) -> Result<(), RemoteError> {
        let mut inner = self.inner();
        inner.mutation_requests += 1;
        inner.behaviour.can_update()?;

        let index = inner.position(id)?;
        inner.tasks[index].apply(&patch);
        log::debug!("Updated task {} with {:?}", id, patch);
        inner.broadcast();
        Ok(())
    }

    async fn delete(&self, id: &TaskId) -> Result<(), RemoteError> {
        let mut inner = self.inner();
        inner.mutation_requests += 1;
        inner.behaviour.can_delete()?;

        let index = inner.position(id)?;
        inner.tasks.remove(index);
        log::debug!("Deleted task {}", id);
        inner.broadcast();
        Ok(())
    }
}
