//! This module mirrors a remote collection locally
//!
//! A [`TaskStore`] owns the only subscription to the remote collection. A single consumer task reads the snapshots in order,
//! and publishes the derived [`TaskViews`] as one immutable value, so that readers never see a flat list and a grouping coming from different snapshots.
//!
//! Mutations are sent to the remote collection and never touch the local mirror: their effect only becomes visible when the next snapshot is delivered.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::date_key::DateKey;
use crate::task::{NewTask, Task, TaskId};
use crate::traits::{RemoteCollection, RemoteError, Subscription};

pub mod views;
pub use views::TaskViews;


/// Why a task could not be added
#[derive(Debug)]
pub enum TaskError {
    /// The text was empty (or only contained whitespace). Nothing has been sent to the remote collection
    EmptyText,
    /// The remote collection has refused or failed the creation
    Remote(RemoteError),
}

impl Display for TaskError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskError::EmptyText => write!(f, "Task text is empty"),
            TaskError::Remote(err) => write!(f, "Unable to save the task: {}", err),
        }
    }
}

impl Error for TaskError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            TaskError::EmptyText => None,
            TaskError::Remote(err) => Some(err.as_ref()),
        }
    }
}


/// A local mirror of a remote collection of tasks
pub struct TaskStore<R>
where
    R: RemoteCollection + 'static,
{
    remote: Arc<R>,
    views: watch::Receiver<Arc<TaskViews>>,
    consumer: Option<JoinHandle<()>>,
    /// Set by [`TaskStore::stop`]. The consumer checks it before every publication
    stopped: Arc<Mutex<bool>>,
}

impl<R> TaskStore<R>
where
    R: RemoteCollection + 'static,
{
    /// Subscribe to the remote collection, and start mirroring it.
    ///
    /// Views are empty (with a generation of `0`) until the first snapshot is received.
    /// This must be called from within a tokio runtime.
    pub async fn connect(remote: Arc<R>) -> Result<Self, RemoteError> {
        let subscription = remote.subscribe().await?;
        let (sender, receiver) = watch::channel(Arc::new(TaskViews::default()));
        let stopped = Arc::new(Mutex::new(false));
        let consumer = tokio::spawn(consume(subscription, sender, stopped.clone()));
        log::info!("Task store connected");

        Ok(Self {
            remote,
            views: receiver,
            consumer: Some(consumer),
            stopped,
        })
    }

    /// Returns the remote collection this store mirrors
    pub fn remote(&self) -> &Arc<R> {
        &self.remote
    }

    /// The views derived from the latest snapshot
    pub fn views(&self) -> Arc<TaskViews> {
        self.views.borrow().clone()
    }

    /// A receiver that is notified every time new views are published
    pub fn watch_views(&self) -> watch::Receiver<Arc<TaskViews>> {
        self.views.clone()
    }

    /// Wait until views newer than `generation` are published.
    ///
    /// Returns `None` in case no more views will ever be published (e.g. the store has been stopped)
    pub async fn views_after(&self, generation: u64) -> Option<Arc<TaskViews>> {
        let mut receiver = self.views.clone();
        loop {
            {
                let current = receiver.borrow_and_update();
                if current.generation() > generation {
                    return Some(current.clone());
                }
            }
            if receiver.changed().await.is_err() {
                return None;
            }
        }
    }

    /// Whether the subscription is still active
    pub fn is_live(&self) -> bool {
        match &self.consumer {
            None => false,
            Some(handle) => handle.is_finished() == false,
        }
    }

    /// Cancel the subscription. Views will not change anymore
    pub fn stop(&mut self) {
        // The consumer may be running on another thread, and abort() does not interrupt it mid-poll
        *self.stopped.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = true;
        if let Some(consumer) = self.consumer.take() {
            log::info!("Stopping the task store");
            consumer.abort();
        }
    }

    /// Ask the remote collection to create a task.
    ///
    /// Nothing is sent when `text` is empty or only contains whitespace.
    /// The new task will only appear in the views once the next snapshot is received.
    pub async fn add_task(&self, text: &str, date: DateKey) -> Result<TaskId, TaskError> {
        self.prepare_add(text, date)?.send().await.result
    }

    /// Validate a task creation, without sending it yet.
    ///
    /// The returned request does not borrow this store, so that it can be sent (or spawned) while the store keeps being read.
    pub fn prepare_add(&self, text: &str, date: DateKey) -> Result<AddRequest<R>, TaskError> {
        if text.trim().is_empty() {
            log::debug!("Refusing to add a task with an empty text");
            return Err(TaskError::EmptyText);
        }
        Ok(AddRequest {
            remote: self.remote.clone(),
            task: NewTask::pending(text.to_string(), date),
        })
    }

    /// Ask the remote collection to flip the completion status of a task.
    ///
    /// Only the completion status is sent.
    pub async fn toggle_completion(&self, task: &Task) -> Result<(), RemoteError> {
        self.remote.update(task.id(), task.toggled()).await
    }

    /// Ask the remote collection to delete a task
    pub async fn delete_task(&self, id: &TaskId) -> Result<(), RemoteError> {
        self.remote.delete(id).await
    }
}

impl<R> Drop for TaskStore<R>
where
    R: RemoteCollection + 'static,
{
    fn drop(&mut self) {
        self.stop();
    }
}


/// A validated task creation, see [`TaskStore::prepare_add`]
#[derive(Debug)]
pub struct AddRequest<R> {
    remote: Arc<R>,
    task: NewTask,
}

/// What happened to an [`AddRequest`]. It gives the task back, so that it is not lost in case of failure
#[derive(Debug)]
pub struct AddOutcome {
    pub task: NewTask,
    pub result: Result<TaskId, TaskError>,
}

impl<R> AddRequest<R>
where
    R: RemoteCollection + 'static,
{
    pub fn task(&self) -> &NewTask {
        &self.task
    }

    /// Send the creation to the remote collection
    pub async fn send(self) -> AddOutcome {
        let result = match self.remote.create(self.task.clone()).await {
            Err(err) => Err(TaskError::Remote(err)),
            Ok(id) => {
                log::debug!("Task {} has been added to {}", id, self.task.date);
                Ok(id)
            },
        };
        AddOutcome { task: self.task, result }
    }
}


/// Read every snapshot of a subscription, in order, and publish the views derived from each one
async fn consume(mut subscription: Subscription, sender: watch::Sender<Arc<TaskViews>>, stopped: Arc<Mutex<bool>>) {
    let mut generation = 0;
    while let Some(snapshot) = subscription.next().await {
        generation += 1;
        log::trace!("Received snapshot #{} ({} tasks)", generation, snapshot.len());
        let views = TaskViews::from_snapshot(snapshot, generation);

        // The lock is held while publishing, so that nothing gets published once stop() has returned
        let stopped = stopped.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if *stopped {
            log::debug!("Task store has been stopped, dropping snapshot #{}", generation);
            break;
        }
        if sender.send(Arc::new(views)).is_err() {
            log::debug!("Nobody is reading the task views anymore");
            break;
        }
    }
    log::info!("Subscription has ended");
}
