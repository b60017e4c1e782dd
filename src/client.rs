//! This module provides a client to connect to a remote document store over HTTP
//!
//! The store exposes the collection as a JSON endpoint:
//! * `GET {base}/{collection}` lists every record,
//! * `POST {base}/{collection}` creates a record, and replies with its `id`,
//! * `PATCH {base}/{collection}/{id}` applies a partial update,
//! * `DELETE {base}/{collection}/{id}` removes a record.
//!
//! The store does not push changes, so a [`Client`] turns polling into a stream of snapshots.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::mpsc;

use crate::config::Settings;
use crate::resource::Resource;
use crate::task::{NewTask, TaskId, TaskPatch};
use crate::traits::{RemoteCollection, RemoteError, Snapshot, Subscription};

/// Polling faster than this would only hammer the store. Shorter intervals are raised to it
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// The reply of the store when a record is created
#[derive(Debug, Deserialize)]
struct Created {
    id: TaskId,
}


/// A remote collection that lives on an HTTP document store
#[derive(Clone, Debug)]
pub struct Client {
    collection: Resource,
    poll_interval: Duration,
    http: reqwest::Client,
}

impl Client {
    /// Create a client. This does not start a connection
    pub fn new(settings: &Settings) -> Self {
        if settings.poll_interval < MIN_POLL_INTERVAL {
            log::warn!("Poll interval {:?} is too short, using {:?} instead", settings.poll_interval, MIN_POLL_INTERVAL);
        }
        Self {
            collection: settings.resource.join(&settings.collection),
            poll_interval: settings.poll_interval.max(MIN_POLL_INTERVAL),
            http: reqwest::Client::new(),
        }
    }

    /// The resource that represents the whole collection
    pub fn collection(&self) -> &Resource {
        &self.collection
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    fn document(&self, id: &TaskId) -> Resource {
        self.collection.join(id.as_str())
    }
}

#[async_trait]
impl RemoteCollection for Client {
    async fn subscribe(&self) -> Result<Subscription, RemoteError> {
        // The first fetch is awaited here, so that a wrong URL or wrong credentials are reported to the subscriber
        let first = fetch_snapshot(&self.http, &self.collection).await?;

        let (sender, receiver) = mpsc::unbounded_channel();
        let _ = sender.send(first.clone());

        let producer = tokio::spawn(poll(
            self.http.clone(),
            self.collection.clone(),
            self.poll_interval,
            sender,
            first,
        ));
        Ok(Subscription::with_producer(receiver, producer))
    }

    async fn create(&self, task: NewTask) -> Result<TaskId, RemoteError> {
        let request = self.http.post(self.collection.url().clone()).json(&task);
        let response = self.collection.authorize(request).send().await?;
        check_status(&response)?;

        let created: Created = response.json().await?;
        log::debug!("Created task {}", created.id);
        Ok(created.id)
    }

    async fn update(&self, id: &TaskId, patch: TaskPatch) -> Result<(), RemoteError> {
        let document = self.document(id);
        let request = self.http.patch(document.url().clone()).json(&patch);
        let response = document.authorize(request).send().await?;
        check_status(&response)
    }

    async fn delete(&self, id: &TaskId) -> Result<(), RemoteError> {
        let document = self.document(id);
        let request = self.http.delete(document.url().clone());
        let response = document.authorize(request).send().await?;
        check_status(&response)
    }
}

fn check_status(response: &reqwest::Response) -> Result<(), RemoteError> {
    if response.status().is_success() == false {
        return Err(format!("Unexpected HTTP status code {:?} for {}", response.status(), response.url()).into());
    }
    Ok(())
}

/// Fetch the whole collection, ordered by creation time
async fn fetch_snapshot(http: &reqwest::Client, collection: &Resource) -> Result<Snapshot, RemoteError> {
    let request = http.get(collection.url().clone());
    let response = collection.authorize(request).send().await?;
    check_status(&response)?;

    let mut snapshot: Snapshot = response.json().await?;
    // sort_by is stable, records that share a timestamp keep the order of the server
    snapshot.sort_by(|a, b| a.created_at().cmp(b.created_at()));
    Ok(snapshot)
}

/// Fetch the collection every `period`, and forward it whenever it has changed since `last`
async fn poll(http: reqwest::Client, collection: Resource, period: Duration, sender: mpsc::UnboundedSender<Snapshot>, mut last: Snapshot) {
    // interval() panics on a zero period
    let mut ticker = tokio::time::interval(period.max(MIN_POLL_INTERVAL));
    // The first tick completes at once, and the caller has just fetched the collection
    ticker.tick().await;

    loop {
        ticker.tick().await;
        if sender.is_closed() {
            break;
        }

        let snapshot = match fetch_snapshot(&http, &collection).await {
            Err(err) => {
                log::warn!("Unable to fetch {}: {}. Will retry at next tick", collection.url(), err);
                continue;
            },
            Ok(snapshot) => snapshot,
        };
        if snapshot == last {
            continue;
        }

        log::debug!("{} has changed ({} tasks)", collection.url(), snapshot.len());
        if sender.send(snapshot.clone()).is_err() {
            break;
        }
        last = snapshot;
    }
    log::debug!("Stopped polling {}", collection.url());
}
