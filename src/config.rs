//! Support for library configuration options

use std::error::Error;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use once_cell::sync::Lazy;
use url::Url;

use crate::resource::Resource;

/// Name of the remote collection that stores the tasks.
/// Feel free to override it when initing this library.
pub static COLLECTION_NAME: Lazy<Arc<Mutex<String>>> = Lazy::new(|| Arc::new(Mutex::new("todos".to_string())));

/// How often a [`Client`](crate::client::Client) polls the remote collection.
/// Feel free to override it when initing this library.
pub static POLL_INTERVAL: Lazy<Arc<Mutex<Duration>>> = Lazy::new(|| Arc::new(Mutex::new(Duration::from_secs(2))));

/// The environment variable that holds the URL of the remote store
pub const URL_VAR: &str = "TODO_CALENDAR_URL";
/// The environment variable that holds the (optional) API key of the remote store
pub const API_KEY_VAR: &str = "TODO_CALENDAR_API_KEY";


/// Everything needed to connect to a remote store
#[derive(Clone, Debug)]
pub struct Settings {
    pub resource: Resource,
    pub collection: String,
    pub poll_interval: Duration,
}

impl Settings {
    /// Build settings from the connection credentials, using the library-wide defaults for the rest
    pub fn new(resource: Resource) -> Self {
        Self {
            resource,
            collection: current_collection_name(),
            poll_interval: current_poll_interval(),
        }
    }

    /// Read the connection credentials from the environment
    pub fn from_env() -> Result<Self, Box<dyn Error>> {
        let url = match std::env::var(URL_VAR) {
            Err(err) => return Err(format!("Unable to read {}: {}", URL_VAR, err).into()),
            Ok(url) => Url::parse(&url)?,
        };
        let api_key = std::env::var(API_KEY_VAR).ok().filter(|key| key.is_empty() == false);
        Ok(Self::new(Resource::new(url, api_key)))
    }
}

fn current_collection_name() -> String {
    COLLECTION_NAME.lock().map(|name| name.clone()).unwrap_or_else(|_| "todos".to_string())
}

fn current_poll_interval() -> Duration {
    POLL_INTERVAL.lock().map(|interval| *interval).unwrap_or_else(|_| Duration::from_secs(2))
}
