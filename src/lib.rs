//! This crate provides a calendar-based todo list, kept in sync with a live remote collection.
//!
//! The [`calendar`] module builds month grids (whole weeks, including padding days from the adjacent months), and summarizes the tasks of each day.
//!
//! Tasks live in a remote collection (see [`traits::RemoteCollection`]), which may be an HTTP document store (see [`client`]) or an in-memory collection (see [`memory`]). \
//! A [`TaskStore`](store::TaskStore) mirrors this collection locally, and re-derives its views every time the collection sends a new snapshot. \
//! Changes are always sent to the remote collection, and only become visible locally once the collection sends them back.
//!
//! The [`app`] module ties everything together into the state of the application a UI renders.

pub mod traits;

pub mod calendar;
mod date_key;
pub use date_key::{DateKey, ParseDateKeyError};
pub mod task;
pub use task::{Task, TaskId};
pub mod store;
pub use store::TaskStore;
pub mod app;
pub use app::App;

pub mod client;
pub mod memory;
pub mod mock_behaviour;
mod resource;
pub use resource::Resource;

pub mod config;
pub mod utils;
