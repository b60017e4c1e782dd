//! Per-day indicators shown on a month grid

use std::collections::HashMap;

use crate::date_key::DateKey;
use crate::task::Task;

/// Above this number of tasks, a day is considered busy
pub const BUSY_THRESHOLD: usize = 5;

/// What a grid displays for a day that has tasks.
/// This is derived from the task list every time it changes, and never stored
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DaySummary {
    count: usize,
    all_completed: bool,
}

impl DaySummary {
    pub fn count(&self) -> usize { self.count }
    pub fn all_completed(&self) -> bool { self.all_completed }

    pub fn is_busy(&self) -> bool {
        self.count > BUSY_THRESHOLD
    }
}

/// Summarize the tasks of a day. Returns `None` if there is no task for this day
pub fn summarize(date_key: &DateKey, grouped: &HashMap<DateKey, Vec<Task>>) -> Option<DaySummary> {
    let tasks = grouped.get(date_key)?;
    summarize_tasks(tasks)
}

/// Summarize a group of tasks. Returns `None` if there is no task in it
pub fn summarize_tasks(tasks: &[Task]) -> Option<DaySummary> {
    if tasks.is_empty() {
        return None;
    }
    Some(DaySummary {
        count: tasks.len(),
        all_completed: tasks.iter().all(|t| t.completed()),
    })
}
