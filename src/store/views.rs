//! Read-only views derived from one snapshot

use std::collections::HashMap;

use crate::calendar::summary::{self, DaySummary};
use crate::date_key::DateKey;
use crate::task::{Task, TaskId};
use crate::traits::Snapshot;


/// The flat task list and the per-day grouping, both derived from the same snapshot.
///
/// These are never modified once built. A new snapshot produces new views.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TaskViews {
    /// How many snapshots have been received before (and including) the one these views come from.
    /// `0` means no snapshot has been received yet.
    generation: u64,
    /// Ordered by creation date, oldest first
    tasks: Vec<Task>,
    by_date: HashMap<DateKey, Vec<Task>>,
}

impl TaskViews {
    /// Derive views from a full snapshot
    pub fn from_snapshot(snapshot: Snapshot, generation: u64) -> Self {
        let mut by_date: HashMap<DateKey, Vec<Task>> = HashMap::new();
        for task in &snapshot {
            by_date.entry(*task.date())
                .or_insert_with(Vec::new)
                .push(task.clone());
        }

        Self { generation, tasks: snapshot, by_date }
    }

    pub fn generation(&self) -> u64 { self.generation }
    pub fn tasks(&self) -> &[Task] { &self.tasks }
    pub fn by_date(&self) -> &HashMap<DateKey, Vec<Task>> { &self.by_date }

    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id() == id)
    }

    /// The tasks of a day, oldest first
    pub fn tasks_on(&self, date: &DateKey) -> &[Task] {
        self.by_date.get(date).map(|tasks| tasks.as_slice()).unwrap_or(&[])
    }

    pub fn pending_on(&self, date: &DateKey) -> Vec<&Task> {
        self.tasks_on(date).iter().filter(|t| t.completed() == false).collect()
    }

    pub fn completed_on(&self, date: &DateKey) -> Vec<&Task> {
        self.tasks_on(date).iter().filter(|t| t.completed()).collect()
    }

    pub fn summary(&self, date: &DateKey) -> Option<DaySummary> {
        summary::summarize(date, &self.by_date)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn snapshot(specs: &[(&str, &str, bool)]) -> Snapshot {
        let origin = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        specs.iter().enumerate()
            .map(|(i, (text, date, completed))| {
                Task::new(
                    TaskId::from(format!("id-{}", i)),
                    text.to_string(),
                    *completed,
                    date.parse().unwrap(),
                    origin + Duration::minutes(i as i64),
                )
            })
            .collect()
    }

    #[test]
    fn grouping_partitions_the_flat_list() {
        let views = TaskViews::from_snapshot(snapshot(&[
            ("a", "2024-03-15", false),
            ("b", "2024-03-16", true),
            ("c", "2024-03-15", true),
            ("d", "2024-04-01", false),
            ("e", "2024-03-15", false),
        ]), 1);

        let grouped_count: usize = views.by_date().values().map(|g| g.len()).sum();
        assert_eq!(grouped_count, views.tasks().len());
        for task in views.tasks() {
            let occurrences: usize = views.by_date().values()
                .map(|group| group.iter().filter(|t| t.id() == task.id()).count())
                .sum();
            assert_eq!(occurrences, 1);
            assert!(views.tasks_on(task.date()).contains(task));
        }
        for (key, group) in views.by_date() {
            assert!(group.iter().all(|t| t.date() == key));
        }
    }

    #[test]
    fn day_lists_keep_creation_order() {
        let views = TaskViews::from_snapshot(snapshot(&[
            ("a", "2024-03-15", false),
            ("b", "2024-03-15", true),
            ("c", "2024-03-15", false),
            ("d", "2024-03-15", true),
        ]), 1);
        let key: DateKey = "2024-03-15".parse().unwrap();

        let pending: Vec<&str> = views.pending_on(&key).iter().map(|t| t.text()).collect();
        let completed: Vec<&str> = views.completed_on(&key).iter().map(|t| t.text()).collect();
        assert_eq!(pending, vec!["a", "c"]);
        assert_eq!(completed, vec!["b", "d"]);

        let summary = views.summary(&key).unwrap();
        assert_eq!(summary.count(), 4);
        assert_eq!(summary.all_completed(), false);
    }

    #[test]
    fn empty_views() {
        let views = TaskViews::default();
        let key: DateKey = "2024-03-15".parse().unwrap();
        assert_eq!(views.generation(), 0);
        assert!(views.tasks_on(&key).is_empty());
        assert_eq!(views.summary(&key), None);
        assert!(views.get(&TaskId::from("id-0")).is_none());
    }
}
