//! The state of the calendar todo application, and what it displays
//!
//! [`AppState`] holds everything a user action can change besides the tasks themselves (selection, displayed month, theme, text draft, notification).
//! Every user action is a method, so that there is no other way to change this state.
//!
//! [`App`] binds this state to a [`TaskStore`], and builds what a UI has to render.

use std::sync::Arc;

use chrono::{Local, NaiveDate};

use crate::calendar::{self, Day};
use crate::calendar::summary::DaySummary;
use crate::date_key::DateKey;
use crate::store::{AddOutcome, AddRequest, TaskError, TaskStore, TaskViews};
use crate::task::{Task, TaskId};
use crate::traits::RemoteCollection;

/// Shown to the user when a task could not be saved
pub const SAVE_FAILED_MESSAGE: &str = "Unable to save the task. Please check the connection to the remote store.";

/// Weekday labels, in grid order
pub const WEEKDAY_LABELS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];


#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Theme::Dark
    }
}


/// Everything a user can change, apart from the tasks
#[derive(Clone, Debug, PartialEq)]
pub struct AppState {
    selected_date: NaiveDate,
    /// Any day of the displayed month
    current_month: NaiveDate,
    theme: Theme,
    draft: String,
    notification: Option<String>,
}

impl AppState {
    /// A state where both the selection and the displayed month are `today`
    pub fn new(today: NaiveDate) -> Self {
        Self {
            selected_date: today,
            current_month: today,
            theme: Theme::default(),
            draft: String::new(),
            notification: None,
        }
    }

    pub fn selected_date(&self) -> NaiveDate   { self.selected_date }
    pub fn current_month(&self) -> NaiveDate   { self.current_month }
    pub fn theme(&self) -> Theme               { self.theme }
    pub fn draft(&self) -> &str                { &self.draft }
    pub fn notification(&self) -> Option<&str> { self.notification.as_deref() }

    pub fn selected_key(&self) -> DateKey {
        DateKey::from(self.selected_date)
    }

    /// Display the next month. The selection does not change
    pub fn next_month(&mut self) {
        self.current_month = calendar::add_months(self.current_month, 1);
    }

    /// Display the previous month. The selection does not change
    pub fn previous_month(&mut self) {
        self.current_month = calendar::add_months(self.current_month, -1);
    }

    /// Select a day. In case it is not in the displayed month, its month gets displayed instead
    pub fn select_day(&mut self, date: NaiveDate) {
        self.selected_date = date;
        if calendar::same_month(date, self.current_month) == false {
            self.current_month = date;
        }
    }

    pub fn toggle_theme(&mut self) {
        self.theme = self.theme.toggled();
    }

    pub fn set_draft(&mut self, text: String) {
        self.draft = text;
    }

    /// Empty the draft, and return what it contained
    pub fn take_draft(&mut self) -> String {
        std::mem::take(&mut self.draft)
    }

    /// Put back a draft that could not be submitted.
    /// This does nothing in case the user has already typed something else.
    pub fn restore_draft(&mut self, text: String) {
        if self.draft.is_empty() {
            self.draft = text;
        }
    }

    pub fn notify(&mut self, message: String) {
        self.notification = Some(message);
    }

    pub fn dismiss_notification(&mut self) {
        self.notification = None;
    }
}


/// A day of the displayed grid, with its indicator (if it has tasks)
#[derive(Clone, Debug, PartialEq)]
pub struct DayCell {
    pub day: Day,
    pub summary: Option<DaySummary>,
}

/// What the calendar part displays
#[derive(Clone, Debug, PartialEq)]
pub struct MonthView {
    /// e.g. `2024-03`
    pub title: String,
    pub weekday_labels: [&'static str; 7],
    pub cells: Vec<DayCell>,
}

/// What the task list part displays, for the selected day
#[derive(Clone, Debug, PartialEq)]
pub struct DayPanel {
    /// e.g. `2024-03-15 (Friday)`
    pub title: String,
    pub date: DateKey,
    /// Oldest first
    pub pending: Vec<Task>,
    /// Oldest first
    pub completed: Vec<Task>,
}


/// The calendar todo application
pub struct App<R>
where
    R: RemoteCollection + 'static,
{
    state: AppState,
    store: TaskStore<R>,
}

impl<R> App<R>
where
    R: RemoteCollection + 'static,
{
    /// Create an application that starts on `today`
    pub fn new(store: TaskStore<R>, today: NaiveDate) -> Self {
        Self { state: AppState::new(today), store }
    }

    /// Create an application that starts on the current local date
    pub fn starting_today(store: TaskStore<R>) -> Self {
        Self::new(store, Local::now().date_naive())
    }

    pub fn state(&self) -> &AppState { &self.state }
    pub fn state_mut(&mut self) -> &mut AppState { &mut self.state }
    pub fn store(&self) -> &TaskStore<R> { &self.store }

    /// Submit the current draft as a new task for the selected day.
    ///
    /// The draft is cleared right away. If the remote collection refuses the task, the draft is restored and the user is notified.
    /// This borrows the whole app until the remote collection answers; see [`Self::start_submit`] to keep using the app meanwhile.
    pub async fn submit(&mut self) -> Result<TaskId, TaskError> {
        let request = self.start_submit()?;
        let outcome = request.send().await;
        self.finish_submit(outcome)
    }

    /// Take the current draft, and turn it into a request for the selected day.
    ///
    /// The request does not borrow the app: the UI can keep rendering and editing the draft while it is sent.
    /// Its outcome must then be given to [`Self::finish_submit`].
    pub fn start_submit(&mut self) -> Result<AddRequest<R>, TaskError> {
        let text = self.state.take_draft();
        let date = self.state.selected_key();
        self.store.prepare_add(&text, date)
    }

    /// Apply the outcome of a request returned by [`Self::start_submit`]
    pub fn finish_submit(&mut self, outcome: AddOutcome) -> Result<TaskId, TaskError> {
        match outcome.result {
            Ok(id) => Ok(id),
            Err(TaskError::EmptyText) => Err(TaskError::EmptyText),
            Err(TaskError::Remote(err)) => {
                log::error!("Error adding a task on {}: {}", outcome.task.date, err);
                self.state.restore_draft(outcome.task.text);
                self.state.notify(SAVE_FAILED_MESSAGE.to_string());
                Err(TaskError::Remote(err))
            },
        }
    }

    /// Flip the completion status of a task.
    ///
    /// Failures are only logged. The views will change once the remote collection delivers its next snapshot.
    pub async fn toggle(&self, id: &TaskId) {
        let views = self.store.views();
        let task = match views.get(id) {
            None => {
                log::warn!("Unable to toggle task {}: it is not in the current views", id);
                return;
            },
            Some(task) => task,
        };

        if let Err(err) = self.store.toggle_completion(task).await {
            log::warn!("Error updating task {}: {}", id, err);
        }
    }

    /// Delete a task. Failures are only logged.
    pub async fn delete(&self, id: &TaskId) {
        if let Err(err) = self.store.delete_task(id).await {
            log::warn!("Error deleting task {}: {}", id, err);
        }
    }

    /// The grid of the displayed month
    pub fn month_view(&self) -> MonthView {
        month_view(&self.state, &self.store.views())
    }

    /// The tasks of the selected day
    pub fn day_panel(&self) -> DayPanel {
        day_panel(&self.state, &self.store.views())
    }
}

/// Build the grid of the displayed month, with an indicator on every day that has tasks
pub fn month_view(state: &AppState, views: &Arc<TaskViews>) -> MonthView {
    let cells = calendar::build_grid(state.current_month(), state.selected_date())
        .into_iter()
        .map(|day| {
            let summary = views.summary(&DateKey::from(day.date()));
            DayCell { day, summary }
        })
        .collect();

    MonthView {
        title: state.current_month().format("%Y-%m").to_string(),
        weekday_labels: WEEKDAY_LABELS,
        cells,
    }
}

/// Build the task lists of the selected day
pub fn day_panel(state: &AppState, views: &Arc<TaskViews>) -> DayPanel {
    let date = state.selected_key();
    DayPanel {
        title: state.selected_date().format("%Y-%m-%d (%A)").to_string(),
        date,
        pending: views.pending_on(&date).into_iter().cloned().collect(),
        completed: views.completed_on(&date).into_iter().cloned().collect(),
    }
}
