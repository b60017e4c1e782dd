//! This is an example of how todo-calendar can be used.
//! It fills an in-memory collection with a few tasks, and prints the resulting month and day panel.
//!
//! Set the RUST_LOG environment variable to display more info about what happens to the tasks.

use std::sync::Arc;

use chrono::NaiveDate;

use todo_calendar::memory::MemoryCollection;
use todo_calendar::utils::{print_day_panel, print_grid};
use todo_calendar::{App, TaskStore};


#[tokio::main]
async fn main() {
    env_logger::init();

    println!("This example shows a month of tasks, mirrored from an in-memory collection.");
    println!("");

    let today = match NaiveDate::from_ymd_opt(2024, 3, 15) {
        Some(today) => today,
        None => return,
    };
    let collection = Arc::new(MemoryCollection::new());
    let store = match TaskStore::connect(collection).await {
        Err(err) => {
            log::error!("Unable to connect to the collection: {}", err);
            return;
        },
        Ok(store) => store,
    };
    let mut app = App::new(store, today);

    for (day, text) in &[(15, "buy milk"), (15, "call the plumber"), (22, "dentist")] {
        if let Some(date) = NaiveDate::from_ymd_opt(2024, 3, *day) {
            app.state_mut().select_day(date);
        }
        app.state_mut().set_draft(text.to_string());
        if let Err(err) = app.submit().await {
            log::error!("Unable to add {:?}: {}", text, err);
        }
    }
    app.state_mut().select_day(today);

    // Mutations are only visible once the collection has sent them back
    let mut views = app.store().views();
    while views.tasks().len() < 3 {
        views = match app.store().views_after(views.generation()).await {
            None => return,
            Some(views) => views,
        };
    }

    if let Some(task) = views.tasks().first() {
        let id = task.id().clone();
        app.toggle(&id).await;
        app.store().views_after(views.generation()).await;
    }

    print_grid(&app.month_view());
    println!("");
    print_day_panel(&app.day_panel());
}
