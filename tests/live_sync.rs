//! Tests of the local mirror of a remote collection.
//! The remote collection is an in-memory one, whose failures are scripted.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;

use todo_calendar::app::{month_view, AppState};
use todo_calendar::memory::MemoryCollection;
use todo_calendar::mock_behaviour::MockBehaviour;
use todo_calendar::store::{TaskError, TaskViews};
use todo_calendar::traits::RemoteCollection;
use todo_calendar::{DateKey, TaskStore};

const TIMEOUT: Duration = Duration::from_secs(5);

async fn connect() -> (Arc<MemoryCollection>, TaskStore<MemoryCollection>) {
    let collection = Arc::new(MemoryCollection::new());
    let store = TaskStore::connect(collection.clone()).await.unwrap();
    (collection, store)
}

/// Wait for the views derived from the next snapshot
async fn next_views(store: &TaskStore<MemoryCollection>, after: u64) -> Arc<TaskViews> {
    tokio::time::timeout(TIMEOUT, store.views_after(after)).await
        .expect("no snapshot has been delivered in time")
        .expect("the store has stopped")
}

/// Give the consumer task a chance to run
async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}

fn key(s: &str) -> DateKey {
    s.parse().unwrap()
}


#[tokio::test]
async fn test_add_toggle_delete() {
    let _ = env_logger::builder().is_test(true).try_init();

    let (collection, store) = connect().await;
    let views = next_views(&store, 0).await;
    assert_eq!(views.generation(), 1);
    assert!(views.tasks().is_empty());

    // An empty store shows no indicator at all
    let state = AppState::new(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    let grid = month_view(&state, &views);
    assert_eq!(grid.cells.len(), 42);
    assert!(grid.cells.iter().all(|cell| cell.summary.is_none()));

    // Add
    let day = key("2024-03-15");
    let id = store.add_task("buy milk", day).await.unwrap();
    let views = next_views(&store, views.generation()).await;
    assert_eq!(views.tasks().len(), 1);
    let task = &views.tasks()[0];
    assert_eq!(task.id(), &id);
    assert_eq!(task.text(), "buy milk");
    assert_eq!(task.completed(), false);
    assert_eq!(task.date(), &day);
    let summary = views.summary(&day).unwrap();
    assert_eq!(summary.count(), 1);
    assert_eq!(summary.all_completed(), false);

    // Toggle
    store.toggle_completion(task).await.unwrap();
    let views = next_views(&store, views.generation()).await;
    assert_eq!(views.get(&id).unwrap().completed(), true);
    assert_eq!(views.summary(&day).unwrap().all_completed(), true);

    // Empty submissions are not sent
    let requests = collection.mutation_requests();
    assert!(matches!(store.add_task("", day).await, Err(TaskError::EmptyText)));
    assert!(matches!(store.add_task("  \t ", day).await, Err(TaskError::EmptyText)));
    assert_eq!(collection.mutation_requests(), requests);
    settle().await;
    assert_eq!(store.views().generation(), views.generation());
    assert_eq!(store.views().tasks().len(), 1);

    // Delete
    store.delete_task(&id).await.unwrap();
    let views = next_views(&store, views.generation()).await;
    assert!(views.tasks().is_empty());
    assert_eq!(views.summary(&day), None);
}

#[tokio::test]
async fn test_views_only_change_on_snapshots() {
    let _ = env_logger::builder().is_test(true).try_init();

    let (collection, store) = connect().await;
    let day = key("2024-03-15");
    store.add_task("water the plants", day).await.unwrap();
    let views = next_views(&store, 0).await;
    let views = if views.tasks().is_empty() { next_views(&store, views.generation()).await } else { views };
    let task = views.tasks()[0].clone();

    collection.hold_deliveries();
    store.toggle_completion(&task).await.unwrap();
    settle().await;

    // The remote collection has changed, but nothing has been delivered yet
    assert_eq!(collection.tasks()[0].completed(), true);
    assert_eq!(store.views().generation(), views.generation());
    assert_eq!(store.views().get(task.id()).unwrap().completed(), false);

    collection.release_deliveries();
    let views = next_views(&store, views.generation()).await;
    assert_eq!(views.get(task.id()).unwrap().completed(), true);
}

#[tokio::test]
async fn test_grouping_follows_creation_order() {
    let _ = env_logger::builder().is_test(true).try_init();

    let (collection, store) = connect().await;
    collection.hold_deliveries();
    for (text, date) in &[("a", "2024-03-15"), ("b", "2024-03-16"), ("c", "2024-03-15"), ("d", "2024-02-29")] {
        store.add_task(text, key(date)).await.unwrap();
    }
    collection.release_deliveries();

    let mut views = next_views(&store, 0).await;
    while views.tasks().len() < 4 {
        views = next_views(&store, views.generation()).await;
    }

    let texts: Vec<&str> = views.tasks().iter().map(|t| t.text()).collect();
    assert_eq!(texts, vec!["a", "b", "c", "d"]);
    let on_15th: Vec<&str> = views.tasks_on(&key("2024-03-15")).iter().map(|t| t.text()).collect();
    assert_eq!(on_15th, vec!["a", "c"]);
    assert_eq!(views.by_date().len(), 3);

    let grouped: usize = views.by_date().values().map(|group| group.len()).sum();
    assert_eq!(grouped, views.tasks().len());
}

#[tokio::test]
async fn test_failed_mutations_leave_views_untouched() {
    let _ = env_logger::builder().is_test(true).try_init();

    let (collection, store) = connect().await;
    let day = key("2024-03-15");
    let id = store.add_task("call mom", day).await.unwrap();
    let mut views = next_views(&store, 0).await;
    while views.tasks().is_empty() {
        views = next_views(&store, views.generation()).await;
    }
    let task = views.get(&id).unwrap().clone();

    collection.set_mock_behaviour(MockBehaviour::fail_now(1));
    assert!(matches!(store.add_task("another", day).await, Err(TaskError::Remote(_))));
    assert!(store.toggle_completion(&task).await.is_err());
    assert!(store.delete_task(&id).await.is_err());
    settle().await;

    assert_eq!(store.views().generation(), views.generation());
    assert_eq!(store.views().tasks(), views.tasks());
    assert_eq!(collection.tasks().len(), 1);

    // There is no retry: the next attempts are brand new requests
    store.delete_task(&id).await.unwrap();
    let views = next_views(&store, views.generation()).await;
    assert!(views.tasks().is_empty());
}

#[tokio::test]
async fn test_stopped_store_does_not_update() {
    let _ = env_logger::builder().is_test(true).try_init();

    let (collection, mut store) = connect().await;
    let views = next_views(&store, 0).await;
    assert!(store.is_live());
    assert_eq!(collection.subscriber_count(), 1);

    store.stop();
    assert_eq!(store.is_live(), false);
    let after_stop = tokio::time::timeout(TIMEOUT, store.views_after(views.generation())).await.unwrap();
    assert!(after_stop.is_none());
    assert_eq!(collection.subscriber_count(), 0);

    collection.create(todo_calendar::task::NewTask::pending("too late".to_string(), key("2024-03-15"))).await.unwrap();
    settle().await;
    assert_eq!(store.views().generation(), views.generation());
    assert!(store.views().tasks().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_nothing_is_published_once_stop_returns() {
    let _ = env_logger::builder().is_test(true).try_init();

    let (collection, mut store) = connect().await;
    next_views(&store, 0).await;

    // Keep the consumer busy on another worker while the store is being stopped
    let writer = {
        let collection = collection.clone();
        tokio::spawn(async move {
            for i in 0..200 {
                let task = todo_calendar::task::NewTask::pending(format!("task #{}", i), key("2024-03-15"));
                collection.create(task).await.unwrap();
                tokio::task::yield_now().await;
            }
        })
    };
    tokio::time::sleep(Duration::from_millis(1)).await;

    store.stop();
    let generation = store.views().generation();
    writer.await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(store.views().generation(), generation);
}

#[tokio::test]
async fn test_subscription_failure() {
    let _ = env_logger::builder().is_test(true).try_init();

    let collection = Arc::new(MemoryCollection::new());
    collection.set_mock_behaviour(MockBehaviour {
        subscribe_behaviour: (0, 1),
        ..MockBehaviour::default()
    });
    assert!(TaskStore::connect(collection.clone()).await.is_err());

    // Next attempt succeeds
    let store = TaskStore::connect(collection.clone()).await.unwrap();
    let views = next_views(&store, 0).await;
    assert!(views.tasks().is_empty());
}

#[tokio::test]
async fn test_existing_content_is_mirrored() {
    let _ = env_logger::builder().is_test(true).try_init();

    let seed = MemoryCollection::new();
    seed.create(todo_calendar::task::NewTask::pending("first".to_string(), key("2024-03-15"))).await.unwrap();
    seed.create(todo_calendar::task::NewTask::pending("second".to_string(), key("2024-03-17"))).await.unwrap();

    let collection = Arc::new(MemoryCollection::with_tasks(seed.tasks()));
    let store = TaskStore::connect(collection).await.unwrap();
    let views = next_views(&store, 0).await;
    assert_eq!(views.generation(), 1);
    assert_eq!(views.tasks().len(), 2);
    assert_eq!(views.tasks()[0].text(), "first");
    assert!(views.summary(&key("2024-03-17")).is_some());
    assert!(views.summary(&key("2024-03-16")).is_none());
}
