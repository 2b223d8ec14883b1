use chrono::{Duration, Utc};
use serde_json::json;
use tasklist::application::task_store::TaskStore;
use tasklist::domain::query::{self, SortKey, StatusFilter, TaskQuery};
use tasklist::domain::storage::KeyValueStorage;
use tasklist::domain::summary::Summary;
use tasklist::domain::task::{Category, NewTask};
use tasklist::infrastructure::local_storage::FileStorage;

#[test]
fn acceptance_add_toggle_remove_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    let today = Utc::now().date_naive();

    let mut store = TaskStore::open(FileStorage::open(dir.path()).unwrap(), "tasks");
    let milk = store.add(NewTask::new("Buy milk", Category::Personal, Some(today - Duration::days(1)))).unwrap();
    assert!(milk.is_durable());
    let report = store.add(NewTask::new("Write report", Category::Work, None)).unwrap().value;
    let exam = store.add(NewTask::new("Study for exam", Category::Study, today.checked_add_signed(Duration::days(30)))).unwrap().value;
    assert!(store.toggle(&report.id).unwrap().is_durable());
    assert!(store.remove(&exam.id).value);

    // a fresh process sees exactly what was written
    let store = TaskStore::open(FileStorage::open(dir.path()).unwrap(), "tasks");
    assert!(store.load_error().is_none());
    assert_eq!(store.len(), 2);
    assert_eq!(store.tasks()[0].id, report.id);
    assert!(store.tasks()[0].completed);
    assert!(store.tasks()[0].completed_at.is_some());

    let now = Utc::now();
    let overdue = query::run(store.tasks(), &TaskQuery { status: StatusFilter::Overdue, ..TaskQuery::default() }, &now);
    assert_eq!(overdue.len(), 1);
    assert_eq!(overdue[0].text, "Buy milk");
    let sorted = query::run(store.tasks(), &TaskQuery { sort: SortKey::Alphabetical, ..TaskQuery::default() }, &now);
    assert_eq!(sorted.iter().map(|t| t.text.as_str()).collect::<Vec<_>>(), vec!["Buy milk", "Write report"]);
    assert_eq!(Summary::of(store.tasks(), &now), Summary { total: 2, completed: 1, pending: 1, overdue: 1 });
}

#[test]
fn acceptance_reads_record_written_by_the_browser_app() {
    let dir = tempfile::tempdir().unwrap();
    let mut storage = FileStorage::open(dir.path()).unwrap();
    let record = json!([
        {
            "id": "lx2k9d81a3f0e",
            "text": "Renew passport",
            "completed": false,
            "category": "personal",
            "dueDate": "2024-02-10",
            "createdAt": "2024-01-20T08:15:30.123Z",
            "completedAt": null
        },
        {
            "id": "lx2k9e02bb71c",
            "text": "Fix bike",
            "completed": true,
            "category": "hobby",
            "dueDate": null,
            "createdAt": "2024-01-19T18:00:00.000Z",
            "completedAt": "2024-01-21T09:00:00.000Z"
        }
    ]);
    storage.set_item("tasks", &record.to_string()).unwrap();

    let mut store = TaskStore::open(storage, "tasks");
    assert!(store.load_error().is_none());
    assert_eq!(store.len(), 2);
    assert_eq!(store.tasks()[1].category, Category::Unknown("hobby".into()));

    store.save().unwrap();
    let rewritten: serde_json::Value = serde_json::from_str(&store.storage().get_item("tasks").unwrap().unwrap()).unwrap();
    assert_eq!(rewritten[1]["category"], json!("hobby"));
    assert_eq!(rewritten[0]["dueDate"], json!("2024-02-10"));
    assert_eq!(rewritten[1]["dueDate"], json!(null));
    assert_eq!(rewritten[0]["createdAt"], json!("2024-01-20T08:15:30.123Z"));
}

#[test]
fn acceptance_corrupt_file_starts_empty_and_is_replaced_on_next_write() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("tasks.json"), "[{\"id\": 1,").unwrap();

    let mut store = TaskStore::open(FileStorage::open(dir.path()).unwrap(), "tasks");
    assert!(store.is_empty());
    assert!(store.load_error().is_some());

    store.add(NewTask::new("start over", Category::Other, None)).unwrap();
    let store = TaskStore::open(FileStorage::open(dir.path()).unwrap(), "tasks");
    assert!(store.load_error().is_none());
    assert_eq!(store.len(), 1);
}
