//! Integration tests for `TaskService` backed by a JSON file.
//!
//! These tests drive the service through full open/mutate/reopen cycles on a
//! temporary data file.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::fs;
use std::path::PathBuf;

use tasknest_app::{JsonFileStore, TaskService};
use tasknest_core::{
    Category, CategoryFilter, FixedClock, Priority, SortKey, StatusFilter, TaskDraft, TaskUpdate,
    ViewParams,
};
use tempfile::TempDir;
use time::Duration;
use time::macros::datetime;

/// Test helper: temporary directory plus the data file path inside it.
fn setup_data_file() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::with_prefix("tasknest-test-").expect("create temp dir");
    let path = temp_dir.path().join("data").join("tasks.json");
    (temp_dir, path)
}

fn open(path: &PathBuf, clock: FixedClock) -> TaskService<JsonFileStore, FixedClock> {
    TaskService::open_with_clock(JsonFileStore::new(path), clock).expect("open service")
}

#[test]
fn mutations_survive_reopen() {
    let (_dir, path) = setup_data_file();
    let start = datetime!(2025-07-01 09:00 UTC);

    let (report_id, walk_id) = {
        let mut service = open(&path, FixedClock::new(start));
        let report_id = service
            .create(
                TaskDraft::new("Quarterly report")
                    .category(Category::Work)
                    .priority(Priority::Urgent)
                    .due(start + Duration::days(2)),
            )
            .unwrap();
        let walk_id = service
            .create(TaskDraft::new("Evening walk").category(Category::Health))
            .unwrap();
        service.toggle_complete(walk_id).unwrap();
        (report_id, walk_id)
    };

    let service = open(&path, FixedClock::new(start + Duration::hours(1)));
    let report = service.get(report_id).expect("report persisted");
    assert_eq!(report.priority, Priority::Urgent);
    assert_eq!(report.due_date, Some(start + Duration::days(2)));
    let walk = service.get(walk_id).expect("walk persisted");
    assert!(walk.completed);
    assert_eq!(walk.completed_at, Some(start));
}

#[test]
fn view_over_persisted_collection() {
    let (_dir, path) = setup_data_file();
    let clock = FixedClock::new(datetime!(2025-07-01 09:00 UTC));
    let mut service = open(&path, clock);

    for (text, category) in [
        ("Read chapter 3", Category::Study),
        ("Pay electricity", Category::Finance),
        ("Read paper", Category::Study),
    ] {
        service.create(TaskDraft::new(text).category(category)).unwrap();
        service.store().clock().advance(Duration::minutes(1));
    }
    let paper = service.snapshot()[2].id;
    service.toggle_complete(paper).unwrap();

    let params = ViewParams {
        search: "READ".into(),
        category: CategoryFilter::Only(Category::Study),
        status: StatusFilter::Active,
        sort: SortKey::Alphabetical,
    };
    let view = service.view(&params);
    let texts: Vec<&str> = view.tasks.iter().map(|task| task.text.as_str()).collect();
    assert_eq!(texts, vec!["Read chapter 3"]);
    assert_eq!(view.summary.shown, 1);
    assert_eq!(view.summary.total, 3);
    assert_eq!(view.stats.total, 3);
    assert_eq!(view.stats.completed, 1);
    assert_eq!(view.stats.category(Category::Study).total, 2);
}

#[test]
fn import_replaces_collection_and_reports_skips() {
    let (_dir, path) = setup_data_file();
    let mut service = open(&path, FixedClock::new(datetime!(2025-07-01 09:00 UTC)));
    service.create(TaskDraft::new("Will be replaced")).unwrap();

    let payload = r#"[
        { "id": "1700000000000", "text": "From browser", "category": "hobby", "tags": ["paint"] },
        { "text": "   " },
        { "text": "Bad priority", "priority": "someday" }
    ]"#;
    let report = service.import_json(payload).unwrap();
    assert_eq!(report.imported, 1);
    assert_eq!(report.skipped.len(), 2);

    let reopened = open(&path, FixedClock::new(datetime!(2025-07-02 09:00 UTC)));
    let texts: Vec<String> = reopened.snapshot().iter().map(|task| task.text.clone()).collect();
    assert_eq!(texts, vec!["From browser".to_owned()]);
}

#[test]
fn export_then_import_round_trips() {
    let (dir, path) = setup_data_file();
    let mut service = open(&path, FixedClock::new(datetime!(2025-07-01 09:00 UTC)));
    let id = service
        .create(TaskDraft::new("Portable").description("notes").tags(["a", "b"]))
        .unwrap();
    service
        .update(
            id,
            TaskUpdate {
                archived: Some(true),
                ..TaskUpdate::default()
            },
        )
        .unwrap();
    let exported = service.export_json().unwrap();

    let other_path = dir.path().join("other.json");
    let mut other = open(&other_path, FixedClock::new(datetime!(2025-08-01 09:00 UTC)));
    let report = other.import_json(&exported).unwrap();
    assert!(report.is_clean());
    assert_eq!(other.snapshot(), service.snapshot());
}

#[test]
fn clear_completed_persists() {
    let (_dir, path) = setup_data_file();
    let mut service = open(&path, FixedClock::new(datetime!(2025-07-01 09:00 UTC)));
    let mut ids = Vec::new();
    for idx in 0..5 {
        ids.push(service.create(TaskDraft::new(format!("task {idx}"))).unwrap());
    }
    service.toggle_complete(ids[0]).unwrap();
    service.toggle_complete(ids[4]).unwrap();

    assert_eq!(service.clear_completed().unwrap(), 2);
    let reopened = open(&path, FixedClock::new(datetime!(2025-07-01 10:00 UTC)));
    assert_eq!(reopened.store().len(), 3);
    assert!(reopened.snapshot().iter().all(|task| !task.completed));
}

#[test]
fn corrupt_data_file_fails_to_open() {
    let (_dir, path) = setup_data_file();
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, "this is not json").unwrap();

    let Err(err) = TaskService::open_with_clock(
        JsonFileStore::new(&path),
        FixedClock::new(datetime!(2025-07-01 09:00 UTC)),
    ) else {
        panic!("corrupt data file should error");
    };
    assert!(format!("{err:#}").contains("failed to load tasks"));
    assert_eq!(fs::read_to_string(&path).unwrap(), "this is not json");
}

#[test]
fn invalid_record_on_disk_blocks_open_and_keeps_file() {
    let (_dir, path) = setup_data_file();
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let contents = r#"{ "tasks": [ { "text": "keep" }, { "text": "hand edited", "category": "Chores" } ] }"#;
    fs::write(&path, contents).unwrap();

    let Err(err) = TaskService::open_with_clock(
        JsonFileStore::new(&path),
        FixedClock::new(datetime!(2025-07-01 09:00 UTC)),
    ) else {
        panic!("data file with an invalid record should not open");
    };
    let message = format!("{err:#}");
    assert!(message.contains("1 invalid record(s), first at index 1"), "{message}");
    assert_eq!(fs::read_to_string(&path).unwrap(), contents);
}

#[test]
fn legacy_ids_on_disk_are_normalized_on_open() {
    let (_dir, path) = setup_data_file();
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(
        &path,
        r#"{ "version": 1, "tasks": [ { "id": "1700000000000", "text": "fine", "category": "work" } ] }"#,
    )
    .unwrap();

    let mut service = open(&path, FixedClock::new(datetime!(2025-07-01 09:00 UTC)));
    assert_eq!(service.store().len(), 1);
    assert_eq!(service.snapshot()[0].category, Category::Work);

    service.create(TaskDraft::new("new")).unwrap();
    let reopened = open(&path, FixedClock::new(datetime!(2025-07-01 10:00 UTC)));
    let texts: Vec<String> = reopened.snapshot().iter().map(|task| task.text.clone()).collect();
    assert_eq!(texts, vec!["fine".to_owned(), "new".to_owned()]);
}
