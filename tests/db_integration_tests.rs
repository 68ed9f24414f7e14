//! Integration tests for the task storage layer.
//!
//! These tests verify the service operations using an in-memory SQLite
//! database: creation defaults, the soft-delete visibility rule,
//! partial-update semantics, and offset pagination.

use quicktask::db::Database;
use quicktask::types::{NewTask, TaskChanges, TaskPriority, TaskStatus};

/// Helper to create a fresh in-memory database for testing.
fn setup_db() -> Database {
    Database::open_in_memory().expect("Failed to create in-memory database")
}

fn new_task(title: &str) -> NewTask {
    NewTask {
        title: title.to_string(),
        description: None,
        priority: TaskPriority::Medium,
        due_date: None,
    }
}

mod create_tests {
    use super::*;

    #[test]
    fn create_assigns_id_and_defaults() {
        let db = setup_db();

        let task = db.create_task(new_task("Buy milk")).expect("Failed to create task");

        assert!(task.id > 0);
        assert_eq!(task.status, TaskStatus::Pending);
        assert!(!task.is_deleted);
        assert_eq!(task.created_at, task.updated_at);
    }

    #[test]
    fn create_preserves_supplied_fields() {
        let db = setup_db();

        let task = db
            .create_task(NewTask {
                title: "Buy milk".to_string(),
                description: Some("Two liters, whole".to_string()),
                priority: TaskPriority::High,
                due_date: Some("2025-10-30".to_string()),
            })
            .unwrap();

        assert_eq!(task.title, "Buy milk");
        assert_eq!(task.description.as_deref(), Some("Two liters, whole"));
        assert_eq!(task.priority, TaskPriority::High);
        assert_eq!(task.due_date.as_deref(), Some("2025-10-30"));
        // Status is forced to pending regardless of caller input
        assert_eq!(task.status, TaskStatus::Pending);
    }

    #[test]
    fn create_assigns_monotonic_ids() {
        let db = setup_db();

        let first = db.create_task(new_task("first")).unwrap();
        db.delete_task(first.id).unwrap();
        let second = db.create_task(new_task("second")).unwrap();

        // Ids are never reused, even after a delete
        assert!(second.id > first.id);
    }

    #[test]
    fn duplicate_titles_are_allowed() {
        let db = setup_db();

        let a = db.create_task(new_task("same")).unwrap();
        let b = db.create_task(new_task("same")).unwrap();

        assert_ne!(a.id, b.id);
    }

    #[test]
    fn open_file_backed_database() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("tasks.db");

        let db = Database::open(&path).expect("Failed to open file-backed database");
        let task = db.create_task(new_task("persisted")).unwrap();

        let found = db.get_task(task.id).unwrap();
        assert!(found.is_some());
    }
}

mod visibility_tests {
    use super::*;

    #[test]
    fn get_returns_none_for_unknown_id() {
        let db = setup_db();

        assert!(db.get_task(9999).unwrap().is_none());
    }

    #[test]
    fn delete_then_get_yields_none() {
        let db = setup_db();
        let task = db.create_task(new_task("ephemeral")).unwrap();

        assert!(db.delete_task(task.id).unwrap());

        // Soft-deleted tasks are indistinguishable from nonexistent ones
        assert!(db.get_task(task.id).unwrap().is_none());
    }

    #[test]
    fn list_never_includes_deleted_tasks() {
        let db = setup_db();
        let keep = db.create_task(new_task("keep")).unwrap();
        let drop = db.create_task(new_task("drop")).unwrap();
        db.delete_task(drop.id).unwrap();

        let tasks = db.list_tasks(0, 100, None).unwrap();

        let ids: Vec<i64> = tasks.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![keep.id]);
    }

    #[test]
    fn update_on_deleted_task_reports_none() {
        let db = setup_db();
        let task = db.create_task(new_task("gone")).unwrap();
        db.delete_task(task.id).unwrap();

        let changes = TaskChanges {
            title: Some("resurrected?".to_string()),
            ..Default::default()
        };
        let result = db.update_task(task.id, changes).unwrap();

        assert!(result.is_none());
        // The deleted row itself is untouched
        let restored = db.restore_task(task.id).unwrap().unwrap();
        assert_eq!(restored.title, "gone");
    }
}

mod update_tests {
    use super::*;

    #[test]
    fn update_applies_only_present_fields() {
        let db = setup_db();
        let task = db
            .create_task(NewTask {
                title: "original".to_string(),
                description: Some("keep me".to_string()),
                priority: TaskPriority::High,
                due_date: Some("2025-10-30".to_string()),
            })
            .unwrap();

        let changes = TaskChanges {
            priority: Some(TaskPriority::Low),
            ..Default::default()
        };
        let updated = db.update_task(task.id, changes).unwrap().unwrap();

        assert_eq!(updated.priority, TaskPriority::Low);
        assert_eq!(updated.title, "original");
        assert_eq!(updated.description.as_deref(), Some("keep me"));
        assert_eq!(updated.due_date.as_deref(), Some("2025-10-30"));
        assert_eq!(updated.status, TaskStatus::Pending);
        assert!(updated.updated_at >= updated.created_at);
    }

    #[test]
    fn update_changes_status() {
        let db = setup_db();
        let task = db.create_task(new_task("finish me")).unwrap();

        let changes = TaskChanges {
            status: Some(TaskStatus::Completed),
            ..Default::default()
        };
        let updated = db.update_task(task.id, changes).unwrap().unwrap();

        assert_eq!(updated.status, TaskStatus::Completed);
    }

    #[test]
    fn empty_update_leaves_task_unchanged() {
        let db = setup_db();
        let task = db.create_task(new_task("stable")).unwrap();

        let updated = db.update_task(task.id, TaskChanges::default()).unwrap().unwrap();

        assert_eq!(updated.title, task.title);
        assert_eq!(updated.updated_at, task.updated_at);
    }

    #[test]
    fn update_unknown_id_reports_none() {
        let db = setup_db();

        let changes = TaskChanges {
            title: Some("nobody".to_string()),
            ..Default::default()
        };
        assert!(db.update_task(424242, changes).unwrap().is_none());
    }
}

mod delete_restore_tests {
    use super::*;

    #[test]
    fn delete_unknown_id_reports_false() {
        let db = setup_db();

        assert!(!db.delete_task(9999).unwrap());
    }

    #[test]
    fn delete_is_idempotent() {
        let db = setup_db();
        let task = db.create_task(new_task("twice")).unwrap();

        assert!(db.delete_task(task.id).unwrap());
        // Second delete finds the row without the visibility filter and
        // reasserts the flag
        assert!(db.delete_task(task.id).unwrap());
    }

    #[test]
    fn restore_unknown_id_reports_none() {
        let db = setup_db();

        assert!(db.restore_task(9999).unwrap().is_none());
    }

    #[test]
    fn delete_restore_roundtrip_preserves_fields() {
        let db = setup_db();
        let task = db
            .create_task(NewTask {
                title: "survivor".to_string(),
                description: Some("comes back intact".to_string()),
                priority: TaskPriority::High,
                due_date: Some("2025-12-01".to_string()),
            })
            .unwrap();

        db.delete_task(task.id).unwrap();
        let restored = db.restore_task(task.id).unwrap().unwrap();

        assert_eq!(restored.title, task.title);
        assert_eq!(restored.description, task.description);
        assert_eq!(restored.priority, task.priority);
        assert_eq!(restored.due_date, task.due_date);
        assert_eq!(restored.status, task.status);
        assert!(!restored.is_deleted);
        assert_eq!(restored.created_at, task.created_at);
        assert!(restored.updated_at >= task.updated_at);

        assert!(db.get_task(task.id).unwrap().is_some());
    }

    #[test]
    fn restore_on_active_task_succeeds() {
        let db = setup_db();
        let task = db.create_task(new_task("already here")).unwrap();

        let first = db.restore_task(task.id).unwrap().unwrap();
        let second = db.restore_task(task.id).unwrap().unwrap();

        assert!(!first.is_deleted);
        assert!(!second.is_deleted);
        assert_eq!(first.title, second.title);
        // A no-op restore still refreshes updated_at
        assert!(second.updated_at >= task.updated_at);
    }
}

mod list_tests {
    use super::*;

    #[test]
    fn list_returns_insertion_order() {
        let db = setup_db();
        for title in ["a", "b", "c"] {
            db.create_task(new_task(title)).unwrap();
        }

        let tasks = db.list_tasks(0, 100, None).unwrap();

        let titles: Vec<&str> = tasks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["a", "b", "c"]);
    }

    #[test]
    fn pagination_partitions_without_overlap_or_gap() {
        let db = setup_db();
        let mut all_ids = Vec::new();
        for i in 0..5 {
            all_ids.push(db.create_task(new_task(&format!("task {}", i))).unwrap().id);
        }

        let mut paged = Vec::new();
        for skip in [0, 2, 4] {
            for task in db.list_tasks(skip, 2, None).unwrap() {
                paged.push(task.id);
            }
        }

        assert_eq!(paged, all_ids);
    }

    #[test]
    fn status_filter_restricts_results() {
        let db = setup_db();
        let done = db.create_task(new_task("done")).unwrap();
        db.create_task(new_task("open")).unwrap();
        let changes = TaskChanges {
            status: Some(TaskStatus::Completed),
            ..Default::default()
        };
        db.update_task(done.id, changes).unwrap();

        let completed = db.list_tasks(0, 100, Some(TaskStatus::Completed)).unwrap();
        let pending = db.list_tasks(0, 100, Some(TaskStatus::Pending)).unwrap();

        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].id, done.id);
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].title, "open");
    }

    #[test]
    fn skip_past_end_returns_empty() {
        let db = setup_db();
        db.create_task(new_task("only one")).unwrap();

        assert!(db.list_tasks(10, 5, None).unwrap().is_empty());
    }
}
