//! Task CRUD operations, soft-delete aware.
//!
//! The five service operations run against the `tasks` table. Ordinary
//! reads (`get_task`, `list_tasks`, `update_task`) apply the visibility
//! rule: soft-deleted rows look absent. `delete_task` and `restore_task`
//! deliberately skip that filter so both are idempotent.

use super::{Database, now_ms};
use crate::types::{NewTask, Task, TaskChanges, TaskPriority, TaskStatus};
use anyhow::{Result, anyhow};
use rusqlite::{Connection, Row, params};

fn parse_task_row(row: &Row) -> rusqlite::Result<Task> {
    let status: String = row.get("status")?;
    let priority: String = row.get("priority")?;

    Ok(Task {
        id: row.get("id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        status: TaskStatus::from_str(&status).unwrap_or(TaskStatus::Pending),
        priority: TaskPriority::from_str(&priority).unwrap_or_default(),
        due_date: row.get("due_date")?,
        is_deleted: row.get("is_deleted")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

/// Fetch a row by id using an existing connection, optionally applying the
/// soft-delete visibility filter.
fn get_task_internal(conn: &Connection, task_id: i64, visible_only: bool) -> Result<Option<Task>> {
    let sql = if visible_only {
        "SELECT * FROM tasks WHERE id = ?1 AND is_deleted = 0"
    } else {
        "SELECT * FROM tasks WHERE id = ?1"
    };
    let mut stmt = conn.prepare(sql)?;

    match stmt.query_row(params![task_id], parse_task_row) {
        Ok(task) => Ok(Some(task)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

impl Database {
    /// Create a new task. Status is forced to pending and the soft-delete
    /// flag cleared regardless of caller input; created_at and updated_at
    /// are stamped to the same instant.
    pub fn create_task(&self, new: NewTask) -> Result<Task> {
        self.with_conn(|conn| {
            let now = now_ms();
            conn.execute(
                "INSERT INTO tasks (title, description, status, priority, due_date, is_deleted, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6, ?6)",
                params![
                    new.title,
                    new.description,
                    TaskStatus::Pending.as_str(),
                    new.priority.as_str(),
                    new.due_date,
                    now
                ],
            )?;
            let task_id = conn.last_insert_rowid();
            get_task_internal(conn, task_id, false)?
                .ok_or_else(|| anyhow!("task {} missing after insert", task_id))
        })
    }

    /// List visible tasks in insertion order with offset pagination and an
    /// optional status filter. Bounds on skip/limit are enforced by the
    /// endpoint layer before this call.
    pub fn list_tasks(
        &self,
        skip: i64,
        limit: i64,
        status: Option<TaskStatus>,
    ) -> Result<Vec<Task>> {
        self.with_conn(|conn| {
            let mut tasks = Vec::new();
            match status {
                Some(status) => {
                    let mut stmt = conn.prepare(
                        "SELECT * FROM tasks WHERE is_deleted = 0 AND status = ?1
                         ORDER BY id LIMIT ?2 OFFSET ?3",
                    )?;
                    let rows =
                        stmt.query_map(params![status.as_str(), limit, skip], parse_task_row)?;
                    for row in rows {
                        tasks.push(row?);
                    }
                }
                None => {
                    let mut stmt = conn.prepare(
                        "SELECT * FROM tasks WHERE is_deleted = 0
                         ORDER BY id LIMIT ?1 OFFSET ?2",
                    )?;
                    let rows = stmt.query_map(params![limit, skip], parse_task_row)?;
                    for row in rows {
                        tasks.push(row?);
                    }
                }
            }
            Ok(tasks)
        })
    }

    /// Fetch a visible task. A soft-deleted id is indistinguishable from a
    /// nonexistent one.
    pub fn get_task(&self, task_id: i64) -> Result<Option<Task>> {
        self.with_conn(|conn| get_task_internal(conn, task_id, true))
    }

    /// Apply the fields present in `changes` to a visible task and refresh
    /// updated_at. Returns None when the id is absent or soft-deleted.
    /// An empty change set returns the task untouched.
    pub fn update_task(&self, task_id: i64, changes: TaskChanges) -> Result<Option<Task>> {
        self.with_conn(|conn| {
            let Some(task) = get_task_internal(conn, task_id, true)? else {
                return Ok(None);
            };
            if changes.is_empty() {
                return Ok(Some(task));
            }

            let title = changes.title.unwrap_or(task.title);
            let description = changes.description.or(task.description);
            let status = changes.status.unwrap_or(task.status);
            let priority = changes.priority.unwrap_or(task.priority);
            let due_date = changes.due_date.or(task.due_date);

            conn.execute(
                "UPDATE tasks
                 SET title = ?1, description = ?2, status = ?3, priority = ?4,
                     due_date = ?5, updated_at = ?6
                 WHERE id = ?7",
                params![
                    title,
                    description,
                    status.as_str(),
                    priority.as_str(),
                    due_date,
                    now_ms(),
                    task_id
                ],
            )?;
            get_task_internal(conn, task_id, false)
        })
    }

    /// Soft-delete a task. The lookup skips the visibility filter, so
    /// deleting an already-deleted task reasserts the flag and still
    /// succeeds. Returns false only when no row with that id exists.
    pub fn delete_task(&self, task_id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let updated = conn.execute(
                "UPDATE tasks SET is_deleted = 1, updated_at = ?1 WHERE id = ?2",
                params![now_ms(), task_id],
            )?;
            Ok(updated > 0)
        })
    }

    /// Restore a soft-deleted task. The lookup skips the visibility filter,
    /// so restoring an already-active task is a no-op that still refreshes
    /// updated_at. Returns None when no row with that id exists.
    pub fn restore_task(&self, task_id: i64) -> Result<Option<Task>> {
        self.with_conn(|conn| {
            let updated = conn.execute(
                "UPDATE tasks SET is_deleted = 0, updated_at = ?1 WHERE id = ?2",
                params![now_ms(), task_id],
            )?;
            if updated == 0 {
                return Ok(None);
            }
            get_task_internal(conn, task_id, false)
        })
    }
}
