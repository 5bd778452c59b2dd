//! Kanban task board.

use anyhow::Result;
use rusqlite::{OptionalExtension, Row};
use tracing::info;

use crate::db::models::{Branch, NewTask, Task};
use crate::db::{scope, Database, WhereClause};
use crate::error::DeskError;
use crate::filter::{Column, FilterRequest};

const TASK_COLUMNS: &str = "id, title, description, status, owner, start_date, due_date, label, color, branch_id, created_at";

/// Optional task filters. Text fields match as substrings, the rest exactly.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub title: Option<String>,
    pub description: Option<String>,
    pub label: Option<String>,
    pub status: Option<String>,
    pub start_date: Option<String>,
    pub due_date: Option<String>,
}

impl TaskFilter {
    /// Fold the field filters into `request`, which already carries the
    /// period on `created_at`.
    pub fn apply(&self, request: FilterRequest) -> FilterRequest {
        request
            .on(Column::from_static("created_at"))
            .contains(Column::from_static("title"), self.title.clone())
            .contains(Column::from_static("description"), self.description.clone())
            .contains(Column::from_static("label"), self.label.clone())
            .exact(Column::from_static("start_date"), self.start_date.clone())
            .exact(Column::from_static("due_date"), self.due_date.clone())
            .exact(Column::from_static("status"), self.status.clone())
    }
}

fn task_from_row(row: &Row<'_>) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        status: row.get(3)?,
        owner: row.get(4)?,
        start_date: row.get(5)?,
        due_date: row.get(6)?,
        label: row.get(7)?,
        color: row.get(8)?,
        branch_id: row.get(9)?,
        created_at: row.get(10)?,
    })
}

/// Empty optional fields are stored as NULL.
fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn validate(task: &NewTask) -> Result<i64, DeskError> {
    if task.title.trim().is_empty() {
        return Err(DeskError::MissingField("title"));
    }
    if task.status.trim().is_empty() {
        return Err(DeskError::MissingField("status"));
    }
    if task.owner.trim().is_empty() {
        return Err(DeskError::MissingField("owner"));
    }
    task.branch_id.ok_or(DeskError::MissingField("branch_id"))
}

impl Database {
    /// Create a task stamped with the current time.
    pub fn create_task(&self, task: &NewTask) -> Result<Task> {
        let branch_id = validate(task)?;
        let created_at = self.now_string();

        self.conn.execute(
            "INSERT INTO tasks (title, description, status, owner, start_date, due_date, label, color, branch_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            rusqlite::params![
                task.title.trim(),
                task.description,
                task.status.trim(),
                task.owner.trim(),
                non_blank(&task.start_date),
                non_blank(&task.due_date),
                non_blank(&task.label),
                non_blank(&task.color),
                branch_id,
                created_at,
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        info!("Created task {id}: {}", task.title);
        self.get_task(id)?
            .ok_or_else(|| DeskError::NotFound { kind: "task", id }.into())
    }

    pub fn get_task(&self, id: i64) -> Result<Option<Task>> {
        let task = self
            .conn
            .query_row(
                &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"),
                [id],
                task_from_row,
            )
            .optional()?;
        Ok(task)
    }

    /// Tasks of one owner (all owners when `None`), newest first.
    pub fn list_tasks(&self, owner: Option<&str>) -> Result<Vec<Task>> {
        self.filter_tasks(owner, &FilterRequest::default())
    }

    /// Tasks matching `filter`, scoped to `owner` when given, newest first.
    pub fn filter_tasks(&self, owner: Option<&str>, filter: &FilterRequest) -> Result<Vec<Task>> {
        let clause = WhereClause::new(
            owner.and_then(|o| scope("owner", o.to_string())),
            filter,
            self.today(),
        );

        let sql = format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE {} ORDER BY created_at DESC, id DESC",
            clause.sql
        );
        self.query_all(&sql, &clause.param_refs(), task_from_row)
    }

    /// Replace every editable field of a task. Returns `None` if it doesn't exist.
    pub fn update_task(&self, id: i64, task: &NewTask) -> Result<Option<Task>> {
        let branch_id = validate(task)?;

        let changed = self.conn.execute(
            "UPDATE tasks SET
                title = ?1,
                description = ?2,
                status = ?3,
                start_date = ?4,
                due_date = ?5,
                label = ?6,
                color = ?7,
                branch_id = ?8,
                owner = ?9
             WHERE id = ?10",
            rusqlite::params![
                task.title.trim(),
                task.description,
                task.status.trim(),
                non_blank(&task.start_date),
                non_blank(&task.due_date),
                non_blank(&task.label),
                non_blank(&task.color),
                branch_id,
                task.owner.trim(),
                id,
            ],
        )?;

        if changed == 0 {
            return Ok(None);
        }
        info!("Updated task {id}");
        self.get_task(id)
    }

    pub fn delete_task(&self, id: i64) -> Result<bool> {
        let deleted = self.conn.execute("DELETE FROM tasks WHERE id = ?1", [id])?;
        Ok(deleted > 0)
    }

    /// Distinct branches known from user accounts, by name.
    pub fn task_branches(&self) -> Result<Vec<Branch>> {
        self.query_all(
            "SELECT DISTINCT branch_id, branch FROM users ORDER BY branch, branch_id",
            rusqlite::params![],
            |row| {
                Ok(Branch {
                    branch_id: row.get(0)?,
                    branch_name: row.get(1)?,
                })
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{build, Period};
    use chrono::NaiveDate;

    #[test]
    fn task_filter_orders_conditions() {
        let filter = TaskFilter {
            title: Some("report".into()),
            status: Some("Open".into()),
            label: Some(" ".into()),
            ..Default::default()
        };
        let request = filter.apply(FilterRequest::new(Period::Today));
        let cond = build(&request, NaiveDate::from_ymd_opt(2024, 3, 14).unwrap());
        assert_eq!(
            cond.predicate,
            "date(created_at) = ?1 AND fold(title) LIKE ?2 ESCAPE '\\' AND status = ?3"
        );
    }

    #[test]
    fn validation_names_first_missing_field() {
        let task = NewTask {
            title: "Call supplier".into(),
            owner: "North".into(),
            branch_id: Some(1),
            ..Default::default()
        };
        assert!(matches!(validate(&task), Err(DeskError::MissingField("status"))));
    }
}
