//! Company calendar events.

use anyhow::Result;
use rusqlite::{OptionalExtension, Row};
use tracing::info;

use crate::db::models::{Event, NewEvent};
use crate::db::{Database, WhereClause};
use crate::error::DeskError;
use crate::filter::{Column, FilterRequest};
use crate::scope::require_role;

fn event_from_row(row: &Row<'_>) -> rusqlite::Result<Event> {
    Ok(Event {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        starts_at: row.get(3)?,
        ends_at: row.get(4)?,
    })
}

impl Database {
    /// Events in start order, optionally restricted to a period over `starts_at`.
    pub fn list_events(&self, filter: &FilterRequest) -> Result<Vec<Event>> {
        let filter = filter.clone().on(Column::from_static("starts_at"));
        let clause = WhereClause::new(None, &filter, self.today());

        let sql = format!(
            "SELECT id, title, description, starts_at, ends_at
             FROM events
             WHERE {}
             ORDER BY starts_at ASC, id ASC",
            clause.sql
        );
        self.query_all(&sql, &clause.param_refs(), event_from_row)
    }

    /// Add an event. Only `editor_role` may do so.
    pub fn add_event(&self, role: &str, editor_role: &str, event: &NewEvent) -> Result<Event> {
        require_role(role, editor_role, "add events")?;
        if event.title.trim().is_empty() {
            return Err(DeskError::MissingField("title").into());
        }
        if event.starts_at.trim().is_empty() {
            return Err(DeskError::MissingField("start").into());
        }

        self.conn.execute(
            "INSERT INTO events (title, description, starts_at, ends_at) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![
                event.title.trim(),
                event.description,
                event.starts_at.trim(),
                event.ends_at.as_deref().map(str::trim).filter(|e| !e.is_empty()),
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        info!("Added event {id}: {}", event.title);
        self.get_event(id)?
            .ok_or_else(|| DeskError::NotFound { kind: "event", id }.into())
    }

    pub fn get_event(&self, id: i64) -> Result<Option<Event>> {
        let event = self
            .conn
            .query_row(
                "SELECT id, title, description, starts_at, ends_at FROM events WHERE id = ?1",
                [id],
                event_from_row,
            )
            .optional()?;
        Ok(event)
    }

    /// Move an event to a new start. Returns `None` if it doesn't exist.
    pub fn reschedule_event(&self, id: i64, starts_at: &str) -> Result<Option<Event>> {
        let changed = self.conn.execute(
            "UPDATE events SET starts_at = ?1 WHERE id = ?2",
            rusqlite::params![starts_at.trim(), id],
        )?;
        if changed == 0 {
            return Ok(None);
        }
        info!("Rescheduled event {id} to {starts_at}");
        self.get_event(id)
    }
}
