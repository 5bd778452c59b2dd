//! Inter-branch inventory transfer requests.

use anyhow::Result;
use rusqlite::Row;
use tracing::info;

use crate::db::models::{NewTransfer, Transfer};
use crate::db::{Database, WhereClause};
use crate::error::DeskError;
use crate::filter::{Column, FilterRequest};

fn transfer_from_row(row: &Row<'_>) -> rusqlite::Result<Transfer> {
    Ok(Transfer {
        id: row.get(0)?,
        item_code: row.get(1)?,
        description: row.get(2)?,
        quantity: row.get(3)?,
        from_location: row.get(4)?,
        to_location: row.get(5)?,
        cost: row.get(6)?,
        status: row.get(7)?,
        notes: row.get(8)?,
        creation_date: row.get(9)?,
    })
}

fn validate(transfer: &NewTransfer) -> Result<(), DeskError> {
    if transfer.item_code.trim().is_empty() {
        return Err(DeskError::MissingField("item_code"));
    }
    if transfer.from_location.trim().is_empty() {
        return Err(DeskError::MissingField("from_location"));
    }
    if transfer.to_location.trim().is_empty() {
        return Err(DeskError::MissingField("to_location"));
    }
    if transfer.status.trim().is_empty() {
        return Err(DeskError::MissingField("status"));
    }
    Ok(())
}

impl Database {
    /// Transfers, newest first, optionally restricted to one status and to a
    /// period over `creation_date`.
    pub fn list_transfers(&self, status: Option<&str>, filter: &FilterRequest) -> Result<Vec<Transfer>> {
        let filter = filter
            .clone()
            .on(Column::from_static("creation_date"))
            .exact(Column::from_static("status"), status.map(str::to_string));
        let clause = WhereClause::new(None, &filter, self.today());

        let sql = format!(
            "SELECT id, item_code, description, quantity, from_location, to_location, cost, status, notes, creation_date
             FROM transfers
             WHERE {}
             ORDER BY id DESC",
            clause.sql
        );
        self.query_all(&sql, &clause.param_refs(), transfer_from_row)
    }

    /// Record a new transfer request dated today. Returns its id.
    pub fn create_transfer(&self, transfer: &NewTransfer) -> Result<i64> {
        validate(transfer)?;
        let creation_date = self.today().format("%Y-%m-%d").to_string();

        self.conn.execute(
            "INSERT INTO transfers
                (item_code, description, quantity, from_location, to_location, cost, status, notes, creation_date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            rusqlite::params![
                transfer.item_code.trim(),
                transfer.description,
                transfer.quantity,
                transfer.from_location.trim(),
                transfer.to_location.trim(),
                transfer.cost,
                transfer.status.trim(),
                transfer.notes,
                creation_date,
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        info!(
            "Created transfer {id}: {} x{} {} -> {}",
            transfer.item_code, transfer.quantity, transfer.from_location, transfer.to_location
        );
        Ok(id)
    }

    /// Replace a transfer's fields. Returns false if it doesn't exist.
    pub fn update_transfer(&self, id: i64, transfer: &NewTransfer) -> Result<bool> {
        validate(transfer)?;

        let changed = self.conn.execute(
            "UPDATE transfers SET
                item_code = ?1, description = ?2, quantity = ?3,
                from_location = ?4, to_location = ?5, cost = ?6,
                status = ?7, notes = ?8
             WHERE id = ?9",
            rusqlite::params![
                transfer.item_code.trim(),
                transfer.description,
                transfer.quantity,
                transfer.from_location.trim(),
                transfer.to_location.trim(),
                transfer.cost,
                transfer.status.trim(),
                transfer.notes,
                id,
            ],
        )?;
        Ok(changed > 0)
    }

    pub fn delete_transfer(&self, id: i64) -> Result<bool> {
        let deleted = self.conn.execute("DELETE FROM transfers WHERE id = ?1", [id])?;
        Ok(deleted > 0)
    }

    /// Branch names a transfer can go to, excluding the caller's own.
    pub fn transfer_branches(&self, exclude: Option<&str>) -> Result<Vec<String>> {
        self.query_all(
            "SELECT DISTINCT branch FROM users WHERE branch != ?1 ORDER BY branch",
            rusqlite::params![exclude.unwrap_or("")],
            |row| row.get(0),
        )
    }
}
