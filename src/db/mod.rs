pub mod migrations;
pub mod models;
pub mod schema;

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::types::ToSql;
use rusqlite::{Connection, Row};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::filter::clock::format_timestamp;
use crate::filter::{self, Clock, FilterRequest, SystemClock};
use models::*;

/// Tables reported by `stats`, in display order.
const STAT_TABLES: &[&str] = &[
    "users",
    "branch_corporate",
    "sales_data",
    "sales_target",
    "leads",
    "manual",
    "tasks",
    "transfers",
    "events",
    "posts",
    "stories",
    "comments",
];

/// Scope a query to `column = value`.
pub(crate) fn scope<T: ToSql + 'static>(column: &str, value: T) -> Option<(&str, Box<dyn ToSql>)> {
    let boxed: Box<dyn ToSql> = Box::new(value);
    Some((column, boxed))
}

/// A WHERE clause: an optional scope equality (`?1`) followed by a built
/// filter condition, with all parameters in placeholder order.
pub(crate) struct WhereClause {
    pub sql: String,
    pub params: Vec<Box<dyn ToSql>>,
}

impl WhereClause {
    pub fn new(
        scope: Option<(&str, Box<dyn ToSql>)>,
        filter: &FilterRequest,
        today: NaiveDate,
    ) -> Self {
        let mut parts: Vec<String> = Vec::new();
        let mut params: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some((column, value)) = scope {
            parts.push(format!("{column} = ?{}", params.len() + 1));
            params.push(value);
        }

        let cond = filter::build_from(filter, today, params.len() + 1);
        if parts.is_empty() || !cond.matches_all() {
            parts.push(cond.predicate);
        }
        for p in cond.params {
            params.push(Box::new(p));
        }

        WhereClause {
            sql: parts.join(" AND "),
            params,
        }
    }

    pub fn param_refs(&self) -> Vec<&dyn ToSql> {
        self.params.iter().map(|p| p.as_ref()).collect()
    }
}

/// The store handle. Opened once at startup and passed to every operation.
pub struct Database {
    pub conn: Connection,
    pub path: PathBuf,
    clock: Box<dyn Clock>,
}

impl Database {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;

        // Performance pragmas
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA foreign_keys = ON;
             PRAGMA cache_size = -64000;",
        )?;

        let db = Self::init(conn, path.to_path_buf())?;
        info!("Opened database: {}", path.display());
        Ok(db)
    }

    /// A private in-memory database with the full schema.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn, PathBuf::from(":memory:"))
    }

    fn init(conn: Connection, path: PathBuf) -> Result<Self> {
        filter::register_fold(&conn).context("Failed to register SQL functions")?;
        schema::create_schema(&conn)?;
        migrations::run_migrations(&conn)?;
        Ok(Database {
            conn,
            path,
            clock: Box::new(SystemClock),
        })
    }

    /// Replace the clock used for period filters and row timestamps.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Default database path: ~/.branchdesk/branchdesk.db
    pub fn default_db_path() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not determine home directory")?;
        Ok(home.join(".branchdesk").join("branchdesk.db"))
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn now(&self) -> NaiveDateTime {
        self.clock.now()
    }

    /// Current time, formatted for storage.
    pub fn now_string(&self) -> String {
        format_timestamp(self.clock.now())
    }

    /// Run `sql` with positional `params` and map every row.
    pub(crate) fn query_all<T, F>(&self, sql: &str, params: &[&dyn ToSql], map: F) -> Result<Vec<T>>
    where
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        debug!(params = params.len(), "{sql}");
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params, map)?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }

    /// Get database statistics.
    pub fn stats(&self) -> Result<DbStats> {
        let mut tables = Vec::new();
        for table in STAT_TABLES {
            let rows: i64 = self
                .conn
                .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0))?;
            tables.push(TableCount {
                table: table.to_string(),
                rows,
            });
        }

        let db_size_bytes = std::fs::metadata(&self.path)
            .map(|m| m.len())
            .unwrap_or(0);

        Ok(DbStats {
            tables,
            db_size_bytes,
        })
    }
}
