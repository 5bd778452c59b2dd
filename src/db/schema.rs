use anyhow::Result;
use rusqlite::Connection;

pub fn create_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        -- Version tracking
        CREATE TABLE IF NOT EXISTS desk_meta (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );

        -- Staff accounts; branch names double as task owners
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            branch TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE COLLATE NOCASE,
            role TEXT NOT NULL,
            branch_id INTEGER NOT NULL,
            created_on TEXT NOT NULL
        );

        -- Sales reporting
        CREATE TABLE IF NOT EXISTS branch_corporate (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            branch_id INTEGER NOT NULL,
            type TEXT NOT NULL,
            amount REAL NOT NULL DEFAULT 0,
            date TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS sales_data (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            branch_id INTEGER NOT NULL,
            category TEXT NOT NULL,
            amount REAL NOT NULL DEFAULT 0,
            date TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS sales_target (
            branch_id INTEGER NOT NULL,
            month TEXT NOT NULL,
            target_amount REAL NOT NULL,
            PRIMARY KEY (branch_id, month)
        );

        CREATE TABLE IF NOT EXISTS leads (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            branch_id INTEGER NOT NULL,
            leads_sent INTEGER NOT NULL DEFAULT 0,
            date TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS manual (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            branch_id INTEGER NOT NULL,
            client_name TEXT NOT NULL,
            invoice_number TEXT NOT NULL,
            date TEXT NOT NULL,
            amount REAL NOT NULL DEFAULT 0,
            category TEXT NOT NULL DEFAULT ''
        );

        -- Kanban board
        CREATE TABLE IF NOT EXISTS tasks (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            status TEXT NOT NULL,
            owner TEXT NOT NULL,
            start_date TEXT,
            due_date TEXT,
            label TEXT,
            color TEXT,
            branch_id INTEGER NOT NULL,
            created_at TEXT NOT NULL
        );

        -- Inter-branch inventory transfers
        CREATE TABLE IF NOT EXISTS transfers (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            item_code TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            quantity INTEGER NOT NULL DEFAULT 0,
            from_location TEXT NOT NULL,
            to_location TEXT NOT NULL,
            cost REAL NOT NULL DEFAULT 0,
            status TEXT NOT NULL,
            notes TEXT NOT NULL DEFAULT '',
            creation_date TEXT NOT NULL
        );

        -- Calendar
        CREATE TABLE IF NOT EXISTS events (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            starts_at TEXT NOT NULL,
            ends_at TEXT
        );

        -- Indexes for common filters
        CREATE INDEX IF NOT EXISTS idx_corporate_branch_date ON branch_corporate(branch_id, date);
        CREATE INDEX IF NOT EXISTS idx_sales_branch_date ON sales_data(branch_id, date);
        CREATE INDEX IF NOT EXISTS idx_leads_date ON leads(date);
        CREATE INDEX IF NOT EXISTS idx_manual_branch ON manual(branch_id);
        CREATE INDEX IF NOT EXISTS idx_events_start ON events(starts_at);
        ",
    )?;

    conn.execute(
        "INSERT OR REPLACE INTO desk_meta (key, value) VALUES ('schema_version', '1')",
        [],
    )?;

    Ok(())
}
