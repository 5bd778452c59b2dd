#![allow(dead_code)]

use branchdesk::db::Database;
use branchdesk::filter::FixedClock;
use chrono::{NaiveDate, NaiveDateTime};

pub fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// In-memory database whose clock reads noon on `today`.
pub fn db_on(today: &str) -> Database {
    Database::open_in_memory()
        .unwrap()
        .with_clock(FixedClock::on(d(today)))
}

/// In-memory database whose clock reads exactly `now` (`YYYY-MM-DD HH:MM:SS`).
pub fn db_at(now: &str) -> Database {
    let now = NaiveDateTime::parse_from_str(now, "%Y-%m-%d %H:%M:%S").unwrap();
    Database::open_in_memory().unwrap().with_clock(FixedClock(now))
}

pub fn insert_sale(db: &Database, branch: i64, category: &str, amount: f64, date: &str) {
    db.conn
        .execute(
            "INSERT INTO sales_data (branch_id, category, amount, date) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![branch, category, amount, date],
        )
        .unwrap();
}

pub fn insert_corporate(db: &Database, branch: i64, kind: &str, amount: f64, date: &str) {
    db.conn
        .execute(
            "INSERT INTO branch_corporate (branch_id, type, amount, date) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![branch, kind, amount, date],
        )
        .unwrap();
}

pub fn insert_leads(db: &Database, branch: i64, sent: i64, date: &str) {
    db.conn
        .execute(
            "INSERT INTO leads (branch_id, leads_sent, date) VALUES (?1, ?2, ?3)",
            rusqlite::params![branch, sent, date],
        )
        .unwrap();
}
