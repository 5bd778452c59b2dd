//! Conditions evaluated against real rows.

mod common;

use branchdesk::db::Database;
use branchdesk::filter::{build, build_from, Column, FilterRequest, Period};
use chrono::NaiveDate;
use common::d;

/// A scratch table of (id, created_at, title, status) rows.
fn rows(stamps: &[(&str, &str, &str)]) -> Database {
    let db = Database::open_in_memory().unwrap();
    db.conn
        .execute_batch(
            "CREATE TABLE items (
                id INTEGER PRIMARY KEY,
                created_at TEXT NOT NULL,
                title TEXT NOT NULL DEFAULT '',
                status TEXT NOT NULL DEFAULT ''
            );",
        )
        .unwrap();
    for (created_at, title, status) in stamps {
        db.conn
            .execute(
                "INSERT INTO items (created_at, title, status) VALUES (?1, ?2, ?3)",
                rusqlite::params![created_at, title, status],
            )
            .unwrap();
    }
    db
}

/// created_at values of the rows matching `request` on `today`.
fn matching(db: &Database, request: &FilterRequest, today: NaiveDate) -> Vec<String> {
    let cond = build(request, today);
    let sql = format!(
        "SELECT created_at FROM items WHERE {} ORDER BY id",
        cond.predicate
    );
    let mut stmt = db.conn.prepare(&sql).unwrap();
    let rows = stmt
        .query_map(cond.sql_params().as_slice(), |r| r.get::<_, String>(0))
        .unwrap();
    rows.collect::<Result<Vec<_>, _>>().unwrap()
}

#[test]
fn today_matches_same_calendar_day_only() {
    let db = rows(&[
        ("2024-03-14 00:00:01", "", ""),
        ("2024-03-14 23:59:59", "", ""),
        ("2024-03-13 23:59:59", "", ""),
    ]);
    let found = matching(&db, &FilterRequest::new(Period::Today), d("2024-03-14"));
    assert_eq!(found, vec!["2024-03-14 00:00:01", "2024-03-14 23:59:59"]);
}

#[test]
fn week_is_the_calendar_week_containing_today() {
    // Sunday 2024-03-17: 6 days back is Monday 03-11, 7 and 8 days back are
    // the previous Sunday and Saturday.
    let db = rows(&[
        ("2024-03-11 09:00:00", "", ""),
        ("2024-03-10 09:00:00", "", ""),
        ("2024-03-09 09:00:00", "", ""),
        ("2024-03-17 18:00:00", "", ""),
        ("2024-03-18 08:00:00", "", ""),
    ]);
    let found = matching(&db, &FilterRequest::new(Period::Week), d("2024-03-17"));
    assert_eq!(found, vec!["2024-03-11 09:00:00", "2024-03-17 18:00:00"]);
}

#[test]
fn month_and_year_use_calendar_boundaries() {
    let db = rows(&[
        ("2024-03-01", "", ""),
        ("2024-03-31 22:00:00", "", ""),
        ("2024-02-29", "", ""),
        ("2023-03-15", "", ""),
        ("2024-12-31", "", ""),
    ]);
    let today = d("2024-03-14");
    assert_eq!(
        matching(&db, &FilterRequest::new(Period::Month), today),
        vec!["2024-03-01", "2024-03-31 22:00:00"]
    );
    assert_eq!(
        matching(&db, &FilterRequest::new(Period::Year), today),
        vec!["2024-03-01", "2024-03-31 22:00:00", "2024-02-29", "2024-12-31"]
    );
}

#[test]
fn custom_range_is_inclusive_on_whole_days() {
    let db = rows(&[
        ("2023-12-31 23:59:59", "", ""),
        ("2024-01-01 00:00:00", "", ""),
        ("2024-01-15", "", ""),
        ("2024-01-31 23:30:00", "", ""),
        ("2024-02-01 00:00:00", "", ""),
    ]);
    let request = FilterRequest::from_params(Some("custom"), Some("2024-01-01"), Some("2024-01-31"), None)
        .unwrap();
    assert_eq!(
        matching(&db, &request, d("2024-06-01")),
        vec!["2024-01-01 00:00:00", "2024-01-15", "2024-01-31 23:30:00"]
    );
}

#[test]
fn custom_start_only_has_no_upper_bound() {
    let db = rows(&[("2023-12-31", "", ""), ("2024-01-01", "", ""), ("2030-01-01", "", "")]);
    let request = FilterRequest::from_params(Some("custom"), Some("2024-01-01"), None, None).unwrap();
    assert_eq!(
        matching(&db, &request, d("2024-06-01")),
        vec!["2024-01-01", "2030-01-01"]
    );
}

#[test]
fn bogus_and_absent_periods_match_everything() {
    let db = rows(&[("2001-01-01", "", ""), ("2024-03-14", "", "")]);
    let today = d("2024-03-14");
    let bogus = FilterRequest::from_params(Some("bogus"), None, None, None).unwrap();
    let absent = FilterRequest::from_params(None, None, None, None).unwrap();
    assert_eq!(matching(&db, &bogus, today), matching(&db, &absent, today));
    assert_eq!(matching(&db, &absent, today).len(), 2);
}

#[test]
fn blank_filter_equals_omitted_filter() {
    let db = rows(&[("2024-03-14", "Alpha", "Open"), ("2024-03-14", "Beta", "Done")]);
    let today = d("2024-03-14");
    let blank = FilterRequest::default().exact(Column::from_static("status"), Some("   ".into()));
    assert_eq!(matching(&db, &blank, today), matching(&db, &FilterRequest::default(), today));
}

#[test]
fn substring_match_ignores_case() {
    let db = rows(&[("2024-01-01", "xABCy", ""), ("2024-01-02", "xyz", "")]);
    let request = FilterRequest::default().contains(Column::from_static("title"), Some("abc".into()));
    assert_eq!(matching(&db, &request, d("2024-03-14")), vec!["2024-01-01"]);
}

#[test]
fn substring_match_ignores_case_beyond_ascii() {
    let db = rows(&[
        ("2024-01-01", "RÉSUMÉ final", ""),
        ("2024-01-02", "Straße", ""),
        ("2024-01-03", "resume", ""),
    ]);
    let today = d("2024-03-14");

    let lower = FilterRequest::default().contains(Column::from_static("title"), Some("résumé".into()));
    assert_eq!(matching(&db, &lower, today), vec!["2024-01-01"]);

    let upper = FilterRequest::default().contains(Column::from_static("title"), Some("STRASSE".into()));
    assert!(matching(&db, &upper, today).is_empty());

    let mixed = FilterRequest::default().contains(Column::from_static("title"), Some("STRAßE".into()));
    assert_eq!(matching(&db, &mixed, today), vec!["2024-01-02"]);
}

#[test]
fn exact_and_substring_differ_on_trailing_space() {
    let db = rows(&[("2024-01-01", "", "open ")]);
    let today = d("2024-03-14");
    let exact = FilterRequest::default().exact(Column::from_static("status"), Some("Open".into()));
    let contains = FilterRequest::default().contains(Column::from_static("status"), Some("Open".into()));
    assert!(matching(&db, &exact, today).is_empty());
    assert_eq!(matching(&db, &contains, today), vec!["2024-01-01"]);
}

#[test]
fn like_wildcards_in_values_match_literally() {
    let db = rows(&[("2024-01-01", "50% off", ""), ("2024-01-02", "500 off", "")]);
    let request = FilterRequest::default().contains(Column::from_static("title"), Some("50%".into()));
    assert_eq!(matching(&db, &request, d("2024-03-14")), vec!["2024-01-01"]);
}

#[test]
fn offset_numbering_binds_after_caller_params() {
    let db = rows(&[
        ("2024-03-14", "Alpha", "Open"),
        ("2024-03-14", "Alpha", "Done"),
        ("2024-03-01", "Alpha", "Open"),
    ]);
    let request = FilterRequest::new(Period::Today).exact(Column::from_static("status"), Some("Open".into()));
    let cond = build_from(&request, d("2024-03-14"), 2);

    let sql = format!("SELECT COUNT(*) FROM items WHERE title = ?1 AND {}", cond.predicate);
    let mut params: Vec<&dyn rusqlite::ToSql> = vec![&"Alpha"];
    params.extend(cond.sql_params());
    let count: i64 = db
        .conn
        .query_row(&sql, params.as_slice(), |r| r.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn same_input_same_output() {
    let request = FilterRequest::from_params(Some("custom"), Some("2024-01-01"), Some("2024-01-31"), Some("date"))
        .unwrap()
        .contains(Column::from_static("title"), Some("abc".into()));
    let today = d("2024-03-14");
    let a = build(&request, today);
    let b = build(&request, today);
    assert_eq!(a.predicate, b.predicate);
    assert_eq!(a.params, b.params);
}
