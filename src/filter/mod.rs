//! Query condition builder shared by every filtered report and list.
//!
//! A [`FilterRequest`] (period tag, optional custom range, optional field
//! filters) becomes a [`ConditionResult`]: one predicate for a `WHERE` clause
//! plus the values for its numbered `?N` placeholders. Building is pure; the
//! current date is passed in by the caller.

pub mod clock;
pub mod extra;
pub mod period;

use chrono::NaiveDate;
use regex::Regex;
use rusqlite::types::{ToSql, ToSqlOutput};
use serde::Serialize;
use std::borrow::Cow;
use std::fmt;
use std::sync::LazyLock;
use thiserror::Error;

pub use clock::{Clock, FixedClock, SystemClock};
pub use extra::{register_fold, FieldFilter, MatchMode, FOLD_FUNCTION};
pub use period::Period;

/// Column filtered on when the caller names none.
pub const DEFAULT_COLUMN: &str = "created_at";

/// Predicate used when nothing constrains the result set.
pub const MATCH_ALL: &str = "TRUE";

static IDENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)?$")
        .unwrap_or_else(|e| panic!("identifier pattern: {e}"))
});

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterError {
    #[error("invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("invalid column name '{0}'")]
    InvalidColumn(String),
}

/// A column reference that is safe to splice into SQL text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column(Cow<'static, str>);

impl Column {
    /// Validate a column name supplied at runtime (`name` or `alias.name`).
    pub fn new(name: &str) -> Result<Self, FilterError> {
        let name = name.trim();
        if IDENT_RE.is_match(name) {
            Ok(Column(Cow::Owned(name.to_string())))
        } else {
            Err(FilterError::InvalidColumn(name.to_string()))
        }
    }

    /// Column name fixed in the source.
    pub fn from_static(name: &'static str) -> Self {
        debug_assert!(IDENT_RE.is_match(name), "bad column literal: {name}");
        Column(Cow::Borrowed(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Column {
    fn default() -> Self {
        Column::from_static(DEFAULT_COLUMN)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A bound parameter value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Param {
    Date(NaiveDate),
    Text(String),
}

impl ToSql for Param {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self {
            Param::Date(d) => Ok(ToSqlOutput::from(d.format("%Y-%m-%d").to_string())),
            Param::Text(s) => Ok(ToSqlOutput::from(s.as_str())),
        }
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Param::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Param::Text(s) => f.write_str(s),
        }
    }
}

/// Everything needed to filter one query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterRequest {
    pub period: Period,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub column: Column,
    pub extra: Vec<FieldFilter>,
}

impl FilterRequest {
    pub fn new(period: Period) -> Self {
        FilterRequest {
            period,
            ..Default::default()
        }
    }

    /// Build from raw string parameters (query string or CLI flags).
    ///
    /// The period tag is permissive: anything unknown means no filter. Dates
    /// and the column name are validated, blank values count as absent.
    pub fn from_params(
        period: Option<&str>,
        start: Option<&str>,
        end: Option<&str>,
        column: Option<&str>,
    ) -> Result<Self, FilterError> {
        let column = match column.map(str::trim).filter(|c| !c.is_empty()) {
            Some(c) => Column::new(c)?,
            None => Column::default(),
        };
        Ok(FilterRequest {
            period: period.map(Period::from_tag).unwrap_or_default(),
            start: parse_date(start)?,
            end: parse_date(end)?,
            column,
            extra: Vec::new(),
        })
    }

    /// Filter on `column` instead of the default.
    pub fn on(mut self, column: Column) -> Self {
        self.column = column;
        self
    }

    pub fn between(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    pub fn exact(mut self, column: Column, value: Option<String>) -> Self {
        self.extra.push(FieldFilter::exact(column, value));
        self
    }

    pub fn contains(mut self, column: Column, value: Option<String>) -> Self {
        self.extra.push(FieldFilter::contains(column, value));
        self
    }
}

/// Parse an optional ISO date; blank counts as absent.
pub fn parse_date(value: Option<&str>) -> Result<Option<NaiveDate>, FilterError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => NaiveDate::parse_from_str(v, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| FilterError::InvalidDate(v.to_string())),
        None => Ok(None),
    }
}

/// A WHERE-clause predicate and its positional parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConditionResult {
    pub predicate: String,
    pub params: Vec<Param>,
}

impl ConditionResult {
    /// True when the predicate filters nothing.
    pub fn matches_all(&self) -> bool {
        self.predicate == MATCH_ALL
    }

    /// Parameters in the form rusqlite binds.
    pub fn sql_params(&self) -> Vec<&dyn ToSql> {
        self.params.iter().map(|p| p as &dyn ToSql).collect()
    }
}

/// Accumulates AND-able conditions and numbers their placeholders.
pub(crate) struct Conditions {
    parts: Vec<String>,
    params: Vec<Param>,
    first: usize,
}

impl Conditions {
    fn new(first: usize) -> Self {
        Conditions {
            parts: Vec::new(),
            params: Vec::new(),
            first,
        }
    }

    /// Record a value and return its placeholder.
    fn bind(&mut self, param: Param) -> String {
        let n = self.first + self.params.len();
        self.params.push(param);
        format!("?{n}")
    }

    fn push(&mut self, part: String) {
        self.parts.push(part);
    }

    fn finish(self) -> ConditionResult {
        let predicate = if self.parts.is_empty() {
            MATCH_ALL.to_string()
        } else {
            self.parts.join(" AND ")
        };
        ConditionResult {
            predicate,
            params: self.params,
        }
    }
}

/// Build the condition with placeholders numbered from `?1`.
pub fn build(request: &FilterRequest, today: NaiveDate) -> ConditionResult {
    build_from(request, today, 1)
}

/// Build the condition with placeholders numbered from `?first`, for queries
/// that bind their own parameters ahead of it.
pub fn build_from(request: &FilterRequest, today: NaiveDate, first: usize) -> ConditionResult {
    let mut conds = Conditions::new(first.max(1));
    period::resolve(
        &mut conds,
        request.period,
        request.column.as_str(),
        request.start,
        request.end,
        today,
    );
    extra::compose(&mut conds, &request.extra);
    conds.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn no_period_no_filters_matches_all() {
        let cond = build(&FilterRequest::default(), d("2024-03-17"));
        assert_eq!(cond.predicate, "TRUE");
        assert!(cond.params.is_empty());
        assert!(cond.matches_all());
    }

    #[test]
    fn bogus_period_equals_absent_period() {
        let today = d("2024-03-17");
        let bogus = FilterRequest::from_params(Some("bogus"), None, None, None).unwrap();
        let absent = FilterRequest::from_params(None, None, None, None).unwrap();
        assert_eq!(build(&bogus, today), build(&absent, today));
    }

    #[test]
    fn period_predicates_bind_the_anchor() {
        let today = d("2024-03-14");
        let col = Column::from_static("date");

        let cond = build(&FilterRequest::new(Period::Today).on(col.clone()), today);
        assert_eq!(cond.predicate, "date(date) = ?1");
        assert_eq!(cond.params, vec![Param::Date(today)]);

        let cond = build(&FilterRequest::new(Period::Week).on(col.clone()), today);
        assert_eq!(cond.predicate, "date(date) BETWEEN ?1 AND ?2");
        assert_eq!(cond.params, vec![Param::Date(d("2024-03-11")), Param::Date(d("2024-03-17"))]);

        let cond = build(&FilterRequest::new(Period::Month).on(col.clone()), today);
        assert_eq!(cond.predicate, "date(date, 'start of month') = ?1");
        assert_eq!(cond.params, vec![Param::Date(d("2024-03-01"))]);

        let cond = build(&FilterRequest::new(Period::Year).on(col), today);
        assert_eq!(cond.predicate, "strftime('%Y', date) = ?1");
        assert_eq!(cond.params, vec![Param::Text("2024".into())]);
    }

    #[test]
    fn custom_range_variants() {
        let today = d("2024-03-14");
        let req = |s: Option<&str>, e: Option<&str>| {
            FilterRequest::from_params(Some("custom"), s, e, None).unwrap()
        };

        let cond = build(&req(Some("2024-01-01"), Some("2024-01-31")), today);
        assert_eq!(cond.predicate, "date(created_at) BETWEEN ?1 AND ?2");
        assert_eq!(cond.params, vec![Param::Date(d("2024-01-01")), Param::Date(d("2024-01-31"))]);

        let cond = build(&req(Some("2024-01-01"), None), today);
        assert_eq!(cond.predicate, "date(created_at) >= ?1");

        let cond = build(&req(None, Some("2024-01-31")), today);
        assert_eq!(cond.predicate, "date(created_at) <= ?1");

        let cond = build(&req(None, Some("  ")), today);
        assert!(cond.matches_all());
    }

    #[test]
    fn explicit_dates_ignored_outside_custom() {
        let req = FilterRequest::from_params(Some("year"), Some("2001-01-01"), Some("2001-12-31"), None)
            .unwrap();
        let cond = build(&req, d("2024-03-14"));
        assert_eq!(cond.params, vec![Param::Text("2024".into())]);
    }

    #[test]
    fn extra_filters_continue_numbering() {
        let req = FilterRequest::new(Period::Week)
            .contains(Column::from_static("title"), Some("abc".into()))
            .exact(Column::from_static("status"), Some("  ".into()))
            .exact(Column::from_static("label"), Some(" Open ".into()));
        let cond = build_from(&req, d("2024-03-14"), 2);
        assert_eq!(
            cond.predicate,
            "date(created_at) BETWEEN ?2 AND ?3 AND fold(title) LIKE ?4 ESCAPE '\\' AND label = ?5"
        );
        assert_eq!(cond.params[2], Param::Text("%abc%".into()));
        assert_eq!(cond.params[3], Param::Text("Open".into()));
        assert_eq!(cond.params.len(), 4);
    }

    #[test]
    fn match_all_is_dropped_when_extras_apply() {
        let req = FilterRequest::default().exact(Column::from_static("status"), Some("done".into()));
        let cond = build(&req, d("2024-03-14"));
        assert_eq!(cond.predicate, "status = ?1");
    }

    #[test]
    fn build_is_deterministic() {
        let req = FilterRequest::new(Period::Custom)
            .between(Some(d("2024-01-01")), None)
            .contains(Column::from_static("title"), Some("x".into()));
        let today = d("2024-03-14");
        assert_eq!(build(&req, today), build(&req, today));
    }

    #[test]
    fn from_params_validates_dates_and_columns() {
        assert_eq!(
            FilterRequest::from_params(Some("custom"), Some("2024-13-01"), None, None),
            Err(FilterError::InvalidDate("2024-13-01".into()))
        );
        assert_eq!(
            FilterRequest::from_params(None, None, Some("'; DROP TABLE x; --"), None),
            Err(FilterError::InvalidDate("'; DROP TABLE x; --".into()))
        );
        assert_eq!(
            FilterRequest::from_params(None, None, None, Some("date) OR 1=1 --")),
            Err(FilterError::InvalidColumn("date) OR 1=1 --".into()))
        );
        let req = FilterRequest::from_params(None, None, None, Some("t.date")).unwrap();
        assert_eq!(req.column.as_str(), "t.date");
        let req = FilterRequest::from_params(None, None, None, Some("")).unwrap();
        assert_eq!(req.column.as_str(), DEFAULT_COLUMN);
    }
}
