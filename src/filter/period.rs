use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

use super::{Conditions, Param};

/// Named time window a report or list is restricted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Today,
    /// Calendar week, Monday through Sunday.
    Week,
    Month,
    Year,
    /// Explicit start/end dates.
    Custom,
    #[default]
    None,
}

impl Period {
    /// Parse a period tag. Unknown tags mean no time filter at all.
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_lowercase().as_str() {
            "today" => Period::Today,
            "week" => Period::Week,
            "month" => Period::Month,
            "year" => Period::Year,
            "custom" => Period::Custom,
            _ => Period::None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Today => "today",
            Period::Week => "week",
            Period::Month => "month",
            Period::Year => "year",
            Period::Custom => "custom",
            Period::None => "none",
        }
    }
}

/// Monday and Sunday of the calendar week containing `day`.
pub fn week_bounds(day: NaiveDate) -> (NaiveDate, NaiveDate) {
    let offset = u64::from(day.weekday().num_days_from_monday());
    let monday = day.checked_sub_days(Days::new(offset)).unwrap_or(day);
    let sunday = monday.checked_add_days(Days::new(6)).unwrap_or(monday);
    (monday, sunday)
}

/// Push the period predicate for `column` onto `conds`.
/// Pushes nothing when the period does not constrain.
pub(super) fn resolve(
    conds: &mut Conditions,
    period: Period,
    column: &str,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    today: NaiveDate,
) {
    match period {
        Period::Today => {
            let p = conds.bind(Param::Date(today));
            conds.push(format!("date({column}) = {p}"));
        }
        Period::Week => {
            let (monday, sunday) = week_bounds(today);
            let lo = conds.bind(Param::Date(monday));
            let hi = conds.bind(Param::Date(sunday));
            conds.push(format!("date({column}) BETWEEN {lo} AND {hi}"));
        }
        Period::Month => {
            let first = today.with_day(1).unwrap_or(today);
            let p = conds.bind(Param::Date(first));
            conds.push(format!("date({column}, 'start of month') = {p}"));
        }
        Period::Year => {
            let p = conds.bind(Param::Text(format!("{:04}", today.year())));
            conds.push(format!("strftime('%Y', {column}) = {p}"));
        }
        Period::Custom => match (start, end) {
            (Some(start), Some(end)) => {
                let lo = conds.bind(Param::Date(start));
                let hi = conds.bind(Param::Date(end));
                conds.push(format!("date({column}) BETWEEN {lo} AND {hi}"));
            }
            (Some(start), None) => {
                let p = conds.bind(Param::Date(start));
                conds.push(format!("date({column}) >= {p}"));
            }
            (None, Some(end)) => {
                let p = conds.bind(Param::Date(end));
                conds.push(format!("date({column}) <= {p}"));
            }
            (None, None) => {}
        },
        Period::None => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn tags_are_case_insensitive_and_permissive() {
        assert_eq!(Period::from_tag("Week"), Period::Week);
        assert_eq!(Period::from_tag(" month "), Period::Month);
        assert_eq!(Period::from_tag("bogus"), Period::None);
        assert_eq!(Period::from_tag(""), Period::None);
    }

    #[test]
    fn week_runs_monday_to_sunday() {
        // 2024-03-17 is a Sunday
        assert_eq!(week_bounds(d("2024-03-17")), (d("2024-03-11"), d("2024-03-17")));
        assert_eq!(week_bounds(d("2024-03-11")), (d("2024-03-11"), d("2024-03-17")));
        // spans a month boundary
        assert_eq!(week_bounds(d("2024-03-01")), (d("2024-02-26"), d("2024-03-03")));
    }
}
