//! Sales and lead reports for the branch dashboard.

use anyhow::Result;
use chrono::{Datelike, Days};
use rusqlite::OptionalExtension;
use tracing::info;

use crate::db::models::{DailyTotal, LeadCount, TargetProgress, Total};
use crate::db::{scope, Database, WhereClause};
use crate::filter::{Column, FilterRequest, Period};

impl Database {
    /// Corporate sales totals by type (`branch_corporate`).
    pub fn corporate_sales(&self, branch: Option<i64>, filter: &FilterRequest) -> Result<Vec<Total>> {
        self.totals_by("branch_corporate", "type", branch, filter)
    }

    /// Branch sales totals by category (`sales_data`).
    pub fn branch_sales(&self, branch: Option<i64>, filter: &FilterRequest) -> Result<Vec<Total>> {
        self.totals_by("sales_data", "category", branch, filter)
    }

    fn totals_by(
        &self,
        table: &str,
        key: &str,
        branch: Option<i64>,
        filter: &FilterRequest,
    ) -> Result<Vec<Total>> {
        let filter = filter.clone().on(Column::from_static("date"));
        let clause = WhereClause::new(branch.and_then(|b| scope("branch_id", b)), &filter, self.today());

        let sql = format!(
            "SELECT {key}, COALESCE(SUM(amount), 0)
             FROM {table}
             WHERE {}
             GROUP BY {key}
             ORDER BY {key}",
            clause.sql
        );

        self.query_all(&sql, &clause.param_refs(), |row| {
            Ok(Total {
                key: row.get(0)?,
                total: row.get(1)?,
            })
        })
    }

    /// Leads sent per branch.
    pub fn leads_by_branch(&self, filter: &FilterRequest) -> Result<Vec<LeadCount>> {
        let filter = filter.clone().on(Column::from_static("date"));
        let clause = WhereClause::new(None, &filter, self.today());

        let sql = format!(
            "SELECT branch_id, COALESCE(SUM(leads_sent), 0)
             FROM leads
             WHERE {}
             GROUP BY branch_id
             ORDER BY branch_id",
            clause.sql
        );

        self.query_all(&sql, &clause.param_refs(), |row| {
            Ok(LeadCount {
                branch_id: row.get(0)?,
                count: row.get(1)?,
            })
        })
    }

    /// Daily sales totals from `days` days ago through today.
    pub fn sales_trend(&self, branch: i64, days: u32) -> Result<Vec<DailyTotal>> {
        let today = self.today();
        // A window reaching past the earliest representable date has no lower bound.
        let since = today.checked_sub_days(Days::new(u64::from(days)));
        let filter = FilterRequest::new(Period::Custom)
            .on(Column::from_static("date"))
            .between(since, None);
        let clause = WhereClause::new(scope("branch_id", branch), &filter, today);

        let sql = format!(
            "SELECT date(date) AS sales_date, COALESCE(SUM(amount), 0)
             FROM sales_data
             WHERE {}
             GROUP BY sales_date
             ORDER BY sales_date",
            clause.sql
        );

        self.query_all(&sql, &clause.param_refs(), |row| {
            Ok(DailyTotal {
                sales_date: row.get(0)?,
                total: row.get(1)?,
            })
        })
    }

    /// This month's sales against the branch's target. Falls back to
    /// `default_target` when no target is stored for the month.
    pub fn target_progress(&self, branch: i64, default_target: f64) -> Result<TargetProgress> {
        let today = self.today();

        let sales = WhereClause::new(
            scope("branch_id", branch),
            &FilterRequest::new(Period::Month).on(Column::from_static("date")),
            today,
        );
        let total_sales: f64 = self.conn.query_row(
            &format!("SELECT COALESCE(SUM(amount), 0) FROM sales_data WHERE {}", sales.sql),
            sales.param_refs().as_slice(),
            |r| r.get(0),
        )?;

        let target = WhereClause::new(
            scope("branch_id", branch),
            &FilterRequest::new(Period::Month).on(Column::from_static("month")),
            today,
        );
        let target_amount: Option<f64> = self
            .conn
            .query_row(
                &format!(
                    "SELECT target_amount FROM sales_target WHERE {} ORDER BY month DESC LIMIT 1",
                    target.sql
                ),
                target.param_refs().as_slice(),
                |r| r.get(0),
            )
            .optional()?;

        Ok(TargetProgress {
            total_sales,
            target_amount: target_amount.unwrap_or(default_target),
        })
    }

    /// Set (or replace) the current month's sales target for a branch.
    pub fn set_sales_target(&self, branch: i64, amount: f64) -> Result<()> {
        let today = self.today();
        let month = today.with_day(1).unwrap_or(today).format("%Y-%m-%d").to_string();

        self.conn.execute(
            "INSERT INTO sales_target (branch_id, month, target_amount)
             VALUES (?1, ?2, ?3)
             ON CONFLICT (branch_id, month)
             DO UPDATE SET target_amount = excluded.target_amount",
            rusqlite::params![branch, month, amount],
        )?;

        info!("Set sales target for branch {branch} ({month}): {amount}");
        Ok(())
    }
}
