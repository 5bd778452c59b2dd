use anyhow::Result;

use crate::db::models::Invoice;
use crate::db::{scope, Database, WhereClause};
use crate::filter::{Column, FilterRequest};

impl Database {
    /// Manually entered invoices, optionally scoped to a branch, newest first.
    /// `client` matches client names as a substring.
    pub fn manual_invoices(
        &self,
        branch: Option<i64>,
        client: Option<&str>,
        filter: &FilterRequest,
    ) -> Result<Vec<Invoice>> {
        let filter = filter
            .clone()
            .on(Column::from_static("date"))
            .contains(Column::from_static("client_name"), client.map(str::to_string));
        let clause = WhereClause::new(branch.and_then(|b| scope("branch_id", b)), &filter, self.today());

        let sql = format!(
            "SELECT client_name, invoice_number, date, amount, category
             FROM manual
             WHERE {}
             ORDER BY date DESC, id DESC",
            clause.sql
        );
        self.query_all(&sql, &clause.param_refs(), |row| {
            Ok(Invoice {
                client_name: row.get(0)?,
                invoice_number: row.get(1)?,
                date: row.get(2)?,
                amount: row.get(3)?,
                category: row.get(4)?,
            })
        })
    }
}
