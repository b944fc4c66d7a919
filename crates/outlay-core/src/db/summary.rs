//! Scoped aggregates and expense summaries

use tracing::debug;

use super::sql::{from_cents, Translate};
use super::Database;
use crate::error::Result;
use crate::filter::ExpenseFilter;
use crate::scope::Caller;
use crate::summary::{summarize, ExpenseSummary, ScalarTotals};

impl Database {
    /// Sum, count, average and extrema over every expense matching a filter
    pub fn expense_totals(&self, filter: &ExpenseFilter) -> Result<ScalarTotals> {
        let conn = self.conn()?;
        let sql_filter = filter.predicate().to_sql();
        let sql = format!(
            "SELECT SUM(e.amount_cents), COUNT(e.id), MAX(e.amount_cents), MIN(e.amount_cents) \
             FROM expenses e {}",
            sql_filter.where_clause
        );

        let params = sql_filter.params_refs();
        let (sum, count, max, min): (Option<i64>, i64, Option<i64>, Option<i64>) =
            conn.query_row(&sql, params.as_slice(), |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
            })?;

        Ok(ScalarTotals::from_parts(
            sum.map(from_cents),
            count,
            max.map(from_cents),
            min.map(from_cents),
        ))
    }

    /// Summary of the expenses the caller may see.
    ///
    /// Admins aggregate over every user and get a per-user breakdown;
    /// anyone else aggregates over their own expenses only.
    pub fn expense_summary(&self, caller: &Caller) -> Result<ExpenseSummary> {
        let filter = ExpenseFilter::new().user_id(caller.summary_user_id());
        debug!(
            caller = caller.user_id,
            role = %caller.role,
            scoped_to = ?filter.user_id,
            "Computing expense summary"
        );

        let totals = self.expense_totals(&filter)?;
        let records = self.find_all_expenses(&filter)?;
        Ok(summarize(caller.role, totals, &records))
    }
}
