//! Expense operations
//!
//! Listing goes through the shared page executor with user and category
//! joined in, so a page of records needs no further lookups. Single-record
//! access checks ownership against the caller before anything is returned
//! or changed.

use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use tracing::{info, warn};

use super::audit::insert_audit;
use super::query::{count, fetch_all, fetch_page, Source};
use super::sql::{from_cents, to_cents};
use super::{parse_datetime, Database};
use crate::error::{Error, Result};
use crate::filter::{ExpenseField, ExpenseFilter, Page, PageRequest, Sort, SortDirection};
use crate::models::{AuditAction, ExpenseRecord, ExpenseUpdate, NewExpense};
use crate::scope::Caller;

const ENTITY_TYPE: &str = "expense";

pub(crate) const EXPENSE_SOURCE: Source<ExpenseField> = Source {
    columns: "e.id, e.expense_date, e.title, e.description, e.amount_cents, \
              e.category_id, c.name, e.user_id, u.email, u.first_name || ' ' || u.last_name, \
              e.created_at, e.updated_at",
    from: "expenses e \
           JOIN users u ON u.id = e.user_id \
           LEFT JOIN categories c ON c.id = e.category_id",
    id: ExpenseField::Id,
};

pub(crate) fn row_to_expense(row: &Row<'_>) -> rusqlite::Result<ExpenseRecord> {
    let date_str: String = row.get(1)?;
    let created_at: String = row.get(10)?;
    let updated_at: String = row.get(11)?;
    Ok(ExpenseRecord {
        id: row.get(0)?,
        expense_date: chrono::NaiveDate::parse_from_str(&date_str, "%Y-%m-%d").unwrap_or_default(),
        title: row.get(2)?,
        description: row.get(3)?,
        amount: from_cents(row.get(4)?),
        category_id: row.get(5)?,
        category_name: row.get(6)?,
        user_id: row.get(7)?,
        user_email: row.get(8)?,
        user_name: row.get(9)?,
        created_at: parse_datetime(&created_at),
        updated_at: parse_datetime(&updated_at),
    })
}

/// Default listing order: most recent expense date first
fn with_default_sort(request: &PageRequest<ExpenseField>) -> PageRequest<ExpenseField> {
    if request.sort().is_empty() {
        request
            .clone()
            .sorted_by(Sort::new(ExpenseField::ExpenseDate, SortDirection::Desc))
    } else {
        request.clone()
    }
}

/// Look up a category id, dropping ids that do not exist
fn resolve_category(conn: &Connection, category_id: Option<i64>) -> Result<Option<i64>> {
    let Some(id) = category_id else {
        return Ok(None);
    };
    let found: Option<i64> = conn
        .query_row("SELECT id FROM categories WHERE id = ?", params![id], |row| {
            row.get(0)
        })
        .optional()?;
    if found.is_none() {
        warn!(category_id = id, "Unknown category, expense left uncategorized");
    }
    Ok(found)
}

fn find_expense(conn: &Connection, id: i64) -> Result<Option<ExpenseRecord>> {
    let sql = format!(
        "SELECT {} FROM {} WHERE e.id = ?",
        EXPENSE_SOURCE.columns, EXPENSE_SOURCE.from
    );
    Ok(conn.query_row(&sql, params![id], row_to_expense).optional()?)
}

/// Load an expense and check the caller may touch it: NotFound, then Forbidden
fn expense_for(conn: &Connection, caller: &Caller, id: i64) -> Result<ExpenseRecord> {
    let expense =
        find_expense(conn, id)?.ok_or_else(|| Error::NotFound(format!("Expense {}", id)))?;
    caller.ensure_can_access(expense.user_id)?;
    Ok(expense)
}

/// A write that touched no row means the expense is gone; nothing may be audited
pub(super) fn ensure_changed(changed: usize, id: i64) -> Result<()> {
    if changed == 0 {
        return Err(Error::NotFound(format!("Expense {}", id)));
    }
    Ok(())
}

fn require_title(title: &str) -> Result<&str> {
    let title = title.trim();
    if title.is_empty() {
        return Err(Error::InvalidData("Expense title must not be empty".to_string()));
    }
    Ok(title)
}

impl Database {
    /// Create an expense owned by the caller
    pub fn create_expense(&self, caller: &Caller, expense: &NewExpense) -> Result<ExpenseRecord> {
        let title = require_title(&expense.title)?;
        let amount_cents = to_cents(expense.amount)?;

        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let category_id = resolve_category(&tx, expense.category_id)?;

        tx.execute(
            r#"
            INSERT INTO expenses (user_id, category_id, title, description, amount_cents, expense_date)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
            params![
                caller.user_id,
                category_id,
                title,
                expense.description,
                amount_cents,
                expense.expense_date.format("%Y-%m-%d").to_string()
            ],
        )?;
        let id = tx.last_insert_rowid();

        let details = serde_json::json!({
            "title": title,
            "amount": from_cents(amount_cents).to_string(),
            "categoryId": category_id,
        })
        .to_string();
        insert_audit(
            &tx,
            &caller.email,
            AuditAction::Create,
            ENTITY_TYPE,
            Some(id),
            Some(&details),
        )?;
        tx.commit()?;

        info!(expense_id = id, user_id = caller.user_id, "Created expense");
        self.get_expense(id)?
            .ok_or_else(|| Error::NotFound(format!("Expense {}", id)))
    }

    /// Get an expense by ID without any access check
    pub fn get_expense(&self, id: i64) -> Result<Option<ExpenseRecord>> {
        let conn = self.conn()?;
        find_expense(&conn, id)
    }

    /// Get an expense the caller may see: NotFound first, then Forbidden
    pub fn get_expense_for(&self, caller: &Caller, id: i64) -> Result<ExpenseRecord> {
        let conn = self.conn()?;
        expense_for(&conn, caller, id)
    }

    /// Record a denied change in the audit log; other errors pass through
    fn reject_change(&self, caller: &Caller, action: AuditAction, id: i64, err: Error) -> Error {
        if let Error::Forbidden(ref msg) = err {
            warn!(expense_id = id, caller = caller.user_id, %action, "Access denied");
            if let Err(log_err) =
                self.log_audit_failure(&caller.email, action, ENTITY_TYPE, Some(id), msg)
            {
                return log_err;
            }
        }
        err
    }

    /// Apply a partial update.
    ///
    /// Present fields overwrite, absent fields are kept, except the category
    /// which is always re-resolved from `update.category_id`.
    pub fn update_expense(
        &self,
        caller: &Caller,
        id: i64,
        update: &ExpenseUpdate,
    ) -> Result<ExpenseRecord> {
        let new_title = update.title.as_deref().map(require_title).transpose()?;
        let new_cents = update.amount.map(to_cents).transpose()?;

        // The ownership check and the write share one write-locked transaction
        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let existing = match expense_for(&tx, caller, id) {
            Ok(expense) => expense,
            Err(err) => {
                drop(tx);
                return Err(self.reject_change(caller, AuditAction::Update, id, err));
            }
        };

        let title = new_title.map_or(existing.title, str::to_string);
        let description = update.description.clone().or(existing.description);
        let amount_cents = match new_cents {
            Some(cents) => cents,
            None => to_cents(existing.amount)?,
        };
        let expense_date = update.expense_date.unwrap_or(existing.expense_date);
        let category_id = resolve_category(&tx, update.category_id)?;

        let changed = tx.execute(
            r#"
            UPDATE expenses
            SET title = ?, description = ?, amount_cents = ?, expense_date = ?,
                category_id = ?, updated_at = CURRENT_TIMESTAMP
            WHERE id = ?
            "#,
            params![
                title,
                description,
                amount_cents,
                expense_date.format("%Y-%m-%d").to_string(),
                category_id,
                id
            ],
        )?;
        ensure_changed(changed, id)?;

        let details = serde_json::json!({
            "title": title,
            "amount": from_cents(amount_cents).to_string(),
            "categoryId": category_id,
        })
        .to_string();
        insert_audit(
            &tx,
            &caller.email,
            AuditAction::Update,
            ENTITY_TYPE,
            Some(id),
            Some(&details),
        )?;
        tx.commit()?;

        info!(expense_id = id, "Updated expense");
        self.get_expense(id)?
            .ok_or_else(|| Error::NotFound(format!("Expense {}", id)))
    }

    /// Delete an expense the caller owns (or any, for admins)
    pub fn delete_expense(&self, caller: &Caller, id: i64) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let existing = match expense_for(&tx, caller, id) {
            Ok(expense) => expense,
            Err(err) => {
                drop(tx);
                return Err(self.reject_change(caller, AuditAction::Delete, id, err));
            }
        };

        let changed = tx.execute("DELETE FROM expenses WHERE id = ?", params![id])?;
        ensure_changed(changed, id)?;

        let details = serde_json::json!({
            "title": existing.title,
            "owner": existing.user_email,
        })
        .to_string();
        insert_audit(
            &tx,
            &caller.email,
            AuditAction::Delete,
            ENTITY_TYPE,
            Some(id),
            Some(&details),
        )?;
        tx.commit()?;

        info!(expense_id = id, "Deleted expense");
        Ok(())
    }

    /// Run an expense filter as given, one page at a time
    pub fn search_expenses(
        &self,
        filter: &ExpenseFilter,
        request: &PageRequest<ExpenseField>,
    ) -> Result<Page<ExpenseRecord>> {
        let conn = self.conn()?;
        fetch_page(
            &conn,
            &EXPENSE_SOURCE,
            &filter.predicate(),
            &with_default_sort(request),
            row_to_expense,
        )
    }

    /// List expenses visible to the caller
    ///
    /// The filter is scoped before the predicate is built: non-admin callers
    /// only ever see their own expenses whatever `user_id` was requested.
    pub fn list_expenses(
        &self,
        caller: &Caller,
        filter: &ExpenseFilter,
        request: &PageRequest<ExpenseField>,
    ) -> Result<Page<ExpenseRecord>> {
        let scoped = caller.scope_expense_filter(filter.clone());
        self.search_expenses(&scoped, request)
    }

    /// Every expense matching a filter, most recent first
    pub fn find_all_expenses(&self, filter: &ExpenseFilter) -> Result<Vec<ExpenseRecord>> {
        let conn = self.conn()?;
        fetch_all(
            &conn,
            &EXPENSE_SOURCE,
            &filter.predicate(),
            &[Sort::new(ExpenseField::ExpenseDate, SortDirection::Desc)],
            row_to_expense,
        )
    }

    /// Count expenses matching a filter
    pub fn count_expenses(&self, filter: &ExpenseFilter) -> Result<i64> {
        let conn = self.conn()?;
        count(&conn, &EXPENSE_SOURCE, &filter.predicate())
    }
}
