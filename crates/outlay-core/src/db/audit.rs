//! Audit log operations

use rusqlite::{params, Connection, Row};

use super::query::{fetch_page, Source};
use super::{parse_datetime, Database};
use crate::error::Result;
use crate::filter::{AuditField, AuditFilter, Page, PageRequest, Sort, SortDirection};
use crate::models::{AuditAction, AuditEntry};

const AUDIT_SOURCE: Source<AuditField> = Source {
    columns: "a.id, a.timestamp, a.user_email, a.action, a.entity_type, a.entity_id, \
              a.details, a.success, a.error_message",
    from: "audit_log a",
    id: AuditField::Id,
};

/// Write an audit entry on an existing connection
pub(crate) fn insert_audit(
    conn: &Connection,
    user_email: &str,
    action: AuditAction,
    entity_type: &str,
    entity_id: Option<i64>,
    details: Option<&str>,
) -> Result<i64> {
    conn.execute(
        r#"
        INSERT INTO audit_log (user_email, action, entity_type, entity_id, details)
        VALUES (?, ?, ?, ?, ?)
        "#,
        params![user_email, action.as_str(), entity_type, entity_id, details],
    )?;
    Ok(conn.last_insert_rowid())
}

fn row_to_audit_entry(row: &Row<'_>) -> rusqlite::Result<AuditEntry> {
    let timestamp: String = row.get(1)?;
    Ok(AuditEntry {
        id: row.get(0)?,
        timestamp: parse_datetime(&timestamp),
        user_email: row.get(2)?,
        action: row.get(3)?,
        entity_type: row.get(4)?,
        entity_id: row.get(5)?,
        details: row.get(6)?,
        success: row.get(7)?,
        error_message: row.get(8)?,
    })
}

impl Database {
    /// Log a failed action with its error message
    pub fn log_audit_failure(
        &self,
        user_email: &str,
        action: AuditAction,
        entity_type: &str,
        entity_id: Option<i64>,
        error_message: &str,
    ) -> Result<i64> {
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO audit_log (user_email, action, entity_type, entity_id, success, error_message)
            VALUES (?, ?, ?, ?, 0, ?)
            "#,
            params![user_email, action.as_str(), entity_type, entity_id, error_message],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Search the audit log; newest first unless the request sorts otherwise
    pub fn search_audit_log(
        &self,
        filter: &AuditFilter,
        request: &PageRequest<AuditField>,
    ) -> Result<Page<AuditEntry>> {
        let conn = self.conn()?;
        let request = if request.sort().is_empty() {
            request
                .clone()
                .sorted_by(Sort::new(AuditField::Timestamp, SortDirection::Desc))
        } else {
            request.clone()
        };
        fetch_page(
            &conn,
            &AUDIT_SOURCE,
            &filter.predicate(),
            &request,
            row_to_audit_entry,
        )
    }
}
