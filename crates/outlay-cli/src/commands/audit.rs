//! Audit log command implementation

use anyhow::Result;
use outlay_core::{AuditField, AuditFilter, Database, PageRequest};

use super::{print_json, truncate};

pub fn cmd_audit(
    db: &Database,
    filter: &AuditFilter,
    request: &PageRequest<AuditField>,
    json: bool,
) -> Result<()> {
    let page = db.search_audit_log(filter, request)?;

    if json {
        return print_json(&page);
    }

    if page.content.is_empty() {
        println!("No audit entries found.");
        return Ok(());
    }

    println!();
    println!("📜 Audit Log ({} entries)", page.total_elements);
    println!("   ─────────────────────────────────────────────────────────────");

    for entry in &page.content {
        let target = match (&entry.entity_type, entry.entity_id) {
            (Some(t), Some(id)) => format!("{} #{}", t, id),
            (Some(t), None) => t.clone(),
            _ => String::new(),
        };
        let outcome = if entry.success {
            String::new()
        } else {
            format!(
                " \x1b[31mFAILED: {}\x1b[0m",
                entry.error_message.as_deref().unwrap_or("unknown")
            )
        };
        println!(
            "   {} │ {:<6} │ {:<14} │ {}{}",
            entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
            entry.action,
            target,
            truncate(&entry.user_email, 28),
            outcome
        );
    }

    Ok(())
}
