//! User command implementations

use anyhow::{anyhow, Context, Result};
use outlay_core::models::{NewUser, RoleName};
use outlay_core::{Database, PageRequest, UserField, UserFilter};

use super::{print_json, truncate};

pub fn cmd_users_list(
    db: &Database,
    filter: &UserFilter,
    request: &PageRequest<UserField>,
    json: bool,
) -> Result<()> {
    let page = db.search_users(filter, request)?;

    if json {
        return print_json(&page);
    }

    if page.content.is_empty() {
        println!("No users found.");
        return Ok(());
    }

    println!();
    println!("👥 Users ({} total)", page.total_elements);
    println!("   ─────────────────────────────────────────────────────────────");

    for u in &page.content {
        let status = if u.is_active { "" } else { " (inactive)" };
        println!(
            "   [{:>3}] {:<24} │ {:<28} │ {:<5}{}",
            u.id,
            truncate(&u.full_name(), 24),
            truncate(&u.email, 28),
            u.role,
            status
        );
    }

    Ok(())
}

/// Resolve a role name flag to its id
pub fn role_id(db: &Database, role: &str) -> Result<i64> {
    let name: RoleName = role.parse().map_err(|e: String| anyhow!(e))?;
    Ok(db.get_role(name)?.id)
}

pub fn cmd_users_add(
    db: &Database,
    first_name: &str,
    last_name: &str,
    email: &str,
    role: &str,
) -> Result<()> {
    let role: RoleName = role.parse().map_err(|e: String| anyhow!(e))?;
    let user = db
        .create_user(&NewUser {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: email.to_string(),
            role,
            is_active: true,
            is_verified: false,
        })
        .context("Failed to add user")?;

    println!("✅ Added {} {} <{}> as {}", user.first_name, user.last_name, user.email, user.role);
    Ok(())
}

pub fn cmd_users_deactivate(db: &Database, id: i64) -> Result<()> {
    db.deactivate_user(id)
        .with_context(|| format!("Failed to deactivate user {}", id))?;
    println!("✅ Deactivated user {}", id);
    Ok(())
}
