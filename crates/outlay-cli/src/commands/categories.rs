//! Category command implementations

use anyhow::{Context, Result};
use outlay_core::models::NewCategory;
use outlay_core::Database;

use super::print_json;

pub fn cmd_categories_list(db: &Database, json: bool) -> Result<()> {
    let categories = db.list_categories()?;

    if json {
        return print_json(&categories);
    }

    if categories.is_empty() {
        println!("No categories yet. Add one with:");
        println!("  outlay --as <admin email> categories add Food");
        return Ok(());
    }

    println!();
    println!("🏷️  Categories");
    println!("   ─────────────────────────────────────────────────────────────");
    for c in &categories {
        let status = if c.is_active { "" } else { " (inactive)" };
        match c.description {
            Some(ref d) => println!("   [{:>3}] {}{} - {}", c.id, c.name, status, d),
            None => println!("   [{:>3}] {}{}", c.id, c.name, status),
        }
    }
    Ok(())
}

pub fn cmd_categories_add(db: &Database, name: &str, description: Option<&str>) -> Result<()> {
    let category = db
        .create_category(&NewCategory {
            name: name.to_string(),
            description: description.map(str::to_string),
            is_active: true,
        })
        .context("Failed to add category")?;
    println!("✅ Added category {} (id {})", category.name, category.id);
    Ok(())
}

pub fn cmd_categories_delete(db: &Database, id: i64) -> Result<()> {
    db.delete_category(id)
        .with_context(|| format!("Failed to delete category {}", id))?;
    println!("🗑️  Deleted category {}; its expenses are now uncategorized", id);
    Ok(())
}
