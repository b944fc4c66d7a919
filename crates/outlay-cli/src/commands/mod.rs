//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Init and shared utilities (open_db, config, caller resolution, paging)
//! - `expenses` - Expense commands (list, show, add, update, delete)
//! - `users` - User commands (list, add, deactivate)
//! - `categories` - Category commands (list, add, delete)
//! - `summary` - Spending summary
//! - `audit` - Audit log listing

pub mod audit;
pub mod categories;
pub mod core;
pub mod expenses;
pub mod summary;
pub mod users;

// Re-export command functions for main.rs
pub use audit::*;
pub use categories::*;
pub use core::*;
pub use expenses::*;
pub use summary::*;
pub use users::*;

use anyhow::Result;
use serde::Serialize;

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Pretty-print a value as JSON on stdout
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
