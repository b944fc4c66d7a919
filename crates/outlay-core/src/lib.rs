//! Outlay Core Library
//!
//! Shared functionality for the outlay expense tracker:
//! - Predicate builder for expense, user and audit queries
//! - Paginated query execution with matching totals
//! - Access scope resolution for admin and regular callers
//! - Summary aggregation (totals, extrema, category/month/user breakdowns)
//! - SQLite store with connection pooling and optional encryption
//! - TOML configuration

pub mod config;
pub mod db;
pub mod error;
pub mod filter;
pub mod models;
pub mod scope;
pub mod summary;

/// Test fixtures (seeded roles, users, categories, expenses)
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use config::Config;
pub use db::Database;
pub use error::{Error, Result};
pub use filter::{
    AuditField, AuditFilter, Condition, ExpenseField, ExpenseFilter, Field, FieldSource,
    FieldValue, Page, PageRequest, Predicate, Sort, SortDirection, UserField, UserFilter,
};
pub use scope::Caller;
pub use summary::ExpenseSummary;
