//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;

/// Outlay - Track, filter and summarize expenses
#[derive(Parser)]
#[command(name = "outlay")]
#[command(about = "Expense tracker with filtered listings and spending summaries", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path (overrides the config file)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Config file (defaults to <config dir>/outlay/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Email of the user to act as
    #[arg(long = "as", value_name = "EMAIL", global = true)]
    pub as_user: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable database encryption (not recommended for production)
    ///
    /// By default, the database is encrypted using SQLCipher.
    /// Set OUTLAY_DB_KEY environment variable with your passphrase.
    /// Use --no-encrypt only for development or testing.
    #[arg(long, global = true)]
    pub no_encrypt: bool,

    /// Print results as JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database, optionally creating the first admin
    Init {
        /// Email for an initial admin account
        #[arg(long)]
        admin_email: Option<String>,

        /// Admin first name
        #[arg(long, default_value = "Admin")]
        first_name: String,

        /// Admin last name
        #[arg(long, default_value = "User")]
        last_name: String,
    },

    /// Manage users (admin only)
    Users {
        #[command(subcommand)]
        action: Option<UsersAction>,
    },

    /// Manage categories
    Categories {
        #[command(subcommand)]
        action: Option<CategoriesAction>,
    },

    /// List and manage expenses
    Expenses {
        #[command(subcommand)]
        action: Option<ExpensesAction>,
    },

    /// Spending summary for the acting user (all users for admins)
    Summary,

    /// Show the audit log (admin only)
    Audit {
        /// Only entries by this email
        #[arg(long)]
        user: Option<String>,

        /// Only this action (CREATE, UPDATE, DELETE)
        #[arg(long)]
        action: Option<String>,

        /// Only this entity type
        #[arg(long)]
        entity_type: Option<String>,

        /// Entries on or after this date
        #[arg(long)]
        since: Option<NaiveDate>,

        /// Entries on or before this date
        #[arg(long)]
        until: Option<NaiveDate>,

        #[command(flatten)]
        page: PageArgs,
    },
}

/// Page window and sort flags shared by listings
#[derive(Args, Debug, Clone)]
pub struct PageArgs {
    /// Zero-based page index
    #[arg(long, default_value = "0")]
    pub page: u32,

    /// Page size (defaults to the configured size)
    #[arg(long)]
    pub size: Option<u32>,

    /// Sort field
    #[arg(long)]
    pub sort: Option<String>,

    /// Sort direction: asc or desc
    #[arg(long, default_value = "desc")]
    pub order: String,
}

impl Default for PageArgs {
    fn default() -> Self {
        Self {
            page: 0,
            size: None,
            sort: None,
            order: "desc".to_string(),
        }
    }
}

#[derive(Subcommand)]
pub enum UsersAction {
    /// List users
    List {
        /// Search first name, last name and email
        #[arg(short, long)]
        search: Option<String>,

        /// Only users with this role (ADMIN or USER)
        #[arg(long)]
        role: Option<String>,

        /// Filter by active flag
        #[arg(long)]
        active: Option<bool>,

        /// Filter by verified flag
        #[arg(long)]
        verified: Option<bool>,

        #[command(flatten)]
        page: PageArgs,
    },

    /// Add a user
    Add {
        /// First name
        #[arg(long)]
        first_name: String,

        /// Last name
        #[arg(long)]
        last_name: String,

        /// Email (must be unique)
        #[arg(long)]
        email: String,

        /// Role: ADMIN or USER
        #[arg(long, default_value = "USER")]
        role: String,
    },

    /// Deactivate a user
    Deactivate {
        /// User ID
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum CategoriesAction {
    /// List categories
    List,

    /// Add a category (admin only)
    Add {
        /// Category name (must be unique)
        name: String,

        /// Description
        #[arg(short, long)]
        description: Option<String>,
    },

    /// Delete a category; its expenses become uncategorized (admin only)
    Delete {
        /// Category ID
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum ExpensesAction {
    /// List expenses visible to the acting user
    List {
        /// Only this user's expenses (ignored for non-admins)
        #[arg(long)]
        user: Option<i64>,

        /// Only this category
        #[arg(long)]
        category: Option<i64>,

        /// Search title and description
        #[arg(short, long)]
        search: Option<String>,

        /// Earliest expense date (inclusive)
        #[arg(long)]
        from: Option<NaiveDate>,

        /// Latest expense date (inclusive)
        #[arg(long)]
        to: Option<NaiveDate>,

        /// Minimum amount (inclusive)
        #[arg(long)]
        min: Option<Decimal>,

        /// Maximum amount (inclusive)
        #[arg(long)]
        max: Option<Decimal>,

        #[command(flatten)]
        page: PageArgs,
    },

    /// Show one expense
    Show {
        /// Expense ID
        id: i64,
    },

    /// Record an expense
    Add {
        /// Title
        #[arg(long)]
        title: String,

        /// Amount
        #[arg(long)]
        amount: Decimal,

        /// Expense date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Category ID
        #[arg(long)]
        category: Option<i64>,

        /// Description
        #[arg(short, long)]
        description: Option<String>,
    },

    /// Update an expense; omitting --category clears it
    Update {
        /// Expense ID
        id: i64,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        amount: Option<Decimal>,

        #[arg(long)]
        date: Option<NaiveDate>,

        #[arg(long)]
        category: Option<i64>,

        #[arg(short, long)]
        description: Option<String>,
    },

    /// Delete an expense
    Delete {
        /// Expense ID
        id: i64,
    },
}
