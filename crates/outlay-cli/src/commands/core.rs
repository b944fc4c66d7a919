//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_db` - Shared utility to open the database
//! - `load_config` - Config file lookup
//! - `require_caller` / `require_admin` - Resolve the acting user from `--as`
//! - `page_request` - Build a page window from listing flags
//! - `cmd_init` - Initialize the database

use std::path::Path;

use anyhow::{bail, Context, Result};
use outlay_core::models::{NewUser, RoleName};
use outlay_core::{Caller, Config, Database, Field, PageRequest, Sort, SortDirection};

use crate::cli::PageArgs;

/// Open database with encryption by default, or unencrypted if --no-encrypt
pub fn open_db(db_path: &Path, no_encrypt: bool) -> Result<Database> {
    let path_str = db_path
        .to_str()
        .with_context(|| format!("Database path is not valid UTF-8: {}", db_path.display()))?;
    if no_encrypt {
        Database::new_unencrypted(path_str).context("Failed to open database (unencrypted)")
    } else {
        Database::new(path_str).context("Failed to open database")
    }
}

/// Load config from --config, the default location, or defaults
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    Config::load(path).context("Failed to load config")
}

/// Resolve `--as <email>` to a caller; authentication happens here, not in the core
pub fn require_caller(db: &Database, as_user: Option<&str>) -> Result<Caller> {
    let Some(email) = as_user else {
        bail!("This command needs an acting user: pass --as <email>");
    };
    let caller = db
        .resolve_caller(email)
        .with_context(|| format!("Authentication failed for {}", email))?;
    tracing::debug!("Acting as {} (user {}, {})", caller.email, caller.user_id, caller.role);
    Ok(caller)
}

/// Resolve the caller and insist on the admin role
pub fn require_admin(db: &Database, as_user: Option<&str>) -> Result<Caller> {
    let caller = require_caller(db, as_user)?;
    if !caller.is_admin() {
        bail!("Access denied: {} is not an admin", caller.email);
    }
    Ok(caller)
}

/// Page window from listing flags, sorted by `default_sort` when no --sort is given
pub fn page_request<F: Field>(
    args: &PageArgs,
    config: &Config,
    default_sort: F,
) -> Result<PageRequest<F>> {
    let request = PageRequest::new(args.page, config.page_size(args.size))?;
    let sort = match args.sort.as_deref() {
        Some(key) => Sort::parse(key, &args.order)?,
        None => Sort::new(default_sort, SortDirection::parse(&args.order)),
    };
    Ok(request.sorted_by(sort))
}

pub fn cmd_init(
    db_path: &Path,
    no_encrypt: bool,
    admin_email: Option<&str>,
    first_name: &str,
    last_name: &str,
) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    let db = open_db(db_path, no_encrypt)?;
    init_admin(&db, admin_email, first_name, last_name)?;

    if db.is_encrypted() {
        println!("   🔒 Encryption: ENABLED");
    } else {
        println!("   ⚠️  Encryption: DISABLED (--no-encrypt)");
    }

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Add a category: outlay --as <admin email> categories add Food");
    println!("  2. Record an expense: outlay --as <email> expenses add --title Lunch --amount 12.50");
    println!("  3. See where it went: outlay --as <email> summary");

    Ok(())
}

/// Create the first admin account if one was requested and does not exist yet
pub fn init_admin(
    db: &Database,
    admin_email: Option<&str>,
    first_name: &str,
    last_name: &str,
) -> Result<()> {
    let Some(email) = admin_email else {
        return Ok(());
    };
    if db.get_user_by_email(email)?.is_some() {
        tracing::warn!("Skipping admin bootstrap: {} already exists", email);
        println!("   Admin {} already exists", email);
        return Ok(());
    }

    let user = db
        .create_user(&NewUser {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: email.to_string(),
            role: RoleName::Admin,
            is_active: true,
            is_verified: true,
        })
        .context("Failed to create admin")?;
    println!("   Created admin {} (id {})", user.email, user.id);
    Ok(())
}
