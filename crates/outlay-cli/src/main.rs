//! Outlay CLI - Expense tracker
//!
//! Usage:
//!   outlay init --admin-email me@example.com     Initialize database
//!   outlay --as me@example.com expenses add ...  Record an expense
//!   outlay --as me@example.com expenses list     Filtered, paginated listing
//!   outlay --as me@example.com summary           Totals and breakdowns

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use outlay_core::models::ExpenseUpdate;
use outlay_core::{AuditField, AuditFilter, ExpenseField, ExpenseFilter, UserField, UserFilter};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = commands::load_config(cli.config.as_deref())?;

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > config level (default info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new(&config.log_level)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let db_path = cli.db.clone().unwrap_or_else(|| config.database_path.clone());
    let as_user = cli.as_user.as_deref();

    match cli.command {
        Commands::Init {
            admin_email,
            first_name,
            last_name,
        } => commands::cmd_init(
            &db_path,
            cli.no_encrypt,
            admin_email.as_deref(),
            &first_name,
            &last_name,
        ),
        Commands::Users { action } => {
            let db = commands::open_db(&db_path, cli.no_encrypt)?;
            commands::require_admin(&db, as_user)?;
            match action {
                None => commands::cmd_users_list(
                    &db,
                    &UserFilter::new(),
                    &commands::page_request(
                        &PageArgs::default(),
                        &config,
                        UserField::CreatedAt,
                    )?,
                    cli.json,
                ),
                Some(UsersAction::List {
                    search,
                    role,
                    active,
                    verified,
                    page,
                }) => {
                    let role_id = role
                        .as_deref()
                        .map(|r| commands::role_id(&db, r))
                        .transpose()?;
                    let filter = UserFilter::new()
                        .search(search.as_deref())
                        .role_id(role_id)
                        .is_active(active)
                        .is_verified(verified);
                    let request = commands::page_request(&page, &config, UserField::CreatedAt)?;
                    commands::cmd_users_list(&db, &filter, &request, cli.json)
                }
                Some(UsersAction::Add {
                    first_name,
                    last_name,
                    email,
                    role,
                }) => commands::cmd_users_add(&db, &first_name, &last_name, &email, &role),
                Some(UsersAction::Deactivate { id }) => commands::cmd_users_deactivate(&db, id),
            }
        }
        Commands::Categories { action } => {
            let db = commands::open_db(&db_path, cli.no_encrypt)?;
            match action {
                None | Some(CategoriesAction::List) => {
                    commands::cmd_categories_list(&db, cli.json)
                }
                Some(CategoriesAction::Add { name, description }) => {
                    commands::require_admin(&db, as_user)?;
                    commands::cmd_categories_add(&db, &name, description.as_deref())
                }
                Some(CategoriesAction::Delete { id }) => {
                    commands::require_admin(&db, as_user)?;
                    commands::cmd_categories_delete(&db, id)
                }
            }
        }
        Commands::Expenses { action } => {
            let db = commands::open_db(&db_path, cli.no_encrypt)?;
            let caller = commands::require_caller(&db, as_user)?;
            match action {
                None => {
                    let request = commands::page_request(
                        &PageArgs::default(),
                        &config,
                        ExpenseField::ExpenseDate,
                    )?;
                    commands::cmd_expenses_list(
                        &db,
                        &caller,
                        &ExpenseFilter::new(),
                        &request,
                        cli.json,
                    )
                }
                Some(ExpensesAction::List {
                    user,
                    category,
                    search,
                    from,
                    to,
                    min,
                    max,
                    page,
                }) => {
                    let filter = ExpenseFilter::new()
                        .user_id(user)
                        .category_id(category)
                        .search(search.as_deref())
                        .date_range(from, to)
                        .amount_range(min, max);
                    let request =
                        commands::page_request(&page, &config, ExpenseField::ExpenseDate)?;
                    commands::cmd_expenses_list(&db, &caller, &filter, &request, cli.json)
                }
                Some(ExpensesAction::Show { id }) => {
                    commands::cmd_expenses_show(&db, &caller, id, cli.json)
                }
                Some(ExpensesAction::Add {
                    title,
                    amount,
                    date,
                    category,
                    description,
                }) => commands::cmd_expenses_add(
                    &db,
                    &caller,
                    &commands::AddExpense {
                        title: &title,
                        amount,
                        date,
                        category,
                        description: description.as_deref(),
                    },
                    cli.json,
                ),
                Some(ExpensesAction::Update {
                    id,
                    title,
                    amount,
                    date,
                    category,
                    description,
                }) => commands::cmd_expenses_update(
                    &db,
                    &caller,
                    id,
                    &ExpenseUpdate {
                        title,
                        description,
                        amount,
                        expense_date: date,
                        category_id: category,
                    },
                    cli.json,
                ),
                Some(ExpensesAction::Delete { id }) => {
                    commands::cmd_expenses_delete(&db, &caller, id)
                }
            }
        }
        Commands::Summary => {
            let db = commands::open_db(&db_path, cli.no_encrypt)?;
            let caller = commands::require_caller(&db, as_user)?;
            commands::cmd_summary(&db, &caller, cli.json)
        }
        Commands::Audit {
            user,
            action,
            entity_type,
            since,
            until,
            page,
        } => {
            let db = commands::open_db(&db_path, cli.no_encrypt)?;
            commands::require_admin(&db, as_user)?;
            let filter = AuditFilter::new()
                .user_email(user.as_deref())
                .action(action.as_deref())
                .entity(entity_type.as_deref(), None)
                .time_range(
                    since.and_then(|d| d.and_hms_opt(0, 0, 0)),
                    until.and_then(|d| d.and_hms_opt(23, 59, 59)),
                );
            let request = commands::page_request(&page, &config, AuditField::Timestamp)?;
            commands::cmd_audit(&db, &filter, &request, cli.json)
        }
    }
}
