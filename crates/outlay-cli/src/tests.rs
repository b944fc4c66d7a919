//! CLI command tests
//!
//! This module contains all tests for the CLI commands.

use outlay_core::models::{ExpenseUpdate, RoleName};
use outlay_core::test_utils::{date_of, Fixture};
use outlay_core::{
    AuditField, AuditFilter, Config, ExpenseField, ExpenseFilter, SortDirection, UserField,
    UserFilter,
};
use rust_decimal_macros::dec;

use crate::cli::PageArgs;
use crate::commands::{self, truncate};

fn setup() -> Fixture {
    Fixture::new().with_alice_expenses()
}

fn first_page<F: outlay_core::Field>(default_sort: F) -> outlay_core::PageRequest<F> {
    commands::page_request(&PageArgs::default(), &Config::default(), default_sort).unwrap()
}

// ========== Caller Resolution Tests ==========

#[test]
fn test_require_caller_needs_as_flag() {
    let fx = setup();
    let result = commands::require_caller(&fx.db, None);
    assert!(result.is_err());
}

#[test]
fn test_require_caller_unknown_email() {
    let fx = setup();
    let result = commands::require_caller(&fx.db, Some("nobody@example.com"));
    assert!(result.is_err());
}

#[test]
fn test_require_caller_resolves_role() {
    let fx = setup();
    let caller = commands::require_caller(&fx.db, Some("ALICE@example.com")).unwrap();
    assert_eq!(caller.user_id, fx.alice.user_id);
    assert_eq!(caller.role, RoleName::User);
}

#[test]
fn test_require_admin() {
    let fx = setup();
    assert!(commands::require_admin(&fx.db, Some("admin@example.com")).is_ok());
    assert!(commands::require_admin(&fx.db, Some("alice@example.com")).is_err());
}

#[test]
fn test_require_caller_rejects_deactivated() {
    let fx = setup();
    commands::cmd_users_deactivate(&fx.db, fx.bob.user_id).unwrap();
    assert!(commands::require_caller(&fx.db, Some("bob@example.com")).is_err());
}

// ========== Paging Tests ==========

#[test]
fn test_page_request_defaults() {
    let request = first_page(ExpenseField::ExpenseDate);
    assert_eq!(request.page(), 0);
    assert_eq!(request.size(), 10);
    assert_eq!(request.sort().len(), 1);
    assert_eq!(request.sort()[0].field, ExpenseField::ExpenseDate);
    assert_eq!(request.sort()[0].direction, SortDirection::Desc);
}

#[test]
fn test_page_request_explicit_sort() {
    let args = PageArgs {
        page: 2,
        size: Some(5),
        sort: Some("amount".to_string()),
        order: "asc".to_string(),
    };
    let request = commands::page_request(&args, &Config::default(), ExpenseField::ExpenseDate)
        .unwrap();
    assert_eq!(request.page(), 2);
    assert_eq!(request.size(), 5);
    assert_eq!(request.sort()[0].field, ExpenseField::Amount);
    assert_eq!(request.sort()[0].direction, SortDirection::Asc);
}

#[test]
fn test_page_request_caps_size() {
    let args = PageArgs {
        size: Some(5000),
        ..PageArgs::default()
    };
    let request = commands::page_request(&args, &Config::default(), UserField::CreatedAt).unwrap();
    assert_eq!(request.size(), 100);
}

#[test]
fn test_page_request_rejects_zero_size() {
    let args = PageArgs {
        size: Some(0),
        ..PageArgs::default()
    };
    let result = commands::page_request(&args, &Config::default(), UserField::CreatedAt);
    assert!(result.is_err());
}

#[test]
fn test_page_request_unknown_sort() {
    let args = PageArgs {
        sort: Some("colour".to_string()),
        ..PageArgs::default()
    };
    let result = commands::page_request(&args, &Config::default(), ExpenseField::ExpenseDate);
    assert!(result.is_err());
}

// ========== Expenses Command Tests ==========

#[test]
fn test_cmd_expenses_list() {
    let fx = setup();
    let request = first_page(ExpenseField::ExpenseDate);
    let result =
        commands::cmd_expenses_list(&fx.db, &fx.alice, &ExpenseFilter::new(), &request, false);
    assert!(result.is_ok());
}

#[test]
fn test_cmd_expenses_list_json_as_admin() {
    let fx = setup();
    let request = first_page(ExpenseField::ExpenseDate);
    let filter = ExpenseFilter::new().user_id(Some(fx.alice.user_id));
    let result = commands::cmd_expenses_list(&fx.db, &fx.admin, &filter, &request, true);
    assert!(result.is_ok());
}

#[test]
fn test_cmd_expenses_list_empty() {
    let fx = setup();
    let request = first_page(ExpenseField::ExpenseDate);
    let result =
        commands::cmd_expenses_list(&fx.db, &fx.bob, &ExpenseFilter::new(), &request, false);
    assert!(result.is_ok());
}

#[test]
fn test_cmd_expenses_add_and_show() {
    let fx = setup();
    let result = commands::cmd_expenses_add(
        &fx.db,
        &fx.bob,
        &commands::AddExpense {
            title: "Bus pass",
            amount: dec!(45.00),
            date: Some(date_of("2024-03-01")),
            category: Some(fx.transport.id),
            description: Some("Monthly"),
        },
        false,
    );
    assert!(result.is_ok());

    let filter = ExpenseFilter::new().user_id(Some(fx.bob.user_id));
    let bobs = fx.db.find_all_expenses(&filter).unwrap();
    assert_eq!(bobs.len(), 1);
    assert_eq!(bobs[0].amount, dec!(45.00));
    assert_eq!(bobs[0].category_name.as_deref(), Some("Transport"));

    assert!(commands::cmd_expenses_show(&fx.db, &fx.bob, bobs[0].id, false).is_ok());
    assert!(commands::cmd_expenses_show(&fx.db, &fx.bob, bobs[0].id, true).is_ok());
}

#[test]
fn test_cmd_expenses_add_defaults_to_today() {
    let fx = setup();
    commands::cmd_expenses_add(
        &fx.db,
        &fx.bob,
        &commands::AddExpense {
            title: "Coffee",
            amount: dec!(3.50),
            date: None,
            category: None,
            description: None,
        },
        true,
    )
    .unwrap();

    let filter = ExpenseFilter::new().user_id(Some(fx.bob.user_id));
    let bobs = fx.db.find_all_expenses(&filter).unwrap();
    assert_eq!(bobs.len(), 1);
    assert_eq!(bobs[0].expense_date, chrono::Utc::now().date_naive());
}

#[test]
fn test_cmd_expenses_add_blank_title() {
    let fx = setup();
    let result = commands::cmd_expenses_add(
        &fx.db,
        &fx.bob,
        &commands::AddExpense {
            title: "   ",
            amount: dec!(1.00),
            date: None,
            category: None,
            description: None,
        },
        false,
    );
    assert!(result.is_err());
}

#[test]
fn test_cmd_expenses_show_other_users_expense() {
    let fx = setup();
    let alices = fx
        .db
        .find_all_expenses(&ExpenseFilter::new().user_id(Some(fx.alice.user_id)))
        .unwrap();
    let id = alices[0].id;

    assert!(commands::cmd_expenses_show(&fx.db, &fx.bob, id, false).is_err());
    assert!(commands::cmd_expenses_show(&fx.db, &fx.admin, id, false).is_ok());
}

#[test]
fn test_cmd_expenses_update() {
    let fx = setup();
    let expense = fx.expense(&fx.bob, "Lunch", dec!(12.00), "2024-04-02", Some(fx.food.id));

    let result = commands::cmd_expenses_update(
        &fx.db,
        &fx.bob,
        expense.id,
        &ExpenseUpdate {
            amount: Some(dec!(14.25)),
            category_id: Some(fx.food.id),
            ..ExpenseUpdate::default()
        },
        false,
    );
    assert!(result.is_ok());

    let updated = fx.db.get_expense(expense.id).unwrap().unwrap();
    assert_eq!(updated.amount, dec!(14.25));
    assert_eq!(updated.title, "Lunch");
    assert_eq!(updated.category_id, Some(fx.food.id));
}

#[test]
fn test_cmd_expenses_update_forbidden() {
    let fx = setup();
    let expense = fx.expense(&fx.alice, "Books", dec!(22.00), "2024-04-02", None);
    let result = commands::cmd_expenses_update(
        &fx.db,
        &fx.bob,
        expense.id,
        &ExpenseUpdate {
            title: Some("Mine now".to_string()),
            ..ExpenseUpdate::default()
        },
        true,
    );
    assert!(result.is_err());
    assert_eq!(fx.db.get_expense(expense.id).unwrap().unwrap().title, "Books");
}

#[test]
fn test_cmd_expenses_delete() {
    let fx = setup();
    let expense = fx.expense(&fx.bob, "Snack", dec!(2.00), "2024-04-02", None);

    assert!(commands::cmd_expenses_delete(&fx.db, &fx.alice, expense.id).is_err());
    assert!(commands::cmd_expenses_delete(&fx.db, &fx.bob, expense.id).is_ok());
    assert!(fx.db.get_expense(expense.id).unwrap().is_none());
    assert!(commands::cmd_expenses_delete(&fx.db, &fx.bob, expense.id).is_err());
}

// ========== Summary Command Tests ==========

#[test]
fn test_cmd_summary_user() {
    let fx = setup();
    assert!(commands::cmd_summary(&fx.db, &fx.alice, false).is_ok());
    assert!(commands::cmd_summary(&fx.db, &fx.alice, true).is_ok());
}

#[test]
fn test_cmd_summary_admin() {
    let fx = setup();
    fx.expense(&fx.bob, "Train", dec!(100.00), "2024-03-10", Some(fx.transport.id));
    assert!(commands::cmd_summary(&fx.db, &fx.admin, false).is_ok());
}

#[test]
fn test_cmd_summary_no_expenses() {
    let fx = setup();
    assert!(commands::cmd_summary(&fx.db, &fx.bob, false).is_ok());
}

// ========== Users Command Tests ==========

#[test]
fn test_cmd_users_list() {
    let fx = setup();
    let request = first_page(UserField::CreatedAt);
    assert!(commands::cmd_users_list(&fx.db, &UserFilter::new(), &request, false).is_ok());
    assert!(commands::cmd_users_list(&fx.db, &UserFilter::new(), &request, true).is_ok());
}

#[test]
fn test_cmd_users_add() {
    let fx = setup();
    let result = commands::cmd_users_add(&fx.db, "Cara", "Cole", "cara@example.com", "admin");
    assert!(result.is_ok());

    let user = fx.db.get_user_by_email("cara@example.com").unwrap().unwrap();
    assert_eq!(user.role, RoleName::Admin.as_str());
    assert!(user.is_active);
}

#[test]
fn test_cmd_users_add_duplicate_email() {
    let fx = setup();
    let result = commands::cmd_users_add(&fx.db, "Alice", "Again", "Alice@Example.com", "USER");
    assert!(result.is_err());
}

#[test]
fn test_cmd_users_add_bad_role() {
    let fx = setup();
    let result = commands::cmd_users_add(&fx.db, "Dan", "Doe", "dan@example.com", "OWNER");
    assert!(result.is_err());
}

#[test]
fn test_role_id() {
    let fx = setup();
    let admin_role = commands::role_id(&fx.db, "ADMIN").unwrap();
    let filter = UserFilter::new().role_id(Some(admin_role));
    let page = fx.db.search_users(&filter, &first_page(UserField::CreatedAt)).unwrap();
    assert_eq!(page.total_elements, 1);
    assert_eq!(page.content[0].email, "admin@example.com");
}

// ========== Categories Command Tests ==========

#[test]
fn test_cmd_categories_list() {
    let fx = setup();
    assert!(commands::cmd_categories_list(&fx.db, false).is_ok());
    assert!(commands::cmd_categories_list(&fx.db, true).is_ok());
}

#[test]
fn test_cmd_categories_add_and_delete() {
    let fx = setup();
    commands::cmd_categories_add(&fx.db, "Rent", Some("Housing")).unwrap();
    let rent = fx
        .db
        .list_categories()
        .unwrap()
        .into_iter()
        .find(|c| c.name == "Rent")
        .unwrap();
    assert_eq!(rent.description.as_deref(), Some("Housing"));

    assert!(commands::cmd_categories_add(&fx.db, "rent", None).is_err());
    assert!(commands::cmd_categories_delete(&fx.db, rent.id).is_ok());
    assert!(fx.db.get_category(rent.id).unwrap().is_none());
}

// ========== Audit Command Tests ==========

#[test]
fn test_cmd_audit() {
    let fx = setup();
    let request = first_page(AuditField::Timestamp);
    assert!(commands::cmd_audit(&fx.db, &AuditFilter::new(), &request, false).is_ok());

    let filter = AuditFilter::new().action(Some("CREATE"));
    assert!(commands::cmd_audit(&fx.db, &filter, &request, true).is_ok());
}

// ========== Init Command Tests ==========

#[test]
fn test_init_admin_creates_once() {
    let fx = Fixture::new();
    commands::init_admin(&fx.db, Some("root@example.com"), "Root", "User").unwrap();
    commands::init_admin(&fx.db, Some("root@example.com"), "Root", "User").unwrap();

    let root = fx.db.resolve_caller("root@example.com").unwrap();
    assert!(root.is_admin());
}

#[test]
fn test_init_admin_skipped_without_email() {
    let fx = Fixture::new();
    assert!(commands::init_admin(&fx.db, None, "Admin", "User").is_ok());
}

#[test]
fn test_cmd_init_unencrypted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("outlay.db");
    let result = commands::cmd_init(&path, true, Some("boss@example.com"), "Big", "Boss");
    assert!(result.is_ok());

    let db = commands::open_db(&path, true).unwrap();
    assert!(!db.is_encrypted());
    assert!(db.resolve_caller("boss@example.com").unwrap().is_admin());
}

// ========== Config Tests ==========

#[test]
fn test_load_config_explicit_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[pagination]\ndefault_page_size = 25\nmax_page_size = 50\n").unwrap();

    let config = commands::load_config(Some(&path)).unwrap();
    assert_eq!(config.default_page_size, 25);
    assert_eq!(config.page_size(Some(80)), 50);
}

#[test]
fn test_load_config_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");
    assert!(commands::load_config(Some(&path)).is_err());
}

// ========== Helper Tests ==========

#[test]
fn test_truncate() {
    assert_eq!(truncate("short", 10), "short");
    assert_eq!(truncate("a longer title here", 10), "a longe...");
    assert_eq!(truncate("café crème brûlée", 8), "café ...");
}
