//! Test utilities for outlay-core
//!
//! Seeded databases for unit, integration and CLI tests: an admin, two
//! regular users, two categories and helpers to add expenses.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::db::Database;
use crate::models::{Category, ExpenseRecord, NewCategory, NewExpense, NewUser, RoleName};
use crate::scope::Caller;

/// A throwaway database with a known cast of users and categories
pub struct Fixture {
    pub db: Database,
    pub admin: Caller,
    pub alice: Caller,
    pub bob: Caller,
    pub food: Category,
    pub transport: Category,
}

impl Fixture {
    /// Fresh database with users and categories, no expenses
    pub fn new() -> Self {
        let db = Database::in_memory().expect("create test database");

        let admin = add_user(&db, "Ada", "Admin", "admin@example.com", RoleName::Admin);
        let alice = add_user(&db, "Alice", "Archer", "alice@example.com", RoleName::User);
        let bob = add_user(&db, "Bob", "Baker", "bob@example.com", RoleName::User);

        let food = add_category(&db, "Food");
        let transport = add_category(&db, "Transport");

        Self {
            db,
            admin,
            alice,
            bob,
            food,
            transport,
        }
    }

    /// Add an expense owned by `owner`
    pub fn expense(
        &self,
        owner: &Caller,
        title: &str,
        amount: Decimal,
        date: &str,
        category_id: Option<i64>,
    ) -> ExpenseRecord {
        self.db
            .create_expense(
                owner,
                &NewExpense {
                    title: title.to_string(),
                    description: None,
                    amount,
                    expense_date: date_of(date),
                    category_id,
                },
            )
            .expect("create test expense")
    }

    /// Alice's three expenses: Food 50.00 and 30.00 in January, Transport
    /// 20.00 in February 2024
    pub fn with_alice_expenses(self) -> Self {
        self.expense(
            &self.alice,
            "Groceries",
            Decimal::new(5000, 2),
            "2024-01-15",
            Some(self.food.id),
        );
        self.expense(
            &self.alice,
            "Dinner out",
            Decimal::new(3000, 2),
            "2024-01-20",
            Some(self.food.id),
        );
        self.expense(
            &self.alice,
            "Taxi",
            Decimal::new(2000, 2),
            "2024-02-01",
            Some(self.transport.id),
        );
        self
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a "YYYY-MM-DD" literal
pub fn date_of(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("valid test date")
}

fn add_user(db: &Database, first: &str, last: &str, email: &str, role: RoleName) -> Caller {
    let user = db
        .create_user(&NewUser {
            first_name: first.to_string(),
            last_name: last.to_string(),
            email: email.to_string(),
            role,
            is_active: true,
            is_verified: true,
        })
        .expect("create test user");
    Caller::from_user(&user)
}

fn add_category(db: &Database, name: &str) -> Category {
    db.create_category(&NewCategory {
        name: name.to_string(),
        description: None,
        is_active: true,
    })
    .expect("create test category")
}
