//! Expense command implementations

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use outlay_core::models::{ExpenseRecord, ExpenseUpdate, NewExpense};
use outlay_core::{Caller, Database, ExpenseField, ExpenseFilter, Page, PageRequest};
use rust_decimal::Decimal;

use super::{print_json, truncate};

/// Flags for a new expense
pub struct AddExpense<'a> {
    pub title: &'a str,
    pub amount: Decimal,
    pub date: Option<NaiveDate>,
    pub category: Option<i64>,
    pub description: Option<&'a str>,
}

pub fn cmd_expenses_list(
    db: &Database,
    caller: &Caller,
    filter: &ExpenseFilter,
    request: &PageRequest<ExpenseField>,
    json: bool,
) -> Result<()> {
    let page = db.list_expenses(caller, filter, request)?;

    if json {
        return print_json(&page);
    }

    print_expense_page(&page, caller.is_admin());
    Ok(())
}

fn print_expense_page(page: &Page<ExpenseRecord>, show_owner: bool) {
    if page.content.is_empty() {
        println!("No expenses found ({} total).", page.total_elements);
        return;
    }

    println!();
    println!(
        "🧾 Expenses (page {} of {}, {} total)",
        page.page + 1,
        page.total_pages(),
        page.total_elements
    );
    println!("   ─────────────────────────────────────────────────────────────");

    for e in &page.content {
        let owner = if show_owner {
            format!(" │ {}", truncate(&e.user_email, 24))
        } else {
            String::new()
        };
        println!(
            "   [{:>4}] {} │ {:>10} │ {:<14} │ {}{}",
            e.id,
            e.expense_date,
            format!("${}", e.amount),
            truncate(e.category_label(), 14),
            truncate(&e.title, 32),
            owner
        );
    }

    if !page.is_last() {
        println!();
        println!("   More results: --page {}", page.page + 1);
    }
}

pub fn cmd_expenses_show(db: &Database, caller: &Caller, id: i64, json: bool) -> Result<()> {
    let expense = db
        .get_expense_for(caller, id)
        .with_context(|| format!("Cannot show expense {}", id))?;

    if json {
        return print_json(&expense);
    }

    println!();
    println!("🧾 Expense #{}", expense.id);
    println!("   Title:       {}", expense.title);
    if let Some(ref description) = expense.description {
        println!("   Description: {}", description);
    }
    println!("   Amount:      ${}", expense.amount);
    println!("   Date:        {}", expense.expense_date);
    println!("   Category:    {}", expense.category_label());
    println!("   Owner:       {} <{}>", expense.user_name, expense.user_email);
    println!(
        "   Created:     {}",
        expense.created_at.format("%Y-%m-%d %H:%M:%S")
    );
    println!(
        "   Updated:     {}",
        expense.updated_at.format("%Y-%m-%d %H:%M:%S")
    );
    Ok(())
}

pub fn cmd_expenses_add(
    db: &Database,
    caller: &Caller,
    args: &AddExpense<'_>,
    json: bool,
) -> Result<()> {
    let expense = db
        .create_expense(
            caller,
            &NewExpense {
                title: args.title.to_string(),
                description: args.description.map(str::to_string),
                amount: args.amount,
                expense_date: args.date.unwrap_or_else(|| Utc::now().date_naive()),
                category_id: args.category,
            },
        )
        .context("Failed to record expense")?;

    if json {
        return print_json(&expense);
    }

    println!(
        "✅ Recorded expense #{}: {} ${} ({})",
        expense.id,
        expense.title,
        expense.amount,
        expense.category_label()
    );
    Ok(())
}

pub fn cmd_expenses_update(
    db: &Database,
    caller: &Caller,
    id: i64,
    update: &ExpenseUpdate,
    json: bool,
) -> Result<()> {
    let expense = db
        .update_expense(caller, id, update)
        .with_context(|| format!("Failed to update expense {}", id))?;

    if json {
        return print_json(&expense);
    }

    println!(
        "✅ Updated expense #{}: {} ${} ({})",
        expense.id,
        expense.title,
        expense.amount,
        expense.category_label()
    );
    Ok(())
}

pub fn cmd_expenses_delete(db: &Database, caller: &Caller, id: i64) -> Result<()> {
    db.delete_expense(caller, id)
        .with_context(|| format!("Failed to delete expense {}", id))?;
    println!("🗑️  Deleted expense #{}", id);
    Ok(())
}
