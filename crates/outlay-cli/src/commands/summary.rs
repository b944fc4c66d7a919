//! Summary command implementation

use anyhow::Result;
use outlay_core::{Caller, Database};

use super::{print_json, truncate};

pub fn cmd_summary(db: &Database, caller: &Caller, json: bool) -> Result<()> {
    let summary = db.expense_summary(caller)?;

    if json {
        return print_json(&summary);
    }

    println!();
    if caller.is_admin() {
        println!("📊 Spending Summary (all users)");
    } else {
        println!("📊 Spending Summary for {}", caller.email);
    }
    println!("   ─────────────────────────────────────────────────────────────");

    if summary.total_count == 0 {
        println!("   No expenses recorded yet.");
        return Ok(());
    }

    println!("   Total:   ${:.2} across {} expenses", summary.total_amount, summary.total_count);
    println!("   Average: ${:.2}", summary.average_amount);
    println!(
        "   Largest: ${:.2}   Smallest: ${:.2}",
        summary.max_amount, summary.min_amount
    );

    println!();
    println!(
        "   {:25} │ {:>10} │ {:>6} │ {:>5}",
        "Category", "Amount", "%", "Count"
    );
    println!("   ──────────────────────────┼────────────┼────────┼───────");
    for cat in &summary.category_breakdown {
        println!(
            "   {:25} │ {:>10} │ {:>5.1}% │ {:>5}",
            truncate(&cat.category_name, 25),
            format!("{:.2}", cat.total_amount),
            cat.percentage,
            cat.count
        );
    }

    println!();
    println!("   {:25} │ {:>10} │ {:>5}", "Month", "Amount", "Count");
    println!("   ──────────────────────────┼────────────┼───────");
    for month in &summary.monthly_breakdown {
        println!(
            "   {:25} │ {:>10} │ {:>5}",
            month.month,
            format!("{:.2}", month.total_amount),
            month.count
        );
    }

    if let Some(ref users) = summary.user_breakdown {
        println!();
        println!(
            "   {:25} │ {:>10} │ {:>6} │ {:>5}",
            "User", "Amount", "%", "Count"
        );
        println!("   ──────────────────────────┼────────────┼────────┼───────");
        for user in users {
            println!(
                "   {:25} │ {:>10} │ {:>5.1}% │ {:>5}",
                truncate(&user.user_email, 25),
                format!("{:.2}", user.total_amount),
                user.percentage,
                user.count
            );
        }
    }

    Ok(())
}
