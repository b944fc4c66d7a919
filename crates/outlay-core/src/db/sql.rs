//! Predicate to SQL translation
//!
//! Turns a [`Predicate`] into a WHERE clause plus positional parameters, and
//! a sort list into an ORDER BY clause. Column names only ever come from
//! [`Field::column`], so user input never reaches the SQL text.

use rusqlite::functions::FunctionFlags;
use rusqlite::Connection;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::{Error, Result};
use crate::filter::{Condition, Field, FieldValue, Predicate, Sort, SortDirection};

/// SQL function folding text to Unicode lowercase; SQLite's LOWER() only folds ASCII
const FOLD_CASE_FN: &str = "fold_case";

/// Register the SQL functions the translated clauses rely on
pub(crate) fn register_functions(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        FOLD_CASE_FN,
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let text: Option<String> = ctx.get(0)?;
            Ok(text.map(|t| t.to_lowercase()))
        },
    )
}

/// Result of translating a predicate - WHERE clause and its parameters
pub struct SqlFilter {
    /// WHERE clause including "WHERE" keyword (empty if no conditions)
    pub where_clause: String,
    /// Parameters for the query (boxed for rusqlite compatibility)
    pub params: Vec<Box<dyn rusqlite::ToSql>>,
}

impl SqlFilter {
    /// Borrow the parameters in the form rusqlite expects
    pub fn params_refs(&self) -> Vec<&dyn rusqlite::ToSql> {
        self.params.iter().map(|p| p.as_ref()).collect()
    }
}

/// Translation of a store-agnostic value into SQL
pub trait Translate {
    fn to_sql(&self) -> SqlFilter;
}

impl<F: Field> Translate for Predicate<F> {
    fn to_sql(&self) -> SqlFilter {
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();
        let clauses: Vec<String> = self
            .conditions()
            .iter()
            .map(|c| condition_sql(c, &mut params))
            .collect();

        let where_clause = if clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", clauses.join(" AND "))
        };

        SqlFilter {
            where_clause,
            params,
        }
    }
}

/// Which side of a comparison a money value bounds
#[derive(Clone, Copy)]
enum Bound {
    Exact,
    Lower,
    Upper,
}

fn condition_sql<F: Field>(
    condition: &Condition<F>,
    params: &mut Vec<Box<dyn rusqlite::ToSql>>,
) -> String {
    match condition {
        Condition::Equals(field, value) => {
            params.push(bind(*field, value, Bound::Exact));
            format!("{} = ?", field.column())
        }
        Condition::Between(field, lo, hi) => {
            params.push(bind(*field, lo, Bound::Lower));
            params.push(bind(*field, hi, Bound::Upper));
            format!("{} BETWEEN ? AND ?", field.column())
        }
        Condition::AtLeast(field, lo) => {
            params.push(bind(*field, lo, Bound::Lower));
            format!("{} >= ?", field.column())
        }
        Condition::AtMost(field, hi) => {
            params.push(bind(*field, hi, Bound::Upper));
            format!("{} <= ?", field.column())
        }
        Condition::LikeCi(field, term) => {
            params.push(Box::new(like_pattern(term)));
            format!("{}({}) LIKE ? ESCAPE '\\'", FOLD_CASE_FN, field.column())
        }
        Condition::Or(alternatives) => {
            if alternatives.is_empty() {
                return "0".to_string();
            }
            let parts: Vec<String> = alternatives
                .iter()
                .map(|c| condition_sql(c, params))
                .collect();
            format!("({})", parts.join(" OR "))
        }
    }
}

fn bind<F: Field>(field: F, value: &FieldValue, bound: Bound) -> Box<dyn rusqlite::ToSql> {
    match value {
        FieldValue::Int(v) => Box::new(*v),
        FieldValue::Bool(v) => Box::new(*v),
        FieldValue::Text(v) => Box::new(v.clone()),
        FieldValue::Date(v) => Box::new(v.format("%Y-%m-%d").to_string()),
        FieldValue::Timestamp(v) => Box::new(v.format("%Y-%m-%d %H:%M:%S").to_string()),
        FieldValue::Money(v) if field.is_money() => Box::new(bound_cents(*v, bound)),
        FieldValue::Money(v) => Box::new(v.to_string()),
    }
}

/// Convert a money bound to cents, rounding inward so inclusive bounds stay exact
fn bound_cents(amount: Decimal, bound: Bound) -> i64 {
    let strategy = match bound {
        Bound::Exact => RoundingStrategy::MidpointAwayFromZero,
        Bound::Lower => RoundingStrategy::ToPositiveInfinity,
        Bound::Upper => RoundingStrategy::ToNegativeInfinity,
    };
    // An out-of-range bound still bounds every storable amount
    scale_to_cents(amount, strategy).unwrap_or(if amount.is_sign_negative() {
        i64::MIN
    } else {
        i64::MAX
    })
}

fn scale_to_cents(amount: Decimal, strategy: RoundingStrategy) -> Option<i64> {
    amount
        .checked_mul(Decimal::ONE_HUNDRED)
        .map(|v| v.round_dp_with_strategy(0, strategy))
        .and_then(|v| v.to_i64())
}

/// Stored representation of an amount: cents, rounded half-up.
/// Amounts whose cents do not fit in an i64 are rejected.
pub(crate) fn to_cents(amount: Decimal) -> Result<i64> {
    scale_to_cents(amount, RoundingStrategy::MidpointAwayFromZero)
        .ok_or_else(|| Error::InvalidData(format!("Amount out of range: {}", amount)))
}

/// Amount with two fractional digits from stored cents
pub(crate) fn from_cents(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

/// Unicode-lowercased LIKE pattern with wildcards in the term escaped
fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for ch in term.to_lowercase().chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

/// Build "ORDER BY ..." from sort keys, always ending on the id column
pub(crate) fn order_clause<F: Field>(sort: &[Sort<F>], id: F) -> String {
    let mut keys: Vec<String> = sort
        .iter()
        .map(|s| format!("{} {}", s.field.column(), s.direction.as_sql()))
        .collect();

    if !sort.iter().any(|s| s.field == id) {
        let direction = sort.first().map(|s| s.direction).unwrap_or(SortDirection::Asc);
        keys.push(format!("{} {}", id.column(), direction.as_sql()));
    }

    format!("ORDER BY {}", keys.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{ExpenseField, ExpenseFilter, UserField, UserFilter};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    #[test]
    fn test_empty_predicate_has_no_where() {
        let sql = ExpenseFilter::new().predicate().to_sql();
        assert!(sql.where_clause.is_empty());
        assert!(sql.params.is_empty());
    }

    #[test]
    fn test_full_expense_filter_sql() {
        let sql = ExpenseFilter::new()
            .user_id(Some(7))
            .category_id(Some(3))
            .search(Some("lunch"))
            .date_range(
                NaiveDate::from_ymd_opt(2024, 1, 1),
                NaiveDate::from_ymd_opt(2024, 1, 31),
            )
            .amount_range(Some(dec!(10)), None)
            .predicate()
            .to_sql();

        assert_eq!(
            sql.where_clause,
            "WHERE e.user_id = ? AND e.category_id = ? AND \
             (fold_case(e.title) LIKE ? ESCAPE '\\' OR fold_case(e.description) LIKE ? ESCAPE '\\') AND \
             e.expense_date BETWEEN ? AND ? AND e.amount_cents >= ?"
        );
        assert_eq!(sql.params.len(), 7);
    }

    #[test]
    fn test_user_flags_sql() {
        let sql = UserFilter::new()
            .role_id(Some(2))
            .is_active(Some(true))
            .predicate()
            .to_sql();
        assert_eq!(sql.where_clause, "WHERE u.role_id = ? AND u.is_active = ?");
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("Taxi"), "%taxi%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
        assert_eq!(like_pattern("CAFÉ"), "%café%");
    }

    #[test]
    fn test_money_bounds_round_inward() {
        assert_eq!(bound_cents(dec!(10.001), Bound::Lower), 1001);
        assert_eq!(bound_cents(dec!(10.009), Bound::Upper), 1000);
        assert_eq!(bound_cents(dec!(10.00), Bound::Lower), 1000);
        assert_eq!(bound_cents(dec!(10.00), Bound::Upper), 1000);
    }

    #[test]
    fn test_cents_conversion() {
        assert_eq!(to_cents(dec!(12.345)).unwrap(), 1235);
        assert_eq!(to_cents(dec!(-0.005)).unwrap(), -1);
        assert_eq!(from_cents(1999), dec!(19.99));
    }

    #[test]
    fn test_stored_amount_out_of_range_is_rejected() {
        assert!(matches!(
            to_cents(dec!(100000000000000000000.00)),
            Err(Error::InvalidData(_))
        ));
        assert!(matches!(to_cents(Decimal::MIN), Err(Error::InvalidData(_))));
        assert_eq!(to_cents(dec!(92233720368547758.07)).unwrap(), i64::MAX);
    }

    #[test]
    fn test_out_of_range_bounds_saturate() {
        assert_eq!(bound_cents(Decimal::MAX, Bound::Upper), i64::MAX);
        assert_eq!(bound_cents(Decimal::MIN, Bound::Lower), i64::MIN);
    }

    #[test]
    fn test_order_clause_tie_break() {
        assert_eq!(
            order_clause::<ExpenseField>(&[], ExpenseField::Id),
            "ORDER BY e.id ASC"
        );
        assert_eq!(
            order_clause(
                &[Sort::new(ExpenseField::ExpenseDate, SortDirection::Desc)],
                ExpenseField::Id
            ),
            "ORDER BY e.expense_date DESC, e.id DESC"
        );
        assert_eq!(
            order_clause(
                &[
                    Sort::new(UserField::LastName, SortDirection::Asc),
                    Sort::new(UserField::FirstName, SortDirection::Desc),
                ],
                UserField::Id
            ),
            "ORDER BY u.last_name ASC, u.first_name DESC, u.id ASC"
        );
    }

    #[test]
    fn test_sort_on_id_adds_no_duplicate() {
        assert_eq!(
            order_clause(
                &[Sort::new(ExpenseField::Id, SortDirection::Desc)],
                ExpenseField::Id
            ),
            "ORDER BY e.id DESC"
        );
    }
}
