//! Expense filter builder
//!
//! Collects the optional filter tuple for expense listings and turns it into
//! a single [`Predicate`]. The same predicate drives both the page fetch and
//! the matching count, so the two can never disagree.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::condition::{Condition, Field, FieldSource, FieldValue, Predicate};
use crate::models::ExpenseRecord;

/// Filterable and sortable expense columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExpenseField {
    Id,
    UserId,
    CategoryId,
    Title,
    Description,
    Amount,
    ExpenseDate,
    CreatedAt,
    UpdatedAt,
}

impl Field for ExpenseField {
    fn column(self) -> &'static str {
        match self {
            Self::Id => "e.id",
            Self::UserId => "e.user_id",
            Self::CategoryId => "e.category_id",
            Self::Title => "e.title",
            Self::Description => "e.description",
            Self::Amount => "e.amount_cents",
            Self::ExpenseDate => "e.expense_date",
            Self::CreatedAt => "e.created_at",
            Self::UpdatedAt => "e.updated_at",
        }
    }

    fn is_money(self) -> bool {
        matches!(self, Self::Amount)
    }

    fn from_sort_key(key: &str) -> Option<Self> {
        match key {
            "id" => Some(Self::Id),
            "expenseDate" => Some(Self::ExpenseDate),
            "amount" => Some(Self::Amount),
            "title" => Some(Self::Title),
            "createdAt" => Some(Self::CreatedAt),
            "updatedAt" => Some(Self::UpdatedAt),
            _ => None,
        }
    }
}

impl FieldSource<ExpenseField> for ExpenseRecord {
    fn field_value(&self, field: ExpenseField) -> Option<FieldValue> {
        match field {
            ExpenseField::Id => Some(self.id.into()),
            ExpenseField::UserId => Some(self.user_id.into()),
            ExpenseField::CategoryId => self.category_id.map(FieldValue::from),
            ExpenseField::Title => Some(self.title.as_str().into()),
            ExpenseField::Description => self.description.as_deref().map(FieldValue::from),
            ExpenseField::Amount => Some(self.amount.into()),
            ExpenseField::ExpenseDate => Some(self.expense_date.into()),
            ExpenseField::CreatedAt => Some(self.created_at.naive_utc().into()),
            ExpenseField::UpdatedAt => Some(self.updated_at.naive_utc().into()),
        }
    }
}

/// Optional filter tuple for expense queries. Absent means unconstrained.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpenseFilter {
    pub user_id: Option<i64>,
    pub category_id: Option<i64>,
    pub search: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub min_amount: Option<Decimal>,
    pub max_amount: Option<Decimal>,
}

impl ExpenseFilter {
    /// Create a new filter builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set owning user filter
    pub fn user_id(mut self, id: Option<i64>) -> Self {
        self.user_id = id;
        self
    }

    /// Set category filter
    pub fn category_id(mut self, id: Option<i64>) -> Self {
        self.category_id = id;
        self
    }

    /// Set search term (title or description)
    pub fn search(mut self, term: Option<&str>) -> Self {
        self.search = term.map(str::to_string);
        self
    }

    /// Set inclusive expense date bounds
    pub fn date_range(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.start_date = start;
        self.end_date = end;
        self
    }

    /// Set inclusive amount bounds
    pub fn amount_range(mut self, min: Option<Decimal>, max: Option<Decimal>) -> Self {
        self.min_amount = min;
        self.max_amount = max;
        self
    }

    /// Compose the conjunction of every present dimension
    pub fn predicate(&self) -> Predicate<ExpenseField> {
        Predicate::new()
            .and(
                self.user_id
                    .map(|id| Condition::Equals(ExpenseField::UserId, id.into())),
            )
            .and(
                self.category_id
                    .map(|id| Condition::Equals(ExpenseField::CategoryId, id.into())),
            )
            .and(Condition::search(
                &[ExpenseField::Title, ExpenseField::Description],
                self.search.as_deref(),
            ))
            .and(Condition::range(
                ExpenseField::ExpenseDate,
                self.start_date.map(FieldValue::from),
                self.end_date.map(FieldValue::from),
            ))
            .and(Condition::range(
                ExpenseField::Amount,
                self.min_amount.map(FieldValue::from),
                self.max_amount.map(FieldValue::from),
            ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn expense(title: &str, description: Option<&str>, amount: Decimal) -> ExpenseRecord {
        ExpenseRecord {
            id: 1,
            expense_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            title: title.to_string(),
            description: description.map(str::to_string),
            amount,
            category_id: Some(3),
            category_name: Some("Food".to_string()),
            user_id: 7,
            user_email: "a@example.com".to_string(),
            user_name: "Ann Example".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_empty_filter_matches_all() {
        let predicate = ExpenseFilter::new().predicate();
        assert!(predicate.is_empty());
        assert!(predicate.matches(&expense("Lunch", None, dec!(10))));
    }

    #[test]
    fn test_absent_dimensions_add_no_conditions() {
        let predicate = ExpenseFilter::new()
            .user_id(Some(7))
            .search(Some("  "))
            .predicate();
        assert_eq!(predicate.len(), 1);
        assert_eq!(
            predicate.conditions()[0],
            Condition::Equals(ExpenseField::UserId, FieldValue::Int(7))
        );
    }

    #[test]
    fn test_full_filter_condition_order() {
        let predicate = ExpenseFilter::new()
            .user_id(Some(7))
            .category_id(Some(3))
            .search(Some("lunch"))
            .date_range(NaiveDate::from_ymd_opt(2024, 1, 1), None)
            .amount_range(None, Some(dec!(50)))
            .predicate();
        let conditions = predicate.conditions();
        assert_eq!(conditions.len(), 5);
        assert!(matches!(conditions[2], Condition::Or(ref alts) if alts.len() == 2));
        assert!(matches!(
            conditions[3],
            Condition::AtLeast(ExpenseField::ExpenseDate, _)
        ));
        assert!(matches!(conditions[4], Condition::AtMost(ExpenseField::Amount, _)));
    }

    #[test]
    fn test_search_matches_title_or_description() {
        let predicate = ExpenseFilter::new().search(Some("TAXI")).predicate();
        assert!(predicate.matches(&expense("Taxi home", None, dec!(20))));
        assert!(predicate.matches(&expense("Ride", Some("late taxi"), dec!(20))));
        assert!(!predicate.matches(&expense("Bus", Some("monthly pass"), dec!(20))));
    }

    #[test]
    fn test_amount_range_inclusive() {
        let predicate = ExpenseFilter::new()
            .amount_range(Some(dec!(20.00)), Some(dec!(30.00)))
            .predicate();
        assert!(predicate.matches(&expense("a", None, dec!(20.00))));
        assert!(predicate.matches(&expense("b", None, dec!(30.00))));
        assert!(!predicate.matches(&expense("c", None, dec!(30.01))));
    }

    #[test]
    fn test_sort_keys() {
        assert_eq!(
            ExpenseField::from_sort_key("expenseDate"),
            Some(ExpenseField::ExpenseDate)
        );
        assert_eq!(ExpenseField::from_sort_key("amount"), Some(ExpenseField::Amount));
        assert_eq!(ExpenseField::from_sort_key("user_id; DROP TABLE"), None);
    }
}
