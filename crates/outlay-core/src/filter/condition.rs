//! Typed condition terms and their conjunction
//!
//! A [`Predicate`] is an ordered list of [`Condition`]s combined with AND.
//! It carries no knowledge of SQL: the store translates it (see `db::sql`)
//! and [`Predicate::matches`] evaluates the same list in memory.

use std::cmp::Ordering;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

/// A filterable, sortable column of some record type
pub trait Field: Copy + Eq + fmt::Debug {
    /// Qualified SQL column for this field
    fn column(self) -> &'static str;

    /// Whether the store keeps this field as integer cents
    fn is_money(self) -> bool {
        false
    }

    /// Parse an API sort key ("expenseDate", "createdAt", ...) into a field
    fn from_sort_key(key: &str) -> Option<Self>;
}

/// A typed value a condition compares against
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Int(i64),
    Bool(bool),
    Text(String),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
    Money(Decimal),
}

impl FieldValue {
    /// Compare two values of the same kind; mismatched kinds are unordered
    pub fn compare(&self, other: &FieldValue) -> Option<Ordering> {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => Some(a.cmp(b)),
            (Self::Bool(a), Self::Bool(b)) => Some(a.cmp(b)),
            (Self::Text(a), Self::Text(b)) => Some(a.cmp(b)),
            (Self::Date(a), Self::Date(b)) => Some(a.cmp(b)),
            (Self::Timestamp(a), Self::Timestamp(b)) => Some(a.cmp(b)),
            (Self::Money(a), Self::Money(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(v: NaiveDate) -> Self {
        Self::Date(v)
    }
}

impl From<NaiveDateTime> for FieldValue {
    fn from(v: NaiveDateTime) -> Self {
        Self::Timestamp(v)
    }
}

impl From<Decimal> for FieldValue {
    fn from(v: Decimal) -> Self {
        Self::Money(v)
    }
}

/// A single constraint on one field (or a disjunction of constraints)
#[derive(Debug, Clone, PartialEq)]
pub enum Condition<F> {
    /// Exact equality
    Equals(F, FieldValue),
    /// Inclusive on both ends
    Between(F, FieldValue, FieldValue),
    /// Inclusive lower bound
    AtLeast(F, FieldValue),
    /// Inclusive upper bound
    AtMost(F, FieldValue),
    /// Case-insensitive substring match; the term is already trimmed
    LikeCi(F, String),
    /// At least one of the inner conditions holds
    Or(Vec<Condition<F>>),
}

impl<F: Field> Condition<F> {
    /// Build the range condition for optional inclusive bounds.
    ///
    /// Both bounds give `Between`, one bound gives `AtLeast`/`AtMost`,
    /// no bounds give no condition at all.
    pub fn range(field: F, lower: Option<FieldValue>, upper: Option<FieldValue>) -> Option<Self> {
        match (lower, upper) {
            (Some(lo), Some(hi)) => Some(Self::Between(field, lo, hi)),
            (Some(lo), None) => Some(Self::AtLeast(field, lo)),
            (None, Some(hi)) => Some(Self::AtMost(field, hi)),
            (None, None) => None,
        }
    }

    /// Substring search over several fields, or nothing for a blank term
    pub fn search(fields: &[F], term: Option<&str>) -> Option<Self> {
        let term = term.map(str::trim).filter(|t| !t.is_empty())?;
        let alternatives = fields
            .iter()
            .map(|f| Self::LikeCi(*f, term.to_string()))
            .collect();
        Some(Self::Or(alternatives))
    }

    /// Evaluate against a record. A missing (NULL) field never matches.
    pub fn matches<R: FieldSource<F> + ?Sized>(&self, record: &R) -> bool {
        match self {
            Self::Equals(field, expected) => record
                .field_value(*field)
                .is_some_and(|v| v.compare(expected) == Some(Ordering::Equal)),
            Self::Between(field, lo, hi) => record.field_value(*field).is_some_and(|v| {
                matches!(
                    v.compare(lo),
                    Some(Ordering::Greater | Ordering::Equal)
                ) && matches!(v.compare(hi), Some(Ordering::Less | Ordering::Equal))
            }),
            Self::AtLeast(field, lo) => record
                .field_value(*field)
                .is_some_and(|v| matches!(v.compare(lo), Some(Ordering::Greater | Ordering::Equal))),
            Self::AtMost(field, hi) => record
                .field_value(*field)
                .is_some_and(|v| matches!(v.compare(hi), Some(Ordering::Less | Ordering::Equal))),
            Self::LikeCi(field, term) => match record.field_value(*field) {
                Some(FieldValue::Text(text)) => {
                    text.to_lowercase().contains(&term.to_lowercase())
                }
                _ => false,
            },
            Self::Or(alternatives) => alternatives.iter().any(|c| c.matches(record)),
        }
    }
}

/// A record that can report its field values for in-memory evaluation
pub trait FieldSource<F> {
    /// Value of the field, or `None` when it is NULL
    fn field_value(&self, field: F) -> Option<FieldValue>;
}

/// An AND-combination of conditions. Empty means "match all".
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate<F> {
    conditions: Vec<Condition<F>>,
}

impl<F> Default for Predicate<F> {
    fn default() -> Self {
        Self {
            conditions: Vec::new(),
        }
    }
}

impl<F: Field> Predicate<F> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a condition when present; absent dimensions add nothing
    pub fn and(mut self, condition: Option<Condition<F>>) -> Self {
        if let Some(c) = condition {
            self.conditions.push(c);
        }
        self
    }

    pub fn conditions(&self) -> &[Condition<F>] {
        &self.conditions
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    /// An empty predicate matches every record
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn matches<R: FieldSource<F> + ?Sized>(&self, record: &R) -> bool {
        self.conditions.iter().all(|c| c.matches(record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum TestField {
        Name,
        Note,
        Amount,
    }

    impl Field for TestField {
        fn column(self) -> &'static str {
            match self {
                Self::Name => "name",
                Self::Note => "note",
                Self::Amount => "amount",
            }
        }

        fn from_sort_key(_key: &str) -> Option<Self> {
            None
        }
    }

    struct Row {
        name: &'static str,
        note: Option<&'static str>,
        amount: Decimal,
    }

    impl FieldSource<TestField> for Row {
        fn field_value(&self, field: TestField) -> Option<FieldValue> {
            match field {
                TestField::Name => Some(self.name.into()),
                TestField::Note => self.note.map(FieldValue::from),
                TestField::Amount => Some(self.amount.into()),
            }
        }
    }

    fn row() -> Row {
        Row {
            name: "Coffee Beans",
            note: None,
            amount: dec!(12.50),
        }
    }

    #[test]
    fn test_range_three_way_policy() {
        let lo = Some(FieldValue::from(dec!(1)));
        let hi = Some(FieldValue::from(dec!(2)));
        assert!(matches!(
            Condition::range(TestField::Amount, lo.clone(), hi.clone()),
            Some(Condition::Between(..))
        ));
        assert!(matches!(
            Condition::range(TestField::Amount, lo, None),
            Some(Condition::AtLeast(..))
        ));
        assert!(matches!(
            Condition::range(TestField::Amount, None, hi),
            Some(Condition::AtMost(..))
        ));
        assert!(Condition::range(TestField::Amount, None, None).is_none());
    }

    #[test]
    fn test_blank_search_is_absent() {
        assert!(Condition::search(&[TestField::Name], Some("   ")).is_none());
        assert!(Condition::search(&[TestField::Name], Some("")).is_none());
        assert!(Condition::search(&[TestField::Name], None).is_none());
    }

    #[test]
    fn test_search_trims_and_ignores_case() {
        let cond = Condition::search(&[TestField::Name, TestField::Note], Some("  BEANS "))
            .unwrap();
        assert!(cond.matches(&row()));
    }

    #[test]
    fn test_search_folds_non_ascii_case() {
        let latte = Row {
            name: "Café Latte",
            note: Some("ÜBER grande"),
            amount: dec!(4.20),
        };
        let cond = Condition::search(&[TestField::Name], Some("CAFÉ")).unwrap();
        assert!(cond.matches(&latte));
        let cond = Condition::search(&[TestField::Note], Some("über")).unwrap();
        assert!(cond.matches(&latte));
    }

    #[test]
    fn test_null_field_never_matches() {
        let cond = Condition::LikeCi(TestField::Note, "x".to_string());
        assert!(!cond.matches(&row()));
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let between = Condition::Between(
            TestField::Amount,
            dec!(12.50).into(),
            dec!(12.50).into(),
        );
        assert!(between.matches(&row()));
        assert!(Condition::AtLeast(TestField::Amount, dec!(12.50).into()).matches(&row()));
        assert!(Condition::AtMost(TestField::Amount, dec!(12.50).into()).matches(&row()));
        assert!(!Condition::AtLeast(TestField::Amount, dec!(12.51).into()).matches(&row()));
    }

    #[test]
    fn test_empty_predicate_matches_all() {
        let predicate: Predicate<TestField> = Predicate::new().and(None).and(None);
        assert!(predicate.is_empty());
        assert!(predicate.matches(&row()));
    }

    #[test]
    fn test_inverted_range_matches_nothing() {
        let predicate = Predicate::new().and(Condition::range(
            TestField::Amount,
            Some(dec!(200).into()),
            Some(dec!(100).into()),
        ));
        assert!(!predicate.matches(&row()));
    }
}
