//! Audit log filter builder

use chrono::NaiveDateTime;

use super::condition::{Condition, Field, FieldSource, FieldValue, Predicate};
use crate::models::AuditEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuditField {
    Id,
    UserEmail,
    Action,
    EntityType,
    EntityId,
    Timestamp,
}

impl Field for AuditField {
    fn column(self) -> &'static str {
        match self {
            Self::Id => "a.id",
            Self::UserEmail => "a.user_email",
            Self::Action => "a.action",
            Self::EntityType => "a.entity_type",
            Self::EntityId => "a.entity_id",
            Self::Timestamp => "a.timestamp",
        }
    }

    fn from_sort_key(key: &str) -> Option<Self> {
        match key {
            "id" => Some(Self::Id),
            "timestamp" | "createdAt" => Some(Self::Timestamp),
            "action" => Some(Self::Action),
            _ => None,
        }
    }
}

impl FieldSource<AuditField> for AuditEntry {
    fn field_value(&self, field: AuditField) -> Option<FieldValue> {
        match field {
            AuditField::Id => Some(self.id.into()),
            AuditField::UserEmail => Some(self.user_email.as_str().into()),
            AuditField::Action => Some(self.action.as_str().into()),
            AuditField::EntityType => self.entity_type.as_deref().map(FieldValue::from),
            AuditField::EntityId => self.entity_id.map(FieldValue::from),
            AuditField::Timestamp => Some(self.timestamp.naive_utc().into()),
        }
    }
}

/// Optional filter tuple for audit log queries
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuditFilter {
    pub user_email: Option<String>,
    pub action: Option<String>,
    pub entity_type: Option<String>,
    pub entity_id: Option<i64>,
    pub from: Option<NaiveDateTime>,
    pub to: Option<NaiveDateTime>,
}

impl AuditFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_email(mut self, email: Option<&str>) -> Self {
        self.user_email = email.map(str::to_string);
        self
    }

    /// Action names are stored upper-case, so the filter value is folded to match
    pub fn action(mut self, action: Option<&str>) -> Self {
        self.action = action.map(|a| a.trim().to_uppercase());
        self
    }

    pub fn entity(mut self, entity_type: Option<&str>, entity_id: Option<i64>) -> Self {
        self.entity_type = entity_type.map(str::to_string);
        self.entity_id = entity_id;
        self
    }

    pub fn time_range(mut self, from: Option<NaiveDateTime>, to: Option<NaiveDateTime>) -> Self {
        self.from = from;
        self.to = to;
        self
    }

    pub fn predicate(&self) -> Predicate<AuditField> {
        let exact = |field, value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(|v| Condition::Equals(field, v.into()))
        };

        Predicate::new()
            .and(exact(AuditField::UserEmail, &self.user_email))
            .and(exact(AuditField::Action, &self.action))
            .and(exact(AuditField::EntityType, &self.entity_type))
            .and(
                self.entity_id
                    .map(|id| Condition::Equals(AuditField::EntityId, id.into())),
            )
            .and(Condition::range(
                AuditField::Timestamp,
                self.from.map(FieldValue::from),
                self.to.map(FieldValue::from),
            ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_values_ignored() {
        let predicate = AuditFilter::new()
            .user_email(Some(""))
            .action(Some("  "))
            .predicate();
        assert!(predicate.is_empty());
    }

    #[test]
    fn test_entity_filter() {
        let predicate = AuditFilter::new()
            .action(Some("DELETE"))
            .entity(Some("expense"), Some(4))
            .predicate();
        assert_eq!(predicate.len(), 3);
    }

    #[test]
    fn test_action_is_case_insensitive() {
        let filter = AuditFilter::new().action(Some(" delete "));
        assert_eq!(filter.action.as_deref(), Some("DELETE"));
        assert_eq!(filter.predicate().len(), 1);
    }
}
