//! User filter builder

use super::condition::{Condition, Field, FieldSource, FieldValue, Predicate};
use crate::models::User;

/// Filterable and sortable user columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserField {
    Id,
    RoleId,
    FirstName,
    LastName,
    Email,
    IsActive,
    IsVerified,
    CreatedAt,
}

impl Field for UserField {
    fn column(self) -> &'static str {
        match self {
            Self::Id => "u.id",
            Self::RoleId => "u.role_id",
            Self::FirstName => "u.first_name",
            Self::LastName => "u.last_name",
            Self::Email => "u.email",
            Self::IsActive => "u.is_active",
            Self::IsVerified => "u.is_verified",
            Self::CreatedAt => "u.created_at",
        }
    }

    fn from_sort_key(key: &str) -> Option<Self> {
        match key {
            "id" => Some(Self::Id),
            "createdAt" => Some(Self::CreatedAt),
            "firstName" => Some(Self::FirstName),
            "lastName" => Some(Self::LastName),
            "email" => Some(Self::Email),
            _ => None,
        }
    }
}

impl FieldSource<UserField> for User {
    fn field_value(&self, field: UserField) -> Option<FieldValue> {
        Some(match field {
            UserField::Id => self.id.into(),
            UserField::RoleId => self.role_id.into(),
            UserField::FirstName => self.first_name.as_str().into(),
            UserField::LastName => self.last_name.as_str().into(),
            UserField::Email => self.email.as_str().into(),
            UserField::IsActive => self.is_active.into(),
            UserField::IsVerified => self.is_verified.into(),
            UserField::CreatedAt => self.created_at.naive_utc().into(),
        })
    }
}

/// Optional filter tuple for user queries
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserFilter {
    pub search: Option<String>,
    pub role_id: Option<i64>,
    pub is_active: Option<bool>,
    pub is_verified: Option<bool>,
}

impl UserFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set search term (first name, last name or email)
    pub fn search(mut self, term: Option<&str>) -> Self {
        self.search = term.map(str::to_string);
        self
    }

    pub fn role_id(mut self, id: Option<i64>) -> Self {
        self.role_id = id;
        self
    }

    pub fn is_active(mut self, value: Option<bool>) -> Self {
        self.is_active = value;
        self
    }

    pub fn is_verified(mut self, value: Option<bool>) -> Self {
        self.is_verified = value;
        self
    }

    pub fn predicate(&self) -> Predicate<UserField> {
        Predicate::new()
            .and(Condition::search(
                &[UserField::FirstName, UserField::LastName, UserField::Email],
                self.search.as_deref(),
            ))
            .and(
                self.role_id
                    .map(|id| Condition::Equals(UserField::RoleId, id.into())),
            )
            .and(
                self.is_active
                    .map(|v| Condition::Equals(UserField::IsActive, v.into())),
            )
            .and(
                self.is_verified
                    .map(|v| Condition::Equals(UserField::IsVerified, v.into())),
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user(first: &str, last: &str, email: &str, active: bool) -> User {
        User {
            id: 1,
            first_name: first.to_string(),
            last_name: last.to_string(),
            email: email.to_string(),
            role_id: 2,
            role: "USER".to_string(),
            is_active: active,
            is_verified: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_search_covers_names_and_email() {
        let predicate = UserFilter::new().search(Some("smith")).predicate();
        assert!(predicate.matches(&user("Jo", "Smith", "jo@x.io", true)));
        assert!(predicate.matches(&user("Smithy", "Lee", "lee@x.io", true)));
        assert!(predicate.matches(&user("Al", "Ng", "asmith@x.io", true)));
        assert!(!predicate.matches(&user("Al", "Ng", "al@x.io", true)));
    }

    #[test]
    fn test_flags_are_exact_match() {
        let predicate = UserFilter::new().is_active(Some(false)).predicate();
        assert!(predicate.matches(&user("a", "b", "c", false)));
        assert!(!predicate.matches(&user("a", "b", "c", true)));
    }

    #[test]
    fn test_empty_user_filter() {
        assert!(UserFilter::new().search(Some(" ")).predicate().is_empty());
    }
}
