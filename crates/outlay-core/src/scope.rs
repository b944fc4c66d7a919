//! Access scope resolution
//!
//! An administrative caller sees every user's records; anyone else is
//! pinned to their own. The override is applied to the filter tuple before
//! any predicate is built, whatever user id the request asked for.

use tracing::debug;

use crate::error::{Error, Result};
use crate::filter::ExpenseFilter;
use crate::models::{RoleName, User};

/// The authenticated identity a request runs as
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub user_id: i64,
    pub email: String,
    pub role: RoleName,
}

impl Caller {
    pub fn new(user_id: i64, email: impl Into<String>, role: RoleName) -> Self {
        Self {
            user_id,
            email: email.into(),
            role,
        }
    }

    /// Build a caller from a stored user; unknown role names get the
    /// non-administrative scope
    pub fn from_user(user: &User) -> Self {
        let role = user.role.parse().unwrap_or(RoleName::User);
        Self::new(user.id, user.email.clone(), role)
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Narrow an expense filter to what this caller may list.
    ///
    /// Admins keep the requested `user_id` (possibly none); everyone else
    /// gets their own id regardless of the request.
    pub fn scope_expense_filter(&self, filter: ExpenseFilter) -> ExpenseFilter {
        if self.is_admin() {
            return filter;
        }
        if filter.user_id.is_some_and(|requested| requested != self.user_id) {
            debug!(
                caller = self.user_id,
                requested = ?filter.user_id,
                "Overriding requested user filter with caller id"
            );
        }
        filter.user_id(Some(self.user_id))
    }

    /// User id a summary is restricted to, or `None` for all users
    pub fn summary_user_id(&self) -> Option<i64> {
        if self.is_admin() {
            None
        } else {
            Some(self.user_id)
        }
    }

    /// Check that this caller may touch a record owned by `owner_id`
    pub fn ensure_can_access(&self, owner_id: i64) -> Result<()> {
        if self.is_admin() || owner_id == self.user_id {
            Ok(())
        } else {
            Err(Error::Forbidden(format!(
                "User {} may not access records of user {}",
                self.user_id, owner_id
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_keeps_requested_user() {
        let admin = Caller::new(1, "admin@example.com", RoleName::Admin);
        let scoped = admin.scope_expense_filter(ExpenseFilter::new().user_id(Some(9)));
        assert_eq!(scoped.user_id, Some(9));

        let unscoped = admin.scope_expense_filter(ExpenseFilter::new());
        assert_eq!(unscoped.user_id, None);
    }

    #[test]
    fn test_user_is_forced_to_own_id() {
        let user = Caller::new(5, "u@example.com", RoleName::User);
        let scoped = user.scope_expense_filter(ExpenseFilter::new().user_id(Some(9)));
        assert_eq!(scoped.user_id, Some(5));

        let defaulted = user.scope_expense_filter(ExpenseFilter::new());
        assert_eq!(defaulted.user_id, Some(5));
    }

    #[test]
    fn test_override_keeps_other_dimensions() {
        let user = Caller::new(5, "u@example.com", RoleName::User);
        let scoped = user.scope_expense_filter(
            ExpenseFilter::new().category_id(Some(2)).search(Some("rent")),
        );
        assert_eq!(scoped.category_id, Some(2));
        assert_eq!(scoped.search.as_deref(), Some("rent"));
    }

    #[test]
    fn test_ownership_check() {
        let user = Caller::new(5, "u@example.com", RoleName::User);
        assert!(user.ensure_can_access(5).is_ok());
        assert!(matches!(user.ensure_can_access(6), Err(Error::Forbidden(_))));

        let admin = Caller::new(1, "a@example.com", RoleName::Admin);
        assert!(admin.ensure_can_access(6).is_ok());
    }

    #[test]
    fn test_summary_scope() {
        assert_eq!(
            Caller::new(1, "a", RoleName::Admin).summary_user_id(),
            None
        );
        assert_eq!(Caller::new(4, "b", RoleName::User).summary_user_id(), Some(4));
    }
}
