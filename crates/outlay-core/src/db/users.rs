//! User and role operations

use rusqlite::{params, OptionalExtension, Row};
use tracing::info;

use super::query::{fetch_page, Source};
use super::{parse_datetime, Database};
use crate::error::{Error, Result};
use crate::filter::{Page, PageRequest, Sort, SortDirection, UserField, UserFilter};
use crate::models::{NewUser, Role, RoleName, User};
use crate::scope::Caller;

const USER_SOURCE: Source<UserField> = Source {
    columns: "u.id, u.first_name, u.last_name, u.email, u.role_id, r.name, \
              u.is_active, u.is_verified, u.created_at, u.updated_at",
    from: "users u JOIN roles r ON r.id = u.role_id",
    id: UserField::Id,
};

impl Database {
    fn row_to_user(row: &Row<'_>) -> rusqlite::Result<User> {
        let created_at: String = row.get(8)?;
        let updated_at: String = row.get(9)?;
        Ok(User {
            id: row.get(0)?,
            first_name: row.get(1)?,
            last_name: row.get(2)?,
            email: row.get(3)?,
            role_id: row.get(4)?,
            role: row.get(5)?,
            is_active: row.get(6)?,
            is_verified: row.get(7)?,
            created_at: parse_datetime(&created_at),
            updated_at: parse_datetime(&updated_at),
        })
    }

    /// List all roles
    pub fn list_roles(&self) -> Result<Vec<Role>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT id, name, description FROM roles ORDER BY id")?;
        let roles = stmt
            .query_map([], |row| {
                Ok(Role {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    description: row.get(2)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(roles)
    }

    /// Get a role by name
    pub fn get_role(&self, name: RoleName) -> Result<Role> {
        let conn = self.conn()?;
        conn.query_row(
            "SELECT id, name, description FROM roles WHERE name = ?",
            params![name.as_str()],
            |row| {
                Ok(Role {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    description: row.get(2)?,
                })
            },
        )
        .optional()?
        .ok_or_else(|| Error::NotFound(format!("Role {}", name)))
    }

    /// Create a user; the email must be unused
    pub fn create_user(&self, user: &NewUser) -> Result<User> {
        let email = user.email.trim();
        if email.is_empty() {
            return Err(Error::InvalidData("Email must not be empty".to_string()));
        }
        if self.get_user_by_email(email)?.is_some() {
            return Err(Error::Conflict(format!("Email already registered: {}", email)));
        }

        let role = self.get_role(user.role)?;
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO users (first_name, last_name, email, role_id, is_active, is_verified)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
            params![
                user.first_name,
                user.last_name,
                email,
                role.id,
                user.is_active,
                user.is_verified
            ],
        )?;
        let id = conn.last_insert_rowid();
        info!(user_id = id, role = %user.role, "Created user");

        self.get_user(id)?
            .ok_or_else(|| Error::NotFound(format!("User {}", id)))
    }

    /// Get a user by ID
    pub fn get_user(&self, id: i64) -> Result<Option<User>> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {} FROM {} WHERE u.id = ?",
            USER_SOURCE.columns, USER_SOURCE.from
        );
        let user = conn
            .query_row(&sql, params![id], Self::row_to_user)
            .optional()?;
        Ok(user)
    }

    /// Get a user by email (case-insensitive)
    pub fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {} FROM {} WHERE LOWER(u.email) = LOWER(?)",
            USER_SOURCE.columns, USER_SOURCE.from
        );
        let user = conn
            .query_row(&sql, params![email.trim()], Self::row_to_user)
            .optional()?;
        Ok(user)
    }

    /// Resolve the identity a request runs as from an email
    pub fn resolve_caller(&self, email: &str) -> Result<Caller> {
        let user = self
            .get_user_by_email(email)?
            .ok_or_else(|| Error::NotFound(format!("No user with email {}", email)))?;
        if !user.is_active {
            return Err(Error::Forbidden(format!("User {} is deactivated", user.email)));
        }
        Ok(Caller::from_user(&user))
    }

    /// Search users with pagination; newest first unless sorted otherwise
    pub fn search_users(
        &self,
        filter: &UserFilter,
        request: &PageRequest<UserField>,
    ) -> Result<Page<User>> {
        let conn = self.conn()?;
        let request = if request.sort().is_empty() {
            request
                .clone()
                .sorted_by(Sort::new(UserField::CreatedAt, SortDirection::Desc))
        } else {
            request.clone()
        };
        fetch_page(
            &conn,
            &USER_SOURCE,
            &filter.predicate(),
            &request,
            Self::row_to_user,
        )
    }

    /// Mark a user inactive
    pub fn deactivate_user(&self, id: i64) -> Result<()> {
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE users SET is_active = 0, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
            params![id],
        )?;
        if updated == 0 {
            return Err(Error::NotFound(format!("User {}", id)));
        }
        info!(user_id = id, "Deactivated user");
        Ok(())
    }

    /// Delete a user and their expenses
    pub fn delete_user(&self, id: i64) -> Result<()> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM users WHERE id = ?", params![id])?;
        if deleted == 0 {
            return Err(Error::NotFound(format!("User {}", id)));
        }
        info!(user_id = id, "Deleted user");
        Ok(())
    }
}
