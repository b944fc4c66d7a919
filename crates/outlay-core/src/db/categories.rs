//! Category operations

use rusqlite::{params, OptionalExtension, Row};
use tracing::info;

use super::Database;
use crate::error::{Error, Result};
use crate::models::{Category, NewCategory};

impl Database {
    fn row_to_category(row: &Row<'_>) -> rusqlite::Result<Category> {
        Ok(Category {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            is_active: row.get(3)?,
        })
    }

    fn ensure_category_name_free(&self, name: &str, except: Option<i64>) -> Result<()> {
        let conn = self.conn()?;
        let existing: Option<i64> = conn
            .query_row(
                "SELECT id FROM categories WHERE LOWER(name) = LOWER(?)",
                params![name],
                |row| row.get(0),
            )
            .optional()?;
        match existing {
            Some(id) if Some(id) != except => {
                Err(Error::Conflict(format!("Category already exists: {}", name)))
            }
            _ => Ok(()),
        }
    }

    /// Create a category; names are unique
    pub fn create_category(&self, category: &NewCategory) -> Result<Category> {
        let name = category.name.trim();
        if name.is_empty() {
            return Err(Error::InvalidData("Category name must not be empty".to_string()));
        }
        self.ensure_category_name_free(name, None)?;

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO categories (name, description, is_active) VALUES (?, ?, ?)",
            params![name, category.description, category.is_active],
        )?;
        let id = conn.last_insert_rowid();
        info!(category_id = id, name, "Created category");

        Ok(Category {
            id,
            name: name.to_string(),
            description: category.description.clone(),
            is_active: category.is_active,
        })
    }

    /// List all categories by name
    pub fn list_categories(&self) -> Result<Vec<Category>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, description, is_active FROM categories ORDER BY name COLLATE NOCASE",
        )?;
        let categories = stmt
            .query_map([], Self::row_to_category)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(categories)
    }

    /// Get a category by ID
    pub fn get_category(&self, id: i64) -> Result<Option<Category>> {
        let conn = self.conn()?;
        let category = conn
            .query_row(
                "SELECT id, name, description, is_active FROM categories WHERE id = ?",
                params![id],
                Self::row_to_category,
            )
            .optional()?;
        Ok(category)
    }

    /// Replace a category's fields
    pub fn update_category(&self, id: i64, category: &NewCategory) -> Result<Category> {
        let name = category.name.trim();
        if name.is_empty() {
            return Err(Error::InvalidData("Category name must not be empty".to_string()));
        }
        self.ensure_category_name_free(name, Some(id))?;

        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE categories SET name = ?, description = ?, is_active = ? WHERE id = ?",
            params![name, category.description, category.is_active, id],
        )?;
        if updated == 0 {
            return Err(Error::NotFound(format!("Category {}", id)));
        }

        Ok(Category {
            id,
            name: name.to_string(),
            description: category.description.clone(),
            is_active: category.is_active,
        })
    }

    /// Delete a category; its expenses become uncategorized
    pub fn delete_category(&self, id: i64) -> Result<()> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM categories WHERE id = ?", params![id])?;
        if deleted == 0 {
            return Err(Error::NotFound(format!("Category {}", id)));
        }
        info!(category_id = id, "Deleted category");
        Ok(())
    }
}
