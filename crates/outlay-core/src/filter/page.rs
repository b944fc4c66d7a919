//! Sort keys, page windows and page results

use serde::Serialize;

use super::condition::Field;
use crate::error::{Error, Result};

/// Sort direction for a query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    /// "ASC" in any case is ascending; anything else is descending
    pub fn parse(s: &str) -> Self {
        if s.eq_ignore_ascii_case("asc") {
            Self::Asc
        } else {
            Self::Desc
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

impl std::fmt::Display for SortDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_sql())
    }
}

/// One sort key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort<F> {
    pub field: F,
    pub direction: SortDirection,
}

impl<F: Field> Sort<F> {
    pub fn new(field: F, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    /// Parse a sort key name and direction string ("expenseDate", "desc")
    pub fn parse(key: &str, direction: &str) -> Result<Self> {
        let field = F::from_sort_key(key)
            .ok_or_else(|| Error::InvalidData(format!("Unknown sort field: {}", key)))?;
        Ok(Self::new(field, SortDirection::parse(direction)))
    }
}

/// Zero-based page index, page size and ordered sort keys
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest<F> {
    page: u32,
    size: u32,
    sort: Vec<Sort<F>>,
}

impl<F: Field> PageRequest<F> {
    /// Create an unsorted page request; size must be positive
    pub fn new(page: u32, size: u32) -> Result<Self> {
        if size == 0 {
            return Err(Error::InvalidData("Page size must be greater than 0".to_string()));
        }
        Ok(Self {
            page,
            size,
            sort: Vec::new(),
        })
    }

    /// Append a sort key; earlier keys take precedence
    pub fn sorted_by(mut self, sort: Sort<F>) -> Self {
        self.sort.push(sort);
        self
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn sort(&self) -> &[Sort<F>] {
        &self.sort
    }

    /// Row offset of the first record in this window
    pub fn offset(&self) -> i64 {
        i64::from(self.page) * i64::from(self.size)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.size)
    }
}

/// One page of results plus the total across all pages
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub total_elements: i64,
    pub page: u32,
    pub size: u32,
}

impl<T> Page<T> {
    pub fn total_pages(&self) -> i64 {
        if self.size == 0 {
            return 0;
        }
        let size = i64::from(self.size);
        (self.total_elements + size - 1) / size
    }

    pub fn is_last(&self) -> bool {
        i64::from(self.page) + 1 >= self.total_pages()
    }
}
