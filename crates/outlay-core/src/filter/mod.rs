//! Query composition: typed conditions, filter builders, sorting and paging
//!
//! - `condition` - condition vocabulary, predicates, in-memory evaluation
//! - `expense` - expense filter tuple and fields
//! - `user` - user filter tuple and fields
//! - `audit` - audit log filter tuple and fields
//! - `page` - sort keys, page windows and page results

mod audit;
mod condition;
mod expense;
mod page;
mod user;

pub use audit::{AuditField, AuditFilter};
pub use condition::{Condition, Field, FieldSource, FieldValue, Predicate};
pub use expense::{ExpenseField, ExpenseFilter};
pub use page::{Page, PageRequest, Sort, SortDirection};
pub use user::{UserField, UserFilter};
