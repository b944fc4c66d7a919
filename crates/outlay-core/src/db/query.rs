//! Paginated query executor
//!
//! Every listing in the store goes through [`fetch_page`]: the predicate is
//! translated once and the resulting [`SqlFilter`] feeds both the windowed
//! SELECT and the COUNT, so the page and its total always agree.

use rusqlite::{Connection, Row};
use tracing::debug;

use super::sql::{order_clause, SqlFilter, Translate};
use crate::error::Result;
use crate::filter::{Field, Page, PageRequest, Predicate, Sort};

/// Where a record type lives: its selected columns, joined tables and key
pub(crate) struct Source<F> {
    /// Column list for SELECT
    pub columns: &'static str,
    /// FROM clause including any joins needed to build a full record
    pub from: &'static str,
    /// Primary identity, used for de-duplication and the final tie-break
    pub id: F,
}

impl<F: Field> Source<F> {
    fn select_sql(&self, filter: &SqlFilter, sort: &[Sort<F>]) -> String {
        format!(
            "SELECT DISTINCT {} FROM {} {} {}",
            self.columns,
            self.from,
            filter.where_clause,
            order_clause(sort, self.id)
        )
    }

    fn count_sql(&self, filter: &SqlFilter) -> String {
        format!(
            "SELECT COUNT(DISTINCT {}) FROM {} {}",
            self.id.column(),
            self.from,
            filter.where_clause
        )
    }
}

/// Fetch one page window of matching records plus the total match count
pub(crate) fn fetch_page<F, T>(
    conn: &Connection,
    source: &Source<F>,
    predicate: &Predicate<F>,
    request: &PageRequest<F>,
    map_row: impl FnMut(&Row<'_>) -> rusqlite::Result<T>,
) -> Result<Page<T>>
where
    F: Field,
{
    let filter = predicate.to_sql();
    debug!(
        conditions = predicate.len(),
        sort = ?request.sort(),
        page = request.page(),
        size = request.size(),
        "Executing paginated query"
    );

    let sql = format!("{} LIMIT ? OFFSET ?", source.select_sql(&filter, request.sort()));
    let limit = request.limit();
    let offset = request.offset();
    let mut params = filter.params_refs();
    params.push(&limit);
    params.push(&offset);

    let mut stmt = conn.prepare(&sql)?;
    let content = stmt
        .query_map(params.as_slice(), map_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let total_elements = count_with(conn, source, &filter)?;

    Ok(Page {
        content,
        total_elements,
        page: request.page(),
        size: request.size(),
    })
}

/// Fetch every matching record, unwindowed
pub(crate) fn fetch_all<F, T>(
    conn: &Connection,
    source: &Source<F>,
    predicate: &Predicate<F>,
    sort: &[Sort<F>],
    map_row: impl FnMut(&Row<'_>) -> rusqlite::Result<T>,
) -> Result<Vec<T>>
where
    F: Field,
{
    let filter = predicate.to_sql();
    debug!(conditions = predicate.len(), "Fetching all matching records");

    let mut stmt = conn.prepare(&source.select_sql(&filter, sort))?;
    let params = filter.params_refs();
    let records = stmt
        .query_map(params.as_slice(), map_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(records)
}

/// Count matching records
pub(crate) fn count<F: Field>(
    conn: &Connection,
    source: &Source<F>,
    predicate: &Predicate<F>,
) -> Result<i64> {
    count_with(conn, source, &predicate.to_sql())
}

fn count_with<F: Field>(conn: &Connection, source: &Source<F>, filter: &SqlFilter) -> Result<i64> {
    let params = filter.params_refs();
    let total: i64 = conn.query_row(&source.count_sql(filter), params.as_slice(), |row| {
        row.get(0)
    })?;
    Ok(total)
}
