use super::error::QueryError;
use super::translate::is_valid_identifier;
use super::types::{EngineQuery, FilterSpec, SqlResult};

/// SQL generation for the Postgres engine. Values are always bound as
/// positional parameters; identifiers are format-validated before quoting.
///
/// Equality comparisons are text-coerced (`"col"::text = $n`) because filter
/// values arrive as query-string text and may target non-text columns.

pub fn build_select(table: &str, query: &EngineQuery) -> Result<SqlResult, QueryError> {
    validate_table(table)?;
    let mut params = vec![];
    let where_clause = build_where(&query.filter, &mut params)?;
    let order_clause = build_order(query)?;
    let take = query.take.max(0);
    let skip = query.skip.max(0);

    let sql = [
        format!("SELECT row_to_json(t) AS row FROM \"{}\" t", table),
        if where_clause.is_empty() { String::new() } else { format!("WHERE {}", where_clause) },
        order_clause,
        format!("LIMIT {} OFFSET {}", take, skip),
    ]
    .into_iter()
    .filter(|s| !s.is_empty())
    .collect::<Vec<_>>()
    .join(" ");

    Ok(SqlResult { query: sql, params })
}

/// Count over the filtered set only; pagination never affects the total.
pub fn build_count(table: &str, filter: &FilterSpec) -> Result<SqlResult, QueryError> {
    validate_table(table)?;
    let mut params = vec![];
    let where_clause = build_where(filter, &mut params)?;
    let sql = if where_clause.is_empty() {
        format!("SELECT COUNT(*) AS count FROM \"{}\" t", table)
    } else {
        format!("SELECT COUNT(*) AS count FROM \"{}\" t WHERE {}", table, where_clause)
    };
    Ok(SqlResult { query: sql, params })
}

fn build_where(filter: &FilterSpec, params: &mut Vec<String>) -> Result<String, QueryError> {
    let mut conditions = vec![];
    for (column, value) in &filter.equals {
        validate_column(column)?;
        params.push(value.clone());
        conditions.push(format!("t.\"{}\"::text = ${}", column, params.len()));
    }
    if let Some(search) = &filter.search {
        let mut branches = vec![];
        for key in &search.keys {
            validate_column(key)?;
            params.push(format!("%{}%", search.term));
            branches.push(format!("t.\"{}\"::text ILIKE ${}", key, params.len()));
        }
        if !branches.is_empty() {
            conditions.push(format!("({})", branches.join(" OR ")));
        }
    }
    Ok(conditions.join(" AND "))
}

fn build_order(query: &EngineQuery) -> Result<String, QueryError> {
    if query.order.is_empty() {
        // Stable engine default when the request carries no order.
        return Ok("ORDER BY t.\"id\" ASC".to_string());
    }
    let mut parts = vec![];
    for spec in &query.order {
        validate_column(&spec.column)?;
        parts.push(format!("t.\"{}\" {}", spec.column, spec.direction.to_sql()));
    }
    Ok(format!("ORDER BY {}", parts.join(", ")))
}

fn validate_table(name: &str) -> Result<(), QueryError> {
    if is_valid_identifier(name) {
        Ok(())
    } else {
        Err(QueryError::InvalidTableName(name.to_string()))
    }
}

fn validate_column(name: &str) -> Result<(), QueryError> {
    if is_valid_identifier(name) {
        Ok(())
    } else {
        Err(QueryError::InvalidColumn(name.to_string()))
    }
}
