use std::collections::HashMap;

use serde_json::Value;

use super::error::QueryError;
use super::types::{
    EngineQuery, FilterSpec, OrderSpec, OrderTerm, SearchFilter, SortDirection,
};

/// Translate raw string-keyed query parameters from a collection GET into an
/// engine query. The keys `limit`, `offset`, `order`, `searchTerm`,
/// `searchTermKeys` and `relations` carry pipeline meaning; everything else
/// is an equality filter passed through to the engine. Malformed pagination
/// and order values silently fall back to defaults; tightening that would be
/// an observable behavior change for existing API consumers.
pub fn translate(mut params: HashMap<String, String>) -> Result<EngineQuery, QueryError> {
    // Page size must be positive; zero degrades to the default like any
    // other unusable value.
    let take = params
        .remove("limit")
        .and_then(|v| v.trim().parse::<i64>().ok())
        .filter(|v| *v > 0)
        .unwrap_or_else(|| crate::config::CONFIG.api.default_page_size);
    let take = cap_page_size(take);

    let skip = params
        .remove("offset")
        .and_then(|v| v.trim().parse::<i64>().ok())
        .filter(|v| *v >= 0)
        .unwrap_or(0);

    let order = params.remove("order").map(|raw| parse_order(&raw)).unwrap_or_default();

    let search_term = params.remove("searchTerm").unwrap_or_default();
    let search_term_keys = params
        .remove("searchTermKeys")
        .map(|raw| parse_string_array(&raw))
        .unwrap_or_default();
    let search = if !search_term.is_empty() && !search_term_keys.is_empty() {
        for key in &search_term_keys {
            validate_column(key)?;
        }
        Some(SearchFilter { term: search_term, keys: search_term_keys })
    } else {
        None
    };

    let relations = params.remove("relations").map(|raw| parse_string_array(&raw)).unwrap_or_default();

    // Remaining keys are equality filters, scoped to the target entity.
    // No schema validation here; field schemas belong to the validation
    // collaborator. Identifier-format checks keep them quotable.
    let mut equals: Vec<(String, String)> = vec![];
    for (field, value) in params {
        validate_column(&field)?;
        equals.push((field, value));
    }
    equals.sort_by(|a, b| a.0.cmp(&b.0));

    Ok(EngineQuery {
        filter: FilterSpec { equals, search },
        order,
        take,
        skip,
        relations,
    })
}

fn cap_page_size(take: i64) -> i64 {
    let max = crate::config::CONFIG.api.max_page_size.unwrap_or(i64::MAX);
    if take > max {
        tracing::warn!("limit {} exceeds max {}, capping", take, max);
        max
    } else {
        take
    }
}

/// Parse the `order` parameter. Accepts the SDK form, a JSON array of
/// `{"id": col, "desc": bool}`, as well as the `"col desc, other asc"`
/// string form. Anything unparseable yields no explicit order.
pub fn parse_order(raw: &str) -> Vec<OrderSpec> {
    if let Ok(terms) = serde_json::from_str::<Vec<OrderTerm>>(raw) {
        return terms
            .into_iter()
            .filter(|t| is_valid_identifier(&t.id))
            .map(|t| OrderSpec {
                column: t.id,
                direction: if t.desc { SortDirection::Desc } else { SortDirection::Asc },
            })
            .collect();
    }
    parse_order_string(raw)
}

fn parse_order_string(raw: &str) -> Vec<OrderSpec> {
    let mut out = vec![];
    for part in raw.split(',') {
        let trimmed = part.trim();
        if trimmed.is_empty() {
            continue;
        }
        let mut it = trimmed.split_whitespace();
        if let Some(column) = it.next() {
            if !is_valid_identifier(column) {
                continue;
            }
            let dir = it.next().unwrap_or("asc");
            let direction = if dir.eq_ignore_ascii_case("desc") { SortDirection::Desc } else { SortDirection::Asc };
            out.push(OrderSpec { column: column.to_string(), direction });
        }
    }
    out
}

/// Parse a JSON string array (`["a","b"]`); a bare value is treated as a
/// single-element array for leniency with hand-written query strings.
pub fn parse_string_array(raw: &str) -> Vec<String> {
    if let Ok(Value::Array(items)) = serde_json::from_str::<Value>(raw) {
        return items
            .into_iter()
            .filter_map(|v| v.as_str().map(|s| s.to_string()))
            .collect();
    }
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.starts_with('[') {
        vec![]
    } else {
        vec![trimmed.to_string()]
    }
}

pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    name.chars().all(|c| c.is_alphanumeric() || c == '_')
}

fn validate_column(name: &str) -> Result<(), QueryError> {
    if is_valid_identifier(name) {
        Ok(())
    } else {
        Err(QueryError::InvalidColumn(name.to_string()))
    }
}
