//! Saved-search route parameter codec.
//!
//! A saved search serializes into a flat, ordered key/value list suitable
//! for a redirect or shareable link, and parses back into a [`SearchQuery`].
//! Key order is stable (insertion order of filters and values), so generated
//! links are deterministic and testable.
//!
//! Key shape:
//!
//! ```text
//! term
//! sort
//! page_size
//! filters[i].id / .name / .field / .negate / .operator
//! filters[i].values[j].id / .name / .color
//! ```
//!
//! `color` is omitted for values that carry none.

use std::collections::HashMap;

use aegis_core::{
    Error, Filter, FilterOperator, FilterValue, Result, SavedSearch, SearchQuery, SortCriterion,
    DEFAULT_FACET_LIMIT,
};

/// Serialize a saved search into route parameters.
///
/// A non-empty `override_term` takes precedence over the stored term; an
/// empty override keeps the stored term.
pub fn encode_route_params(saved: &SavedSearch, override_term: &str) -> Vec<(String, String)> {
    let term = if override_term.is_empty() {
        saved.term.as_str()
    } else {
        override_term
    };

    let mut params = vec![
        ("term".to_string(), term.to_string()),
        ("sort".to_string(), saved.sort.as_str().to_string()),
        ("page_size".to_string(), saved.page_size.to_string()),
    ];

    for (i, filter) in saved.filters.iter().enumerate() {
        params.push((format!("filters[{}].id", i), filter.id.clone()));
        params.push((format!("filters[{}].name", i), filter.name.clone()));
        params.push((format!("filters[{}].field", i), filter.field.clone()));
        params.push((format!("filters[{}].negate", i), filter.negate.to_string()));
        params.push((
            format!("filters[{}].operator", i),
            filter.operator.as_str().to_string(),
        ));
        for (j, value) in filter.values.iter().enumerate() {
            params.push((format!("filters[{}].values[{}].id", i, j), value.id.clone()));
            params.push((
                format!("filters[{}].values[{}].name", i, j),
                value.name.clone(),
            ));
            if let Some(color) = &value.color {
                params.push((format!("filters[{}].values[{}].color", i, j), color.clone()));
            }
        }
    }

    params
}

/// Parse route parameters back into a [`SearchQuery`].
///
/// Missing `term`/`sort`/`page_size` fall back to defaults; a present but
/// malformed value is an [`Error::InvalidQuery`]. Filter indices are read
/// contiguously from zero, matching what [`encode_route_params`] emits.
pub fn parse_route_params(params: &[(String, String)]) -> Result<SearchQuery> {
    let map: HashMap<&str, &str> = params
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();

    let mut query = SearchQuery {
        term: map.get("term").unwrap_or(&"").to_string(),
        facet_limit: DEFAULT_FACET_LIMIT,
        ..Default::default()
    };
    if let Some(sort) = map.get("sort") {
        query.sort = SortCriterion::parse(sort)?;
    }
    if let Some(page_size) = map.get("page_size") {
        query.page_size = page_size
            .parse()
            .map_err(|_| Error::InvalidQuery(format!("page_size '{}' is not a number", page_size)))?;
    }

    let mut i = 0;
    while let Some(id) = map.get(format!("filters[{}].id", i).as_str()) {
        let mut filter = Filter::new(
            *id,
            required(&map, &format!("filters[{}].name", i))?,
            required(&map, &format!("filters[{}].field", i))?,
        );
        filter.negate = parse_bool(required(&map, &format!("filters[{}].negate", i))?)?;
        filter.operator =
            FilterOperator::parse(required(&map, &format!("filters[{}].operator", i))?)?;

        let mut j = 0;
        while let Some(value_id) = map.get(format!("filters[{}].values[{}].id", i, j).as_str()) {
            let mut value = FilterValue::new(
                *value_id,
                required(&map, &format!("filters[{}].values[{}].name", i, j))?,
            );
            value.color = map
                .get(format!("filters[{}].values[{}].color", i, j).as_str())
                .map(|c| c.to_string());
            filter.values.push(value);
            j += 1;
        }

        query.filters.push(filter);
        i += 1;
    }

    Ok(query)
}

fn required<'a>(map: &'a HashMap<&str, &str>, key: &str) -> Result<&'a str> {
    map.get(key)
        .copied()
        .ok_or_else(|| Error::InvalidQuery(format!("missing route parameter '{}'", key)))
}

fn parse_bool(s: &str) -> Result<bool> {
    match s {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(Error::InvalidQuery(format!(
            "'{}' is not a boolean",
            other
        ))),
    }
}
