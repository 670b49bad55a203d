//! Search query model: term, filters, sort, and pagination.
//!
//! A [`SearchQuery`] is a transient request parameter object. Callers build
//! one (by hand or by parsing route parameters), the aggregator normalizes
//! and validates it, and only then is it submitted to the engine.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Hard upper bound on the page size; larger requests are clamped, never
/// rejected.
pub const MAX_PAGE_SIZE: u32 = 50;

/// Page size used when a caller does not specify one.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Default number of facet values returned per facet.
pub const DEFAULT_FACET_LIMIT: u32 = 10;

// =============================================================================
// SORT & OPERATOR ENUMS
// =============================================================================

/// Sort criterion for the result list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortCriterion {
    #[default]
    Relevance,
    RegistrationDate,
    DocumentDate,
    Title,
}

impl SortCriterion {
    /// Stable wire name, used in route parameters.
    pub fn as_str(&self) -> &'static str {
        match self {
            SortCriterion::Relevance => "relevance",
            SortCriterion::RegistrationDate => "registration_date",
            SortCriterion::DocumentDate => "document_date",
            SortCriterion::Title => "title",
        }
    }

    /// Parse a wire name back into a criterion.
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "relevance" => Ok(SortCriterion::Relevance),
            "registration_date" => Ok(SortCriterion::RegistrationDate),
            "document_date" => Ok(SortCriterion::DocumentDate),
            "title" => Ok(SortCriterion::Title),
            other => Err(Error::InvalidQuery(format!(
                "unknown sort criterion '{}'",
                other
            ))),
        }
    }
}

/// Comparison operator applied by a filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOperator {
    #[default]
    Equals,
    Contains,
    Range,
}

impl FilterOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Equals => "equals",
            FilterOperator::Contains => "contains",
            FilterOperator::Range => "range",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "equals" => Ok(FilterOperator::Equals),
            "contains" => Ok(FilterOperator::Contains),
            "range" => Ok(FilterOperator::Range),
            other => Err(Error::InvalidQuery(format!(
                "unknown filter operator '{}'",
                other
            ))),
        }
    }
}

// =============================================================================
// FILTERS
// =============================================================================

/// One selectable value inside a filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterValue {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl FilterValue {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color: None,
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}

/// A facet filter constraining the result set.
///
/// A filter with zero values is semantically "no constraint" and is dropped
/// during [`SearchQuery::normalized`] before submission to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    pub id: String,
    /// Display name shown to the user.
    pub name: String,
    /// Engine field this filter targets (e.g. "tag_ids", "source_id").
    pub field: String,
    #[serde(default)]
    pub negate: bool,
    #[serde(default)]
    pub operator: FilterOperator,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<FilterValue>,
}

impl Filter {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        field: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            field: field.into(),
            negate: false,
            operator: FilterOperator::Equals,
            values: Vec::new(),
        }
    }

    pub fn negated(mut self) -> Self {
        self.negate = true;
        self
    }

    pub fn with_operator(mut self, operator: FilterOperator) -> Self {
        self.operator = operator;
        self
    }

    pub fn with_value(mut self, value: FilterValue) -> Self {
        self.values.push(value);
        self
    }

    /// Whether this filter constrains anything at all.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

// =============================================================================
// SEARCH QUERY
// =============================================================================

/// A faceted search request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Search term; may be empty (browse-everything queries are valid).
    #[serde(default)]
    pub term: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<Filter>,
    #[serde(default)]
    pub sort: SortCriterion,
    /// Requested page, 1-based.
    pub page: u32,
    pub page_size: u32,
    /// Maximum facet values returned per facet.
    pub facet_limit: u32,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            term: String::new(),
            filters: Vec::new(),
            sort: SortCriterion::Relevance,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            facet_limit: DEFAULT_FACET_LIMIT,
        }
    }
}

impl SearchQuery {
    /// Create a query for the given term with default pagination.
    pub fn new(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            ..Default::default()
        }
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn with_sort(mut self, sort: SortCriterion) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Clamp the page size into `[1, MAX_PAGE_SIZE]` and drop filters that
    /// carry no values.
    pub fn normalized(mut self) -> Self {
        self.page_size = self.page_size.clamp(1, MAX_PAGE_SIZE);
        self.filters.retain(|f| !f.is_empty());
        self
    }

    /// Reject invariant violations before the engine is called, naming the
    /// constraint that failed.
    pub fn validate(&self) -> Result<()> {
        if self.page < 1 {
            return Err(Error::InvalidQuery(format!(
                "page must be >= 1 (got {})",
                self.page
            )));
        }
        if self.page_size < 1 || self.page_size > MAX_PAGE_SIZE {
            return Err(Error::InvalidQuery(format!(
                "page_size must be in [1, {}] (got {})",
                MAX_PAGE_SIZE, self.page_size
            )));
        }
        if self.facet_limit < 1 {
            return Err(Error::InvalidQuery(format!(
                "facet_limit must be >= 1 (got {})",
                self.facet_limit
            )));
        }
        for filter in &self.filters {
            if filter.field.is_empty() {
                return Err(Error::InvalidQuery(format!(
                    "filter '{}' targets an empty field",
                    filter.id
                )));
            }
        }
        Ok(())
    }
}
