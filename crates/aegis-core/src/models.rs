//! Domain models for the Aegis search core.
//!
//! Entities here are the authoritative shapes resolved from the system of
//! record; hit and facet types are the ephemeral shapes the search engine
//! produces per query.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::query::{Filter, SortCriterion};

// =============================================================================
// CALLER IDENTITY & VISIBILITY
// =============================================================================

/// Identity of the requesting user, threaded explicitly into every
/// aggregator call. Used for visibility filtering, never for ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerIdentity {
    pub user_id: Uuid,
    pub username: String,
}

impl CallerIdentity {
    pub fn new(user_id: Uuid, username: impl Into<String>) -> Self {
        Self {
            user_id,
            username: username.into(),
        }
    }
}

/// The set of visibility-group identifiers determining which documents
/// and entities a caller may see.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibilityScope {
    pub group_ids: Vec<Uuid>,
}

impl VisibilityScope {
    pub fn new(group_ids: Vec<Uuid>) -> Self {
        Self { group_ids }
    }

    /// Whether the scope grants access to the given visibility group.
    pub fn contains(&self, group_id: Uuid) -> bool {
        self.group_ids.contains(&group_id)
    }
}

// =============================================================================
// ENTITIES (system of record)
// =============================================================================

/// Summary of a registered intelligence document, as shown on a result page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub id: Uuid,
    pub title: String,
    /// When the document was registered on the platform.
    pub registered_at: DateTime<Utc>,
    /// Date of the underlying source material, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classification_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_id: Option<Uuid>,
    /// User who registered the document.
    pub registrant_id: Uuid,
    /// Visibility group gating who may see this document.
    pub visibility_group_id: Uuid,
}

/// A tag, grouped on result pages by its parent facet category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
    /// Parent facet category (e.g. "actor", "malware", "region").
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// A document classification level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Classification {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub abbreviation: Option<String>,
}

/// An intelligence source a document originates from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntelSource {
    pub id: Uuid,
    pub name: String,
    /// Admiralty-style reliability grade ("A".."F"), when assessed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reliability: Option<String>,
}

/// A platform user (registrant facet).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: Uuid,
    pub username: String,
    pub display_name: String,
}

// =============================================================================
// ENGINE OUTPUT (ephemeral, per query)
// =============================================================================

/// A single ranked hit from the search engine. Produced per query, never
/// persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub document_id: Uuid,
    /// Highlighted body excerpt, when the engine produced one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    /// Highlighted title excerpt, when the engine produced one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_excerpt: Option<String>,
    /// Absolute rank of the hit within the full result set.
    pub position: u32,
}

/// An opaque engine-side facet value: a key (expected to parse as a stable
/// domain UUID for entity facets) plus an occurrence count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetCount {
    pub key: String,
    pub count: u64,
}

impl FacetCount {
    pub fn new(key: impl Into<String>, count: u64) -> Self {
        Self {
            key: key.into(),
            count,
        }
    }
}

/// Everything the engine returns for one faceted query.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FacetSearchResponse {
    pub hits: Vec<SearchHit>,
    /// Total matching documents across all pages.
    pub total_hits: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tag_facets: Vec<FacetCount>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub classification_facets: Vec<FacetCount>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub source_facets: Vec<FacetCount>,
    /// Reliability grades are engine-native strings, never resolved.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reliability_facets: Vec<FacetCount>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub registrant_facets: Vec<FacetCount>,
}

// =============================================================================
// AGGREGATED RESULT (derived, never stored)
// =============================================================================

/// One resolved document hit on a result page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentResult {
    pub document: DocumentSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_excerpt: Option<String>,
    pub position: u32,
}

/// One facet value's contribution to the result set: a resolved entity plus
/// its occurrence count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerticalResult<T> {
    pub entity: T,
    pub count: u64,
}

/// Tag vertical results grouped under their parent facet category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagFacetGroup {
    pub category: String,
    pub entries: Vec<VerticalResult<Tag>>,
}

/// The fully resolved output of one aggregation call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregatedResult {
    /// Resolved document hits, preserving the engine's ranking order.
    pub documents: Vec<DocumentResult>,
    /// Tag facets grouped by parent category, engine ordering preserved
    /// within each group.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tag_groups: Vec<TagFacetGroup>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub classifications: Vec<VerticalResult<Classification>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<VerticalResult<IntelSource>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub registrants: Vec<VerticalResult<UserAccount>>,
    /// Engine-native reliability counts, passed through unresolved.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reliabilities: Vec<FacetCount>,
    pub total_hits: u64,
    /// Wall time spent in the aggregation call.
    pub elapsed_ms: u64,
    /// `ceil(total_hits / page_size)`; a perfectly divisible total yields
    /// no extra page.
    pub page_count: u64,
    /// Hits the engine returned that could not be resolved (index/DB skew).
    pub unresolved_hits: u64,
    /// Facet values dropped during resolution.
    pub unresolved_facets: u64,
}

/// Compute the page count for a total hit count and page size.
pub fn page_count(total_hits: u64, page_size: u32) -> u64 {
    debug_assert!(page_size > 0);
    total_hits.div_ceil(u64::from(page_size.max(1)))
}

// =============================================================================
// SAVED SEARCH (the only persisted entity in this core)
// =============================================================================

/// Ownership tag of a saved search.
///
/// The `save_as_default` branch checks this explicitly: a [`Public`] search
/// is shared and must never be mutated on a user's behalf.
///
/// [`Public`]: SavedSearchScope::Public
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SavedSearchScope {
    /// Owned by a single user; safe to overwrite in place.
    Private,
    /// Shared across users; overwriting requires a private copy instead.
    Public,
}

/// A persisted query configuration a user can reuse or set as their default
/// landing search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedSearch {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub scope: SavedSearchScope,
    pub term: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<Filter>,
    pub sort: SortCriterion,
    pub page_size: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SavedSearch {
    /// Whether this search may be mutated in place on the owner's behalf.
    pub fn is_private(&self) -> bool {
        self.scope == SavedSearchScope::Private
    }
}
