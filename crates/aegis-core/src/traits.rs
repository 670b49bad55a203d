//! Collaborator traits for the Aegis search core.
//!
//! These traits define the seams between the aggregator and its external
//! collaborators (search engine, system of record, visibility service),
//! enabling pluggable backends and testability.

use std::collections::HashMap;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{CallerIdentity, FacetSearchResponse, SavedSearch, VisibilityScope};
use crate::query::SearchQuery;

// =============================================================================
// RESULT-TAGGED BATCH RESOLUTION
// =============================================================================

/// Per-key outcome of a batched entity lookup.
///
/// Replaces exception-per-item control flow: a batch returns one tag per
/// requested key, and the caller decides what a miss means. The aggregator
/// drops [`NotFound`] and [`Unauthorized`] entries locally and never aborts
/// the request for them.
///
/// [`NotFound`]: Resolution::NotFound
/// [`Unauthorized`]: Resolution::Unauthorized
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution<T> {
    /// The entity exists and the caller may see it.
    Found(T),
    /// No entity with this key exists (deleted, or index/DB skew).
    NotFound,
    /// The entity exists but the caller lacks visibility into it.
    Unauthorized,
}

impl<T> Resolution<T> {
    pub fn is_found(&self) -> bool {
        matches!(self, Resolution::Found(_))
    }

    /// Consume the resolution, yielding the entity if it was found.
    pub fn found(self) -> Option<T> {
        match self {
            Resolution::Found(entity) => Some(entity),
            _ => None,
        }
    }
}

// =============================================================================
// SEARCH ENGINE
// =============================================================================

/// The external full-text search engine, treated as an opaque collaborator.
///
/// An implementation that cannot reach its backend must surface
/// [`Error::EngineUnavailable`](crate::Error::EngineUnavailable); the
/// aggregator propagates that as a hard failure.
#[async_trait]
pub trait SearchEngine: Send + Sync {
    /// Run a faceted query, returning ranked hits, the total hit count, and
    /// raw facet counts per category. Results are pre-restricted to the
    /// given visibility scope.
    async fn facet_search(
        &self,
        caller: &CallerIdentity,
        query: &SearchQuery,
        scope: &VisibilityScope,
    ) -> Result<FacetSearchResponse>;

    /// Suggest spelling-corrected or similar terms for a query.
    async fn suggest_similar(
        &self,
        term: &str,
        accuracy: f32,
        fuzzy: bool,
    ) -> Result<Vec<String>>;
}

// =============================================================================
// ENTITY LOOKUP
// =============================================================================

/// Batched, authorization-aware lookup against the system of record, one
/// implementation per entity kind (document, tag, classification, source,
/// user).
///
/// `get_batch` is the only access path the aggregator uses; per-hit lookups
/// (N+1) are deliberately not part of the contract.
#[async_trait]
pub trait EntityLookup<T>: Send + Sync {
    /// Resolve a batch of ids in a single call. Every requested id appears
    /// in the returned map exactly once, tagged with its [`Resolution`].
    async fn get_batch(
        &self,
        caller: &CallerIdentity,
        ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Resolution<T>>>;
}

// =============================================================================
// VISIBILITY SCOPE
// =============================================================================

/// Supplies the caller's default visibility-group identifiers.
#[async_trait]
pub trait VisibilityScopeProvider: Send + Sync {
    async fn default_scope(&self, caller: &CallerIdentity) -> Result<VisibilityScope>;
}

// =============================================================================
// SAVED SEARCH STORE
// =============================================================================

/// Persistence for saved searches.
#[async_trait]
pub trait SavedSearchStore: Send + Sync {
    /// Fetch the caller's current default search, if any.
    async fn get_default(&self, owner_id: Uuid) -> Result<Option<SavedSearch>>;

    /// Persist a new saved search.
    async fn create(&self, search: &SavedSearch) -> Result<()>;

    /// Overwrite an existing saved search in place.
    async fn update(&self, search: &SavedSearch) -> Result<()>;
}
