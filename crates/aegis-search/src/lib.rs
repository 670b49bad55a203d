//! # aegis-search
//!
//! Faceted search aggregation for the Aegis platform.
//!
//! This crate provides:
//! - [`SearchAggregator`]: merges engine hits and facet counts with
//!   authorization-filtered entity lookups into a paginated result
//! - The saved-search route parameter codec ([`encode_route_params`] /
//!   [`parse_route_params`])
//! - [`SavedSearchService`]: the save-as-default ownership branch
//! - [`HttpSearchEngine`]: a JSON client for the external engine
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use aegis_search::{EntityLookups, HttpSearchEngine, SearchAggregator};
//! use aegis_core::{SearchQuery, TracingAuditLog};
//!
//! let db = aegis_db::Database::connect("postgres://...").await?;
//! let aggregator = SearchAggregator::new(
//!     Arc::new(HttpSearchEngine::from_env()),
//!     EntityLookups {
//!         documents: Arc::new(db.documents.clone()),
//!         tags: Arc::new(db.tags.clone()),
//!         classifications: Arc::new(db.classifications.clone()),
//!         sources: Arc::new(db.sources.clone()),
//!         users: Arc::new(db.users.clone()),
//!     },
//!     Arc::new(db.visibility.clone()),
//!     Arc::new(TracingAuditLog),
//! );
//!
//! let result = aggregator.execute(SearchQuery::new("apt29"), &caller).await?;
//! ```

pub mod aggregator;
pub mod defaults;
pub mod engine;
pub mod route;

// Re-export core types
pub use aegis_core::*;

pub use aggregator::{EntityLookups, SearchAggregator, DEFAULT_SUGGEST_ACCURACY};
pub use defaults::SavedSearchService;
pub use engine::{HttpSearchEngine, DEFAULT_ENGINE_URL, ENGINE_TIMEOUT_SECS};
pub use route::{encode_route_params, parse_route_params};
