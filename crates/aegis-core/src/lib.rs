//! # aegis-core
//!
//! Core types, traits, and abstractions for the Aegis search core.
//!
//! This crate provides the foundational data structures and trait
//! definitions that the other Aegis crates depend on: the search query
//! model, the domain entities, the collaborator traits, and the shared
//! error and audit types.

pub mod audit;
pub mod error;
pub mod logging;
pub mod models;
pub mod query;
pub mod traits;

// Re-export commonly used types at crate root
pub use audit::{AuditEvent, AuditLog, NoOpAuditLog, TracingAuditLog};
pub use error::{Error, Result};
pub use models::*;
pub use query::{
    Filter, FilterOperator, FilterValue, SearchQuery, SortCriterion, DEFAULT_FACET_LIMIT,
    DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE,
};
pub use traits::{
    EntityLookup, Resolution, SavedSearchStore, SearchEngine, VisibilityScopeProvider,
};
