//! # aegis-db
//!
//! PostgreSQL system-of-record layer for the Aegis search core.
//!
//! This crate provides:
//! - Connection pool management
//! - Batched, authorization-aware entity lookups (documents, tags,
//!   classifications, sources, users)
//! - Visibility scope resolution from group membership
//! - Saved search persistence
//!
//! ## Example
//!
//! ```rust,ignore
//! use aegis_db::Database;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/aegis").await?;
//!     let scope = db.visibility.default_scope(&caller).await?;
//!     let docs = db.documents.get_batch(&caller, &ids).await?;
//!     Ok(())
//! }
//! ```

pub mod catalogs;
pub mod documents;
pub mod pool;
pub mod saved_searches;
pub mod tags;
pub mod users;
pub mod visibility;

// Re-export core types
pub use aegis_core::*;

pub use catalogs::{PgClassificationLookup, PgSourceLookup};
pub use documents::PgDocumentLookup;
pub use pool::{create_pool, create_pool_with_config, PoolConfig};
pub use saved_searches::PgSavedSearchStore;
pub use tags::PgTagLookup;
pub use users::PgUserLookup;
pub use visibility::PgVisibilityScopeProvider;

/// Facade over the connection pool and one repository per concern.
#[derive(Clone)]
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::PgPool,
    /// Visibility-scoped document lookup.
    pub documents: PgDocumentLookup,
    /// Tag lookup.
    pub tags: PgTagLookup,
    /// Classification lookup.
    pub classifications: PgClassificationLookup,
    /// Intelligence source lookup.
    pub sources: PgSourceLookup,
    /// User account lookup (registrant facet).
    pub users: PgUserLookup,
    /// Default visibility scope from group membership.
    pub visibility: PgVisibilityScopeProvider,
    /// Saved search persistence.
    pub saved_searches: PgSavedSearchStore,
}

impl Database {
    /// Connect with default pool configuration.
    pub async fn connect(database_url: &str) -> Result<Self> {
        Self::connect_with_config(database_url, PoolConfig::default()).await
    }

    /// Connect with custom pool configuration.
    pub async fn connect_with_config(database_url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(database_url, config).await?;
        Ok(Self::from_pool(pool))
    }

    /// Build the facade over an existing pool.
    pub fn from_pool(pool: sqlx::PgPool) -> Self {
        Self {
            documents: PgDocumentLookup::new(pool.clone()),
            tags: PgTagLookup::new(pool.clone()),
            classifications: PgClassificationLookup::new(pool.clone()),
            sources: PgSourceLookup::new(pool.clone()),
            users: PgUserLookup::new(pool.clone()),
            visibility: PgVisibilityScopeProvider::new(pool.clone()),
            saved_searches: PgSavedSearchStore::new(pool.clone()),
            pool,
        }
    }
}
