//! Saved search persistence.
//!
//! A saved search row carries the full query configuration; its filters are
//! stored as a JSONB document. The per-user default is a separate mapping
//! table (`user_default_search`), so a shared public search can be someone's
//! default without being owned by them.

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tracing::info;
use uuid::Uuid;

use aegis_core::{
    Error, Filter, Result, SavedSearch, SavedSearchScope, SavedSearchStore, SortCriterion,
};

/// Stable text representation of a scope, used as the column value.
pub fn scope_to_str(scope: SavedSearchScope) -> &'static str {
    match scope {
        SavedSearchScope::Private => "private",
        SavedSearchScope::Public => "public",
    }
}

/// Parse a scope column value; an unknown value is data corruption and
/// surfaces as an error rather than defaulting.
pub fn scope_from_str(s: &str) -> Result<SavedSearchScope> {
    match s {
        "private" => Ok(SavedSearchScope::Private),
        "public" => Ok(SavedSearchScope::Public),
        other => Err(Error::Internal(format!(
            "unknown saved-search scope '{}'",
            other
        ))),
    }
}

/// PostgreSQL implementation of [`SavedSearchStore`].
#[derive(Clone)]
pub struct PgSavedSearchStore {
    pool: PgPool,
}

impl PgSavedSearchStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_search(row: &sqlx::postgres::PgRow) -> Result<SavedSearch> {
        let scope: String = row.get("scope");
        let sort: String = row.get("sort");
        let filters: serde_json::Value = row.get("filters");
        let filters: Vec<Filter> = serde_json::from_value(filters)?;
        let page_size: i32 = row.get("page_size");

        Ok(SavedSearch {
            id: row.get("id"),
            owner_id: row.get("owner_id"),
            scope: scope_from_str(&scope)?,
            term: row.get("term"),
            filters,
            sort: SortCriterion::parse(&sort)?,
            page_size: page_size as u32,
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        })
    }
}

#[async_trait]
impl SavedSearchStore for PgSavedSearchStore {
    async fn get_default(&self, owner_id: Uuid) -> Result<Option<SavedSearch>> {
        let row = sqlx::query(
            r#"
            SELECT s.id, s.owner_id, s.scope, s.term, s.filters, s.sort,
                   s.page_size, s.created_at, s.updated_at
            FROM saved_search s
            JOIN user_default_search d ON d.saved_search_id = s.id
            WHERE d.user_id = $1
            "#,
        )
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::row_to_search).transpose()
    }

    async fn create(&self, search: &SavedSearch) -> Result<()> {
        let filters = serde_json::to_value(&search.filters)?;

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO saved_search
                (id, owner_id, scope, term, filters, sort, page_size,
                 created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(search.id)
        .bind(search.owner_id)
        .bind(scope_to_str(search.scope))
        .bind(&search.term)
        .bind(&filters)
        .bind(search.sort.as_str())
        .bind(search.page_size as i32)
        .bind(search.created_at)
        .bind(search.updated_at)
        .execute(&mut *tx)
        .await?;

        // Creating through this store always marks the search as the
        // owner's default landing search.
        sqlx::query(
            r#"
            INSERT INTO user_default_search (user_id, saved_search_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id) DO UPDATE SET saved_search_id = $2
            "#,
        )
        .bind(search.owner_id)
        .bind(search.id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(
            subsystem = "db",
            component = "saved_searches",
            op = "create",
            saved_search_id = %search.id,
            user_id = %search.owner_id,
            "Created saved search and set as default"
        );

        Ok(())
    }

    async fn update(&self, search: &SavedSearch) -> Result<()> {
        let filters = serde_json::to_value(&search.filters)?;

        let result = sqlx::query(
            r#"
            UPDATE saved_search
            SET term = $2, filters = $3, sort = $4, page_size = $5,
                updated_at = $6
            WHERE id = $1
            "#,
        )
        .bind(search.id)
        .bind(&search.term)
        .bind(&filters)
        .bind(search.sort.as_str())
        .bind(search.page_size as i32)
        .bind(search.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::SavedSearchNotFound(search.id));
        }

        info!(
            subsystem = "db",
            component = "saved_searches",
            op = "update",
            saved_search_id = %search.id,
            user_id = %search.owner_id,
            "Updated saved search"
        );

        Ok(())
    }
}
