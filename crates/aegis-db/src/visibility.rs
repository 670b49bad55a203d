//! Default visibility scope from group membership.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use aegis_core::{CallerIdentity, Result, VisibilityScope, VisibilityScopeProvider};

/// PostgreSQL implementation of [`VisibilityScopeProvider`].
///
/// A caller's default scope is the set of visibility groups they are a
/// member of. An empty scope is valid and simply matches nothing.
#[derive(Clone)]
pub struct PgVisibilityScopeProvider {
    pool: PgPool,
}

impl PgVisibilityScopeProvider {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VisibilityScopeProvider for PgVisibilityScopeProvider {
    async fn default_scope(&self, caller: &CallerIdentity) -> Result<VisibilityScope> {
        let group_ids: Vec<Uuid> = sqlx::query_scalar(
            r#"
            SELECT group_id
            FROM user_group_membership
            WHERE user_id = $1
            ORDER BY group_id
            "#,
        )
        .bind(caller.user_id)
        .fetch_all(&self.pool)
        .await?;

        debug!(
            subsystem = "db",
            component = "visibility",
            op = "default_scope",
            user_id = %caller.user_id,
            group_count = group_ids.len(),
            "Resolved default visibility scope"
        );

        Ok(VisibilityScope::new(group_ids))
    }
}
