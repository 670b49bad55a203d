//! User account lookup (registrant facet).

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use aegis_core::{CallerIdentity, EntityLookup, Resolution, Result, UserAccount};

/// PostgreSQL implementation of `EntityLookup<UserAccount>`.
#[derive(Clone)]
pub struct PgUserLookup {
    pool: PgPool,
}

impl PgUserLookup {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EntityLookup<UserAccount> for PgUserLookup {
    async fn get_batch(
        &self,
        _caller: &CallerIdentity,
        ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Resolution<UserAccount>>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        // Deactivated accounts stay resolvable: their registrations remain
        // attributed on result pages.
        let rows = sqlx::query(
            r#"
            SELECT id, username, display_name
            FROM app_user
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        let mut resolved: HashMap<Uuid, Resolution<UserAccount>> = HashMap::new();
        for row in rows {
            let id: Uuid = row.get("id");
            resolved.insert(
                id,
                Resolution::Found(UserAccount {
                    id,
                    username: row.get("username"),
                    display_name: row.get("display_name"),
                }),
            );
        }
        for id in ids {
            resolved.entry(*id).or_insert(Resolution::NotFound);
        }

        Ok(resolved)
    }
}
