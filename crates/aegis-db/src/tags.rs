//! Tag lookup.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use aegis_core::{CallerIdentity, EntityLookup, Resolution, Result, Tag};

/// PostgreSQL implementation of `EntityLookup<Tag>`.
///
/// Tags are platform-wide, so a requested id either resolves or is gone;
/// there is no per-tag authorization.
#[derive(Clone)]
pub struct PgTagLookup {
    pool: PgPool,
}

impl PgTagLookup {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EntityLookup<Tag> for PgTagLookup {
    async fn get_batch(
        &self,
        _caller: &CallerIdentity,
        ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Resolution<Tag>>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query(
            r#"
            SELECT id, name, category, color
            FROM tag
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        let mut resolved: HashMap<Uuid, Resolution<Tag>> = HashMap::new();
        for row in rows {
            let id: Uuid = row.get("id");
            resolved.insert(
                id,
                Resolution::Found(Tag {
                    id,
                    name: row.get("name"),
                    category: row.get("category"),
                    color: row.get("color"),
                }),
            );
        }
        for id in ids {
            resolved.entry(*id).or_insert(Resolution::NotFound);
        }

        Ok(resolved)
    }
}
