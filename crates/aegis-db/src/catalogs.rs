//! Catalog lookups: classifications and intelligence sources.
//!
//! Both are small platform-wide reference tables with the same resolution
//! shape as tags (Found or NotFound, no per-row authorization).

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use aegis_core::{CallerIdentity, Classification, EntityLookup, IntelSource, Resolution, Result};

/// PostgreSQL implementation of `EntityLookup<Classification>`.
#[derive(Clone)]
pub struct PgClassificationLookup {
    pool: PgPool,
}

impl PgClassificationLookup {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EntityLookup<Classification> for PgClassificationLookup {
    async fn get_batch(
        &self,
        _caller: &CallerIdentity,
        ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Resolution<Classification>>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query(
            r#"
            SELECT id, name, abbreviation
            FROM classification
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        let mut resolved: HashMap<Uuid, Resolution<Classification>> = HashMap::new();
        for row in rows {
            let id: Uuid = row.get("id");
            resolved.insert(
                id,
                Resolution::Found(Classification {
                    id,
                    name: row.get("name"),
                    abbreviation: row.get("abbreviation"),
                }),
            );
        }
        for id in ids {
            resolved.entry(*id).or_insert(Resolution::NotFound);
        }

        Ok(resolved)
    }
}

/// PostgreSQL implementation of `EntityLookup<IntelSource>`.
#[derive(Clone)]
pub struct PgSourceLookup {
    pool: PgPool,
}

impl PgSourceLookup {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EntityLookup<IntelSource> for PgSourceLookup {
    async fn get_batch(
        &self,
        _caller: &CallerIdentity,
        ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Resolution<IntelSource>>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query(
            r#"
            SELECT id, name, reliability
            FROM intel_source
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        let mut resolved: HashMap<Uuid, Resolution<IntelSource>> = HashMap::new();
        for row in rows {
            let id: Uuid = row.get("id");
            resolved.insert(
                id,
                Resolution::Found(IntelSource {
                    id,
                    name: row.get("name"),
                    reliability: row.get("reliability"),
                }),
            );
        }
        for id in ids {
            resolved.entry(*id).or_insert(Resolution::NotFound);
        }

        Ok(resolved)
    }
}
