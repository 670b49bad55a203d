//! Visibility-scoped document lookup.
//!
//! Documents are the only entity kind gated per-row by visibility groups:
//! a row the caller's groups do not cover resolves as
//! [`Resolution::Unauthorized`] rather than being silently omitted, so the
//! aggregator can distinguish skew from authorization and count both.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use aegis_core::{CallerIdentity, DocumentSummary, EntityLookup, Resolution, Result};

/// PostgreSQL implementation of `EntityLookup<DocumentSummary>`.
#[derive(Clone)]
pub struct PgDocumentLookup {
    pool: PgPool,
}

impl PgDocumentLookup {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EntityLookup<DocumentSummary> for PgDocumentLookup {
    async fn get_batch(
        &self,
        caller: &CallerIdentity,
        ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Resolution<DocumentSummary>>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query(
            r#"
            SELECT
                d.id,
                d.title,
                d.registered_at,
                d.document_date,
                d.classification_id,
                d.source_id,
                d.registrant_id,
                d.visibility_group_id,
                EXISTS (
                    SELECT 1
                    FROM user_group_membership m
                    WHERE m.group_id = d.visibility_group_id
                      AND m.user_id = $2
                ) AS authorized
            FROM document d
            WHERE d.id = ANY($1)
              AND d.deleted_at IS NULL
            "#,
        )
        .bind(ids)
        .bind(caller.user_id)
        .fetch_all(&self.pool)
        .await?;

        let mut resolved: HashMap<Uuid, Resolution<DocumentSummary>> = HashMap::new();
        for row in rows {
            let id: Uuid = row.get("id");
            let authorized: bool = row.get("authorized");
            let resolution = if authorized {
                Resolution::Found(DocumentSummary {
                    id,
                    title: row.get("title"),
                    registered_at: row.get("registered_at"),
                    document_date: row.get("document_date"),
                    classification_id: row.get("classification_id"),
                    source_id: row.get("source_id"),
                    registrant_id: row.get("registrant_id"),
                    visibility_group_id: row.get("visibility_group_id"),
                })
            } else {
                Resolution::Unauthorized
            };
            resolved.insert(id, resolution);
        }

        // Every requested id gets a tag, even when the row is gone.
        for id in ids {
            resolved.entry(*id).or_insert(Resolution::NotFound);
        }

        Ok(resolved)
    }
}
