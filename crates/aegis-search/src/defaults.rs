//! Save-as-default service for saved searches.

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use aegis_core::{
    AuditEvent, AuditLog, CallerIdentity, Result, SavedSearch, SavedSearchScope, SavedSearchStore,
    SearchQuery,
};

/// Manages a caller's default landing search.
#[derive(Clone)]
pub struct SavedSearchService {
    store: Arc<dyn SavedSearchStore>,
    audit: Arc<dyn AuditLog>,
}

impl SavedSearchService {
    pub fn new(store: Arc<dyn SavedSearchStore>, audit: Arc<dyn AuditLog>) -> Self {
        Self { store, audit }
    }

    /// Persist the current query state as the caller's default search.
    ///
    /// The ownership branch is explicit: an existing *private* default is
    /// overwritten in place (same persisted identity); when there is no
    /// default, or the default is a *public* shared search, a fresh private
    /// copy is created instead. A caller can therefore never clobber a
    /// shared saved search by hitting "save as default".
    pub async fn save_as_default(
        &self,
        query: &SearchQuery,
        caller: &CallerIdentity,
    ) -> Result<SavedSearch> {
        let query = query.clone().normalized();
        query.validate()?;
        let now = Utc::now();

        let saved = match self.store.get_default(caller.user_id).await? {
            Some(mut existing) if existing.is_private() => {
                existing.term = query.term;
                existing.filters = query.filters;
                existing.sort = query.sort;
                existing.page_size = query.page_size;
                existing.updated_at = now;
                self.store.update(&existing).await?;
                existing
            }
            _ => {
                let search = SavedSearch {
                    id: Uuid::new_v4(),
                    owner_id: caller.user_id,
                    scope: SavedSearchScope::Private,
                    term: query.term,
                    filters: query.filters,
                    sort: query.sort,
                    page_size: query.page_size,
                    created_at: now,
                    updated_at: now,
                };
                self.store.create(&search).await?;
                search
            }
        };

        info!(
            subsystem = "search",
            component = "saved_searches",
            op = "save_as_default",
            user_id = %caller.user_id,
            saved_search_id = %saved.id,
            "Saved default search"
        );

        self.audit.record(AuditEvent::new(
            caller.user_id,
            "search.save_default",
            json!({ "saved_search_id": saved.id, "term": saved.term }),
        ));

        Ok(saved)
    }
}
