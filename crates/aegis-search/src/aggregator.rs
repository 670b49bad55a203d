//! Faceted search aggregation.
//!
//! [`SearchAggregator`] turns a [`SearchQuery`] plus a caller identity into
//! an [`AggregatedResult`], tolerating partial inconsistency between the
//! search engine's index and the system of record: a hit or facet value the
//! engine knows about but the database no longer has (or the caller may not
//! see) is dropped and counted, never fatal. Only an unreachable engine, an
//! invalid query, or an infrastructure failure aborts the request.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

use serde_json::json;
use tracing::{debug, info};
use uuid::Uuid;

use aegis_core::{
    page_count, AggregatedResult, AuditEvent, AuditLog, CallerIdentity, Classification,
    DocumentResult, DocumentSummary, EntityLookup, FacetCount, IntelSource, Resolution, Result,
    SearchEngine, SearchQuery, Tag, TagFacetGroup, UserAccount, VerticalResult,
    VisibilityScopeProvider,
};

/// Accuracy passed to the engine's suggester when the caller does not care.
pub const DEFAULT_SUGGEST_ACCURACY: f32 = 0.7;

/// The entity lookups the aggregator resolves hits and facets against,
/// one per entity kind.
#[derive(Clone)]
pub struct EntityLookups {
    pub documents: Arc<dyn EntityLookup<DocumentSummary>>,
    pub tags: Arc<dyn EntityLookup<Tag>>,
    pub classifications: Arc<dyn EntityLookup<Classification>>,
    pub sources: Arc<dyn EntityLookup<IntelSource>>,
    pub users: Arc<dyn EntityLookup<UserAccount>>,
}

/// Combines engine hits and facet counts with authoritative entity lookups
/// into a paginated, faceted result view-model.
#[derive(Clone)]
pub struct SearchAggregator {
    engine: Arc<dyn SearchEngine>,
    lookups: EntityLookups,
    scope_provider: Arc<dyn VisibilityScopeProvider>,
    audit: Arc<dyn AuditLog>,
}

impl SearchAggregator {
    pub fn new(
        engine: Arc<dyn SearchEngine>,
        lookups: EntityLookups,
        scope_provider: Arc<dyn VisibilityScopeProvider>,
        audit: Arc<dyn AuditLog>,
    ) -> Self {
        Self {
            engine,
            lookups,
            scope_provider,
            audit,
        }
    }

    /// Run one faceted search for the caller.
    ///
    /// The query is normalized (page-size clamp, empty-filter pruning) and
    /// validated before the engine is called. Output guarantees: document
    /// order follows the engine's ranking, facet verticals follow the
    /// engine's facet ordering, and no entity the caller is not authorized
    /// to view appears anywhere in the result.
    ///
    /// Cancellation is cooperative: dropping the returned future abandons
    /// the outstanding engine and lookup calls; no partial result escapes.
    pub async fn execute(
        &self,
        query: SearchQuery,
        caller: &CallerIdentity,
    ) -> Result<AggregatedResult> {
        let started = Instant::now();
        let query = query.normalized();
        query.validate()?;

        let scope = self.scope_provider.default_scope(caller).await?;
        let response = self.engine.facet_search(caller, &query, &scope).await?;

        // Hit ids are deduplicated for the batched lookup; duplicates in the
        // hit list (index anomalies) still render per hit further down.
        let mut seen = HashSet::new();
        let doc_ids: Vec<Uuid> = response
            .hits
            .iter()
            .map(|hit| hit.document_id)
            .filter(|id| seen.insert(*id))
            .collect();

        let mut unresolved_facets = 0u64;
        let tag_keys = parse_facet_keys("tags", &response.tag_facets, &mut unresolved_facets);
        let classification_keys = parse_facet_keys(
            "classifications",
            &response.classification_facets,
            &mut unresolved_facets,
        );
        let source_keys =
            parse_facet_keys("sources", &response.source_facets, &mut unresolved_facets);
        let registrant_keys = parse_facet_keys(
            "registrants",
            &response.registrant_facets,
            &mut unresolved_facets,
        );

        // The five lookups are read-only and mutually independent; running
        // them concurrently is a latency optimization only.
        let tag_ids = ids_of(&tag_keys);
        let classification_ids = ids_of(&classification_keys);
        let source_ids = ids_of(&source_keys);
        let registrant_ids = ids_of(&registrant_keys);
        let (documents, tags, classifications, sources, users) = futures::try_join!(
            self.lookups.documents.get_batch(caller, &doc_ids),
            self.lookups.tags.get_batch(caller, &tag_ids),
            self.lookups
                .classifications
                .get_batch(caller, &classification_ids),
            self.lookups.sources.get_batch(caller, &source_ids),
            self.lookups.users.get_batch(caller, &registrant_ids),
        )?;

        // Step 3: emit result tuples in ranking order, skipping hits the
        // system of record no longer resolves (index/database skew).
        let mut unresolved_hits = 0u64;
        let mut results = Vec::with_capacity(response.hits.len());
        for hit in &response.hits {
            match documents.get(&hit.document_id) {
                Some(Resolution::Found(document)) => results.push(DocumentResult {
                    document: document.clone(),
                    excerpt: hit.excerpt.clone(),
                    title_excerpt: hit.title_excerpt.clone(),
                    position: hit.position,
                }),
                _ => {
                    debug!(
                        subsystem = "search",
                        component = "aggregator",
                        op = "execute",
                        document_id = %hit.document_id,
                        "Hit could not be resolved; skipping"
                    );
                    unresolved_hits += 1;
                }
            }
        }

        let tag_entries = resolve_vertical(&tag_keys, &tags, &mut unresolved_facets);
        let classifications =
            resolve_vertical(&classification_keys, &classifications, &mut unresolved_facets);
        let sources = resolve_vertical(&source_keys, &sources, &mut unresolved_facets);
        let registrants = resolve_vertical(&registrant_keys, &users, &mut unresolved_facets);
        let tag_groups = group_tags_by_category(tag_entries);

        let elapsed_ms = started.elapsed().as_millis() as u64;
        let result = AggregatedResult {
            documents: results,
            tag_groups,
            classifications,
            sources,
            registrants,
            reliabilities: response.reliability_facets.clone(),
            total_hits: response.total_hits,
            elapsed_ms,
            page_count: page_count(response.total_hits, query.page_size),
            unresolved_hits,
            unresolved_facets,
        };

        info!(
            subsystem = "search",
            component = "aggregator",
            op = "execute",
            user_id = %caller.user_id,
            query = %query.term,
            total_hits = result.total_hits,
            result_count = result.documents.len(),
            unresolved_hits = result.unresolved_hits,
            unresolved_facets = result.unresolved_facets,
            duration_ms = elapsed_ms,
            "Search aggregation complete"
        );

        self.audit.record(AuditEvent::new(
            caller.user_id,
            "search.execute",
            json!({
                "term": query.term,
                "page": query.page,
                "total_hits": result.total_hits,
                "unresolved_hits": result.unresolved_hits,
                "unresolved_facets": result.unresolved_facets,
            }),
        ));

        Ok(result)
    }

    /// Suggest similar terms for a query via the engine's suggester.
    pub async fn suggest(&self, term: &str) -> Result<Vec<String>> {
        self.engine
            .suggest_similar(term, DEFAULT_SUGGEST_ACCURACY, true)
            .await
    }
}

/// Parse one facet bucket's keys into UUIDs, dropping unparseable keys with
/// a debug log. A key that is not a UUID means the engine index holds a
/// value the system of record never issued.
fn parse_facet_keys(
    bucket: &'static str,
    facets: &[FacetCount],
    dropped: &mut u64,
) -> Vec<(Uuid, u64)> {
    let mut parsed = Vec::with_capacity(facets.len());
    for facet in facets {
        match Uuid::parse_str(&facet.key) {
            Ok(id) => parsed.push((id, facet.count)),
            Err(_) => {
                debug!(
                    subsystem = "search",
                    component = "aggregator",
                    op = "execute",
                    facet_bucket = bucket,
                    facet_key = %facet.key,
                    "Facet key is not a valid UUID; dropping"
                );
                *dropped += 1;
            }
        }
    }
    parsed
}

fn ids_of(parsed: &[(Uuid, u64)]) -> Vec<Uuid> {
    parsed.iter().map(|(id, _)| *id).collect()
}

/// Build vertical results in the engine's facet order, dropping entries the
/// caller cannot view or that no longer exist.
fn resolve_vertical<T: Clone>(
    parsed: &[(Uuid, u64)],
    resolved: &HashMap<Uuid, Resolution<T>>,
    dropped: &mut u64,
) -> Vec<VerticalResult<T>> {
    let mut verticals = Vec::with_capacity(parsed.len());
    for (id, count) in parsed {
        match resolved.get(id) {
            Some(Resolution::Found(entity)) => verticals.push(VerticalResult {
                entity: entity.clone(),
                count: *count,
            }),
            _ => *dropped += 1,
        }
    }
    verticals
}

/// Group tag verticals under their parent facet category, preserving both
/// the first-appearance order of categories and the engine order within
/// each group.
fn group_tags_by_category(entries: Vec<VerticalResult<Tag>>) -> Vec<TagFacetGroup> {
    let mut groups: Vec<TagFacetGroup> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for entry in entries {
        let category = entry.entity.category.clone();
        match index.get(&category) {
            Some(&i) => groups[i].entries.push(entry),
            None => {
                index.insert(category.clone(), groups.len());
                groups.push(TagFacetGroup {
                    category,
                    entries: vec![entry],
                });
            }
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use aegis_core::{
        Error, FacetSearchResponse, NoOpAuditLog, SearchHit, VisibilityScope,
    };
    use async_trait::async_trait;
    use chrono::Utc;

    struct StaticEngine {
        response: FacetSearchResponse,
    }

    #[async_trait]
    impl SearchEngine for StaticEngine {
        async fn facet_search(
            &self,
            _caller: &CallerIdentity,
            _query: &SearchQuery,
            _scope: &VisibilityScope,
        ) -> Result<FacetSearchResponse> {
            Ok(self.response.clone())
        }

        async fn suggest_similar(
            &self,
            _term: &str,
            _accuracy: f32,
            _fuzzy: bool,
        ) -> Result<Vec<String>> {
            Ok(vec!["emotet".to_string()])
        }
    }

    struct DownEngine;

    #[async_trait]
    impl SearchEngine for DownEngine {
        async fn facet_search(
            &self,
            _caller: &CallerIdentity,
            _query: &SearchQuery,
            _scope: &VisibilityScope,
        ) -> Result<FacetSearchResponse> {
            Err(Error::EngineUnavailable("connection refused".to_string()))
        }

        async fn suggest_similar(
            &self,
            _term: &str,
            _accuracy: f32,
            _fuzzy: bool,
        ) -> Result<Vec<String>> {
            Err(Error::EngineUnavailable("connection refused".to_string()))
        }
    }

    struct MapLookup<T> {
        map: HashMap<Uuid, Resolution<T>>,
    }

    impl<T> MapLookup<T> {
        fn new(map: HashMap<Uuid, Resolution<T>>) -> Self {
            Self { map }
        }

        fn empty() -> Self {
            Self {
                map: HashMap::new(),
            }
        }
    }

    #[async_trait]
    impl<T: Clone + Send + Sync> EntityLookup<T> for MapLookup<T> {
        async fn get_batch(
            &self,
            _caller: &CallerIdentity,
            ids: &[Uuid],
        ) -> Result<HashMap<Uuid, Resolution<T>>> {
            Ok(ids
                .iter()
                .map(|id| {
                    (
                        *id,
                        self.map.get(id).cloned().unwrap_or(Resolution::NotFound),
                    )
                })
                .collect())
        }
    }

    struct StaticScope;

    #[async_trait]
    impl VisibilityScopeProvider for StaticScope {
        async fn default_scope(&self, _caller: &CallerIdentity) -> Result<VisibilityScope> {
            Ok(VisibilityScope::new(vec![Uuid::nil()]))
        }
    }

    fn caller() -> CallerIdentity {
        CallerIdentity::new(Uuid::new_v4(), "analyst")
    }

    fn document(id: Uuid) -> DocumentSummary {
        DocumentSummary {
            id,
            title: format!("doc-{}", id),
            registered_at: Utc::now(),
            document_date: None,
            classification_id: None,
            source_id: None,
            registrant_id: Uuid::new_v4(),
            visibility_group_id: Uuid::nil(),
        }
    }

    fn hit(id: Uuid, position: u32) -> SearchHit {
        SearchHit {
            document_id: id,
            excerpt: Some(format!("...{}...", position)),
            title_excerpt: None,
            position,
        }
    }

    fn aggregator(
        engine: Arc<dyn SearchEngine>,
        documents: MapLookup<DocumentSummary>,
        tags: MapLookup<Tag>,
    ) -> SearchAggregator {
        SearchAggregator::new(
            engine,
            EntityLookups {
                documents: Arc::new(documents),
                tags: Arc::new(tags),
                classifications: Arc::new(MapLookup::empty()),
                sources: Arc::new(MapLookup::empty()),
                users: Arc::new(MapLookup::empty()),
            },
            Arc::new(StaticScope),
            Arc::new(NoOpAuditLog),
        )
    }

    #[tokio::test]
    async fn test_execute_preserves_ranking_order() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let response = FacetSearchResponse {
            hits: vec![hit(b, 1), hit(a, 2), hit(c, 3)],
            total_hits: 3,
            ..Default::default()
        };
        let docs: HashMap<_, _> = [a, b, c]
            .into_iter()
            .map(|id| (id, Resolution::Found(document(id))))
            .collect();

        let agg = aggregator(
            Arc::new(StaticEngine { response }),
            MapLookup::new(docs),
            MapLookup::empty(),
        );
        let result = agg.execute(SearchQuery::new("apt"), &caller()).await.unwrap();

        let order: Vec<Uuid> = result.documents.iter().map(|d| d.document.id).collect();
        assert_eq!(order, vec![b, a, c]);
        assert_eq!(result.unresolved_hits, 0);
    }

    #[tokio::test]
    async fn test_execute_skips_unresolvable_hit_without_error() {
        let (known, stale) = (Uuid::new_v4(), Uuid::new_v4());
        let response = FacetSearchResponse {
            hits: vec![hit(known, 1), hit(stale, 2)],
            total_hits: 2,
            ..Default::default()
        };
        let docs = HashMap::from([(known, Resolution::Found(document(known)))]);

        let agg = aggregator(
            Arc::new(StaticEngine { response }),
            MapLookup::new(docs),
            MapLookup::empty(),
        );
        let result = agg.execute(SearchQuery::new("apt"), &caller()).await.unwrap();

        assert_eq!(result.documents.len(), 1);
        assert_eq!(result.documents[0].document.id, known);
        assert_eq!(result.unresolved_hits, 1);
    }

    #[tokio::test]
    async fn test_execute_duplicate_hit_ids_do_not_crash() {
        let id = Uuid::new_v4();
        let response = FacetSearchResponse {
            hits: vec![hit(id, 1), hit(id, 2)],
            total_hits: 2,
            ..Default::default()
        };
        let docs = HashMap::from([(id, Resolution::Found(document(id)))]);

        let agg = aggregator(
            Arc::new(StaticEngine { response }),
            MapLookup::new(docs),
            MapLookup::empty(),
        );
        let result = agg.execute(SearchQuery::new("apt"), &caller()).await.unwrap();

        // One mapping in the dictionary, both hits render against it.
        assert_eq!(result.documents.len(), 2);
        assert_eq!(result.unresolved_hits, 0);
    }

    #[tokio::test]
    async fn test_execute_drops_unauthorized_facet_value_only() {
        let visible = Uuid::new_v4();
        let hidden = Uuid::new_v4();
        let response = FacetSearchResponse {
            total_hits: 0,
            tag_facets: vec![
                FacetCount::new(visible.to_string(), 9),
                FacetCount::new(hidden.to_string(), 4),
            ],
            ..Default::default()
        };
        let tags = HashMap::from([
            (
                visible,
                Resolution::Found(Tag {
                    id: visible,
                    name: "APT29".to_string(),
                    category: "actor".to_string(),
                    color: None,
                }),
            ),
            (hidden, Resolution::Unauthorized),
        ]);

        let agg = aggregator(
            Arc::new(StaticEngine { response }),
            MapLookup::empty(),
            MapLookup::new(tags),
        );
        let result = agg.execute(SearchQuery::new(""), &caller()).await.unwrap();

        assert_eq!(result.tag_groups.len(), 1);
        assert_eq!(result.tag_groups[0].entries.len(), 1);
        assert_eq!(result.tag_groups[0].entries[0].entity.name, "APT29");
        assert_eq!(result.unresolved_facets, 1);
    }

    #[tokio::test]
    async fn test_execute_drops_non_uuid_facet_key() {
        let response = FacetSearchResponse {
            total_hits: 0,
            tag_facets: vec![FacetCount::new("not-a-uuid", 3)],
            ..Default::default()
        };

        let agg = aggregator(
            Arc::new(StaticEngine { response }),
            MapLookup::empty(),
            MapLookup::empty(),
        );
        let result = agg.execute(SearchQuery::new(""), &caller()).await.unwrap();

        assert!(result.tag_groups.is_empty());
        assert_eq!(result.unresolved_facets, 1);
    }

    #[tokio::test]
    async fn test_execute_page_count() {
        let response = FacetSearchResponse {
            total_hits: 101,
            ..Default::default()
        };
        let agg = aggregator(
            Arc::new(StaticEngine { response }),
            MapLookup::empty(),
            MapLookup::empty(),
        );

        let result = agg
            .execute(SearchQuery::new("apt").with_page_size(10), &caller())
            .await
            .unwrap();
        assert_eq!(result.page_count, 11);
    }

    #[tokio::test]
    async fn test_execute_engine_unavailable_propagates() {
        let agg = aggregator(Arc::new(DownEngine), MapLookup::empty(), MapLookup::empty());

        match agg.execute(SearchQuery::new("apt"), &caller()).await {
            Err(Error::EngineUnavailable(_)) => {}
            other => panic!("Expected EngineUnavailable, got {:?}", other.err()),
        }
    }

    #[tokio::test]
    async fn test_execute_rejects_invalid_query_before_engine() {
        // A down engine proves the engine is never consulted.
        let agg = aggregator(Arc::new(DownEngine), MapLookup::empty(), MapLookup::empty());
        let query = SearchQuery::new("apt").with_page(0);

        match agg.execute(query, &caller()).await {
            Err(Error::InvalidQuery(msg)) => assert!(msg.contains("page")),
            other => panic!("Expected InvalidQuery, got {:?}", other.err()),
        }
    }

    #[tokio::test]
    async fn test_group_tags_preserves_category_and_engine_order() {
        let tag = |name: &str, category: &str| VerticalResult {
            entity: Tag {
                id: Uuid::new_v4(),
                name: name.to_string(),
                category: category.to_string(),
                color: None,
            },
            count: 1,
        };
        let groups = group_tags_by_category(vec![
            tag("APT29", "actor"),
            tag("Emotet", "malware"),
            tag("APT28", "actor"),
        ]);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].category, "actor");
        assert_eq!(groups[0].entries[0].entity.name, "APT29");
        assert_eq!(groups[0].entries[1].entity.name, "APT28");
        assert_eq!(groups[1].category, "malware");
    }

    #[tokio::test]
    async fn test_suggest_delegates_to_engine() {
        let agg = aggregator(
            Arc::new(StaticEngine {
                response: FacetSearchResponse::default(),
            }),
            MapLookup::empty(),
            MapLookup::empty(),
        );
        assert_eq!(agg.suggest("emotett").await.unwrap(), vec!["emotet"]);
    }
}
