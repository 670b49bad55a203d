//! End-to-end aggregation pipeline tests with in-memory collaborators.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use aegis_search::{
    encode_route_params, parse_route_params, CallerIdentity, Classification, DocumentSummary,
    EntityLookup, EntityLookups, FacetCount, FacetSearchResponse, Filter, FilterValue,
    IntelSource, NoOpAuditLog, Resolution, Result, SavedSearch, SavedSearchScope,
    SavedSearchService, SavedSearchStore, SearchAggregator, SearchEngine, SearchHit, SearchQuery,
    SortCriterion, Tag, UserAccount, VisibilityScope, VisibilityScopeProvider,
};

struct FixedEngine {
    response: FacetSearchResponse,
}

#[async_trait]
impl SearchEngine for FixedEngine {
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
        Ok(vec![])
    }
}

struct MapLookup<T> {
    map: HashMap<Uuid, Resolution<T>>,
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

struct EveryoneScope;

#[async_trait]
impl VisibilityScopeProvider for EveryoneScope {
    async fn default_scope(&self, _caller: &CallerIdentity) -> Result<VisibilityScope> {
        Ok(VisibilityScope::new(vec![Uuid::nil()]))
    }
}

#[derive(Default)]
struct MemoryStore {
    default: std::sync::Mutex<Option<SavedSearch>>,
}

#[async_trait]
impl SavedSearchStore for MemoryStore {
    async fn get_default(&self, _owner_id: Uuid) -> Result<Option<SavedSearch>> {
        Ok(self.default.lock().unwrap().clone())
    }

    async fn create(&self, search: &SavedSearch) -> Result<()> {
        *self.default.lock().unwrap() = Some(search.clone());
        Ok(())
    }

    async fn update(&self, search: &SavedSearch) -> Result<()> {
        *self.default.lock().unwrap() = Some(search.clone());
        Ok(())
    }
}

struct Fixture {
    doc_visible: Uuid,
    doc_unauthorized: Uuid,
    doc_stale: Uuid,
    tag_actor: Uuid,
    tag_malware: Uuid,
    classification: Uuid,
    source: Uuid,
    registrant: Uuid,
}

impl Fixture {
    fn new() -> Self {
        Self {
            doc_visible: Uuid::new_v4(),
            doc_unauthorized: Uuid::new_v4(),
            doc_stale: Uuid::new_v4(),
            tag_actor: Uuid::new_v4(),
            tag_malware: Uuid::new_v4(),
            classification: Uuid::new_v4(),
            source: Uuid::new_v4(),
            registrant: Uuid::new_v4(),
        }
    }

    fn engine_response(&self) -> FacetSearchResponse {
        let hit = |id: Uuid, position: u32| SearchHit {
            document_id: id,
            excerpt: Some("…<em>apt29</em>…".to_string()),
            title_excerpt: None,
            position,
        };
        FacetSearchResponse {
            hits: vec![
                hit(self.doc_visible, 1),
                hit(self.doc_unauthorized, 2),
                hit(self.doc_stale, 3),
            ],
            total_hits: 73,
            tag_facets: vec![
                FacetCount::new(self.tag_actor.to_string(), 31),
                FacetCount::new(self.tag_malware.to_string(), 18),
                FacetCount::new("corrupted-key", 2),
            ],
            classification_facets: vec![FacetCount::new(self.classification.to_string(), 40)],
            source_facets: vec![FacetCount::new(self.source.to_string(), 22)],
            reliability_facets: vec![FacetCount::new("B", 51), FacetCount::new("C", 22)],
            registrant_facets: vec![FacetCount::new(self.registrant.to_string(), 12)],
        }
    }

    fn aggregator(&self) -> SearchAggregator {
        let document = DocumentSummary {
            id: self.doc_visible,
            title: "APT29 phishing wave".to_string(),
            registered_at: Utc::now(),
            document_date: None,
            classification_id: Some(self.classification),
            source_id: Some(self.source),
            registrant_id: self.registrant,
            visibility_group_id: Uuid::nil(),
        };
        let documents = HashMap::from([
            (self.doc_visible, Resolution::Found(document)),
            (self.doc_unauthorized, Resolution::Unauthorized),
            // doc_stale deliberately absent: index/database skew
        ]);
        let tags = HashMap::from([
            (
                self.tag_actor,
                Resolution::Found(Tag {
                    id: self.tag_actor,
                    name: "APT29".to_string(),
                    category: "actor".to_string(),
                    color: Some("#aa0000".to_string()),
                }),
            ),
            (
                self.tag_malware,
                Resolution::Found(Tag {
                    id: self.tag_malware,
                    name: "WellMess".to_string(),
                    category: "malware".to_string(),
                    color: None,
                }),
            ),
        ]);
        let classifications = HashMap::from([(
            self.classification,
            Resolution::Found(Classification {
                id: self.classification,
                name: "Restricted".to_string(),
                abbreviation: Some("R".to_string()),
            }),
        )]);
        let sources = HashMap::from([(
            self.source,
            Resolution::Found(IntelSource {
                id: self.source,
                name: "Partner feed".to_string(),
                reliability: Some("B".to_string()),
            }),
        )]);
        let users = HashMap::from([(
            self.registrant,
            Resolution::Found(UserAccount {
                id: self.registrant,
                username: "jdoe".to_string(),
                display_name: "J. Doe".to_string(),
            }),
        )]);

        SearchAggregator::new(
            Arc::new(FixedEngine {
                response: self.engine_response(),
            }),
            EntityLookups {
                documents: Arc::new(MapLookup { map: documents }),
                tags: Arc::new(MapLookup { map: tags }),
                classifications: Arc::new(MapLookup {
                    map: classifications,
                }),
                sources: Arc::new(MapLookup { map: sources }),
                users: Arc::new(MapLookup { map: users }),
            },
            Arc::new(EveryoneScope),
            Arc::new(NoOpAuditLog),
        )
    }
}

fn caller() -> CallerIdentity {
    CallerIdentity::new(Uuid::new_v4(), "analyst")
}

#[tokio::test]
async fn full_pipeline_produces_degraded_but_complete_page() {
    let fixture = Fixture::new();
    let result = fixture
        .aggregator()
        .execute(SearchQuery::new("apt29").with_page_size(10), &caller())
        .await
        .unwrap();

    // Only the resolvable, authorized hit survives; the other two are
    // counted, not fatal.
    assert_eq!(result.documents.len(), 1);
    assert_eq!(result.documents[0].document.id, fixture.doc_visible);
    assert_eq!(result.unresolved_hits, 2);

    // Tag facets grouped by category, corrupted key dropped.
    assert_eq!(result.tag_groups.len(), 2);
    assert_eq!(result.tag_groups[0].category, "actor");
    assert_eq!(result.tag_groups[1].category, "malware");
    assert_eq!(result.unresolved_facets, 1);

    // Remaining verticals resolved with engine counts intact.
    assert_eq!(result.classifications[0].entity.name, "Restricted");
    assert_eq!(result.classifications[0].count, 40);
    assert_eq!(result.sources[0].entity.name, "Partner feed");
    assert_eq!(result.registrants[0].entity.username, "jdoe");

    // Reliability counts pass through unresolved.
    assert_eq!(result.reliabilities.len(), 2);
    assert_eq!(result.reliabilities[0], FacetCount::new("B", 51));

    assert_eq!(result.total_hits, 73);
    assert_eq!(result.page_count, 8); // ceil(73 / 10)
}

#[tokio::test]
async fn saved_default_round_trips_through_route_params() {
    let store = Arc::new(MemoryStore::default());
    let service = SavedSearchService::new(store, Arc::new(NoOpAuditLog));
    let caller = caller();

    let query = SearchQuery::new("midnight blizzard")
        .with_sort(SortCriterion::RegistrationDate)
        .with_page_size(25)
        .with_filter(
            Filter::new("f-tags", "Tags", "tag_ids")
                .with_value(FilterValue::new("v1", "APT29").with_color("#aa0000")),
        );

    let saved = service.save_as_default(&query, &caller).await.unwrap();
    assert_eq!(saved.scope, SavedSearchScope::Private);

    // Encode the saved default into a shareable link and parse it back.
    let params = encode_route_params(&saved, "");
    let parsed = parse_route_params(&params).unwrap();

    assert_eq!(parsed.term, "midnight blizzard");
    assert_eq!(parsed.sort, SortCriterion::RegistrationDate);
    assert_eq!(parsed.page_size, 25);
    assert_eq!(parsed.filters, saved.filters);

    // Saving again overwrites the same private default.
    let again = service
        .save_as_default(&SearchQuery::new("turla"), &caller)
        .await
        .unwrap();
    assert_eq!(again.id, saved.id);
    assert_eq!(again.term, "turla");
}
