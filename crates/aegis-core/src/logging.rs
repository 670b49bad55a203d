//! Structured logging schema and field name constants for Aegis.
//!
//! All crates use these constants for consistent structured logging fields,
//! so log aggregation tools can query by standardized field names across
//! every subsystem.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires operator attention |
//! | WARN  | Recoverable issue, automatic fallback applied |
//! | INFO  | Operation completions, saved-search writes |
//! | DEBUG | Decision points, dropped hits/facets, index-DB skew |
//! | TRACE | Per-item iteration, high-volume data (hits, facet values) |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Subsystem originating the log event.
/// Values: "search", "db", "engine"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "aggregator", "route_codec", "saved_searches", "pool"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "execute", "facet_search", "save_as_default", "get_batch"
pub const OPERATION: &str = "op";

/// UUID of the requesting user.
pub const USER_ID: &str = "user_id";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Document UUID being operated on.
pub const DOCUMENT_ID: &str = "document_id";

/// Saved search UUID.
pub const SAVED_SEARCH_ID: &str = "saved_search_id";

/// Search query text.
pub const QUERY: &str = "query";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of result documents assembled for the page.
pub const RESULT_COUNT: &str = "result_count";

/// Total hits reported by the engine across all pages.
pub const TOTAL_HITS: &str = "total_hits";

/// Hits the engine returned that could not be resolved against the
/// system of record (index/database skew).
pub const UNRESOLVED_HITS: &str = "unresolved_hits";

/// Facet values dropped during resolution (unauthorized, deleted, or
/// unparseable key).
pub const UNRESOLVED_FACETS: &str = "unresolved_facets";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Boolean success/failure indicator.
pub const SUCCESS: &str = "success";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";
