//! Structured audit event sink.
//!
//! Audit logging is fire-and-forget: `record` is synchronous, is never
//! awaited for correctness, and a failing sink must not affect the
//! operation being audited.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

/// One structured audit event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// User the event is attributed to.
    pub actor_id: Uuid,
    /// Logical operation, e.g. "search.execute", "search.save_default".
    pub action: String,
    /// Operation-specific structured payload.
    pub detail: JsonValue,
    pub recorded_at: DateTime<Utc>,
}

impl AuditEvent {
    pub fn new(actor_id: Uuid, action: impl Into<String>, detail: JsonValue) -> Self {
        Self {
            actor_id,
            action: action.into(),
            detail,
            recorded_at: Utc::now(),
        }
    }
}

/// Fire-and-forget structured event sink.
pub trait AuditLog: Send + Sync {
    fn record(&self, event: AuditEvent);
}

/// No-op sink for when auditing isn't needed (tests, tooling).
pub struct NoOpAuditLog;

impl AuditLog for NoOpAuditLog {
    fn record(&self, _event: AuditEvent) {}
}

/// Sink that emits audit events as structured `tracing` records.
pub struct TracingAuditLog;

impl AuditLog for TracingAuditLog {
    fn record(&self, event: AuditEvent) {
        // Field names match the constants in `crate::logging`.
        tracing::info!(
            target: "aegis::audit",
            user_id = %event.actor_id,
            op = %event.action,
            detail = %event.detail,
            "audit event"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_audit_event_serialization() {
        let event = AuditEvent::new(
            Uuid::nil(),
            "search.execute",
            json!({ "total_hits": 42 }),
        );
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["action"], "search.execute");
        assert_eq!(value["detail"]["total_hits"], 42);
    }

    #[test]
    fn test_noop_sink_accepts_events() {
        let sink = NoOpAuditLog;
        sink.record(AuditEvent::new(Uuid::new_v4(), "noop", json!({})));
    }

    #[test]
    fn test_tracing_sink_accepts_events() {
        let sink = TracingAuditLog;
        sink.record(AuditEvent::new(Uuid::new_v4(), "search.execute", json!({})));
    }
}
