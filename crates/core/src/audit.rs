//! Observability sink for query outcomes.
//!
//! The sink is fire-and-forget and infallible by contract: a failing
//! sink must never fail a query. Records carry a scrubbed, truncated
//! preview of the query text, never the full statement.

use floe_common::models::{Role, WarehouseSize};
use serde::Serialize;

/// What happened to a query submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditOutcome {
    Completed,
    Denied,
    Failed,
}

impl AuditOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditOutcome::Completed => "completed",
            AuditOutcome::Denied => "denied",
            AuditOutcome::Failed => "failed",
        }
    }
}

/// One record per query submission.
#[derive(Debug, Clone, Serialize)]
pub struct AuditRecord {
    pub identity: String,
    pub role: Role,
    /// Scrubbed and truncated; see `floe_common::scrubber::preview`.
    pub query_preview: String,
    pub size_hint: Option<WarehouseSize>,
    pub outcome: AuditOutcome,
    /// Rows returned to the caller. Completed queries only.
    pub rows: Option<usize>,
    pub truncated: bool,
    /// Denial reason or failure cause for non-completed outcomes.
    pub detail: Option<String>,
}

pub trait AuditSink: Send + Sync {
    fn record(&self, record: &AuditRecord);
}

/// Default sink: emits structured events with `target = "audit"`, which
/// the telemetry bootstrap routes to a rolling JSONL file when audit
/// logging is enabled.
#[derive(Debug, Default, Clone)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, record: &AuditRecord) {
        tracing::info!(
            target: "audit",
            identity = %record.identity,
            role = %record.role,
            query = %record.query_preview,
            size_hint = ?record.size_hint,
            outcome = record.outcome.as_str(),
            rows = record.rows,
            truncated = record.truncated,
            detail = record.detail.as_deref(),
            "query audit"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&AuditOutcome::Completed).unwrap(),
            "\"completed\""
        );
        assert_eq!(AuditOutcome::Denied.as_str(), "denied");
    }

    #[test]
    fn test_record_serializes_for_shipping() {
        let record = AuditRecord {
            identity: "alice".to_string(),
            role: Role::Analyst,
            query_preview: "SELECT 1".to_string(),
            size_hint: Some(WarehouseSize::M),
            outcome: AuditOutcome::Completed,
            rows: Some(1),
            truncated: false,
            detail: None,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["identity"], "alice");
        assert_eq!(json["role"], "analyst");
        assert_eq!(json["size_hint"], "m");
        assert_eq!(json["outcome"], "completed");
    }
}
