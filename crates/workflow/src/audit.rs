use tracing::info;

use procura_core::audit::{AuditEvent, AuditSink};

/// Audit sink that forwards events to the tracing pipeline; production
/// deployments read the audit trail out of the structured log stream.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn emit(&self, event: AuditEvent) {
        info!(
            target: "procura::audit",
            event_id = %event.event_id,
            event_type = %event.event_type,
            category = ?event.category,
            request_id = event.request_id.as_ref().map(|id| id.0.as_str()),
            correlation_id = %event.correlation_id,
            actor = %event.actor,
            outcome = ?event.outcome,
            metadata = ?event.metadata,
            "audit event",
        );
    }
}
