//! Query orchestration: policy gate, lease acquisition, timeout setup,
//! bounded row collection, and audit emission.

use crate::audit::{AuditOutcome, AuditRecord, AuditSink, TracingAuditSink};
use crate::policy::{self, PolicyDecision};
use crate::pool::{ConnectionLease, ConnectionPool};
use floe_common::config::QueryLimits;
use floe_common::models::{QueryRequest, QueryResult};
use floe_common::scrubber;
use floe_error::ControlPlaneError;
use std::sync::Arc;

pub struct QueryExecutor {
    pool: Arc<ConnectionPool>,
    limits: QueryLimits,
    audit: Arc<dyn AuditSink>,
}

impl QueryExecutor {
    pub fn new(pool: Arc<ConnectionPool>, limits: QueryLimits) -> Self {
        Self {
            pool,
            limits,
            audit: Arc::new(TracingAuditSink),
        }
    }

    pub fn with_audit_sink(mut self, sink: Arc<dyn AuditSink>) -> Self {
        self.audit = sink;
        self
    }

    /// Run one query under the caller's role.
    ///
    /// A policy denial fails before any connection is touched. A failure
    /// after acquisition invalidates the role's pooled connection so a
    /// single bad statement cannot poison subsequent requests, then
    /// surfaces unchanged as [`ControlPlaneError::Execution`]. Every
    /// outcome lands in the audit sink.
    pub async fn execute(&self, request: &QueryRequest) -> Result<QueryResult, ControlPlaneError> {
        if let PolicyDecision::Deny { reason } = policy::evaluate(&request.sql, request.role) {
            self.audit
                .record(&self.record(request, AuditOutcome::Denied, None, Some(reason.clone())));
            return Err(ControlPlaneError::policy(reason));
        }

        let mut lease = match self.pool.acquire(request.role).await {
            Ok(lease) => lease,
            Err(e) => {
                self.audit.record(&self.record(
                    request,
                    AuditOutcome::Failed,
                    None,
                    Some(e.to_string()),
                ));
                return Err(e);
            }
        };

        match self.run_leased(&mut lease, request).await {
            Ok(result) => {
                self.audit
                    .record(&self.record(request, AuditOutcome::Completed, Some(&result), None));
                Ok(result)
            }
            Err(e) => {
                lease.invalidate();
                let cause = format!("{e:#}");
                tracing::warn!(
                    identity = %request.identity,
                    role = %request.role,
                    error = %cause,
                    "query execution failed"
                );
                self.audit.record(&self.record(
                    request,
                    AuditOutcome::Failed,
                    None,
                    Some(cause.clone()),
                ));
                Err(ControlPlaneError::execution(cause))
            }
        }
    }

    async fn run_leased(
        &self,
        lease: &mut ConnectionLease,
        request: &QueryRequest,
    ) -> anyhow::Result<QueryResult> {
        let conn = lease.connection();
        conn.set_statement_timeout(self.limits.statement_timeout())
            .await?;

        let mut stream = conn.execute(&request.sql).await?;
        let columns = stream.columns().to_vec();

        let cap = self.limits.max_result_rows;
        let mut rows = Vec::new();
        let mut truncated = false;
        while let Some(row) = stream.next_row().await? {
            if rows.len() == cap {
                // More rows exist than we will return; stop consuming.
                truncated = true;
                break;
            }
            debug_assert_eq!(row.len(), columns.len());
            rows.push(row);
        }

        Ok(QueryResult {
            columns,
            rows,
            truncated,
        })
    }

    fn record(
        &self,
        request: &QueryRequest,
        outcome: AuditOutcome,
        result: Option<&QueryResult>,
        detail: Option<String>,
    ) -> AuditRecord {
        AuditRecord {
            identity: request.identity.clone(),
            role: request.role,
            query_preview: scrubber::preview(&request.sql),
            size_hint: request.size_hint,
            outcome,
            rows: result.map(QueryResult::row_count),
            truncated: result.map(|r| r.truncated).unwrap_or(false),
            detail,
        }
    }
}
