//! The boundary the serving layer consumes.

use crate::executor::QueryExecutor;
use async_trait::async_trait;
use floe_common::models::{QueryRequest, QueryResult, Role, WarehouseSize};
use floe_error::ControlPlaneError;
use std::sync::Arc;

/// Identity collaborator. Credential verification happens upstream; the
/// control plane trusts whatever role this resolver supplies and never
/// re-checks it.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn resolve(&self, identity: &str) -> Option<Role>;
}

/// The single entry point for running queries. Presentation code goes
/// through here and never reaches into the pool or the policy module.
pub struct ControlPlane {
    executor: QueryExecutor,
    identities: Arc<dyn IdentityResolver>,
}

impl ControlPlane {
    pub fn new(executor: QueryExecutor, identities: Arc<dyn IdentityResolver>) -> Self {
        Self {
            executor,
            identities,
        }
    }

    pub async fn run_query(
        &self,
        identity: &str,
        sql: &str,
        size_hint: Option<WarehouseSize>,
    ) -> Result<QueryResult, ControlPlaneError> {
        let role = self
            .identities
            .resolve(identity)
            .await
            .ok_or_else(|| ControlPlaneError::identity(identity))?;

        let mut request = QueryRequest::new(identity, sql, role);
        request.size_hint = size_hint;
        self.executor.execute(&request).await
    }
}
