//! Floe server: the HTTP layer over the control-plane core.
//!
//! Exposes the facade via a JSON query endpoint plus health probes, and
//! wires the default collaborators: the Postgres warehouse transport and
//! the config-backed identity resolver. Audit records flow to a rolling
//! JSONL file when enabled in configuration.

use anyhow::Context;
use floe_common::config::AppConfig;
use floe_common::telemetry;
use floe_core::transport::WarehouseTransport;
use floe_core::{ConnectionPool, ControlPlane, IdentityResolver, QueryExecutor};
use std::sync::Arc;
use tracing::info;

pub mod api;
pub mod identity;
pub mod postgres;

pub use identity::StaticIdentityResolver;
pub use postgres::PostgresTransport;

/// Assemble the core from configuration and collaborators. The server
/// only ever talks to the returned facade.
pub fn build_control_plane(
    config: &AppConfig,
    transport: Arc<dyn WarehouseTransport>,
    identities: Arc<dyn IdentityResolver>,
) -> ControlPlane {
    let pool = Arc::new(ConnectionPool::new(
        transport,
        config.warehouse.clone(),
        config.bindings.clone(),
    ));
    let executor = QueryExecutor::new(pool, config.limits);
    ControlPlane::new(executor, identities)
}

pub struct FloeServer {
    config_path: String,
    transport: Option<Arc<dyn WarehouseTransport>>,
    identities: Option<Arc<dyn IdentityResolver>>,
}

impl Default for FloeServer {
    fn default() -> Self {
        Self {
            config_path: "config/floe.yaml".to_string(),
            transport: None,
            identities: None,
        }
    }
}

impl FloeServer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, path: impl Into<String>) -> Self {
        self.config_path = path.into();
        self
    }

    /// Override the warehouse transport (defaults to Postgres).
    pub fn with_transport(mut self, transport: Arc<dyn WarehouseTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Override the identity collaborator (defaults to the static table
    /// from configuration).
    pub fn with_identity_resolver(mut self, identities: Arc<dyn IdentityResolver>) -> Self {
        self.identities = Some(identities);
        self
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let config = AppConfig::from_file(&self.config_path)?;

        telemetry::init_tracing(&config.audit);

        let transport = self
            .transport
            .unwrap_or_else(|| Arc::new(PostgresTransport::new(&config.warehouse)));
        let identities = self
            .identities
            .unwrap_or_else(|| Arc::new(StaticIdentityResolver::new(config.identities.clone())));

        let plane = Arc::new(build_control_plane(&config, transport, identities));
        let app = api::create_router(plane);

        let addr: std::net::SocketAddr = config
            .server
            .listen_addr
            .parse()
            .context("invalid listen address")?;
        info!(
            name = %config.server.name,
            %addr,
            identities = config.identities.len(),
            audit = config.audit.enabled,
            "control plane listening"
        );

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind {addr}"))?;
        axum::serve(listener, app).await.context("HTTP server error")
    }
}
