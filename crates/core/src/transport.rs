//! Boundary traits for the warehouse service.
//!
//! The control plane treats the warehouse as an opaque collaborator: it
//! hands over credentials plus a role-derived warehouse name and
//! privilege scope, then runs caller-supplied statements verbatim.
//! Transport failures surface as opaque `anyhow::Error` values; the pool
//! and executor annotate them into the typed error taxonomy.

use async_trait::async_trait;
use secrecy::SecretString;
use serde_json::Value;
use std::time::Duration;

/// Connection parameters for establishing a warehouse session.
///
/// Credentials are static and role-independent; `warehouse` comes from
/// the role's binding and `scope` is the role name upper-cased, per the
/// warehouse wire contract.
#[derive(Debug, Clone)]
pub struct ConnectSpec {
    pub user: String,
    pub password: Option<SecretString>,
    pub warehouse: String,
    pub scope: String,
}

/// Factory side of the warehouse boundary: performs the network
/// handshake and yields a session.
#[async_trait]
pub trait WarehouseTransport: Send + Sync {
    async fn connect(&self, spec: &ConnectSpec) -> anyhow::Result<Box<dyn WarehouseConnection>>;
}

/// An established warehouse session.
///
/// A session is not safe for concurrent use by two in-flight queries;
/// the pool serializes access per role, which is why these methods can
/// take `&mut self`.
#[async_trait]
pub trait WarehouseConnection: Send {
    /// Apply the session-level statement timeout. Called before every
    /// execution.
    async fn set_statement_timeout(&mut self, timeout: Duration) -> anyhow::Result<()>;

    /// Run the statement verbatim and stream its results.
    async fn execute(&mut self, sql: &str) -> anyhow::Result<Box<dyn RowStream>>;
}

/// Result metadata plus an async row cursor.
///
/// A statement that produces no result set (e.g. DDL) reports empty
/// columns and yields no rows. Every yielded row has exactly
/// `columns().len()` cells.
#[async_trait]
pub trait RowStream: Send {
    fn columns(&self) -> &[String];

    async fn next_row(&mut self) -> anyhow::Result<Option<Vec<Value>>>;
}
