//! Role-keyed warehouse connection pool.
//!
//! Exactly one live entry per role: the pool is bounded by the number of
//! roles, trading per-user isolation for simplicity. Warehouse-level
//! authorization already scopes by role, not by individual user.

use crate::transport::{ConnectSpec, WarehouseConnection, WarehouseTransport};
use floe_common::config::{WarehouseBindings, WarehouseSettings};
use floe_common::models::Role;
use floe_error::ControlPlaneError;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::OwnedMutexGuard;
use tokio::time::Instant;

/// Process-unique identity of an established connection.
///
/// A fresh id is assigned on every establishment, so diagnostics (and
/// tests) can tell reuse apart from re-establishment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

struct PoolEntry {
    conn: Box<dyn WarehouseConnection>,
    valid: bool,
    last_used: Instant,
    id: ConnectionId,
}

#[derive(Default)]
struct RoleSlot {
    entry: Option<PoolEntry>,
}

type SharedSlot = Arc<tokio::sync::Mutex<RoleSlot>>;

/// Owns the role -> connection mapping plus liveness metadata.
///
/// The outer lock guards only the slot map and is never held across an
/// await. Each slot carries its own async mutex, which the returned
/// [`ConnectionLease`] holds for the whole acquire-and-use window: two
/// concurrent acquires for one role can never establish duplicate
/// connections, and callers for different roles never block each other.
pub struct ConnectionPool {
    transport: Arc<dyn WarehouseTransport>,
    warehouse: WarehouseSettings,
    bindings: WarehouseBindings,
    slots: parking_lot::Mutex<HashMap<Role, SharedSlot>>,
    next_id: AtomicU64,
}

impl ConnectionPool {
    pub fn new(
        transport: Arc<dyn WarehouseTransport>,
        warehouse: WarehouseSettings,
        bindings: WarehouseBindings,
    ) -> Self {
        Self {
            transport,
            warehouse,
            bindings,
            slots: parking_lot::Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    fn slot(&self, role: Role) -> SharedSlot {
        self.slots.lock().entry(role).or_default().clone()
    }

    /// Returns an exclusive lease on a valid, ready-to-use connection
    /// for the role.
    ///
    /// A valid entry is reused as-is: no liveness probe, cheap reuse is
    /// favored over staleness detection. With an idle timeout configured,
    /// entries idle past the limit are re-established instead. On
    /// establishment failure the slot is left empty and the transport
    /// failure surfaces as [`ControlPlaneError::Connection`].
    pub async fn acquire(&self, role: Role) -> Result<ConnectionLease, ControlPlaneError> {
        let slot = self.slot(role);
        let mut guard = slot.lock_owned().await;

        let reusable = match guard.entry.as_ref() {
            Some(entry) if entry.valid => match self.warehouse.idle_timeout() {
                Some(idle) if entry.last_used.elapsed() > idle => {
                    tracing::debug!(role = %role, connection = %entry.id, "pooled connection passed idle limit");
                    false
                }
                _ => true,
            },
            _ => false,
        };

        if reusable {
            if let Some(entry) = guard.entry.as_mut() {
                entry.last_used = Instant::now();
            }
            return Ok(ConnectionLease { guard, role });
        }

        // Drop the dead handle before re-establishing.
        guard.entry = None;

        let spec = ConnectSpec {
            user: self.warehouse.user.clone(),
            password: self.warehouse.password.clone(),
            warehouse: self.bindings.warehouse_for(role).to_string(),
            scope: role.scope().to_string(),
        };

        let connect = self.transport.connect(&spec);
        let conn = match tokio::time::timeout(self.warehouse.connect_timeout(), connect).await {
            Ok(Ok(conn)) => conn,
            Ok(Err(e)) => {
                let cause = format!("{e:#}");
                tracing::warn!(role = %role, warehouse = %spec.warehouse, error = %cause, "warehouse connection failed");
                return Err(ControlPlaneError::connection(cause));
            }
            Err(_) => {
                let cause = format!(
                    "connect to warehouse '{}' timed out after {:?}",
                    spec.warehouse,
                    self.warehouse.connect_timeout()
                );
                tracing::warn!(role = %role, warehouse = %spec.warehouse, "{}", cause);
                return Err(ControlPlaneError::connection(cause));
            }
        };

        let id = ConnectionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        tracing::info!(role = %role, connection = %id, warehouse = %spec.warehouse, "established warehouse connection");
        guard.entry = Some(PoolEntry {
            conn,
            valid: true,
            last_used: Instant::now(),
            id,
        });

        Ok(ConnectionLease { guard, role })
    }

    /// Flags the role's entry so the next acquire re-establishes. A
    /// no-op for roles with no pooled entry.
    pub async fn invalidate(&self, role: Role) {
        let slot = self.slot(role);
        let mut guard = slot.lock().await;
        if let Some(entry) = guard.entry.as_mut() {
            tracing::debug!(role = %role, connection = %entry.id, "invalidating pooled connection");
            entry.valid = false;
        }
    }
}

/// Exclusive handle on a role's pooled connection.
///
/// Holding the lease holds the role's lock; dropping it releases the
/// role for the next caller. The entry outlives the lease — invalidation
/// only flags it, replacement happens on the next acquire.
pub struct ConnectionLease {
    guard: OwnedMutexGuard<RoleSlot>,
    role: Role,
}

impl std::fmt::Debug for ConnectionLease {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionLease")
            .field("role", &self.role)
            .field("connection_id", &self.guard.entry.as_ref().map(|e| e.id))
            .finish()
    }
}

impl ConnectionLease {
    fn entry_mut(&mut self) -> &mut PoolEntry {
        // An entry is always present while its lease is alive.
        self.guard
            .entry
            .as_mut()
            .expect("connection lease held without a pool entry")
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn connection_id(&self) -> ConnectionId {
        self.guard
            .entry
            .as_ref()
            .expect("connection lease held without a pool entry")
            .id
    }

    pub fn connection(&mut self) -> &mut dyn WarehouseConnection {
        self.entry_mut().conn.as_mut()
    }

    /// Marks the leased connection invalid so the next acquire for this
    /// role re-establishes. Called by the executor on any failure after
    /// acquisition.
    pub fn invalidate(&mut self) {
        let role = self.role;
        let entry = self.entry_mut();
        tracing::debug!(role = %role, connection = %entry.id, "invalidating leased connection");
        entry.valid = false;
    }
}
