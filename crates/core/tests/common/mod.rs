#![allow(dead_code)]

use async_trait::async_trait;
use floe_core::audit::{AuditRecord, AuditSink};
use floe_core::transport::{ConnectSpec, RowStream, WarehouseConnection, WarehouseTransport};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

struct State {
    connects: AtomicUsize,
    specs: Mutex<Vec<ConnectSpec>>,
    connect_error: Mutex<Option<String>>,
    connect_delay: Mutex<Option<Duration>>,
    columns: Mutex<Vec<String>>,
    rows: AtomicUsize,
    execute_error: Mutex<Option<String>>,
    execute_delay: Mutex<Option<Duration>>,
    last_statement_timeout: Mutex<Option<Duration>>,
    active_executes: AtomicUsize,
    max_active_executes: AtomicUsize,
}

impl Default for State {
    fn default() -> Self {
        Self {
            connects: AtomicUsize::new(0),
            specs: Mutex::new(Vec::new()),
            connect_error: Mutex::new(None),
            connect_delay: Mutex::new(None),
            columns: Mutex::new(vec!["ID".to_string(), "VALUE".to_string()]),
            rows: AtomicUsize::new(3),
            execute_error: Mutex::new(None),
            execute_delay: Mutex::new(None),
            last_statement_timeout: Mutex::new(None),
            active_executes: AtomicUsize::new(0),
            max_active_executes: AtomicUsize::new(0),
        }
    }
}

/// Transport double: serves a synthetic result set and records handshake
/// and execution activity for assertions. Behavior can be reconfigured
/// mid-test; established connections observe changes live.
#[derive(Clone, Default)]
pub struct StubTransport {
    state: Arc<State>,
}

impl StubTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn serve_rows(&self, n: usize) {
        self.state.rows.store(n, Ordering::SeqCst);
    }

    /// Statements with no result set (e.g. DDL) report no columns.
    pub fn serve_no_result_set(&self) {
        self.state.columns.lock().unwrap().clear();
        self.state.rows.store(0, Ordering::SeqCst);
    }

    pub fn fail_connect(&self, msg: &str) {
        *self.state.connect_error.lock().unwrap() = Some(msg.to_string());
    }

    pub fn clear_connect_failure(&self) {
        *self.state.connect_error.lock().unwrap() = None;
    }

    pub fn delay_connect(&self, delay: Duration) {
        *self.state.connect_delay.lock().unwrap() = Some(delay);
    }

    pub fn fail_execute(&self, msg: &str) {
        *self.state.execute_error.lock().unwrap() = Some(msg.to_string());
    }

    pub fn clear_execute_failure(&self) {
        *self.state.execute_error.lock().unwrap() = None;
    }

    pub fn delay_execute(&self, delay: Duration) {
        *self.state.execute_delay.lock().unwrap() = Some(delay);
    }

    pub fn connect_count(&self) -> usize {
        self.state.connects.load(Ordering::SeqCst)
    }

    pub fn specs(&self) -> Vec<ConnectSpec> {
        self.state.specs.lock().unwrap().clone()
    }

    pub fn last_statement_timeout(&self) -> Option<Duration> {
        *self.state.last_statement_timeout.lock().unwrap()
    }

    /// High-water mark of overlapping `execute` calls.
    pub fn max_concurrent_executes(&self) -> usize {
        self.state.max_active_executes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WarehouseTransport for StubTransport {
    async fn connect(&self, spec: &ConnectSpec) -> anyhow::Result<Box<dyn WarehouseConnection>> {
        self.state.connects.fetch_add(1, Ordering::SeqCst);
        self.state.specs.lock().unwrap().push(spec.clone());

        let delay = *self.state.connect_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let error = self.state.connect_error.lock().unwrap().clone();
        if let Some(msg) = error {
            anyhow::bail!(msg);
        }

        Ok(Box::new(StubConnection {
            state: self.state.clone(),
        }))
    }
}

struct StubConnection {
    state: Arc<State>,
}

#[async_trait]
impl WarehouseConnection for StubConnection {
    async fn set_statement_timeout(&mut self, timeout: Duration) -> anyhow::Result<()> {
        *self.state.last_statement_timeout.lock().unwrap() = Some(timeout);
        Ok(())
    }

    async fn execute(&mut self, _sql: &str) -> anyhow::Result<Box<dyn RowStream>> {
        let active = self.state.active_executes.fetch_add(1, Ordering::SeqCst) + 1;
        self.state
            .max_active_executes
            .fetch_max(active, Ordering::SeqCst);

        let delay = *self.state.execute_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.state.active_executes.fetch_sub(1, Ordering::SeqCst);

        let error = self.state.execute_error.lock().unwrap().clone();
        if let Some(msg) = error {
            anyhow::bail!(msg);
        }

        Ok(Box::new(StubStream {
            columns: self.state.columns.lock().unwrap().clone(),
            remaining: self.state.rows.load(Ordering::SeqCst),
            next_idx: 0,
        }))
    }
}

struct StubStream {
    columns: Vec<String>,
    remaining: usize,
    next_idx: usize,
}

#[async_trait]
impl RowStream for StubStream {
    fn columns(&self) -> &[String] {
        &self.columns
    }

    async fn next_row(&mut self) -> anyhow::Result<Option<Vec<Value>>> {
        if self.remaining == 0 {
            return Ok(None);
        }
        self.remaining -= 1;
        let idx = self.next_idx;
        self.next_idx += 1;
        Ok(Some(vec![json!(idx), json!(format!("value-{}", idx))]))
    }
}

/// Audit sink double collecting records for assertions.
#[derive(Default)]
pub struct CollectingSink {
    records: Mutex<Vec<AuditRecord>>,
}

impl CollectingSink {
    pub fn records(&self) -> Vec<AuditRecord> {
        self.records.lock().unwrap().clone()
    }
}

impl AuditSink for CollectingSink {
    fn record(&self, record: &AuditRecord) {
        self.records.lock().unwrap().push(record.clone());
    }
}
