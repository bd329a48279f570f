//! Postgres-backed warehouse transport.
//!
//! Postgres stands in for the warehouse service here: the role-derived
//! privilege scope is applied with `SET ROLE`, and the warehouse binding
//! is surfaced as `application_name` for attribution (Postgres has no
//! warehouse concept). Statement text reaches the server verbatim; the
//! session statement timeout maps onto `statement_timeout`.

use async_trait::async_trait;
use floe_common::config::WarehouseSettings;
use floe_core::transport::{ConnectSpec, RowStream, WarehouseConnection, WarehouseTransport};
use futures_util::StreamExt;
use secrecy::ExposeSecret;
use serde_json::Value;
use std::pin::Pin;
use std::time::Duration;
use tokio_postgres::types::{ToSql, Type};
use tokio_postgres::{Client, NoTls, Row};

pub struct PostgresTransport {
    host: String,
    port: u16,
    database: String,
}

impl PostgresTransport {
    pub fn new(settings: &WarehouseSettings) -> Self {
        Self {
            host: settings.host.clone(),
            port: settings.port,
            database: settings.database.clone(),
        }
    }
}

#[async_trait]
impl WarehouseTransport for PostgresTransport {
    async fn connect(&self, spec: &ConnectSpec) -> anyhow::Result<Box<dyn WarehouseConnection>> {
        let mut config = tokio_postgres::Config::new();
        config
            .host(&self.host)
            .port(self.port)
            .dbname(&self.database)
            .user(&spec.user)
            .application_name(&spec.warehouse);
        if let Some(password) = &spec.password {
            config.password(password.expose_secret());
        }

        let (client, connection) = config.connect(NoTls).await?;

        // The connection task drives the socket; it ends when the client
        // is dropped.
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::warn!(error = %e, "warehouse connection task ended with error");
            }
        });

        // Apply the role-derived privilege scope for the session.
        client
            .batch_execute(&format!("SET ROLE \"{}\"", spec.scope))
            .await?;

        Ok(Box::new(PostgresConnection { client }))
    }
}

struct PostgresConnection {
    client: Client,
}

#[async_trait]
impl WarehouseConnection for PostgresConnection {
    async fn set_statement_timeout(&mut self, timeout: Duration) -> anyhow::Result<()> {
        self.client
            .batch_execute(&format!("SET statement_timeout = {}", timeout.as_millis()))
            .await?;
        Ok(())
    }

    async fn execute(&mut self, sql: &str) -> anyhow::Result<Box<dyn RowStream>> {
        // Preparing first gives us column metadata even for statements
        // that end up yielding zero rows.
        let statement = self.client.prepare(sql).await?;
        let columns: Vec<String> = statement
            .columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect();

        let params: Vec<&(dyn ToSql + Sync)> = Vec::new();
        let stream = self.client.query_raw(&statement, params).await?;

        Ok(Box::new(PostgresRowStream {
            columns,
            stream: Box::pin(stream),
        }))
    }
}

struct PostgresRowStream {
    columns: Vec<String>,
    stream: Pin<Box<tokio_postgres::RowStream>>,
}

#[async_trait]
impl RowStream for PostgresRowStream {
    fn columns(&self) -> &[String] {
        &self.columns
    }

    async fn next_row(&mut self) -> anyhow::Result<Option<Vec<Value>>> {
        match self.stream.next().await {
            Some(row) => {
                let row = row?;
                Ok(Some(row_to_cells(&row)))
            }
            None => Ok(None),
        }
    }
}

fn row_to_cells(row: &Row) -> Vec<Value> {
    (0..row.len()).map(|idx| cell_to_json(row, idx)).collect()
}

/// Best-effort typed extraction. Values outside the mapped set fall back
/// to their text form where the driver allows it, else null; a single
/// odd column must not fail the whole row.
fn cell_to_json(row: &Row, idx: usize) -> Value {
    let ty = row.columns()[idx].type_();
    if *ty == Type::BOOL {
        json_cell(row.try_get::<_, Option<bool>>(idx))
    } else if *ty == Type::INT2 {
        json_cell(row.try_get::<_, Option<i16>>(idx))
    } else if *ty == Type::INT4 {
        json_cell(row.try_get::<_, Option<i32>>(idx))
    } else if *ty == Type::INT8 {
        json_cell(row.try_get::<_, Option<i64>>(idx))
    } else if *ty == Type::FLOAT4 {
        json_cell(row.try_get::<_, Option<f32>>(idx))
    } else if *ty == Type::FLOAT8 {
        json_cell(row.try_get::<_, Option<f64>>(idx))
    } else {
        json_cell(row.try_get::<_, Option<String>>(idx))
    }
}

fn json_cell<T: Into<Value>>(cell: Result<Option<T>, tokio_postgres::Error>) -> Value {
    match cell {
        Ok(Some(v)) => v.into(),
        Ok(None) => Value::Null,
        Err(_) => Value::Null,
    }
}
