use crate::models::Role;
use anyhow::{Context, Result};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use validator::Validate;

// Default constants
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_SERVER_NAME: &str = "Floe Control Plane";

pub const DEFAULT_STATEMENT_TIMEOUT_SECS: u64 = 300;
pub const DEFAULT_MAX_RESULT_ROWS: usize = 10_000;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

pub const DEFAULT_WAREHOUSE: &str = "SMALL_WH";
pub const DEFAULT_WAREHOUSE_HOST: &str = "localhost";
pub const DEFAULT_WAREHOUSE_PORT: u16 = 5432;
pub const DEFAULT_WAREHOUSE_DATABASE: &str = "warehouse";

pub const DEFAULT_AUDIT_DIR: &str = "logs";

// Custom Serde logic for SecretString
fn serialize_secret<S>(secret: &Option<SecretString>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    match secret {
        Some(_) => serializer.serialize_str("[REDACTED]"),
        None => serializer.serialize_none(),
    }
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<Option<SecretString>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    Ok(s.map(SecretString::from))
}

#[derive(Debug, Deserialize, Default, Clone, Validate)]
pub struct AppConfig {
    #[serde(default)]
    #[validate(nested)]
    pub server: ServerSettings,

    #[serde(default)]
    pub warehouse: WarehouseSettings,

    #[serde(default)]
    #[validate(nested)]
    pub limits: QueryLimits,

    #[serde(default)]
    pub bindings: WarehouseBindings,

    /// Trusted identity -> role table. Verification happens upstream;
    /// the control plane only maps.
    #[serde(default)]
    pub identities: HashMap<String, Role>,

    #[serde(default)]
    pub audit: AuditSettings,
}

#[derive(Debug, Deserialize, Clone, Validate)]
pub struct ServerSettings {
    #[serde(default = "default_listen_addr")]
    #[validate(length(min = 1))]
    pub listen_addr: String,

    #[serde(default = "default_server_name")]
    pub name: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            name: default_server_name(),
        }
    }
}

fn default_listen_addr() -> String {
    DEFAULT_LISTEN_ADDR.to_string()
}

fn default_server_name() -> String {
    DEFAULT_SERVER_NAME.to_string()
}

/// Static warehouse credentials and connection bounds. Credentials are
/// role-independent; per-role scoping happens on the wire via the role's
/// privilege scope string.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct WarehouseSettings {
    #[serde(default = "default_warehouse_host")]
    pub host: String,

    #[serde(default = "default_warehouse_port")]
    pub port: u16,

    #[serde(default = "default_warehouse_database")]
    pub database: String,

    #[serde(default)]
    pub user: String,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_secret",
        deserialize_with = "deserialize_secret"
    )]
    pub password: Option<SecretString>,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Idle expiry for pooled connections. Unset preserves the baseline
    /// behavior: a valid entry is reused without revalidation.
    #[serde(default)]
    pub idle_timeout_secs: Option<u64>,
}

impl Default for WarehouseSettings {
    fn default() -> Self {
        Self {
            host: default_warehouse_host(),
            port: default_warehouse_port(),
            database: default_warehouse_database(),
            user: String::new(),
            password: None,
            connect_timeout_secs: default_connect_timeout_secs(),
            idle_timeout_secs: None,
        }
    }
}

impl WarehouseSettings {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn idle_timeout(&self) -> Option<Duration> {
        self.idle_timeout_secs.map(Duration::from_secs)
    }
}

fn default_warehouse_host() -> String {
    DEFAULT_WAREHOUSE_HOST.to_string()
}

fn default_warehouse_port() -> u16 {
    DEFAULT_WAREHOUSE_PORT
}

fn default_warehouse_database() -> String {
    DEFAULT_WAREHOUSE_DATABASE.to_string()
}

fn default_connect_timeout_secs() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_SECS
}

#[derive(Debug, Deserialize, Clone, Copy, Validate)]
pub struct QueryLimits {
    /// Session-level statement timeout applied before every execution.
    #[serde(default = "default_statement_timeout_secs")]
    #[validate(range(min = 1))]
    pub statement_timeout_secs: u64,

    /// Hard cap on rows returned to the caller; overflow sets the
    /// `truncated` flag on the result.
    #[serde(default = "default_max_result_rows")]
    #[validate(range(min = 1))]
    pub max_result_rows: usize,
}

impl Default for QueryLimits {
    fn default() -> Self {
        Self {
            statement_timeout_secs: default_statement_timeout_secs(),
            max_result_rows: default_max_result_rows(),
        }
    }
}

impl QueryLimits {
    pub fn statement_timeout(&self) -> Duration {
        Duration::from_secs(self.statement_timeout_secs)
    }
}

fn default_statement_timeout_secs() -> u64 {
    DEFAULT_STATEMENT_TIMEOUT_SECS
}

fn default_max_result_rows() -> usize {
    DEFAULT_MAX_RESULT_ROWS
}

/// Static role -> warehouse mapping. Configuration, not runtime state.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct WarehouseBindings {
    #[serde(default = "default_warehouse_map")]
    pub warehouses: HashMap<Role, String>,

    /// Fallback for roles with no explicit binding.
    #[serde(default = "default_warehouse_name")]
    pub default_warehouse: String,
}

impl Default for WarehouseBindings {
    fn default() -> Self {
        Self {
            warehouses: default_warehouse_map(),
            default_warehouse: default_warehouse_name(),
        }
    }
}

impl WarehouseBindings {
    pub fn warehouse_for(&self, role: Role) -> &str {
        self.warehouses
            .get(&role)
            .map(String::as_str)
            .unwrap_or(&self.default_warehouse)
    }
}

fn default_warehouse_map() -> HashMap<Role, String> {
    HashMap::from([
        (Role::Analyst, "ANALYST_WH".to_string()),
        (Role::DataScientist, "DS_WH".to_string()),
        (Role::Admin, "ADMIN_WH".to_string()),
    ])
}

fn default_warehouse_name() -> String {
    DEFAULT_WAREHOUSE.to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuditSettings {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_audit_dir")]
    pub directory: String,
}

impl Default for AuditSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            directory: default_audit_dir(),
        }
    }
}

fn default_audit_dir() -> String {
    DEFAULT_AUDIT_DIR.to_string()
}

// Config implementation
impl AppConfig {
    pub fn from_file(path: &str) -> Result<Self> {
        let builder = config::Config::builder();

        let builder = if std::path::Path::new(path).exists() {
            builder.add_source(config::File::with_name(path))
        } else {
            builder
        };

        // Add environment variables
        // Map FLOE_LIMITS__MAX_RESULT_ROWS to limits.max_result_rows, etc.
        let builder = builder.add_source(
            config::Environment::with_prefix("FLOE")
                .separator("__")
                .try_parsing(true),
        );

        let cfg = builder.build().context("Failed to build configuration")?;

        let app_config: AppConfig = cfg
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        app_config
            .validate()
            .map_err(|e| anyhow::anyhow!("Configuration validation failed: {:?}", e))?;

        Ok(app_config)
    }
}
