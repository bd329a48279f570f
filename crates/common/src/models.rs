use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The authorization class a verified identity is mapped to.
///
/// A role governs both warehouse assignment and query policy. It is
/// resolved once per request by the identity collaborator and never
/// changes mid-flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Analyst,
    DataScientist,
    Admin,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Analyst, Role::DataScientist, Role::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Analyst => "analyst",
            Role::DataScientist => "data_scientist",
            Role::Admin => "admin",
        }
    }

    /// Privilege scope string per the warehouse wire contract: the role
    /// name upper-cased.
    pub fn scope(&self) -> &'static str {
        match self {
            Role::Analyst => "ANALYST",
            Role::DataScientist => "DATA_SCIENTIST",
            Role::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "analyst" => Ok(Role::Analyst),
            "data_scientist" => Ok(Role::DataScientist),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// Requested warehouse size. Accepted for forward compatibility and
/// recorded in the audit trail; connection routing is decided by the
/// role's warehouse binding, not by this hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WarehouseSize {
    Xs,
    S,
    M,
    L,
}

impl fmt::Display for WarehouseSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WarehouseSize::Xs => write!(f, "xs"),
            WarehouseSize::S => write!(f, "s"),
            WarehouseSize::M => write!(f, "m"),
            WarehouseSize::L => write!(f, "l"),
        }
    }
}

/// A single query submission. Transient: constructed per call, never
/// persisted.
#[derive(Debug, Clone)]
pub struct QueryRequest {
    /// The already-verified caller identity, carried for audit records.
    pub identity: String,
    /// Raw query text, executed verbatim against the warehouse.
    pub sql: String,
    /// Role the caller resolved to. Trusted as-is.
    pub role: Role,
    pub size_hint: Option<WarehouseSize>,
}

impl QueryRequest {
    pub fn new(identity: impl Into<String>, sql: impl Into<String>, role: Role) -> Self {
        Self {
            identity: identity.into(),
            sql: sql.into(),
            role,
            size_hint: None,
        }
    }

    pub fn with_size_hint(mut self, hint: WarehouseSize) -> Self {
        self.size_hint = Some(hint);
        self
    }
}

/// A bounded result set.
///
/// `columns.len()` equals the width of every row in `rows`, and
/// `rows.len()` never exceeds the configured row cap; `truncated` is true
/// iff the warehouse produced more rows than the cap.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<serde_json::Value>>,
    pub truncated: bool,
}

impl QueryResult {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}
