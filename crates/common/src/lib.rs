//! Common utilities, types, and configuration shared across Floe crates.
//!
//! This crate contains the base building blocks for the Floe control
//! plane, including:
//! - **Configuration**: Strongly typed application configuration (`config`).
//! - **Models**: Roles, query requests, and bounded result sets (`models`).
//! - **Telemetry**: Tracing and audit-log bootstrap (`telemetry`).
//! - **Scrubbing**: PII scrubbing for audit previews (`scrubber`).
pub mod config;
pub mod models;
pub mod scrubber;
pub mod telemetry;
