//! Tracing and audit-log bootstrap for the Floe control plane.
//!
//! Regular diagnostics go to stdout behind `RUST_LOG` filtering. Audit
//! records are emitted with `target = "audit"` and, when enabled, routed
//! to a daily-rolling JSONL file so they can be shipped without parsing
//! the process log.

use crate::config::AuditSettings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Initialize the process-wide tracing registry.
///
/// Safe to call more than once; later calls are no-ops (relevant for
/// tests that share a process).
pub fn init_tracing(audit: &AuditSettings) {
    let stdout_layer = tracing_subscriber::fmt::layer().with_filter(EnvFilter::from_default_env());

    let registry = tracing_subscriber::registry().with(stdout_layer);

    if audit.enabled {
        std::fs::create_dir_all(&audit.directory).ok();

        let audit_appender = tracing_appender::rolling::daily(&audit.directory, "audit.jsonl");
        let audit_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_writer(audit_appender)
            .with_filter(tracing_subscriber::filter::filter_fn(|metadata| {
                metadata.target() == "audit"
            }));

        registry.with(audit_layer).try_init().ok();
    } else {
        registry.try_init().ok();
    }
}
