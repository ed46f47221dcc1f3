// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Metrics for observability.
//!
//! Records through the `metrics` facade. Nothing is exported unless the
//! embedding binary installs a recorder, in which case every call below is a
//! cheap no-op otherwise.
//!
//! # Metric Naming Convention
//!
//! All metrics are prefixed with `zk_replicator_` and follow Prometheus conventions:
//! - Counters end in `_total`
//! - Gauges represent current state
//! - Histograms track durations in seconds

use metrics::{counter, gauge, histogram};
use std::time::Duration;

/// Record an endpoint dropped by the resolver.
pub fn record_unresolved_endpoint() {
    counter!("zk_replicator_unresolved_endpoints_total").increment(1);
}

/// Record a session establishment attempt.
pub fn record_session(cluster: &str, success: bool) {
    let status = if success { "success" } else { "failure" };
    counter!("zk_replicator_sessions_total", "cluster" => cluster.to_string(), "status" => status).increment(1);
}

/// Record how long it took to observe the first session state.
pub fn record_session_establish_latency(cluster: &str, latency: Duration) {
    histogram!("zk_replicator_session_establish_seconds", "cluster" => cluster.to_string())
        .record(latency.as_secs_f64());
}

/// Record a node copied into the target.
pub fn record_node_replicated() {
    counter!("zk_replicator_nodes_replicated_total").increment(1);
}

/// Record a node not copied (`reason` = "ephemeral" | "excluded").
pub fn record_node_skipped(reason: &str) {
    counter!("zk_replicator_nodes_skipped_total", "reason" => reason.to_string()).increment(1);
}

/// Record a placeholder parent created by Recursive-Create.
pub fn record_parent_created() {
    counter!("zk_replicator_parents_created_total").increment(1);
}

/// Record a fatal error by type.
pub fn record_error(error_type: &str) {
    counter!("zk_replicator_errors_total", "error_type" => error_type.to_string()).increment(1);
}

/// Gauge for engine state.
pub fn set_engine_state(state: &str) {
    let value = match state {
        "Created" => 0.0,
        "Connecting" => 1.0,
        "Replicating" => 2.0,
        "Finished" => 3.0,
        "Failed" => 4.0,
        _ => -1.0,
    };
    gauge!("zk_replicator_engine_state").set(value);
}

/// Record a completed traversal.
pub fn record_run_complete(nodes_visited: usize, duration: Duration) {
    counter!("zk_replicator_nodes_visited_total").increment(nodes_visited as u64);
    histogram!("zk_replicator_run_duration_seconds").record(duration.as_secs_f64());
}
