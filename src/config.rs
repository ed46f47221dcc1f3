// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Configuration for a replication run.
//!
//! Everything the run needs is carried in one [`ReplicationConfig`] passed by
//! value into [`crate::engine::run()`]. It can be built programmatically, from
//! the CLI flags in `main.rs`, or deserialized from YAML/JSON.
//!
//! # Quick Start
//!
//! ```rust
//! use zk_tree_replicator::config::{ClusterConfig, ReplicationConfig};
//!
//! let config = ReplicationConfig {
//!     source: ClusterConfig::new("source", "zk-a1:2181,zk-a2:2181"),
//!     target: ClusterConfig::new("target", "zk-b1:2181"),
//!     ..Default::default()
//! };
//! assert!(config.validate().is_ok());
//! ```
//!
//! # Configuration Structure
//!
//! ```text
//! ReplicationConfig
//! ├── source: ClusterConfig        # Cluster read from
//! ├── target: ClusterConfig        # Cluster written to
//! ├── root_path: String            # Subtree to copy ("/r3")
//! ├── excluded_paths: Vec<String>  # Exact paths to stop at
//! ├── exclusion_mode: ExclusionMode
//! ├── session: SessionConfig       # Connect / establish timeouts
//! └── dry_run: bool                # Read source only, log writes
//! ```

use crate::error::{ReplicationError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root of the subtree copied when none is configured.
pub const DEFAULT_ROOT_PATH: &str = "/r3";

/// Paths excluded when none are configured (failover bookkeeping).
pub const DEFAULT_EXCLUDED_PATHS: [&str; 2] = ["/r3/failover/history", "/r3/failover/doing"];

// ═══════════════════════════════════════════════════════════════════════════════
// Top-level config
// ═══════════════════════════════════════════════════════════════════════════════

/// The top-level config object passed to `engine::run()`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplicationConfig {
    /// Cluster the tree is read from.
    pub source: ClusterConfig,

    /// Cluster the tree is written to.
    pub target: ClusterConfig,

    /// Absolute path whose descendants are replicated.
    #[serde(default = "default_root_path")]
    pub root_path: String,

    /// Absolute paths matched by exact equality.
    #[serde(default = "default_excluded_paths")]
    pub excluded_paths: Vec<String>,

    /// What happens to the rest of a sibling list once an excluded path is hit.
    #[serde(default)]
    pub exclusion_mode: ExclusionMode,

    #[serde(default)]
    pub session: SessionConfig,

    /// Walk the source but send all writes to a logging no-op target.
    #[serde(default)]
    pub dry_run: bool,
}

fn default_root_path() -> String {
    DEFAULT_ROOT_PATH.to_string()
}

fn default_excluded_paths() -> Vec<String> {
    DEFAULT_EXCLUDED_PATHS.iter().map(|p| p.to_string()).collect()
}

impl Default for ReplicationConfig {
    fn default() -> Self {
        Self {
            source: ClusterConfig::new("source", ""),
            target: ClusterConfig::new("target", ""),
            root_path: default_root_path(),
            excluded_paths: default_excluded_paths(),
            exclusion_mode: ExclusionMode::default(),
            session: SessionConfig::default(),
            dry_run: false,
        }
    }
}

impl ReplicationConfig {
    /// Create a minimal config for testing (loopback clusters, no exclusions).
    pub fn for_testing(source: &str, target: &str) -> Self {
        Self {
            source: ClusterConfig::new("source", source),
            target: ClusterConfig::new("target", target),
            excluded_paths: Vec::new(),
            session: SessionConfig::testing(),
            ..Default::default()
        }
    }

    /// Check the config before any network activity.
    pub fn validate(&self) -> Result<()> {
        if self.source.endpoint_list().is_empty() {
            return Err(ReplicationError::Config(
                "source address list is empty".to_string(),
            ));
        }
        if !self.dry_run && self.target.endpoint_list().is_empty() {
            return Err(ReplicationError::Config(
                "target address list is empty".to_string(),
            ));
        }
        if !self.root_path.starts_with('/') {
            return Err(ReplicationError::Config(format!(
                "root path must be absolute: {}",
                self.root_path
            )));
        }
        if let Some(bad) = self.excluded_paths.iter().find(|p| !p.starts_with('/')) {
            return Err(ReplicationError::Config(format!(
                "excluded path must be absolute: {}",
                bad
            )));
        }
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// ClusterConfig: one per side of the copy
// ═══════════════════════════════════════════════════════════════════════════════

/// Configuration for one coordination-service cluster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// Label used in logs and errors ("source" / "target").
    pub name: String,

    /// Comma-separated `host:port` list, as given on the command line.
    pub endpoints: String,
}

impl ClusterConfig {
    pub fn new(name: &str, endpoints: &str) -> Self {
        Self {
            name: name.to_string(),
            endpoints: endpoints.to_string(),
        }
    }

    /// The endpoint list split into entries.
    pub fn endpoint_list(&self) -> Vec<String> {
        split_list(&self.endpoints)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SessionConfig
// ═══════════════════════════════════════════════════════════════════════════════

/// Timeouts used while establishing sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Timeout handed to the client library for each connection attempt.
    #[serde(default = "default_connection_timeout_ms")]
    pub connection_timeout_ms: u64,

    /// Upper bound on the wait for the first connection-state event.
    #[serde(default = "default_establish_timeout_ms")]
    pub establish_timeout_ms: u64,
}

fn default_connection_timeout_ms() -> u64 {
    5_000
}

fn default_establish_timeout_ms() -> u64 {
    30_000
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            connection_timeout_ms: default_connection_timeout_ms(),
            establish_timeout_ms: default_establish_timeout_ms(),
        }
    }
}

impl SessionConfig {
    /// Short timeouts for tests.
    pub fn testing() -> Self {
        Self {
            connection_timeout_ms: 1_000,
            establish_timeout_ms: 2_000,
        }
    }

    pub fn connection_timeout(&self) -> Duration {
        Duration::from_millis(self.connection_timeout_ms)
    }

    pub fn establish_timeout(&self) -> Duration {
        Duration::from_millis(self.establish_timeout_ms)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// ExclusionMode
// ═══════════════════════════════════════════════════════════════════════════════

/// Traversal behavior when a child path is in the exclusion set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExclusionMode {
    /// Stop processing the remaining siblings at that level.
    ///
    /// This is the long-standing behavior of the tool: an excluded child ends
    /// the walk of its parent's child list, so later siblings are not copied.
    #[default]
    StopSiblings,

    /// Skip only the excluded node and its descendants.
    SkipSubtree,
}

impl std::fmt::Display for ExclusionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExclusionMode::StopSiblings => write!(f, "stop-siblings"),
            ExclusionMode::SkipSubtree => write!(f, "skip-subtree"),
        }
    }
}

/// Split a comma-separated list, trimming whitespace and dropping empty entries.
pub fn split_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
