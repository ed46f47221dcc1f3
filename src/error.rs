// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Error types for the tree replicator.
//!
//! Errors are categorized by the stage of the run they come from. There is
//! no retry anywhere: every error returned from this crate ends the run, and
//! only the binary decides how to report it.
//!
//! # Error Categories
//!
//! | Error Type | Stage | Description |
//! |------------|-------|-------------|
//! | `Config` | startup | Missing or malformed flags/config |
//! | `Resolve` | startup | No usable IPv4 endpoint in an address list |
//! | `Session` | startup | Cluster reported an unusable first state |
//! | `SessionTimeout` | startup | No state event before the deadline |
//! | `NoNode` | traversal | Node (or its parent) does not exist |
//! | `NodeExists` | traversal | Node already exists on create |
//! | `NotEmpty` | traversal | Node has children and cannot be deleted |
//! | `Store` | traversal | Any other coordination-service failure |
//! | `Internal` | any | Unexpected internal error |
//!
//! A single unresolvable endpoint is *not* an error: the resolver logs it and
//! carries on with the remaining entries.

use thiserror::Error;

/// Result type alias for replication operations.
pub type Result<T> = std::result::Result<T, ReplicationError>;

/// Errors that can occur while replicating a tree.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReplicationError {
    /// Invalid or missing configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// No entry of an endpoint list resolved to an IPv4 address.
    #[error("Resolve error ({input}): {message}")]
    Resolve { input: String, message: String },

    /// Session could not be established with a cluster.
    #[error("Session error ({cluster}): {message}")]
    Session { cluster: String, message: String },

    /// No connection-state event arrived before the establish deadline.
    #[error("Session error ({cluster}): no state event within {timeout_ms}ms")]
    SessionTimeout { cluster: String, timeout_ms: u64 },

    /// The node does not exist.
    ///
    /// On create this means the parent is missing, which Recursive-Create
    /// handles by materializing the ancestors.
    #[error("No node: {path}")]
    NoNode { path: String },

    /// The node already exists.
    #[error("Node exists: {path}")]
    NodeExists { path: String },

    /// The node has children, so it cannot be deleted.
    ///
    /// Recursive-Create overwrites such a node's payload in place instead.
    #[error("Node not empty: {path}")]
    NotEmpty { path: String },

    /// Coordination-service call failure.
    #[error("Store error ({operation} {path}): {message}")]
    Store {
        operation: String,
        path: String,
        message: String,
    },

    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ReplicationError {
    /// Create a store error for a failed coordination-service call.
    pub fn store(
        operation: impl Into<String>,
        path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Store {
            operation: operation.into(),
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a session error for the named cluster.
    pub fn session(cluster: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Session {
            cluster: cluster.into(),
            message: message.into(),
        }
    }

    /// True if this is a "node does not exist" outcome.
    pub fn is_no_node(&self) -> bool {
        matches!(self, Self::NoNode { .. })
    }

    /// True if this is a "node already exists" outcome.
    pub fn is_node_exists(&self) -> bool {
        matches!(self, Self::NodeExists { .. })
    }

    /// True if the node could not be deleted because it has children.
    pub fn is_not_empty(&self) -> bool {
        matches!(self, Self::NotEmpty { .. })
    }

    /// Short label for metrics (`error_type`).
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::Resolve { .. } => "resolve",
            Self::Session { .. } => "session",
            Self::SessionTimeout { .. } => "session_timeout",
            Self::NoNode { .. } => "no_node",
            Self::NodeExists { .. } => "node_exists",
            Self::NotEmpty { .. } => "not_empty",
            Self::Store { .. } => "store",
            Self::Internal(_) => "internal",
        }
    }
}
