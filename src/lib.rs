//! # ZooKeeper Tree Replicator
//!
//! One-shot copy of a ZooKeeper tree (persistent nodes and their payloads)
//! from a source cluster into a target cluster, for migrations and
//! point-in-time backups.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │                          zk-tree-replicator                          │
//! │                                                                      │
//! │  ┌──────────┐   ┌──────────────┐   ┌───────────────────────────────┐ │
//! │  │ resolve  │──►│ session      │──►│ Replicator                    │ │
//! │  │ (IPv4)   │   │ (first state)│   │ (DFS + Recursive-Create)      │ │
//! │  └──────────┘   └──────────────┘   └───────────────────────────────┘ │
//! │                        │                 │                 │         │
//! │                        ▼                 ▼                 ▼         │
//! │                 ┌────────────┐    ┌─────────────┐   ┌────────────┐   │
//! │                 │ ZkTree     │    │ ExclusionSet│   │ ZkTree     │   │
//! │                 │ (source)   │    │ (exact)     │   │ (target)   │   │
//! │                 └────────────┘    └─────────────┘   └────────────┘   │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! - Ephemeral nodes are never copied (their descendants still are)
//! - Existing target nodes are deleted and re-created, or overwritten in
//!   place when they still have children
//! - Missing target ancestors are created as empty placeholder nodes
//!
//! ## Usage
//!
//! ```rust,no_run
//! use zk_tree_replicator::{engine, ClusterConfig, ReplicationConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ReplicationConfig {
//!         source: ClusterConfig::new("source", "zk-old-1:2181,zk-old-2:2181"),
//!         target: ClusterConfig::new("target", "zk-new-1:2181"),
//!         ..Default::default()
//!     };
//!
//!     let stats = engine::run(config).await.expect("replication failed");
//!     println!("copied {} nodes", stats.nodes_replicated);
//! }
//! ```

pub mod acl;
pub mod config;
pub mod engine;
pub mod error;
pub mod exclusion;
pub mod metrics;
pub mod replicator;
pub mod resolve;
pub mod session;
pub mod tree;
pub mod zk;

// Re-exports for convenience
pub use acl::{Acl, Perms};
pub use config::{ClusterConfig, ExclusionMode, ReplicationConfig, SessionConfig};
pub use engine::EngineState;
pub use error::{ReplicationError, Result};
pub use exclusion::ExclusionSet;
pub use replicator::{create_recursive, ReplicationStats, Replicator};
pub use session::SessionState;
pub use tree::{CreateMode, NodeData, NoOpTreeStore, TreeStore};
pub use zk::ZkTree;
