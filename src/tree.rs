// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Coordination-service boundary.
//!
//! The replicator never talks to a client library directly. It goes through
//! [`TreeStore`], which exposes exactly the calls a one-shot copy needs. The
//! production implementation is [`crate::zk::ZkTree`]; tests use an
//! in-memory tree.
//!
//! # Example
//!
//! ```rust,no_run
//! use zk_tree_replicator::acl::Acl;
//! use zk_tree_replicator::tree::{BoxFuture, CreateMode, NodeData, TreeStore};
//!
//! struct Empty;
//!
//! impl TreeStore for Empty {
//!     fn children(&self, _path: &str) -> BoxFuture<'_, Vec<String>> {
//!         Box::pin(async { Ok(vec![]) })
//!     }
//!
//!     fn get(&self, path: &str) -> BoxFuture<'_, NodeData> {
//!         let path = path.to_string();
//!         Box::pin(async move {
//!             Err(zk_tree_replicator::ReplicationError::NoNode { path })
//!         })
//!     }
//!
//!     fn exists(&self, _path: &str) -> BoxFuture<'_, bool> {
//!         Box::pin(async { Ok(false) })
//!     }
//!
//!     fn delete(&self, _path: &str, _version: Option<i32>) -> BoxFuture<'_, ()> {
//!         Box::pin(async { Ok(()) })
//!     }
//!
//!     fn set_data(&self, _path: &str, _data: Vec<u8>, _version: Option<i32>) -> BoxFuture<'_, ()> {
//!         Box::pin(async { Ok(()) })
//!     }
//!
//!     fn create(&self, path: &str, _data: Vec<u8>, _acl: Vec<Acl>, _mode: CreateMode) -> BoxFuture<'_, String> {
//!         let path = path.to_string();
//!         Box::pin(async move { Ok(path) })
//!     }
//! }
//! ```

use crate::acl::Acl;
use crate::error::Result;
use std::future::Future;
use std::pin::Pin;

/// Type alias for boxed async futures (reduces trait signature complexity).
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Payload and the metadata the replicator looks at.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NodeData {
    pub data: Vec<u8>,
    /// Session id owning the node, `0` for persistent nodes.
    pub ephemeral_owner: i64,
}

impl NodeData {
    pub fn persistent(data: impl Into<Vec<u8>>) -> Self {
        Self {
            data: data.into(),
            ephemeral_owner: 0,
        }
    }

    pub fn ephemeral(data: impl Into<Vec<u8>>, owner: i64) -> Self {
        Self {
            data: data.into(),
            ephemeral_owner: owner,
        }
    }

    /// True if the node dies with its creating session.
    pub fn is_ephemeral(&self) -> bool {
        self.ephemeral_owner != 0
    }
}

/// Node lifetime requested on create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CreateMode {
    #[default]
    Persistent,
    Ephemeral,
}

/// The calls the replicator needs from a coordination-service session.
///
/// Every call is one blocking round trip from the caller's point of view:
/// the replicator awaits each future before issuing the next call.
pub trait TreeStore: Send + Sync {
    /// Names (not paths) of the direct children of `path`, in server order.
    fn children(&self, path: &str) -> BoxFuture<'_, Vec<String>>;

    /// Payload and metadata of `path`.
    fn get(&self, path: &str) -> BoxFuture<'_, NodeData>;

    /// Whether `path` exists.
    fn exists(&self, path: &str) -> BoxFuture<'_, bool>;

    /// Delete `path`; `None` matches any version.
    ///
    /// Fails with `NotEmpty` when the node has children.
    fn delete(&self, path: &str, version: Option<i32>) -> BoxFuture<'_, ()>;

    /// Replace the payload of an existing node; `None` matches any version.
    fn set_data(&self, path: &str, data: Vec<u8>, version: Option<i32>) -> BoxFuture<'_, ()>;

    /// Create `path`, returning the path actually created.
    ///
    /// Fails with `NoNode` when the parent is missing and `NodeExists` when
    /// the path is taken.
    fn create(
        &self,
        path: &str,
        data: Vec<u8>,
        acl: Vec<Acl>,
        mode: CreateMode,
    ) -> BoxFuture<'_, String>;

    /// Release the session. Default: nothing to release.
    fn close(&self) -> BoxFuture<'_, ()> {
        Box::pin(async { Ok(()) })
    }
}

/// Target used for dry runs.
///
/// Logs writes but doesn't store anything; every node looks absent.
#[derive(Clone, Debug, Default)]
pub struct NoOpTreeStore;

impl TreeStore for NoOpTreeStore {
    fn children(&self, _path: &str) -> BoxFuture<'_, Vec<String>> {
        Box::pin(async { Ok(Vec::new()) })
    }

    fn get(&self, path: &str) -> BoxFuture<'_, NodeData> {
        let path = path.to_string();
        Box::pin(async move { Err(crate::error::ReplicationError::NoNode { path }) })
    }

    fn exists(&self, _path: &str) -> BoxFuture<'_, bool> {
        Box::pin(async { Ok(false) })
    }

    fn delete(&self, path: &str, _version: Option<i32>) -> BoxFuture<'_, ()> {
        let path = path.to_string();
        Box::pin(async move {
            tracing::debug!(path = %path, "NoOp: would delete node");
            Ok(())
        })
    }

    fn set_data(&self, path: &str, data: Vec<u8>, _version: Option<i32>) -> BoxFuture<'_, ()> {
        let path = path.to_string();
        Box::pin(async move {
            tracing::debug!(path = %path, len = data.len(), "NoOp: would set data");
            Ok(())
        })
    }

    fn create(
        &self,
        path: &str,
        data: Vec<u8>,
        acl: Vec<Acl>,
        mode: CreateMode,
    ) -> BoxFuture<'_, String> {
        let path = path.to_string();
        Box::pin(async move {
            tracing::debug!(
                path = %path,
                len = data.len(),
                acl_entries = acl.len(),
                mode = ?mode,
                "NoOp: would create node"
            );
            Ok(path)
        })
    }
}

/// Join a parent path and a child name.
pub fn join_path(parent: &str, child: &str) -> String {
    if parent.ends_with('/') {
        format!("{}{}", parent, child)
    } else {
        format!("{}/{}", parent, child)
    }
}

/// Parent of an absolute path; `None` for the root (or an empty path).
pub fn parent_path(path: &str) -> Option<&str> {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return None;
    }
    match trimmed.rfind('/') {
        Some(0) => Some("/"),
        Some(idx) => Some(&trimmed[..idx]),
        None => None,
    }
}
