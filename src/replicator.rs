// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Recursive node replication.
//!
//! Walks the source tree depth-first, pre-order, and re-creates every
//! persistent node in the target.
//!
//! # Algorithm
//!
//! 1. List the children of the root in the source (failure ends the run)
//! 2. For each child, in the order the source returned them:
//!    - excluded path → apply the [`ExclusionMode`]
//!    - ephemeral node → don't copy it, but still descend
//!    - persistent node → [`create_recursive()`] in the target with an open ACL
//! 3. Descend into the child before moving on to its next sibling
//!
//! The walk keeps an explicit stack of frames (a parent plus the children
//! not yet processed), so tree depth never grows the call stack. Because each
//! frame keeps its sibling list, stopping at an excluded child is just
//! dropping the frame.
//!
//! # Recursive-Create
//!
//! Each target node is deleted (any version) if present, then created. When
//! the create fails because the parent is missing, the parent is created
//! first with an empty payload and [`Perms::DIRECTORY`](crate::acl::Perms)
//! permissions, then the create is retried.
//!
//! A target node that still has children cannot be deleted. Its payload is
//! overwritten in place and its ACL is left alone, so re-running over a
//! populated target converges instead of failing.

use crate::acl::{directory_acl, open_acl, Acl};
use crate::config::ExclusionMode;
use crate::error::{ReplicationError, Result};
use crate::exclusion::ExclusionSet;
use crate::metrics;
use crate::tree::{join_path, parent_path, BoxFuture, CreateMode, TreeStore};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, error, info, instrument};

/// Statistics from a replication run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReplicationStats {
    /// Source nodes whose data was read
    pub nodes_visited: usize,
    /// Nodes written to the target
    pub nodes_replicated: usize,
    /// Ephemeral nodes not written
    pub ephemeral_skipped: usize,
    /// Excluded paths encountered
    pub excluded: usize,
    /// Placeholder parents created in the target
    pub parents_created: usize,
}

/// One level of the walk: a parent path and its unprocessed children.
struct Frame {
    parent: String,
    children: VecDeque<String>,
}

/// Copies a source tree into a target tree.
pub struct Replicator<'a, S: TreeStore + ?Sized, T: TreeStore + ?Sized> {
    source: &'a S,
    target: &'a T,
    exclusions: ExclusionSet,
    mode: ExclusionMode,
}

impl<'a, S: TreeStore + ?Sized, T: TreeStore + ?Sized> Replicator<'a, S, T> {
    pub fn new(source: &'a S, target: &'a T, exclusions: ExclusionSet, mode: ExclusionMode) -> Self {
        Self {
            source,
            target,
            exclusions,
            mode,
        }
    }

    /// Replicate every qualifying descendant of `root`.
    ///
    /// `root` itself is not copied; it appears in the target as a placeholder
    /// parent of its first copied descendant.
    #[instrument(skip(self), fields(mode = %self.mode))]
    pub async fn replicate(&self, root: &str) -> Result<ReplicationStats> {
        let mut stats = ReplicationStats::default();
        let mut stack = vec![self.frame(root).await?];

        while let Some(frame) = stack.last_mut() {
            let Some(name) = frame.children.pop_front() else {
                stack.pop();
                continue;
            };
            let path = join_path(&frame.parent, &name);

            if self.exclusions.is_excluded(&path) {
                stats.excluded += 1;
                metrics::record_node_skipped("excluded");
                match self.mode {
                    ExclusionMode::StopSiblings => {
                        debug!(path = %path, skipped_siblings = frame.children.len(), "Excluded path, stopping at this level");
                        stack.pop();
                    }
                    ExclusionMode::SkipSubtree => {
                        debug!(path = %path, "Excluded path, skipping subtree");
                    }
                }
                continue;
            }

            self.replicate_node(&path, &mut stats).await?;
            let next = self.frame(&path).await?;
            stack.push(next);
        }

        Ok(stats)
    }

    async fn frame(&self, parent: &str) -> Result<Frame> {
        let children = self.source.children(parent).await.map_err(|e| {
            error!(path = %parent, error = %e, "Failed to list children");
            e
        })?;
        Ok(Frame {
            parent: parent.to_string(),
            children: children.into(),
        })
    }

    async fn replicate_node(&self, path: &str, stats: &mut ReplicationStats) -> Result<()> {
        let node = self.source.get(path).await.map_err(|e| {
            error!(path = %path, error = %e, "Failed to read node from source");
            e
        })?;
        stats.nodes_visited += 1;

        if node.is_ephemeral() {
            debug!(path = %path, owner = node.ephemeral_owner, "Ephemeral node, not copied");
            stats.ephemeral_skipped += 1;
            metrics::record_node_skipped("ephemeral");
            return Ok(());
        }

        let parents = AtomicUsize::new(0);
        create_recursive_counted(
            self.target,
            path,
            node.data,
            CreateMode::Persistent,
            open_acl(),
            &parents,
        )
        .await
        .map_err(|e| {
            error!(path = %path, error = %e, "Failed to create node in target");
            e
        })?;

        stats.parents_created += parents.load(Ordering::Relaxed);
        stats.nodes_replicated += 1;
        metrics::record_node_replicated();
        info!("{} backup success", path);
        Ok(())
    }
}

/// Idempotently create `path` in `store`, materializing missing ancestors.
///
/// Returns the path actually created.
pub async fn create_recursive<T: TreeStore + ?Sized>(
    store: &T,
    path: &str,
    data: Vec<u8>,
    mode: CreateMode,
    acl: Vec<Acl>,
) -> Result<String> {
    let parents = AtomicUsize::new(0);
    create_recursive_counted(store, path, data, mode, acl, &parents).await
}

fn create_recursive_counted<'a, T: TreeStore + ?Sized>(
    store: &'a T,
    path: &'a str,
    data: Vec<u8>,
    mode: CreateMode,
    acl: Vec<Acl>,
    parents: &'a AtomicUsize,
) -> BoxFuture<'a, String> {
    Box::pin(async move {
        if store.exists(path).await? {
            debug!(path = %path, "Node exists in target, replacing");
            match store.delete(path, None).await {
                Ok(()) => {}
                Err(e) if e.is_not_empty() => {
                    debug!(path = %path, "Node has children, overwriting data in place");
                    store.set_data(path, data, None).await?;
                    return Ok(path.to_string());
                }
                Err(e) => return Err(e),
            }
        }

        match store.create(path, data.clone(), acl.clone(), mode).await {
            Err(e) if e.is_no_node() => {}
            other => return other,
        }

        let parent = parent_path(path)
            .filter(|p| *p != "/")
            .ok_or_else(|| ReplicationError::NoNode {
                path: path.to_string(),
            })?;

        match create_recursive_counted(store, parent, Vec::new(), mode, directory_acl(&acl), parents).await {
            Ok(_) => {
                parents.fetch_add(1, Ordering::Relaxed);
                metrics::record_parent_created();
                debug!(path = %parent, "Created placeholder parent");
            }
            Err(e) if e.is_node_exists() => {}
            Err(e) => return Err(e),
        }

        store.create(path, data, acl, mode).await
    })
}
