// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! In-memory TreeStore for testing.
//!
//! Behaves like a ZooKeeper tree for the calls the replicator makes:
//! creates fail with `NoNode` when the parent is missing and `NodeExists`
//! when the path is taken, children come back in insertion order.
//! Records every call and can inject a failure on a given operation + path.
//! Deleting a node that has children fails with `NotEmpty`.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;
use zk_tree_replicator::acl::Acl;
use zk_tree_replicator::tree::{BoxFuture, CreateMode, NodeData, TreeStore};
use zk_tree_replicator::ReplicationError;

/// A stored node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockNode {
    pub data: Vec<u8>,
    pub ephemeral_owner: i64,
    pub acl: Vec<Acl>,
}

/// A recorded call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Children(String),
    Get(String),
    Exists(String),
    Delete(String),
    SetData(String),
    Create(String),
    Close,
}

#[derive(Default)]
struct Inner {
    nodes: BTreeMap<String, MockNode>,
    /// Child names per parent, in creation order.
    children: HashMap<String, Vec<String>>,
    calls: Vec<Call>,
    failures: HashMap<(&'static str, String), ReplicationError>,
    /// Paths another writer creates just before our create lands.
    races: HashSet<String>,
}

/// Mock implementation of TreeStore backed by a map.
///
/// # Example
/// ```rust,ignore
/// let source = MemoryTree::new();
/// source.put("/r3/x", b"v1");
/// source.put_ephemeral("/r3/y", b"", 7);
///
/// // Use in tests...
///
/// assert_eq!(target.data("/r3/x"), Some(b"v1".to_vec()));
/// ```
#[derive(Default)]
pub struct MemoryTree {
    inner: Mutex<Inner>,
}

fn parent_of(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) | None => "/",
        Some(idx) => &path[..idx],
    }
}

fn name_of(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

impl MemoryTree {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Fixture Setup
    // =========================================================================

    /// Insert a persistent node, creating missing ancestors with empty data.
    pub fn put(&self, path: &str, data: &[u8]) {
        self.insert_with_ancestors(path, data, 0);
    }

    /// Insert an ephemeral node owned by `owner`.
    pub fn put_ephemeral(&self, path: &str, data: &[u8], owner: i64) {
        self.insert_with_ancestors(path, data, owner);
    }

    fn insert_with_ancestors(&self, path: &str, data: &[u8], owner: i64) {
        let mut inner = self.inner.lock().unwrap();
        let mut ancestors = Vec::new();
        let mut current = parent_of(path);
        while current != "/" && !inner.nodes.contains_key(current) {
            ancestors.push(current.to_string());
            current = parent_of(current);
        }
        for ancestor in ancestors.into_iter().rev() {
            inner.insert(&ancestor, Vec::new(), 0, Vec::new());
        }
        inner.insert(path, data.to_vec(), owner, Vec::new());
    }

    /// Make the next `operation` on `path` fail with `error`.
    pub fn fail_on(&self, operation: &'static str, path: &str, error: ReplicationError) {
        self.inner
            .lock()
            .unwrap()
            .failures
            .insert((operation, path.to_string()), error);
    }

    /// Simulate a concurrent writer: the next create of `path` finds that
    /// someone else just created it and fails with `NodeExists`.
    pub fn race_create(&self, path: &str) {
        self.inner.lock().unwrap().races.insert(path.to_string());
    }

    // =========================================================================
    // Query Methods
    // =========================================================================

    pub fn node(&self, path: &str) -> Option<MockNode> {
        self.inner.lock().unwrap().nodes.get(path).cloned()
    }

    pub fn data(&self, path: &str) -> Option<Vec<u8>> {
        self.node(path).map(|n| n.data)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.inner.lock().unwrap().nodes.contains_key(path)
    }

    /// All node paths, sorted.
    pub fn paths(&self) -> Vec<String> {
        self.inner.lock().unwrap().nodes.keys().cloned().collect()
    }

    /// Full snapshot for state comparisons.
    pub fn snapshot(&self) -> BTreeMap<String, MockNode> {
        self.inner.lock().unwrap().nodes.clone()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.inner.lock().unwrap().calls.clone()
    }

    /// Paths passed to get(), in call order.
    pub fn visited(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Get(p) => Some(p),
                _ => None,
            })
            .collect()
    }

    pub fn was_closed(&self) -> bool {
        self.calls().contains(&Call::Close)
    }

    pub fn reset_calls(&self) {
        self.inner.lock().unwrap().calls.clear();
    }
}

impl Inner {
    fn insert(&mut self, path: &str, data: Vec<u8>, owner: i64, acl: Vec<Acl>) {
        if self.nodes.contains_key(path) {
            let node = self.nodes.get_mut(path).unwrap();
            node.data = data;
            node.ephemeral_owner = owner;
            return;
        }
        self.nodes.insert(
            path.to_string(),
            MockNode {
                data,
                ephemeral_owner: owner,
                acl,
            },
        );
        self.children
            .entry(parent_of(path).to_string())
            .or_default()
            .push(name_of(path).to_string());
    }

    fn check(&mut self, operation: &'static str, path: &str, call: Call) -> Result<(), ReplicationError> {
        self.calls.push(call);
        match self.failures.remove(&(operation, path.to_string())) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn exists(&self, path: &str) -> bool {
        path == "/" || self.nodes.contains_key(path)
    }
}

impl TreeStore for MemoryTree {
    fn children(&self, path: &str) -> BoxFuture<'_, Vec<String>> {
        let path = path.to_string();
        Box::pin(async move {
            let mut inner = self.inner.lock().unwrap();
            inner.check("children", &path, Call::Children(path.clone()))?;
            if !inner.exists(&path) {
                return Err(ReplicationError::NoNode { path });
            }
            Ok(inner.children.get(&path).cloned().unwrap_or_default())
        })
    }

    fn get(&self, path: &str) -> BoxFuture<'_, NodeData> {
        let path = path.to_string();
        Box::pin(async move {
            let mut inner = self.inner.lock().unwrap();
            inner.check("get", &path, Call::Get(path.clone()))?;
            match inner.nodes.get(&path) {
                Some(node) => Ok(NodeData {
                    data: node.data.clone(),
                    ephemeral_owner: node.ephemeral_owner,
                }),
                None => Err(ReplicationError::NoNode { path }),
            }
        })
    }

    fn exists(&self, path: &str) -> BoxFuture<'_, bool> {
        let path = path.to_string();
        Box::pin(async move {
            let mut inner = self.inner.lock().unwrap();
            inner.check("exists", &path, Call::Exists(path.clone()))?;
            Ok(inner.exists(&path))
        })
    }

    fn delete(&self, path: &str, _version: Option<i32>) -> BoxFuture<'_, ()> {
        let path = path.to_string();
        Box::pin(async move {
            let mut inner = self.inner.lock().unwrap();
            inner.check("delete", &path, Call::Delete(path.clone()))?;
            if !inner.nodes.contains_key(&path) {
                return Err(ReplicationError::NoNode { path });
            }
            if inner.children.get(&path).is_some_and(|c| !c.is_empty()) {
                return Err(ReplicationError::NotEmpty { path });
            }
            inner.nodes.remove(&path);
            let name = name_of(&path).to_string();
            if let Some(siblings) = inner.children.get_mut(parent_of(&path)) {
                siblings.retain(|s| *s != name);
            }
            Ok(())
        })
    }

    fn set_data(&self, path: &str, data: Vec<u8>, _version: Option<i32>) -> BoxFuture<'_, ()> {
        let path = path.to_string();
        Box::pin(async move {
            let mut inner = self.inner.lock().unwrap();
            inner.check("set_data", &path, Call::SetData(path.clone()))?;
            match inner.nodes.get_mut(&path) {
                Some(node) => {
                    node.data = data;
                    Ok(())
                }
                None => Err(ReplicationError::NoNode { path }),
            }
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
            let mut inner = self.inner.lock().unwrap();
            inner.check("create", &path, Call::Create(path.clone()))?;
            if inner.races.remove(&path) && inner.exists(parent_of(&path)) {
                inner.insert(&path, Vec::new(), 0, Vec::new());
            }
            if inner.exists(&path) {
                return Err(ReplicationError::NodeExists { path });
            }
            if !inner.exists(parent_of(&path)) {
                return Err(ReplicationError::NoNode { path });
            }
            let owner = match mode {
                CreateMode::Persistent => 0,
                CreateMode::Ephemeral => 1,
            };
            inner.insert(&path, data, owner, acl);
            Ok(path)
        })
    }

    fn close(&self) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            self.inner.lock().unwrap().calls.push(Call::Close);
            Ok(())
        })
    }
}
