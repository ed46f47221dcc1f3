// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! ZooKeeper implementation of [`TreeStore`].
//!
//! The `zookeeper` client is synchronous, so each call runs on the blocking
//! pool and is awaited before the next one is issued.
//!
//! # Session State
//!
//! The client reports connection state only through state listeners; the
//! watcher passed at connect time sees node events alone. A listener is
//! subscribed right after the handle is created. The first transition can
//! happen before that subscription, so a readiness check (`exists("/")` on
//! its own thread) reports `Connected` once a request has been answered.
//!
//! # Closing
//!
//! The client closes its session when the handle is dropped. [`TreeStore::close`]
//! hands the last handle to a dedicated thread and waits for that drop, so the
//! session is closed exactly once and a stuck close never holds a runtime
//! thread.

use crate::acl::{Acl, Perms};
use crate::error::{ReplicationError, Result};
use crate::session::SessionState;
use crate::tree::{BoxFuture, CreateMode, NodeData, TreeStore};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, trace, warn};
use zookeeper::{Permission, WatchedEvent, ZkError, ZkState, ZooKeeper};

/// A live session with one ZooKeeper cluster.
pub struct ZkTree {
    cluster: String,
    zk: Mutex<Option<Arc<ZooKeeper>>>,
}

impl ZkTree {
    /// Open a session. Session-level state changes are forwarded to `events`.
    pub async fn connect(
        cluster: &str,
        endpoints: &[String],
        connection_timeout: Duration,
        events: mpsc::UnboundedSender<SessionState>,
    ) -> Result<Self> {
        let connect_string = endpoints.join(",");
        let node_events = cluster.to_string();

        let zk = tokio::task::spawn_blocking(move || {
            ZooKeeper::connect(&connect_string, connection_timeout, move |event: WatchedEvent| {
                trace!(cluster = %node_events, ?event, "Node event");
            })
        })
        .await
        .map_err(|e| ReplicationError::Internal(format!("connect task failed: {}", e)))?
        .map_err(|e| ReplicationError::session(cluster, format!("connect failed: {:?}", e)))?;
        let zk = Arc::new(zk);

        let listener = events.clone();
        // The subscription lives as long as the client; sends after the
        // establisher has gone are dropped.
        let _subscription = zk.add_listener(move |state: ZkState| {
            let _ = listener.send(session_state(state));
        });

        spawn_readiness_check(cluster, Arc::clone(&zk), events);

        Ok(Self {
            cluster: cluster.to_string(),
            zk: Mutex::new(Some(zk)),
        })
    }

    pub fn cluster(&self) -> &str {
        &self.cluster
    }

    fn handle(&self) -> Result<Arc<ZooKeeper>> {
        self.zk
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
            .ok_or_else(|| ReplicationError::session(&self.cluster, "session closed"))
    }

    fn take_handle(&self) -> Option<Arc<ZooKeeper>> {
        self.zk.lock().unwrap_or_else(|e| e.into_inner()).take()
    }
}

impl Drop for ZkTree {
    fn drop(&mut self) {
        if let Some(zk) = self.take_handle() {
            // Dropped without close(): still release off the caller's thread.
            if let Err(e) = release(zk) {
                warn!(cluster = %self.cluster, error = %e, "Failed to release session");
            }
        }
    }
}

impl TreeStore for ZkTree {
    fn children(&self, path: &str) -> BoxFuture<'_, Vec<String>> {
        let path = path.to_string();
        Box::pin(async move {
            let zk = self.handle()?;
            let p = path.clone();
            blocking("get_children", path, move || zk.get_children(&p, false)).await
        })
    }

    fn get(&self, path: &str) -> BoxFuture<'_, NodeData> {
        let path = path.to_string();
        Box::pin(async move {
            let zk = self.handle()?;
            let p = path.clone();
            let (data, stat) = blocking("get_data", path, move || zk.get_data(&p, false)).await?;
            Ok(NodeData {
                data,
                ephemeral_owner: stat.ephemeral_owner,
            })
        })
    }

    fn exists(&self, path: &str) -> BoxFuture<'_, bool> {
        let path = path.to_string();
        Box::pin(async move {
            let zk = self.handle()?;
            let p = path.clone();
            let stat = blocking("exists", path, move || zk.exists(&p, false)).await?;
            Ok(stat.is_some())
        })
    }

    fn delete(&self, path: &str, version: Option<i32>) -> BoxFuture<'_, ()> {
        let path = path.to_string();
        Box::pin(async move {
            let zk = self.handle()?;
            let p = path.clone();
            blocking("delete", path, move || zk.delete(&p, version)).await
        })
    }

    fn set_data(&self, path: &str, data: Vec<u8>, version: Option<i32>) -> BoxFuture<'_, ()> {
        let path = path.to_string();
        Box::pin(async move {
            let zk = self.handle()?;
            let p = path.clone();
            blocking("set_data", path, move || zk.set_data(&p, data, version)).await?;
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
            let zk = self.handle()?;
            let p = path.clone();
            let acl = acl.into_iter().map(to_zk_acl).collect();
            let mode = match mode {
                CreateMode::Persistent => zookeeper::CreateMode::Persistent,
                CreateMode::Ephemeral => zookeeper::CreateMode::Ephemeral,
            };
            blocking("create", path, move || zk.create(&p, data, acl, mode)).await
        })
    }

    fn close(&self) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            let Some(zk) = self.take_handle() else {
                return Ok(());
            };
            debug!(cluster = %self.cluster, "Closing session");
            let released = release(zk)
                .map_err(|e| ReplicationError::Internal(format!("close thread failed: {}", e)))?;
            released
                .await
                .map_err(|_| ReplicationError::session(&self.cluster, "close thread exited early"))
        })
    }
}

/// Drop `zk` on its own thread. The receiver fires once the drop, and with
/// it the client's session close, has finished.
fn release(zk: Arc<ZooKeeper>) -> std::io::Result<oneshot::Receiver<()>> {
    let (done_tx, done_rx) = oneshot::channel();
    std::thread::Builder::new()
        .name("zk-close".to_string())
        .spawn(move || {
            drop(zk);
            let _ = done_tx.send(());
        })?;
    Ok(done_rx)
}

/// Report `Connected` once the session answers a request.
///
/// Covers a transition that completed before the state listener was
/// subscribed. Runs on a plain thread because the call never returns while
/// the client keeps retrying a server that accepts but does not answer.
fn spawn_readiness_check(
    cluster: &str,
    zk: Arc<ZooKeeper>,
    events: mpsc::UnboundedSender<SessionState>,
) {
    let spawned = std::thread::Builder::new()
        .name("zk-ready".to_string())
        .spawn(move || {
            if zk.exists("/", false).is_ok() {
                let _ = events.send(SessionState::Connected);
            }
        });
    if let Err(e) = spawned {
        warn!(cluster = %cluster, error = %e, "Failed to start readiness check");
    }
}

/// Run a blocking client call and map its error.
async fn blocking<T, F>(operation: &'static str, path: String, call: F) -> Result<T>
where
    F: FnOnce() -> std::result::Result<T, ZkError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(call)
        .await
        .map_err(|e| ReplicationError::Internal(format!("{} task failed: {}", operation, e)))?
        .map_err(|e| map_zk_error(operation, path, e))
}

fn map_zk_error(operation: &str, path: String, err: ZkError) -> ReplicationError {
    match err {
        ZkError::NoNode => ReplicationError::NoNode { path },
        ZkError::NodeExists => ReplicationError::NodeExists { path },
        ZkError::NotEmpty => ReplicationError::NotEmpty { path },
        other => ReplicationError::store(operation, path, format!("{:?}", other)),
    }
}

const PERMISSIONS: [(Perms, Permission); 5] = [
    (Perms::READ, Permission::READ),
    (Perms::WRITE, Permission::WRITE),
    (Perms::CREATE, Permission::CREATE),
    (Perms::DELETE, Permission::DELETE),
    (Perms::ADMIN, Permission::ADMIN),
];

fn to_zk_acl(acl: Acl) -> zookeeper::Acl {
    let perms = PERMISSIONS
        .iter()
        .filter(|(ours, _)| acl.perms.contains(*ours))
        .fold(Permission::NONE, |granted, (_, theirs)| granted | *theirs);
    zookeeper::Acl {
        perms,
        scheme: acl.scheme,
        id: acl.id,
    }
}

#[allow(deprecated)]
fn session_state(state: ZkState) -> SessionState {
    match state {
        ZkState::Connecting | ZkState::Associating => SessionState::Connecting,
        ZkState::Connected => SessionState::Connected,
        ZkState::ConnectedReadOnly => SessionState::ConnectedReadOnly,
        ZkState::AuthFailed => SessionState::AuthFailed,
        ZkState::NotConnected => SessionState::Disconnected,
        ZkState::Closed => SessionState::Closed,
    }
}
