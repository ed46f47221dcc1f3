// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Session establishment.
//!
//! Opens a session to one cluster and waits for the first connection-state
//! event before handing the session to the replicator.
//!
//! # Connection Lifecycle
//!
//! ```text
//! open ──► first state event ──► Connected / Connecting ──► usable
//!                 │
//!                 ├── any other state ──► close, Session error
//!                 └── deadline elapsed ─► close, SessionTimeout error
//! ```
//!
//! The wait is bounded by [`SessionConfig::establish_timeout()`]; a cluster
//! that never reports a state fails the run instead of hanging it.

use crate::config::SessionConfig;
use crate::error::{ReplicationError, Result};
use crate::metrics;
use crate::tree::TreeStore;
use crate::zk::ZkTree;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::time::timeout;
use tracing::{error, info, warn};

/// Connection state reported by a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Connection attempt in progress.
    Connecting,
    /// Connected and healthy.
    Connected,
    /// Connected to a read-only server.
    ConnectedReadOnly,
    /// Server rejected the credentials.
    AuthFailed,
    /// Not connected to any server.
    Disconnected,
    /// Session ended, by the client or by expiry.
    Closed,
}

impl SessionState {
    /// Whether a session whose first event is `self` may be used.
    pub fn is_usable(self) -> bool {
        matches!(self, SessionState::Connected | SessionState::Connecting)
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionState::Connecting => write!(f, "Connecting"),
            SessionState::Connected => write!(f, "Connected"),
            SessionState::ConnectedReadOnly => write!(f, "ConnectedReadOnly"),
            SessionState::AuthFailed => write!(f, "AuthFailed"),
            SessionState::Disconnected => write!(f, "Disconnected"),
            SessionState::Closed => write!(f, "Closed"),
        }
    }
}

/// Wait for the first state event, bounded by `deadline`.
pub async fn await_first_state(
    events: &mut mpsc::UnboundedReceiver<SessionState>,
    cluster: &str,
    deadline: Duration,
) -> Result<SessionState> {
    match timeout(deadline, events.recv()).await {
        Ok(Some(state)) => Ok(state),
        Ok(None) => Err(ReplicationError::session(
            cluster,
            "state channel closed before the first event",
        )),
        Err(_) => Err(ReplicationError::SessionTimeout {
            cluster: cluster.to_string(),
            timeout_ms: deadline.as_millis() as u64,
        }),
    }
}

/// Accept an opened session, or close it and fail.
///
/// The store is returned only when the first state event is usable. On any
/// failure the store is closed before the error is returned; the close is
/// bounded by the same deadline.
pub async fn establish_with<S: TreeStore>(
    cluster: &str,
    store: S,
    events: &mut mpsc::UnboundedReceiver<SessionState>,
    deadline: Duration,
) -> Result<S> {
    let start = Instant::now();

    let outcome = match await_first_state(events, cluster, deadline).await {
        Ok(state) if state.is_usable() => Ok(state),
        Ok(state) => Err(ReplicationError::session(
            cluster,
            format!("connect failed: {}", state),
        )),
        Err(e) => Err(e),
    };

    match outcome {
        Ok(state) => {
            metrics::record_session(cluster, true);
            metrics::record_session_establish_latency(cluster, start.elapsed());
            info!(cluster = %cluster, state = %state, "Session established");
            Ok(store)
        }
        Err(e) => {
            metrics::record_session(cluster, false);
            error!(cluster = %cluster, error = %e, "Session establishment failed");
            match timeout(deadline, store.close()).await {
                Ok(Ok(())) => {}
                Ok(Err(close_err)) => {
                    warn!(cluster = %cluster, error = %close_err, "Failed to close rejected session");
                }
                Err(_) => warn!(cluster = %cluster, "Timed out closing rejected session"),
            }
            Err(e)
        }
    }
}

/// Open a ZooKeeper session over resolved `ip:port` endpoints.
pub async fn establish(cluster: &str, endpoints: &[String], config: &SessionConfig) -> Result<ZkTree> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    info!(
        cluster = %cluster,
        endpoints = %endpoints.join(","),
        timeout_ms = config.connection_timeout_ms,
        "Connecting to cluster"
    );
    let tree = ZkTree::connect(cluster, endpoints, config.connection_timeout(), tx).await?;
    establish_with(cluster, tree, &mut rx, config.establish_timeout()).await
}
