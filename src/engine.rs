// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Run driver.
//!
//! Ties the pieces together for one copy:
//! 1. Validates the config
//! 2. Resolves both endpoint lists via [`crate::resolve`]
//! 3. Establishes the source session, then the target session
//! 4. Runs the [`Replicator`] from the configured root
//! 5. Closes both sessions, whether or not the walk succeeded
//!
//! # State Transitions
//!
//! ```text
//! Created ──► Connecting ──► Replicating ──► Finished
//!                 │               │
//!                 └───────┬───────┘
//!                         ▼
//!                       Failed
//! ```

use crate::config::ReplicationConfig;
use crate::error::Result;
use crate::exclusion::ExclusionSet;
use crate::metrics;
use crate::replicator::{ReplicationStats, Replicator};
use crate::resolve::resolve_endpoints;
use crate::session::establish;
use crate::tree::{NoOpTreeStore, TreeStore};
use std::time::Instant;
use tracing::{info, warn};

/// State of a replication run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Config accepted, nothing opened yet.
    Created,
    /// Resolving endpoints and establishing sessions.
    Connecting,
    /// Walking the source tree.
    Replicating,
    /// Walk completed without error.
    Finished,
    /// The run stopped on an error.
    Failed,
}

impl std::fmt::Display for EngineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineState::Created => write!(f, "Created"),
            EngineState::Connecting => write!(f, "Connecting"),
            EngineState::Replicating => write!(f, "Replicating"),
            EngineState::Finished => write!(f, "Finished"),
            EngineState::Failed => write!(f, "Failed"),
        }
    }
}

fn transition(state: EngineState) {
    info!(state = %state, "Engine state");
    metrics::set_engine_state(&state.to_string());
}

/// Perform one full copy described by `config`.
pub async fn run(config: ReplicationConfig) -> Result<ReplicationStats> {
    config.validate()?;
    transition(EngineState::Created);

    let result = connect_and_replicate(&config).await;
    match &result {
        Ok(stats) => {
            transition(EngineState::Finished);
            info!(
                nodes_visited = stats.nodes_visited,
                nodes_replicated = stats.nodes_replicated,
                ephemeral_skipped = stats.ephemeral_skipped,
                excluded = stats.excluded,
                parents_created = stats.parents_created,
                "Replication complete"
            );
        }
        Err(e) => {
            metrics::record_error(e.kind());
            transition(EngineState::Failed);
        }
    }
    result
}

async fn connect_and_replicate(config: &ReplicationConfig) -> Result<ReplicationStats> {
    transition(EngineState::Connecting);

    let source_endpoints = resolve_endpoints(&config.source.endpoints).await?;
    let source = establish(&config.source.name, &source_endpoints, &config.session).await?;

    if config.dry_run {
        info!("Dry run: target writes are logged, not applied");
        let result = replicate_between(config, &source, &NoOpTreeStore).await;
        close_quietly(&config.source.name, &source).await;
        return result;
    }

    let target = match resolve_endpoints(&config.target.endpoints).await {
        Ok(endpoints) => establish(&config.target.name, &endpoints, &config.session).await,
        Err(e) => Err(e),
    };
    let target = match target {
        Ok(target) => target,
        Err(e) => {
            close_quietly(&config.source.name, &source).await;
            return Err(e);
        }
    };

    let result = replicate_between(config, &source, &target).await;
    close_quietly(&config.source.name, &source).await;
    close_quietly(&config.target.name, &target).await;
    result
}

/// Run the walk between two already-established stores.
pub async fn replicate_between<S, T>(
    config: &ReplicationConfig,
    source: &S,
    target: &T,
) -> Result<ReplicationStats>
where
    S: TreeStore + ?Sized,
    T: TreeStore + ?Sized,
{
    transition(EngineState::Replicating);
    let start = Instant::now();

    let exclusions = ExclusionSet::new(config.excluded_paths.iter().cloned());
    let replicator = Replicator::new(source, target, exclusions, config.exclusion_mode);
    let stats = replicator.replicate(&config.root_path).await?;

    metrics::record_run_complete(stats.nodes_visited, start.elapsed());
    Ok(stats)
}

async fn close_quietly<S: TreeStore + ?Sized>(cluster: &str, store: &S) {
    if let Err(e) = store.close().await {
        warn!(cluster = %cluster, error = %e, "Failed to close session");
    }
}
