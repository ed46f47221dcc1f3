// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

use clap::{Parser, ValueEnum};
use std::process::ExitCode;
use tracing::level_filters::LevelFilter;
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use zk_tree_replicator::config::{
    split_list, ClusterConfig, ExclusionMode, ReplicationConfig, SessionConfig,
};
use zk_tree_replicator::engine;

/// Copy a ZooKeeper tree from one cluster to another.
#[derive(Parser, Debug)]
#[command(name = "zk-replicate", version, about)]
struct Args {
    /// Source cluster address list (host:port,host:port)
    #[arg(long = "sourceaddr")]
    source_addr: String,

    /// Target cluster address list (host:port,host:port)
    #[arg(long = "targetaddr", required_unless_present = "dry_run")]
    target_addr: Option<String>,

    /// Comma-separated absolute paths to exclude (exact match)
    #[arg(long = "excludepath", default_value = "/r3/failover/history,/r3/failover/doing")]
    exclude_path: String,

    /// Root of the subtree to copy
    #[arg(long, default_value = "/r3")]
    root: String,

    /// What to do with the remaining siblings of an excluded path
    #[arg(long, value_enum, default_value_t = ModeArg::StopSiblings)]
    exclusion_mode: ModeArg,

    /// Seconds to wait for the first session state event
    #[arg(long, default_value_t = 30)]
    establish_timeout_secs: u64,

    /// Read the source and log what would be written, without a target
    #[arg(long)]
    dry_run: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModeArg {
    StopSiblings,
    SkipSubtree,
}

impl From<ModeArg> for ExclusionMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::StopSiblings => ExclusionMode::StopSiblings,
            ModeArg::SkipSubtree => ExclusionMode::SkipSubtree,
        }
    }
}

impl Args {
    fn into_config(self) -> ReplicationConfig {
        ReplicationConfig {
            source: ClusterConfig::new("source", &self.source_addr),
            target: ClusterConfig::new("target", self.target_addr.as_deref().unwrap_or_default()),
            root_path: self.root,
            excluded_paths: split_list(&self.exclude_path),
            exclusion_mode: self.exclusion_mode.into(),
            session: SessionConfig {
                establish_timeout_ms: self.establish_timeout_secs.saturating_mul(1_000),
                ..SessionConfig::default()
            },
            dry_run: self.dry_run,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    init_log();
    let args = Args::parse();

    match engine::run(args.into_config()).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Replication failed");
            ExitCode::FAILURE
        }
    }
}

fn init_log() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("ZK_REPLICATOR_LOG")
                .from_env_lossy(),
        )
        .init();
}
