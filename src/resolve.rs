// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Endpoint address resolution.
//!
//! Turns a comma-separated `host:port` list into `ip:port` strings using only
//! IPv4 addresses; older ZooKeeper clients cannot parse IPv6 literals in a
//! connect string.
//!
//! An entry that doesn't resolve to any IPv4 address is dropped with a
//! warning. Only an input with no usable entry at all is an error.

use crate::config::split_list;
use crate::error::{ReplicationError, Result};
use crate::metrics;
use std::net::SocketAddr;
use tracing::{debug, warn};

/// Resolve one `host:port` entry to `ipv4:port`, using the first IPv4 address found.
pub async fn resolve_ipv4(entry: &str) -> Result<String> {
    let addrs = tokio::net::lookup_host(entry)
        .await
        .map_err(|e| ReplicationError::Resolve {
            input: entry.to_string(),
            message: e.to_string(),
        })?;

    for addr in addrs {
        if let SocketAddr::V4(v4) = addr {
            return Ok(v4.to_string());
        }
    }

    Err(ReplicationError::Resolve {
        input: entry.to_string(),
        message: "no IPv4 address for name".to_string(),
    })
}

/// Resolve a comma-separated endpoint list, preserving the order of the
/// entries that resolve.
pub async fn resolve_endpoints(list: &str) -> Result<Vec<String>> {
    let entries = split_list(list);
    let mut resolved = Vec::with_capacity(entries.len());

    for entry in &entries {
        match resolve_ipv4(entry).await {
            Ok(addr) => {
                debug!(entry = %entry, resolved = %addr, "Resolved endpoint");
                resolved.push(addr);
            }
            Err(e) => {
                warn!(entry = %entry, error = %e, "Cannot resolve endpoint, will not use it");
                metrics::record_unresolved_endpoint();
            }
        }
    }

    if resolved.is_empty() {
        return Err(ReplicationError::Resolve {
            input: list.to_string(),
            message: "no valid address found".to_string(),
        });
    }

    Ok(resolved)
}
