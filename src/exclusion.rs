// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Path exclusion filter.
//!
//! Membership is exact string equality against a node's full path. Neither
//! prefixes nor trailing slashes are normalized: `/r3/failover` does not
//! exclude `/r3/failover/doing`, and `/r3/a/` does not exclude `/r3/a`.

use std::collections::HashSet;

/// Fixed set of excluded absolute paths, built once at startup.
#[derive(Debug, Clone, Default)]
pub struct ExclusionSet {
    paths: HashSet<String>,
}

impl ExclusionSet {
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    /// True iff `path` is exactly one of the configured paths.
    pub fn is_excluded(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}
