//! Fuzz target for znode path helpers.
//!
//! This tests that `parent_path` and `join_path` never panic on arbitrary
//! input and that the parent of a joined path is the original parent.

#![no_main]

use libfuzzer_sys::fuzz_target;
use zk_tree_replicator::tree::{join_path, parent_path};

fuzz_target!(|data: (&str, &str)| {
    let (path, name) = data;

    // Should never panic
    if let Some(parent) = parent_path(path) {
        assert!(parent.len() < path.len());
    }

    // Round trip only holds for well-formed absolute parents and plain names
    let well_formed = path.starts_with('/')
        && !path.ends_with('/')
        && !name.is_empty()
        && !name.contains('/');
    if well_formed {
        let child = join_path(path, name);
        assert_eq!(parent_path(&child), Some(path));
    }
});
