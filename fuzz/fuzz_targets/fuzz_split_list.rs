//! Fuzz target for comma-separated list parsing.
//!
//! This tests that `split_list` never panics and only yields trimmed,
//! non-empty entries.

#![no_main]

use libfuzzer_sys::fuzz_target;
use zk_tree_replicator::config::split_list;
use zk_tree_replicator::ExclusionSet;

fuzz_target!(|list: &str| {
    let entries = split_list(list);
    for entry in &entries {
        assert!(!entry.is_empty());
        assert_eq!(entry.trim(), entry.as_str());
        assert!(!entry.contains(','));
    }

    // Every parsed entry is excluded by the set built from it
    let set = ExclusionSet::new(entries.iter().cloned());
    for entry in &entries {
        assert!(set.is_excluded(entry));
    }
});
