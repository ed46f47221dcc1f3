//! Shared test utilities for integration tests.
//!
//! This module provides:
//! - ZooKeeper testcontainer setup
//! - In-process fake ZooKeeper server for session tests
//! - In-memory TreeStore recording calls
//! - In-memory log capture

#![allow(dead_code)]

pub mod containers;
pub mod log_capture;
pub mod mock_tree;

pub use containers::*;
pub use fake_zk::*;
pub use log_capture::*;
pub use mock_tree::*;
