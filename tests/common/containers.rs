// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Testcontainers setup for ZooKeeper.
//!
//! Provides helpers to spin up single-node ZooKeeper clusters for
//! integration tests.

use testcontainers::{clients::Cli, core::WaitFor, Container, GenericImage};
use zk_tree_replicator::acl::open_acl;
use zk_tree_replicator::config::SessionConfig;
use zk_tree_replicator::session::establish;
use zk_tree_replicator::tree::{CreateMode, TreeStore};
use zk_tree_replicator::{create_recursive, ZkTree};

/// Create a standalone ZooKeeper container.
///
/// Uses the official zookeeper:3.8 image. Waits for the client port bind.
pub fn zookeeper_container(docker: &Cli) -> Container<'_, GenericImage> {
    let image = GenericImage::new("zookeeper", "3.8")
        .with_exposed_port(2181)
        .with_wait_for(WaitFor::message_on_stdout("binding to port"));
    docker.run(image)
}

/// Get the `ip:port` endpoint for a container.
pub fn zookeeper_endpoint(container: &Container<'_, GenericImage>) -> String {
    let port = container.get_host_port_ipv4(2181);
    format!("127.0.0.1:{}", port)
}

/// A running cluster plus a session for seeding and inspecting it.
pub struct TestCluster<'a> {
    #[allow(dead_code)] // Kept alive for container lifetime
    container: Container<'a, GenericImage>,
    pub name: String,
    pub endpoint: String,
    pub session: ZkTree,
}

impl<'a> TestCluster<'a> {
    pub async fn new(docker: &'a Cli, name: &str) -> Self {
        let container = zookeeper_container(docker);
        let endpoint = zookeeper_endpoint(&container);
        let session = establish(name, &[endpoint.clone()], &SessionConfig::testing())
            .await
            .expect("Failed to open seeding session");
        Self {
            container,
            name: name.to_string(),
            endpoint,
            session,
        }
    }

    /// Create a persistent node (and any missing parents).
    pub async fn put(&self, path: &str, data: &[u8]) {
        create_recursive(&self.session, path, data.to_vec(), CreateMode::Persistent, open_acl())
            .await
            .expect("Failed to seed node");
    }

    /// Create an ephemeral node owned by the seeding session.
    ///
    /// The parent must already exist.
    pub async fn put_ephemeral(&self, path: &str, data: &[u8]) {
        self.session
            .create(path, data.to_vec(), open_acl(), CreateMode::Ephemeral)
            .await
            .expect("Failed to seed ephemeral node");
    }

    pub async fn data(&self, path: &str) -> Option<Vec<u8>> {
        match self.session.get(path).await {
            Ok(node) => Some(node.data),
            Err(e) if e.is_no_node() => None,
            Err(e) => panic!("get {} failed: {}", path, e),
        }
    }

    pub async fn exists(&self, path: &str) -> bool {
        self.session.exists(path).await.expect("exists failed")
    }
}
