//! Lab provisioning service: the calls a provisioning plan is translated
//! into, plus the GNS3 implementation (REST for the project, Docker API for
//! files and commands inside node containers).

pub mod client;
pub mod docker;
pub mod types;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{NodeSpec, PlatformCapabilities, PortRef};

pub use client::Gns3Client;

/// A node created in a lab project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeHandle {
    pub project_id: String,
    pub node_id: String,
    pub name: String,
    /// Backing container, when the node type has one
    pub container_id: Option<String>,
}

#[async_trait]
pub trait LabProvisioner: Send + Sync {
    async fn list_available_templates(&self) -> Result<PlatformCapabilities>;

    /// Create an empty project, returning its id
    async fn create_project(&self, name: &str) -> Result<String>;

    async fn create_node(&self, project_id: &str, spec: &NodeSpec) -> Result<NodeHandle>;

    async fn create_link(&self, a: (&NodeHandle, &PortRef), b: (&NodeHandle, &PortRef)) -> Result<()>;

    /// Write `bytes` to the absolute `path` inside the node
    async fn push_file(&self, node: &NodeHandle, path: &str, bytes: &[u8]) -> Result<()>;

    async fn start_node(&self, node: &NodeHandle) -> Result<()>;

    async fn stop_node(&self, node: &NodeHandle) -> Result<()>;

    async fn exec_command(&self, node: &NodeHandle, command: &str) -> Result<()>;

    async fn close_project(&self, project_id: &str) -> Result<()>;

    /// Where a user can open the project
    fn project_url(&self, project_id: &str) -> String;
}

/// Split an absolute file path into (directory, file name)
pub fn split_path(path: &str) -> Result<(&str, &str)> {
    let (dir, name) = path
        .rsplit_once('/')
        .ok_or_else(|| anyhow::anyhow!("'{}' is not an absolute path", path))?;
    if name.is_empty() || !path.starts_with('/') {
        return Err(anyhow::anyhow!("'{}' is not an absolute file path", path));
    }
    Ok((if dir.is_empty() { "/" } else { dir }, name))
}
