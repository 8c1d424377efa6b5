use std::collections::HashMap;

use anyhow::{Context, Result};

use crate::gns3::{LabProvisioner, NodeHandle};
use crate::models::ProvisioningPlan;

/// Where the startup-config lands before being moved onto flash
pub const STAGING_PATH: &str = "/startup-config";

/// Flash is only mounted while the node runs
const MOVE_TO_FLASH: &str = "mv /startup-config /mnt/flash/";

/// Translate a plan into lab-server calls. Fails fast on the first error.
///
/// Each node is created, started, given its startup-config and stopped
/// again; links are created once every node exists. Returns the URL of the
/// closed project.
pub async fn apply_plan(plan: &ProvisioningPlan, provisioner: &dyn LabProvisioner, project: &str) -> Result<String> {
    if let Some(link) = plan.dangling_links().first() {
        anyhow::bail!("plan links {} to {} but one of them is not a node", link.a.node, link.b.node);
    }

    let project_id = provisioner.create_project(project).await?;
    let mut handles: HashMap<&str, NodeHandle> = HashMap::new();

    for node in &plan.nodes {
        let handle = provisioner
            .create_node(&project_id, node)
            .await
            .with_context(|| format!("creating node {}", node.name))?;
        provisioner
            .start_node(&handle)
            .await
            .with_context(|| format!("starting node {}", node.name))?;
        provisioner
            .push_file(&handle, STAGING_PATH, node.config.as_bytes())
            .await
            .with_context(|| format!("pushing startup-config to {}", node.name))?;
        provisioner
            .exec_command(&handle, MOVE_TO_FLASH)
            .await
            .with_context(|| format!("moving startup-config on {}", node.name))?;
        provisioner
            .stop_node(&handle)
            .await
            .with_context(|| format!("stopping node {}", node.name))?;
        handles.insert(node.name.as_str(), handle);
    }

    tracing::info!("Creating {} links", plan.links.len());
    for link in &plan.links {
        let (a, b) = match (handles.get(link.a.node.as_str()), handles.get(link.b.node.as_str())) {
            (Some(a), Some(b)) => (a, b),
            _ => anyhow::bail!("link {} <-> {} references an unknown node", link.a.node, link.b.node),
        };
        provisioner
            .create_link((a, &link.a), (b, &link.b))
            .await
            .with_context(|| {
                format!("linking {}:{} to {}:{}", link.a.node, link.a.interface, link.b.node, link.b.interface)
            })?;
    }

    provisioner.close_project(&project_id).await?;
    Ok(provisioner.project_url(&project_id))
}
