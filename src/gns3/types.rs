use serde::{Deserialize, Serialize};

// --- GNS3 v2 REST types ---

#[derive(Debug, Clone, Deserialize)]
pub struct Gns3Template {
    pub template_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub template_type: String,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProjectCreate {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Gns3Project {
    pub project_id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct AdaptersUpdate {
    pub adapters: usize,
}

#[derive(Debug, Serialize)]
pub struct NodePlacement {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Serialize)]
pub struct NodeRename {
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NodeProperties {
    #[serde(default)]
    pub container_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Gns3Node {
    pub node_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub properties: NodeProperties,
}

#[derive(Debug, Serialize)]
pub struct LinkNode {
    pub node_id: String,
    pub adapter_number: u32,
    pub port_number: u32,
}

#[derive(Debug, Serialize)]
pub struct LinkCreate {
    pub nodes: Vec<LinkNode>,
}
