use serde::{Deserialize, Serialize};

/// NodeSpec describes one virtual switch to create in the lab
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSpec {
    pub name: String,
    pub template_id: String,
    /// Version tag the template was matched on
    pub version: String,
    pub interface_count: usize,
    /// Adapters to request from the template (interfaces + management/spare)
    pub adapters: usize,
    pub system_mac: String,
    #[serde(skip_serializing)]
    pub config: String,
    pub x: i32,
    pub y: i32,
}

/// A node + interface reference used by link specs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortRef {
    pub node: String,
    /// Interface name inside the lab node (after renaming)
    pub interface: String,
    /// Adapter slot on the lab node; Ethernet<k> sits on adapter k, management on 0
    pub adapter: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkSpec {
    pub a: PortRef,
    pub b: PortRef,
}

/// ProvisioningPlan is the complete, self-consistent description of the lab
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisioningPlan {
    pub nodes: Vec<NodeSpec>,
    pub links: Vec<LinkSpec>,
}

impl ProvisioningPlan {
    pub fn node(&self, name: &str) -> Option<&NodeSpec> {
        self.nodes.iter().find(|n| n.name == name)
    }

    /// Links whose endpoints are not nodes of this plan
    pub fn dangling_links(&self) -> Vec<&LinkSpec> {
        self.links
            .iter()
            .filter(|l| self.node(&l.a.node).is_none() || self.node(&l.b.node).is_none())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(name: &str) -> NodeSpec {
        NodeSpec {
            name: name.to_string(),
            template_id: "t1".to_string(),
            version: "4.29.2F".to_string(),
            interface_count: 4,
            adapters: 6,
            system_mac: "02:1c:73:00:00:01".to_string(),
            config: String::new(),
            x: 0,
            y: 0,
        }
    }

    fn port(node: &str, adapter: u32) -> PortRef {
        PortRef { node: node.to_string(), interface: format!("Ethernet{}", adapter), adapter }
    }

    #[test]
    fn test_dangling_links() {
        let plan = ProvisioningPlan {
            nodes: vec![node("a"), node("b")],
            links: vec![
                LinkSpec { a: port("a", 1), b: port("b", 1) },
                LinkSpec { a: port("a", 2), b: port("c", 1) },
            ],
        };
        let dangling = plan.dangling_links();
        assert_eq!(dangling.len(), 1);
        assert_eq!(dangling[0].b.node, "c");
    }
}
