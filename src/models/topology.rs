use serde::{Deserialize, Serialize};

/// Canonical link status values
pub mod link_status {
    pub const CONFIRMED: &str = "confirmed";
    pub const UNCONFIRMED: &str = "unconfirmed";
}

/// One side of a link: a device identity plus that device's local interface
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Endpoint {
    pub device: String,
    pub interface: String,
}

impl Endpoint {
    pub fn new(device: &str, interface: &str) -> Self {
        Self {
            device: device.to_string(),
            interface: interface.to_string(),
        }
    }

    /// Case-folded form used for dedup keys
    fn folded(&self) -> (String, String) {
        (self.device.to_lowercase(), self.interface.to_lowercase())
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.device, self.interface)
    }
}

/// LinkEdge is an inferred connection between two devices.
///
/// `confirmed` edges were reported by both ends. Unconfirmed edges were seen
/// from one side only, typically because the far end is outside the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkEdge {
    pub a: Endpoint,
    pub b: Endpoint,
    pub status: String, // confirmed, unconfirmed
}

/// Canonical identity of a physical link, independent of which end reported it
pub type LinkKey = ((String, String), (String, String));

impl LinkEdge {
    pub fn confirmed(a: Endpoint, b: Endpoint) -> Self {
        Self { a, b, status: link_status::CONFIRMED.to_string() }
    }

    pub fn unconfirmed(a: Endpoint, b: Endpoint) -> Self {
        Self { a, b, status: link_status::UNCONFIRMED.to_string() }
    }

    pub fn is_confirmed(&self) -> bool {
        self.status == link_status::CONFIRMED
    }

    /// Sorted pair of (device, interface); an edge and its mirror share a key
    pub fn key(&self) -> LinkKey {
        let (x, y) = (self.a.folded(), self.b.folded());
        if x <= y { (x, y) } else { (y, x) }
    }
}

impl std::fmt::Display for LinkEdge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} <-> {} ({})", self.a, self.b, self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mirror_edges_share_key() {
        let ab = LinkEdge::confirmed(Endpoint::new("leaf1", "Ethernet1"), Endpoint::new("spine1", "Ethernet3"));
        let ba = LinkEdge::confirmed(Endpoint::new("spine1", "ethernet3"), Endpoint::new("LEAF1", "Ethernet1"));
        assert_eq!(ab.key(), ba.key());
    }

    #[test]
    fn test_status_helpers() {
        let e = LinkEdge::unconfirmed(Endpoint::new("a", "Ethernet1"), Endpoint::new("b", "Ethernet2"));
        assert!(!e.is_confirmed());
        assert_eq!(e.to_string(), "a:Ethernet1 <-> b:Ethernet2 (unconfirmed)");
    }
}
