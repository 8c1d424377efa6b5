use serde::{Deserialize, Serialize};

/// One locally observed LLDP adjacency: "on my `local_interface` I see
/// `remote_device` on its `remote_interface`". Inherently one-sided.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NeighborObservation {
    pub local_interface: String,
    pub remote_device: String,
    pub remote_interface: String,
}

impl NeighborObservation {
    pub fn new(local_interface: &str, remote_device: &str, remote_interface: &str) -> Self {
        Self {
            local_interface: local_interface.trim().to_string(),
            remote_device: remote_device.trim().to_string(),
            remote_interface: remote_interface.trim().to_string(),
        }
    }
}

/// DeviceRecord is everything collected from one switch during a run.
///
/// Identity fields are filled by the collector and never change afterwards;
/// `sanitized` is attached once the config has been rewritten for the lab.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceRecord {
    /// Name the switch was queried by
    pub name: String,
    pub model: String,
    /// Platform version as reported by the switch (e.g. "4.29.3F")
    pub version: String,
    /// System MAC, normalized to lowercase colon form
    pub system_mac: String,
    #[serde(default)]
    pub serial_number: String,
    /// LLDP system name; this is what neighbors report for us
    #[serde(default)]
    pub lldp_name: String,
    pub neighbors: Vec<NeighborObservation>,
    #[serde(skip_serializing)]
    pub startup_config: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sanitized: Option<SanitizedConfig>,
}

impl DeviceRecord {
    /// All names other devices may use to refer to this one
    pub fn identities(&self) -> Vec<&str> {
        let mut ids = vec![self.name.as_str()];
        if !self.lldp_name.is_empty() && !self.lldp_name.eq_ignore_ascii_case(&self.name) {
            ids.push(self.lldp_name.as_str());
        }
        ids
    }

    /// Distinct local interfaces that carry at least one neighbor
    pub fn neighbor_interfaces(&self) -> Vec<String> {
        let mut seen: Vec<String> = Vec::new();
        for n in &self.neighbors {
            if !seen.iter().any(|s| s.eq_ignore_ascii_case(&n.local_interface)) {
                seen.push(n.local_interface.clone());
            }
        }
        seen
    }
}

/// Device metadata the sanitizer needs besides the config text itself
#[derive(Debug, Clone)]
pub struct DeviceMeta {
    pub name: String,
    pub system_mac: String,
    /// Interfaces known from outside the config (neighbor table); they join the
    /// rename enumeration after every interface the config itself mentions
    pub extra_interfaces: Vec<String>,
}

impl From<&DeviceRecord> for DeviceMeta {
    fn from(record: &DeviceRecord) -> Self {
        Self {
            name: record.name.clone(),
            system_mac: record.system_mac.clone(),
            extra_interfaces: record.neighbor_interfaces(),
        }
    }
}

/// Source interface name -> lab interface name, in assignment order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceMap {
    entries: Vec<(String, String)>,
}

impl InterfaceMap {
    pub fn insert(&mut self, source: &str, target: &str) {
        if self.get(source).is_none() {
            self.entries.push((source.to_string(), target.to_string()));
        }
    }

    pub fn get(&self, source: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(s, _)| s.eq_ignore_ascii_case(source))
            .map(|(_, t)| t.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(s, t)| (s.as_str(), t.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Output of the config sanitizer for one device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SanitizedConfig {
    #[serde(skip_serializing)]
    pub text: String,
    pub interface_map: InterfaceMap,
    /// Ethernet interfaces the lab node must expose
    pub interface_count: usize,
    /// Synthesized system MAC (locally administered)
    pub system_mac: String,
}
