use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex_lite::{Captures, Regex};

use crate::models::InterfaceMap;

/// Ethernet references, flat ("Ethernet7") or slotted ("Ethernet3/1", "Ethernet1/2/4")
fn ethernet_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\bEthernet(\d+(?:/\d+)*)\b").expect("static regex"))
}

fn management_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\bManagement1\b").expect("static regex"))
}

/// The virtual platform only has Management0
pub const LAB_MANAGEMENT: &str = "Management0";

enum EthernetRef {
    Flat(u32),
    Slotted(String),
}

fn classify(id: &str) -> Option<EthernetRef> {
    if id.contains('/') {
        Some(EthernetRef::Slotted(format!("Ethernet{}", id)))
    } else {
        id.parse().ok().map(EthernetRef::Flat)
    }
}

/// Parse a whole interface name ("Ethernet3/1") as an Ethernet reference
fn classify_name(name: &str) -> Option<EthernetRef> {
    let caps = ethernet_re().captures(name.trim())?;
    let whole = caps.get(0)?;
    if whole.start() != 0 || whole.end() != name.trim().len() {
        return None;
    }
    classify(caps.get(1)?.as_str())
}

fn is_declaration(line: &str) -> bool {
    line.starts_with("interface ")
}

/// Build the slotted -> flat rename table.
///
/// The device's own interfaces (config `interface` declarations, then the
/// `extra` names from the neighbor table) are numbered first, in first-seen
/// order, starting at `base`. Any remaining slotted reference elsewhere in
/// the text follows. Flat indices the device already declares are skipped,
/// so the mapping stays injective and flat names never move.
pub fn build_interface_map(lines: &[String], extra: &[String], base: u32) -> InterfaceMap {
    let mut slotted: Vec<String> = Vec::new();
    let mut reserved: BTreeSet<u32> = BTreeSet::new();

    let mut note = |r: EthernetRef, own: bool| match r {
        EthernetRef::Flat(k) => {
            if own {
                reserved.insert(k);
            }
        }
        EthernetRef::Slotted(name) => {
            if !slotted.iter().any(|s| s.eq_ignore_ascii_case(&name)) {
                slotted.push(name);
            }
        }
    };

    for line in lines.iter().filter(|l| is_declaration(l)) {
        for caps in ethernet_re().captures_iter(line) {
            if let Some(r) = caps.get(1).and_then(|m| classify(m.as_str())) {
                note(r, true);
            }
        }
    }
    for name in extra {
        if let Some(r) = classify_name(name) {
            note(r, true);
        }
    }
    for line in lines.iter().filter(|l| !is_declaration(l)) {
        for caps in ethernet_re().captures_iter(line) {
            if let Some(r) = caps.get(1).and_then(|m| classify(m.as_str())) {
                note(r, false);
            }
        }
    }

    let mut map = InterfaceMap::default();
    let mut next = base;
    for name in slotted {
        while reserved.contains(&next) {
            next += 1;
        }
        map.insert(&name, &format!("Ethernet{}", next));
        reserved.insert(next);
    }
    map
}

/// Apply the rename table (and the management rename) to one line
pub fn rename_line(line: &str, map: &InterfaceMap) -> String {
    let line = management_re().replace_all(line, LAB_MANAGEMENT);
    if map.is_empty() {
        return line.into_owned();
    }
    ethernet_re()
        .replace_all(&line, |caps: &Captures| {
            let whole = &caps[0];
            map.get(whole).map(str::to_string).unwrap_or_else(|| whole.to_string())
        })
        .into_owned()
}

/// Rename a single interface name as the sanitized config would
pub fn lab_interface_name(name: &str, map: &InterfaceMap) -> String {
    rename_line(name.trim(), map)
}

/// Flat Ethernet index of a lab-side interface name ("Ethernet5.100" -> 5)
pub fn ethernet_index(name: &str) -> Option<u32> {
    let caps = ethernet_re().captures(name.trim())?;
    if caps.get(0)?.start() != 0 {
        return None;
    }
    match classify(caps.get(1)?.as_str())? {
        EthernetRef::Flat(k) => Some(k),
        EthernetRef::Slotted(_) => None,
    }
}

/// Interfaces the lab node must expose: the distinct Ethernet interfaces the
/// config declares or the neighbor table uses, widened to the highest index so
/// no referenced port falls outside the node.
pub fn count_interfaces(lines: &[String], map: &InterfaceMap, extra: &[String]) -> usize {
    let mut indices: BTreeSet<u32> = BTreeSet::new();
    for line in lines {
        if let Some(rest) = line.strip_prefix("interface ") {
            for name in rest.split(|c: char| c == ',' || c.is_whitespace()) {
                if let Some(k) = ethernet_index(name) {
                    indices.insert(k);
                }
            }
        }
    }
    for name in extra {
        if let Some(k) = ethernet_index(&lab_interface_name(name, map)) {
            indices.insert(k);
        }
    }
    let highest = indices.last().copied().unwrap_or(0) as usize;
    highest.max(indices.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &str) -> Vec<String> {
        text.lines().map(str::to_string).collect()
    }

    #[test]
    fn test_first_seen_order_from_base() {
        let cfg = lines("interface Ethernet3/1\n!\ninterface Ethernet1/1\n!\ninterface Ethernet3/1.100\n");
        let map = build_interface_map(&cfg, &[], 1);
        assert_eq!(map.get("Ethernet3/1"), Some("Ethernet1"));
        assert_eq!(map.get("Ethernet1/1"), Some("Ethernet2"));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_flat_indices_are_reserved() {
        let cfg = lines("interface Ethernet1\ninterface Ethernet2/1\ninterface Ethernet2\ninterface Ethernet4/1\n");
        let map = build_interface_map(&cfg, &[], 1);
        assert_eq!(map.get("Ethernet2/1"), Some("Ethernet3"));
        assert_eq!(map.get("Ethernet4/1"), Some("Ethernet4"));
    }

    #[test]
    fn test_mapping_is_injective() {
        let mut text = String::new();
        for slot in 1..=4 {
            for port in 1..=8 {
                text.push_str(&format!("interface Ethernet{}/{}\n", slot, port));
            }
        }
        text.push_str("interface Ethernet5\ninterface Ethernet17\n");
        let map = build_interface_map(&lines(&text), &[], 1);
        assert_eq!(map.len(), 32);
        let mut targets: Vec<&str> = map.iter().map(|(_, t)| t).collect();
        targets.sort();
        targets.dedup();
        assert_eq!(targets.len(), 32);
        assert!(!targets.contains(&"Ethernet5"));
        assert!(!targets.contains(&"Ethernet17"));
    }

    #[test]
    fn test_extra_interfaces_follow_config() {
        let cfg = lines("interface Ethernet1/1\n");
        let extra = vec!["Ethernet9/1".to_string(), "Management1".to_string(), "Ethernet1/1".to_string()];
        let map = build_interface_map(&cfg, &extra, 1);
        assert_eq!(map.get("Ethernet1/1"), Some("Ethernet1"));
        assert_eq!(map.get("Ethernet9/1"), Some("Ethernet2"));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_descriptions_do_not_reserve_indices() {
        let cfg = lines("interface Ethernet3/1\n   description to spine1 Ethernet1\nmonitor session m source Ethernet5/5\n");
        let map = build_interface_map(&cfg, &[], 1);
        assert_eq!(map.get("Ethernet3/1"), Some("Ethernet1"));
        assert_eq!(map.get("Ethernet5/5"), Some("Ethernet2"));
    }

    #[test]
    fn test_rename_line_leaves_other_text() {
        let mut map = InterfaceMap::default();
        map.insert("Ethernet3/1", "Ethernet1");
        assert_eq!(rename_line("interface Ethernet3/1.100", &map), "interface Ethernet1.100");
        assert_eq!(rename_line("   description uplink Ethernet3/10", &map), "   description uplink Ethernet3/10");
        assert_eq!(rename_line("interface Management1", &map), "interface Management0");
        assert_eq!(rename_line("interface Ethernet31/1", &map), "interface Ethernet31/1");
    }

    #[test]
    fn test_ethernet_index() {
        assert_eq!(ethernet_index("Ethernet5"), Some(5));
        assert_eq!(ethernet_index("Ethernet5.100"), Some(5));
        assert_eq!(ethernet_index("Ethernet5/1"), None);
        assert_eq!(ethernet_index("Management0"), None);
        assert_eq!(ethernet_index("vEthernet5"), None);
    }

    #[test]
    fn test_count_interfaces_widens_to_highest_index() {
        let cfg = lines("interface Ethernet1\ninterface Ethernet48\n   description to Ethernet60\n");
        assert_eq!(count_interfaces(&cfg, &InterfaceMap::default(), &[]), 48);
        let extra = vec!["Ethernet52".to_string()];
        assert_eq!(count_interfaces(&cfg, &InterfaceMap::default(), &extra), 52);
    }
}
