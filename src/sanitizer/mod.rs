//! Rewrites a production EOS startup-config so it boots cleanly on a cEOS
//! lab node.
//!
//! Rules run in this order:
//! 1. drop AAA and local-user blocks entirely
//! 2. rename `Management1` and slotted `EthernetN/M` interfaces to flat names
//! 3. comment out directives cEOS does not support (whole block)
//! 4. inject an on-boot event handler that pins the synthesized system MAC

mod interfaces;
mod mac;

use crate::errors::SanitizeError;
use crate::models::{DeviceMeta, SanitizedConfig};

pub use interfaces::{ethernet_index, lab_interface_name, LAB_MANAGEMENT};
pub use mac::{is_locally_administered, synthesize_system_mac};

/// Prefix put in front of suppressed lines
pub const COMMENT_MARKER: &str = "!removed_for_cEOS-lab| ";

/// First flat Ethernet index handed out when renaming slotted interfaces
pub const DEFAULT_BASE_INDEX: u32 = 1;

/// Event handler carrying the synthesized system MAC
const SYSMAC_HANDLER: &str = "event-handler ptov-system-mac";

/// Left in place of the handler when the source MAC is unusable
const SYSMAC_SKIPPED: &str = "!removed_for_cEOS-lab| system-mac not set";

/// Top-level commands that open AAA / local account blocks
const ACCESS_PREFIXES: &[&str] = &["aaa", "no aaa", "username"];

/// Commands cEOS rejects or that make no sense in a lab
const UNSUPPORTED_PREFIXES: &[&str] = &[
    "radius-server",
    "ip radius",
    "tacacs-server",
    "ip tacacs",
    "hardware speed-group",
    "queue-monitor",
    "queue",
    "tx-queue",
    "ntp server",
    "daemon TerminAttr",
];

/// Sanitize with the default interface base index
pub fn sanitize(raw: &str, meta: &DeviceMeta) -> Result<SanitizedConfig, SanitizeError> {
    sanitize_with_base(raw, meta, DEFAULT_BASE_INDEX)
}

pub fn sanitize_with_base(
    raw: &str,
    meta: &DeviceMeta,
    base_index: u32,
) -> Result<SanitizedConfig, SanitizeError> {
    if raw.trim().is_empty() || raw.contains('\0') {
        return Err(SanitizeError::EmptyInput);
    }

    let lines: Vec<String> = raw.lines().map(|l| l.trim_end().to_string()).collect();

    // Credentials first: nothing below may keep an AAA/username line alive
    let lines = strip_access_blocks(lines);
    let mut lines = strip_block(lines, SYSMAC_HANDLER);
    lines.retain(|l| !l.starts_with(SYSMAC_SKIPPED));

    let map = interfaces::build_interface_map(&lines, &meta.extra_interfaces, base_index);
    let lines: Vec<String> = lines.iter().map(|l| interfaces::rename_line(l, &map)).collect();

    let mut lines = comment_unsupported(lines);
    let interface_count = interfaces::count_interfaces(&lines, &map, &meta.extra_interfaces);

    let system_mac = match synthesize_system_mac(&meta.system_mac) {
        Some(mac) => {
            insert_before_end(&mut lines, sysmac_handler(&mac));
            mac
        }
        None => {
            tracing::warn!("{}: unusable system MAC '{}', not pinning one", meta.name, meta.system_mac);
            insert_before_end(
                &mut lines,
                vec![format!("{}: source address '{}' unparseable", SYSMAC_SKIPPED, meta.system_mac)],
            );
            String::new()
        }
    };

    let mut text = lines.join("\n");
    text.push('\n');

    Ok(SanitizedConfig {
        text,
        interface_map: map,
        interface_count,
        system_mac,
    })
}

fn indent_of(line: &str) -> usize {
    line.len() - line.trim_start().len()
}

fn starts_with_command(line: &str, command: &str) -> bool {
    match line.strip_prefix(command) {
        Some(rest) => rest.is_empty() || rest.starts_with(' '),
        None => false,
    }
}

/// Drop every top-level AAA / username line together with its indented children
fn strip_access_blocks(lines: Vec<String>) -> Vec<String> {
    let mut out = Vec::with_capacity(lines.len());
    let mut skipping = false;
    for line in lines {
        // Blank lines inside a block belong to it; only the next top-level command ends it
        if indent_of(&line) == 0 && !line.is_empty() {
            skipping = ACCESS_PREFIXES.iter().any(|p| starts_with_command(&line, p));
        }
        if !skipping {
            out.push(line);
        }
    }
    out
}

/// Drop a top-level block by its exact header line
fn strip_block(lines: Vec<String>, header: &str) -> Vec<String> {
    let mut out = Vec::with_capacity(lines.len());
    let mut skipping = false;
    for line in lines {
        if indent_of(&line) == 0 && !line.is_empty() {
            skipping = line == header;
        }
        if !skipping {
            out.push(line);
        }
    }
    out
}

/// Comment out unsupported commands at any depth, along with their sub-block
fn comment_unsupported(lines: Vec<String>) -> Vec<String> {
    let mut out = Vec::with_capacity(lines.len());
    let mut block_indent: Option<usize> = None;
    for line in lines {
        let indent = indent_of(&line);
        if let Some(bi) = block_indent {
            if !line.trim().is_empty() && indent <= bi {
                block_indent = None;
            }
        }
        if block_indent.is_none() {
            let command = line.trim_start();
            if !command.starts_with('!')
                && UNSUPPORTED_PREFIXES.iter().any(|p| starts_with_command(command, p))
            {
                block_indent = Some(indent);
            }
        }
        if block_indent.is_some() && !line.trim().is_empty() {
            out.push(format!("{}{}", COMMENT_MARKER, line));
        } else {
            out.push(line);
        }
    }
    out
}

fn sysmac_handler(mac: &str) -> Vec<String> {
    vec![
        SYSMAC_HANDLER.to_string(),
        "   trigger on-boot".to_string(),
        "   action bash".to_string(),
        format!("      var_sysmac='{}'", mac),
        "      echo $var_sysmac > /mnt/flash/system_mac_address".to_string(),
        "      truncate -s -1 /mnt/flash/system_mac_address".to_string(),
        "      EOF".to_string(),
    ]
}

/// Insert before the closing `end`, or append when the config has none
fn insert_before_end(lines: &mut Vec<String>, block: Vec<String>) {
    while lines.last().map_or(false, |l| l.trim().is_empty()) {
        lines.pop();
    }
    let at = match lines.last() {
        Some(last) if last.trim() == "end" => lines.len() - 1,
        _ => lines.len(),
    };
    lines.splice(at..at, block);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta() -> DeviceMeta {
        DeviceMeta {
            name: "leaf1".to_string(),
            system_mac: "00:1c:73:aa:bb:cc".to_string(),
            extra_interfaces: Vec::new(),
        }
    }

    const PROD_CONFIG: &str = "! device: leaf1 (DCS-7280SR3-48YC8, EOS-4.29.3F)
!
hostname leaf1
!
aaa authentication login default group tacacs+ local
aaa authorization exec default group tacacs+ local
aaa group server tacacs+ TACACS
   server 10.0.0.5 vrf MGMT
!
username admin privilege 15 role network-admin secret sha512 $6$abc
username ops secret 0 opspass
   ssh-key ssh-rsa AAAAB3Nza
!
queue-monitor length
!
tacacs-server host 10.0.0.5 key 7 0011223344
!
interface Port-Channel5
   description mlag-peer
   switchport mode trunk
!
interface Ethernet3/1
   description to spine1 Ethernet1
   channel-group 5 mode active
!
interface Ethernet3/2
   channel-group 5 mode active
   tx-queue 3
      bandwidth percent 20
   no shutdown
!
interface Management1
   ip address 192.0.2.10/24
!
lldp tlv transmit system-name
!
monitor session uplinks source Ethernet3/1
!
end
";

    #[test]
    fn test_scenario_prod_config() {
        let out = sanitize(PROD_CONFIG, &meta()).unwrap();
        let text = &out.text;

        assert!(!text.lines().any(|l| l.starts_with("aaa") || l.starts_with("username")));
        assert!(!text.contains("ssh-key"));
        assert!(!text.contains("server 10.0.0.5 vrf MGMT"));

        assert!(!text.contains("Ethernet3/1"));
        assert_eq!(out.interface_map.get("Ethernet3/1"), Some("Ethernet1"));
        assert_eq!(out.interface_map.get("Ethernet3/2"), Some("Ethernet2"));
        assert!(text.contains("interface Ethernet1\n   description to spine1 Ethernet1\n   channel-group 5 mode active"));
        assert!(text.contains("monitor session uplinks source Ethernet1"));

        assert!(text.contains("!removed_for_cEOS-lab| queue-monitor length"));
        assert!(text.contains("!removed_for_cEOS-lab| tacacs-server host"));
        assert!(text.contains("!removed_for_cEOS-lab|    tx-queue 3\n!removed_for_cEOS-lab|       bandwidth percent 20\n   no shutdown"));

        assert!(text.contains("interface Management0"));
        assert!(!text.contains("Management1"));

        assert!(text.contains("var_sysmac='02:1c:73:aa:bb:cc'"));
        assert!(text.ends_with("      EOF\nend\n"));
        assert_eq!(out.system_mac, "02:1c:73:aa:bb:cc");
        assert_eq!(out.interface_count, 2);
    }

    #[test]
    fn test_idempotent() {
        let once = sanitize(PROD_CONFIG, &meta()).unwrap();
        let twice = sanitize(&once.text, &meta()).unwrap();
        assert_eq!(once.text, twice.text);
        assert!(twice.interface_map.is_empty());
        assert_eq!(once.interface_count, twice.interface_count);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(sanitize("", &meta()), Err(SanitizeError::EmptyInput));
        assert_eq!(sanitize("  \n\n", &meta()), Err(SanitizeError::EmptyInput));
        assert_eq!(sanitize("hostname a\0b", &meta()), Err(SanitizeError::EmptyInput));
    }

    #[test]
    fn test_access_block_ends_at_next_top_level_line() {
        let raw = "username admin secret x\n   ssh-key abc\nhostname sw\n";
        let out = sanitize(raw, &meta()).unwrap();
        assert!(out.text.starts_with("hostname sw\n"));
    }

    #[test]
    fn test_access_block_spans_blank_lines() {
        let raw = "aaa group server tacacs+ T\n   server 1.1.1.1\n\n   server 2.2.2.2 key 7 0822\nhostname x\nend\n";
        let out = sanitize(raw, &meta()).unwrap();
        assert!(!out.text.contains("server 1.1.1.1"));
        assert!(!out.text.contains("server 2.2.2.2"));
        assert!(out.text.contains("hostname x"));
    }

    #[test]
    fn test_no_end_line_appends_handler() {
        let out = sanitize("hostname sw\ninterface Ethernet1\n", &meta()).unwrap();
        assert!(out.text.starts_with("hostname sw\ninterface Ethernet1\nevent-handler ptov-system-mac\n"));
        assert_eq!(out.interface_count, 1);
    }

    #[test]
    fn test_unparseable_mac_is_flagged_not_fatal() {
        let m = DeviceMeta { system_mac: "n/a".to_string(), ..meta() };
        let out = sanitize("hostname sw\nend\n", &m).unwrap();
        assert!(out.system_mac.is_empty());
        assert!(out.text.contains("!removed_for_cEOS-lab| system-mac not set"));
        assert!(!out.text.contains("event-handler"));
        let again = sanitize(&out.text, &m).unwrap();
        assert_eq!(again.text, out.text);
    }

    #[test]
    fn test_neighbor_interfaces_extend_count() {
        let m = DeviceMeta {
            extra_interfaces: vec!["Ethernet7/1".to_string()],
            ..meta()
        };
        let out = sanitize("interface Ethernet1/1\n!\nend\n", &m).unwrap();
        assert_eq!(out.interface_map.get("Ethernet7/1"), Some("Ethernet2"));
        assert_eq!(out.interface_count, 2);
    }

    #[test]
    fn test_base_index() {
        let out = sanitize_with_base("interface Ethernet1/1\nend\n", &meta(), 10).unwrap();
        assert!(out.text.contains("interface Ethernet10\n"));
    }
}
