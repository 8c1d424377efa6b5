//! Lab model builder: turns sanitized device records and the inferred link
//! graph into a provisioning plan for the lab server.

mod layout;

use std::collections::HashMap;

use crate::errors::ModelError;
use crate::models::{
    link_skip, normalize_version, stage, DeviceRecord, EdgeFailure, Endpoint, LinkEdge, LinkSpec,
    NodeSpec, PlatformCapabilities, PortRef, ProvisioningPlan, Template,
};
use crate::sanitizer::{ethernet_index, is_locally_administered, lab_interface_name, LAB_MANAGEMENT};
use crate::topology::IdentityResolver;

use layout::GridLayout;

/// Plan for the devices that could be placed, plus why the rest could not
#[derive(Debug, Default)]
pub struct BuildOutcome {
    pub plan: ProvisioningPlan,
    /// Confirmed edges that became plan links
    pub linked_edges: Vec<LinkEdge>,
    pub skipped_devices: Vec<ModelError>,
    pub skipped_links: Vec<EdgeFailure>,
}

/// Pick the template whose version tag matches exactly and that can hold
/// `interface_count` interfaces.
pub fn match_template<'a>(
    device: &str,
    version: &str,
    interface_count: usize,
    caps: &'a PlatformCapabilities,
) -> Result<&'a Template, ModelError> {
    let wanted = normalize_version(version);
    let candidates: Vec<&Template> = caps
        .templates
        .iter()
        .filter(|t| !t.version_tag.is_empty() && normalize_version(&t.version_tag) == wanted)
        .collect();

    if candidates.is_empty() {
        return Err(ModelError::NoTemplateMatch {
            device: device.to_string(),
            version: version.to_string(),
            detail: None,
        });
    }

    candidates
        .iter()
        .find(|t| t.max_interfaces.map_or(true, |max| interface_count <= max))
        .copied()
        .ok_or_else(|| {
            let largest = candidates.iter().filter_map(|t| t.max_interfaces).max().unwrap_or(0);
            ModelError::NoTemplateMatch {
                device: device.to_string(),
                version: version.to_string(),
                detail: Some(format!(
                    "needs {} interfaces, template allows {}",
                    interface_count, largest
                )),
            }
        })
}

/// Adapter slot for a lab-side interface name; management sits on adapter 0
pub fn adapter_for(interface: &str) -> Option<u32> {
    if interface.eq_ignore_ascii_case(LAB_MANAGEMENT) {
        return Some(0);
    }
    ethernet_index(interface)
}

/// Build the provisioning plan.
///
/// Only records carrying a sanitized config are considered; the pipeline
/// reports sanitize failures on its own. A device without a usable template
/// is left out together with its links. Records naming a device already seen
/// (per `resolver`, the same rule link inference merges by) are skipped as
/// duplicates. Fails with `EmptyPlan` only when no device could be placed.
pub fn build_plan(
    records: &[DeviceRecord],
    edges: &[LinkEdge],
    caps: &PlatformCapabilities,
    extra_adapters: usize,
    resolver: &dyn IdentityResolver,
) -> Result<BuildOutcome, ModelError> {
    let mut outcome = BuildOutcome::default();
    let mut grid = GridLayout::default();
    // canonical identity -> first record name carrying it
    let mut owners: HashMap<String, String> = HashMap::new();

    for record in records {
        let owner = record
            .identities()
            .iter()
            .find_map(|id| owners.get(&resolver.canonical(id)).cloned());
        for id in record.identities() {
            owners
                .entry(resolver.canonical(id))
                .or_insert_with(|| owner.clone().unwrap_or_else(|| record.name.clone()));
        }
        if let Some(kept) = owner {
            let e = ModelError::DuplicateDevice { device: record.name.clone(), kept };
            tracing::warn!("{} [{}]", e, e.code());
            outcome.skipped_devices.push(e);
            continue;
        }
        let Some(sanitized) = record.sanitized.as_ref() else {
            continue;
        };
        let template = match match_template(&record.name, &record.version, sanitized.interface_count, caps) {
            Ok(t) => t,
            Err(e) => {
                tracing::warn!("{} [{}]", e, e.code());
                outcome.skipped_devices.push(e);
                continue;
            }
        };
        if !is_locally_administered(&sanitized.system_mac) {
            tracing::debug!("{}: no locally administered system MAC, MLAG will not form in the lab", record.name);
        }
        let (x, y) = grid.next().unwrap_or_default();
        outcome.plan.nodes.push(NodeSpec {
            name: record.name.clone(),
            template_id: template.template_id.clone(),
            version: template.version_tag.clone(),
            interface_count: sanitized.interface_count,
            adapters: sanitized.interface_count + extra_adapters,
            system_mac: sanitized.system_mac.clone(),
            config: sanitized.text.clone(),
            x,
            y,
        });
    }

    if outcome.plan.nodes.is_empty() {
        return Err(ModelError::EmptyPlan { skipped: outcome.skipped_devices });
    }

    for edge in edges {
        if !edge.is_confirmed() {
            outcome.skipped_links.push(EdgeFailure::link(
                edge,
                stage::MODEL,
                link_skip::UNCONFIRMED,
                "far end did not report this link",
            ));
            continue;
        }
        let ends = (port_ref(records, &outcome.plan, &edge.a), port_ref(records, &outcome.plan, &edge.b));
        match ends {
            (Ok(a), Ok(b)) => {
                outcome.plan.links.push(LinkSpec { a, b });
                outcome.linked_edges.push(edge.clone());
            }
            (Err((code, reason)), _) | (_, Err((code, reason))) => {
                tracing::debug!("{} left out: {}", edge, reason);
                outcome.skipped_links.push(EdgeFailure::link(edge, stage::MODEL, code, reason));
            }
        }
    }

    Ok(outcome)
}

/// Resolve one edge endpoint to a node port of the plan
fn port_ref(
    records: &[DeviceRecord],
    plan: &ProvisioningPlan,
    endpoint: &Endpoint,
) -> Result<PortRef, (&'static str, String)> {
    let node = plan.node(&endpoint.device).ok_or_else(|| {
        (link_skip::ENDPOINT_EXCLUDED, format!("{} is not part of the lab", endpoint.device))
    })?;
    let map = records
        .iter()
        .find(|r| r.name == node.name)
        .and_then(|r| r.sanitized.as_ref())
        .map(|s| &s.interface_map);
    let interface = match map {
        Some(map) => lab_interface_name(&endpoint.interface, map),
        None => endpoint.interface.clone(),
    };
    let adapter = adapter_for(&interface).ok_or_else(|| {
        (link_skip::UNMAPPED_INTERFACE, format!("{} has no lab adapter", endpoint))
    })?;
    if adapter as usize >= node.adapters {
        return Err((
            link_skip::UNMAPPED_INTERFACE,
            format!("{} is beyond the node's {} adapters", endpoint, node.adapters),
        ));
    }
    Ok(PortRef { node: node.name.clone(), interface, adapter })
}
