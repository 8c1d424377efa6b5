//! Link inference from per-device LLDP neighbor tables.
//!
//! A link is `confirmed` when both ends report each other on matching
//! interfaces. A claim whose far end is outside the run, or whose far end
//! does not report it back, yields an `unconfirmed` edge. A local interface
//! carrying contradictory claims is reported as an error and excluded from
//! inference on both sides.

mod resolver;

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::errors::{ClaimedPeer, TopologyError};
use crate::models::{DeviceRecord, Endpoint, LinkEdge, LinkKey, NeighborObservation};

pub use resolver::{ExactResolver, IdentityResolver, ShortNameResolver};

/// Resolver for an `IDENTITY_MATCH` setting; anything but "exact" folds FQDNs
pub fn resolver_for(mode: &str) -> Box<dyn IdentityResolver> {
    match mode {
        "exact" => Box::new(ExactResolver),
        _ => Box::new(ShortNameResolver),
    }
}

/// Result of one inference pass
#[derive(Debug, Default)]
pub struct TopologyOutcome {
    pub edges: Vec<LinkEdge>,
    pub errors: Vec<TopologyError>,
}

impl TopologyOutcome {
    pub fn confirmed(&self) -> impl Iterator<Item = &LinkEdge> {
        self.edges.iter().filter(|e| e.is_confirmed())
    }

    pub fn unconfirmed(&self) -> impl Iterator<Item = &LinkEdge> {
        self.edges.iter().filter(|e| !e.is_confirmed())
    }
}

/// The single claim left on a local interface after contradiction checks
#[derive(Debug, Clone)]
struct Claim {
    local_interface: String,
    remote_device: String,
    remote_interface: String,
}

/// Neighbor table of one device identity, merged across all of its records
struct DeviceTable {
    name: String,
    claims: BTreeMap<String, Claim>,
}

fn fold(interface: &str) -> String {
    interface.trim().to_lowercase()
}

/// Infer the link set for one run.
///
/// Records that resolve to the same identity are merged, so a device queried
/// twice within a batch contributes the union of both neighbor tables.
pub fn infer_links(records: &[DeviceRecord], resolver: &dyn IdentityResolver) -> TopologyOutcome {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut grouped: Vec<(String, Vec<&NeighborObservation>)> = Vec::new();

    for record in records {
        let known = record
            .identities()
            .iter()
            .find_map(|id| index.get(&resolver.canonical(id)).copied());
        let slot = match known {
            Some(slot) => slot,
            None => {
                grouped.push((record.name.clone(), Vec::new()));
                grouped.len() - 1
            }
        };
        for id in record.identities() {
            index.entry(resolver.canonical(id)).or_insert(slot);
        }
        grouped[slot].1.extend(record.neighbors.iter());
    }

    let mut outcome = TopologyOutcome::default();
    // (device slot, folded interface) -> index into outcome.errors
    let mut ambiguous: HashMap<(usize, String), usize> = HashMap::new();
    let mut tables: Vec<DeviceTable> = Vec::with_capacity(grouped.len());

    for (slot, (name, observations)) in grouped.iter().enumerate() {
        let mut by_interface: BTreeMap<String, Vec<Claim>> = BTreeMap::new();
        for obs in observations {
            let claims = by_interface.entry(fold(&obs.local_interface)).or_default();
            let duplicate = claims.iter().any(|c| {
                resolver.same_device(&c.remote_device, &obs.remote_device)
                    && fold(&c.remote_interface) == fold(&obs.remote_interface)
            });
            if !duplicate {
                claims.push(Claim {
                    local_interface: obs.local_interface.clone(),
                    remote_device: obs.remote_device.clone(),
                    remote_interface: obs.remote_interface.clone(),
                });
            }
        }

        let mut table = DeviceTable { name: name.clone(), claims: BTreeMap::new() };
        for (folded, mut claims) in by_interface {
            if claims.len() == 1 {
                if let Some(claim) = claims.pop() {
                    table.claims.insert(folded, claim);
                }
                continue;
            }
            tracing::warn!(
                "{} {}: {} contradictory neighbor claims, excluding interface",
                name,
                claims[0].local_interface,
                claims.len()
            );
            ambiguous.insert((slot, folded), outcome.errors.len());
            outcome.errors.push(TopologyError::AmbiguousInterface {
                device: name.clone(),
                interface: claims[0].local_interface.clone(),
                claims: claims
                    .iter()
                    .map(|c| ClaimedPeer {
                        device: c.remote_device.clone(),
                        interface: c.remote_interface.clone(),
                    })
                    .collect(),
            });
        }
        tables.push(table);
    }

    let mut consumed: HashSet<(usize, String)> = HashSet::new();
    let mut seen: HashSet<LinkKey> = HashSet::new();

    for (slot, table) in tables.iter().enumerate() {
        for (folded, claim) in &table.claims {
            if consumed.contains(&(slot, folded.clone())) {
                continue;
            }
            let local = Endpoint::new(&table.name, &claim.local_interface);
            let remote_slot = index.get(&resolver.canonical(&claim.remote_device)).copied();

            let edge = match remote_slot {
                None => LinkEdge::unconfirmed(
                    local,
                    Endpoint::new(&claim.remote_device, &claim.remote_interface),
                ),
                Some(peer) => {
                    let remote_folded = fold(&claim.remote_interface);
                    if let Some(&err) = ambiguous.get(&(peer, remote_folded.clone())) {
                        record_excluded_claim(&mut outcome.errors[err], &table.name, &claim.local_interface);
                        tracing::debug!(
                            "{}: claim points at ambiguous {} {}, skipped",
                            local,
                            tables[peer].name,
                            claim.remote_interface
                        );
                        continue;
                    }
                    let peer_table = &tables[peer];
                    let corroborated = peer_table.claims.get(&remote_folded).filter(|back| {
                        index.get(&resolver.canonical(&back.remote_device)) == Some(&slot)
                            && fold(&back.remote_interface) == *folded
                    });
                    match corroborated {
                        Some(back) => {
                            consumed.insert((peer, remote_folded));
                            LinkEdge::confirmed(local, Endpoint::new(&peer_table.name, &back.local_interface))
                        }
                        None => LinkEdge::unconfirmed(
                            local,
                            Endpoint::new(&peer_table.name, &claim.remote_interface),
                        ),
                    }
                }
            };
            consumed.insert((slot, folded.clone()));

            if seen.insert(edge.key()) {
                tracing::debug!("inferred {}", edge);
                outcome.edges.push(edge);
            }
        }
    }

    outcome
}

/// Note a claim that was dropped because it points at an ambiguous interface
fn record_excluded_claim(error: &mut TopologyError, device: &str, interface: &str) {
    let TopologyError::AmbiguousInterface { claims, .. } = error;
    let known = claims
        .iter()
        .any(|c| c.device.eq_ignore_ascii_case(device) && fold(&c.interface) == fold(interface));
    if !known {
        claims.push(ClaimedPeer { device: device.to_string(), interface: interface.to_string() });
    }
}
