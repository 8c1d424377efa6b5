use serde_json::Value;

use crate::errors::CollectionError;
use crate::models::NeighborObservation;

const SHOW_LLDP_NEIGHBORS: &str = "show lldp neighbors";

/// Normalize a `show lldp neighbors` reply.
///
/// Two shapes are accepted:
/// - brief: `{"lldpNeighbors": [{"port", "neighborDevice", "neighborPort"}]}`
/// - detail: `{"lldpNeighbors": {"<port>": {"lldpNeighborInfo": [{"systemName",
///   "neighborInterfaceInfo": {"interfaceId_v2" | "interfaceId"}}]}}}`
pub fn parse_neighbors(device: &str, reply: &Value) -> Result<Vec<NeighborObservation>, CollectionError> {
    let malformed = |detail: String| CollectionError::malformed(device, SHOW_LLDP_NEIGHBORS, detail);

    match reply.get("lldpNeighbors") {
        Some(Value::Array(entries)) => entries
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let field = |name: &str| {
                    entry
                        .get(name)
                        .and_then(Value::as_str)
                        .ok_or_else(|| malformed(format!("entry {} lacks '{}'", i, name)))
                };
                Ok(NeighborObservation::new(field("port")?, field("neighborDevice")?, field("neighborPort")?))
            })
            .collect(),
        Some(Value::Object(ports)) => {
            let mut out = Vec::new();
            for (port, detail) in ports {
                let infos = detail
                    .get("lldpNeighborInfo")
                    .and_then(Value::as_array)
                    .ok_or_else(|| malformed(format!("{} lacks 'lldpNeighborInfo'", port)))?;
                for info in infos {
                    let system = info.get("systemName").and_then(Value::as_str).unwrap_or_default();
                    let remote = info
                        .get("neighborInterfaceInfo")
                        .and_then(detail_interface)
                        .ok_or_else(|| malformed(format!("{} neighbor lacks an interface id", port)))?;
                    out.push(NeighborObservation::new(port, system, &remote));
                }
            }
            Ok(out)
        }
        _ => Err(malformed("missing 'lldpNeighbors'".to_string())),
    }
}

/// `interfaceId_v2` is plain; older releases only send a quoted `interfaceId`
fn detail_interface(info: &Value) -> Option<String> {
    info.get("interfaceId_v2")
        .and_then(Value::as_str)
        .or_else(|| info.get("interfaceId").and_then(Value::as_str))
        .map(|s| s.trim().trim_matches('"').to_string())
        .filter(|s| !s.is_empty())
}
