//! Device data collector: queries one switch through a `DeviceQueryService`
//! and normalizes the replies into a `DeviceRecord`.

mod lldp;

use serde_json::Value;

use crate::eapi::DeviceQueryService;
use crate::errors::CollectionError;
use crate::models::DeviceRecord;
use crate::utils::{format_mac, parse_mac};

pub use lldp::parse_neighbors;

const SHOW_VERSION: &str = "show version";
const SHOW_LOCAL_INFO: &str = "show lldp local-info";

/// Collect one device. The first failing query aborts the device; retries
/// are left to the caller.
pub async fn collect(device: &str, service: &dyn DeviceQueryService) -> Result<DeviceRecord, CollectionError> {
    let version = service.get_version(device).await?;
    let model = optional_str(&version, "modelName");
    let platform_version = required_str(device, SHOW_VERSION, &version, "version")?;
    let raw_mac = required_str(device, SHOW_VERSION, &version, "systemMacAddress")?;
    let serial_number = optional_str(&version, "serialNumber");

    let local = service.get_local_info(device).await?;
    let lldp_name = optional_str(&local, "systemName");

    let neighbors = parse_neighbors(device, &service.get_neighbors(device).await?)?;
    let startup_config = service.get_startup_config(device).await?;

    // Unparseable addresses are kept as reported; the sanitizer flags them
    let system_mac = parse_mac(&raw_mac).map(|o| format_mac(&o)).unwrap_or(raw_mac);

    tracing::info!("Finished polling: {} ({} {}, {} neighbors)", device, model, platform_version, neighbors.len());

    Ok(DeviceRecord {
        name: device.to_string(),
        model,
        version: platform_version,
        system_mac,
        serial_number,
        lldp_name,
        neighbors,
        startup_config,
        sanitized: None,
    })
}

fn optional_str(reply: &Value, field: &str) -> String {
    reply
        .get(field)
        .and_then(Value::as_str)
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

fn required_str(device: &str, command: &str, reply: &Value, field: &str) -> Result<String, CollectionError> {
    match reply.get(field).and_then(Value::as_str).map(str::trim) {
        Some(s) if !s.is_empty() => Ok(s.to_string()),
        _ => Err(CollectionError::malformed(device, command, format!("missing '{}'", field))),
    }
}

#[cfg(test)]
pub(crate) mod fake {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use serde_json::{json, Value};

    use crate::eapi::DeviceQueryService;
    use crate::errors::CollectionError;

    /// In-memory switch inventory for collector and pipeline tests
    #[derive(Default)]
    pub struct FakeSwitches {
        pub switches: HashMap<String, FakeSwitch>,
        pub failures: HashMap<String, CollectionError>,
        /// How long each `show version` takes to answer
        pub latency: Option<Duration>,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    #[derive(Clone)]
    pub struct FakeSwitch {
        pub version: Value,
        pub local_info: Value,
        pub neighbors: Value,
        pub config: String,
    }

    impl FakeSwitch {
        /// A cEOS-like switch with brief-shape LLDP neighbors
        pub fn new(name: &str, version: &str, mac: &str, neighbors: &[(&str, &str, &str)], config: &str) -> Self {
            let entries: Vec<Value> = neighbors
                .iter()
                .map(|(port, dev, nport)| json!({"port": port, "neighborDevice": dev, "neighborPort": nport, "ttl": 120}))
                .collect();
            Self {
                version: json!({
                    "modelName": "DCS-7280SR3-48YC8",
                    "version": version,
                    "systemMacAddress": mac,
                    "serialNumber": format!("SN-{}", name),
                }),
                local_info: json!({"systemName": name}),
                neighbors: json!({"lldpNeighbors": entries}),
                config: config.to_string(),
            }
        }
    }

    impl FakeSwitches {
        pub fn with(mut self, name: &str, switch: FakeSwitch) -> Self {
            self.switches.insert(name.to_string(), switch);
            self
        }

        pub fn failing(mut self, name: &str, err: CollectionError) -> Self {
            self.failures.insert(name.to_string(), err);
            self
        }

        pub fn slow(mut self, latency: Duration) -> Self {
            self.latency = Some(latency);
            self
        }

        /// Most `show version` calls that were ever outstanding at once
        pub fn peak_in_flight(&self) -> usize {
            self.peak.load(Ordering::SeqCst)
        }

        fn lookup(&self, device: &str) -> Result<&FakeSwitch, CollectionError> {
            if let Some(err) = self.failures.get(device) {
                return Err(err.clone());
            }
            self.switches.get(device).ok_or_else(|| CollectionError::Unreachable {
                device: device.to_string(),
                detail: "no route to host".to_string(),
            })
        }
    }

    #[async_trait]
    impl DeviceQueryService for FakeSwitches {
        async fn get_version(&self, device: &str) -> Result<Value, CollectionError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            if let Some(latency) = self.latency {
                tokio::time::sleep(latency).await;
            }
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(self.lookup(device)?.version.clone())
        }

        async fn get_neighbors(&self, device: &str) -> Result<Value, CollectionError> {
            Ok(self.lookup(device)?.neighbors.clone())
        }

        async fn get_local_info(&self, device: &str) -> Result<Value, CollectionError> {
            Ok(self.lookup(device)?.local_info.clone())
        }

        async fn get_startup_config(&self, device: &str) -> Result<String, CollectionError> {
            Ok(self.lookup(device)?.config.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fake::{FakeSwitch, FakeSwitches};
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_collect_normalizes_record() {
        let svc = FakeSwitches::default().with(
            "leaf1",
            FakeSwitch::new("leaf1.dc1", "4.29.3F", "001C.73AA.BBCC", &[("Ethernet1", "spine1", "Ethernet3")], "hostname leaf1\n"),
        );
        let record = collect("leaf1", &svc).await.unwrap();
        assert_eq!(record.name, "leaf1");
        assert_eq!(record.version, "4.29.3F");
        assert_eq!(record.model, "DCS-7280SR3-48YC8");
        assert_eq!(record.system_mac, "00:1c:73:aa:bb:cc");
        assert_eq!(record.lldp_name, "leaf1.dc1");
        assert_eq!(record.serial_number, "SN-leaf1.dc1");
        assert_eq!(record.neighbors.len(), 1);
        assert_eq!(record.startup_config, "hostname leaf1\n");
        assert!(record.sanitized.is_none());
    }

    #[tokio::test]
    async fn test_missing_version_is_malformed() {
        let mut sw = FakeSwitch::new("leaf1", "4.29.3F", "00:1c:73:aa:bb:cc", &[], "hostname leaf1\n");
        sw.version = json!({"modelName": "DCS-7280SR3-48YC8", "systemMacAddress": "00:1c:73:aa:bb:cc"});
        let svc = FakeSwitches::default().with("leaf1", sw);
        let err = collect("leaf1", &svc).await.unwrap_err();
        assert_eq!(err.code(), "malformed-reply");
        assert!(err.to_string().contains("missing 'version'"));
    }

    #[tokio::test]
    async fn test_service_errors_pass_through() {
        let svc = FakeSwitches::default().failing("leaf9", CollectionError::Unauthorized { device: "leaf9".to_string() });
        let err = collect("leaf9", &svc).await.unwrap_err();
        assert_eq!(err.code(), "unauthorized");
        let err = collect("nowhere", &svc).await.unwrap_err();
        assert_eq!(err.code(), "unreachable");
    }

    #[tokio::test]
    async fn test_unparseable_mac_kept_verbatim() {
        let svc = FakeSwitches::default().with("leaf1", FakeSwitch::new("leaf1", "4.29.3F", "unknown", &[], "end\n"));
        let record = collect("leaf1", &svc).await.unwrap();
        assert_eq!(record.system_mac, "unknown");
    }
}
