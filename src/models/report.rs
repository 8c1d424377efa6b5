use chrono::{DateTime, Utc};
use serde::Serialize;

use super::plan::ProvisioningPlan;
use super::topology::{Endpoint, LinkEdge};

/// Canonical pipeline stage values
pub mod stage {
    pub const COLLECT: &str = "collect";
    pub const SANITIZE: &str = "sanitize";
    pub const TOPOLOGY: &str = "topology";
    pub const MODEL: &str = "model";
}

/// Canonical reason codes for links left out of the plan that are not
/// errors of their own
pub mod link_skip {
    pub const UNCONFIRMED: &str = "unconfirmed";
    pub const ENDPOINT_EXCLUDED: &str = "endpoint-excluded";
    pub const UNMAPPED_INTERFACE: &str = "unmapped-interface";
}

/// Why a device did not make it into the lab
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceFailure {
    pub device: String,
    pub stage: String,
    pub code: String,
    pub reason: String,
}

impl DeviceFailure {
    pub fn new(device: &str, stage: &str, code: &str, reason: impl Into<String>) -> Self {
        Self {
            device: device.to_string(),
            stage: stage.to_string(),
            code: code.to_string(),
            reason: reason.into(),
        }
    }
}

/// Why a link (or a single interface's claims) did not make it into the lab
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EdgeFailure {
    pub endpoint: Endpoint,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peer: Option<Endpoint>,
    pub stage: String,
    pub code: String,
    pub reason: String,
}

impl EdgeFailure {
    /// A whole link left out of the lab
    pub fn link(edge: &LinkEdge, stage: &str, code: &str, reason: impl Into<String>) -> Self {
        Self {
            endpoint: edge.a.clone(),
            peer: Some(edge.b.clone()),
            stage: stage.to_string(),
            code: code.to_string(),
            reason: reason.into(),
        }
    }

    /// A single interface whose claims were all excluded
    pub fn interface(endpoint: Endpoint, stage: &str, code: &str, reason: impl Into<String>) -> Self {
        Self {
            endpoint,
            peer: None,
            stage: stage.to_string(),
            code: code.to_string(),
            reason: reason.into(),
        }
    }
}

/// Batch-level failure: nothing could be planned
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanFailure {
    pub code: String,
    pub reason: String,
}

/// RunReport is the user-facing summary of one pipeline invocation
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub project: String,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    pub succeeded_devices: Vec<String>,
    pub succeeded_edges: Vec<LinkEdge>,
    pub unconfirmed_edges: Vec<LinkEdge>,
    pub device_failures: Vec<DeviceFailure>,
    pub edge_failures: Vec<EdgeFailure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<ProvisioningPlan>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan_failure: Option<PlanFailure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lab_url: Option<String>,
}

impl RunReport {
    pub fn new(project: &str) -> Self {
        Self {
            project: project.to_string(),
            started_at: Utc::now(),
            finished_at: None,
            succeeded_devices: Vec::new(),
            succeeded_edges: Vec::new(),
            unconfirmed_edges: Vec::new(),
            device_failures: Vec::new(),
            edge_failures: Vec::new(),
            plan: None,
            plan_failure: None,
            lab_url: None,
        }
    }

    #[cfg(test)]
    pub fn failure_for(&self, device: &str) -> Option<&DeviceFailure> {
        self.device_failures.iter().find(|f| f.device == device)
    }
}
