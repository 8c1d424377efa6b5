//! Error taxonomy for the collection / sanitize / topology / model stages.
//!
//! Every variant exposes a stable kebab-case `code()` which is what ends up
//! in the run report next to the device or link it was raised for.

use serde::Serialize;

/// Failure while querying a device for its run-state
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CollectionError {
    #[error("{device}: unreachable: {detail}")]
    Unreachable { device: String, detail: String },

    #[error("{device}: credentials rejected")]
    Unauthorized { device: String },

    #[error("{device}: malformed reply to '{command}': {detail}")]
    MalformedReply {
        device: String,
        command: String,
        detail: String,
    },

    #[error("{device}: no reply within {secs}s")]
    Timeout { device: String, secs: u64 },
}

impl CollectionError {
    pub fn code(&self) -> &'static str {
        match self {
            CollectionError::Unreachable { .. } => "unreachable",
            CollectionError::Unauthorized { .. } => "unauthorized",
            CollectionError::MalformedReply { .. } => "malformed-reply",
            CollectionError::Timeout { .. } => "timeout",
        }
    }

    pub fn malformed(device: &str, command: &str, detail: impl Into<String>) -> Self {
        CollectionError::MalformedReply {
            device: device.to_string(),
            command: command.to_string(),
            detail: detail.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SanitizeError {
    #[error("configuration is empty or not line-oriented text")]
    EmptyInput,
}

impl SanitizeError {
    pub fn code(&self) -> &'static str {
        match self {
            SanitizeError::EmptyInput => "empty-input",
        }
    }
}

/// One end of a neighbor claim, as reported by the claiming device
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClaimedPeer {
    pub device: String,
    pub interface: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TopologyError {
    /// A device reported more than one distinct neighbor on a single local interface
    #[error("{device} {interface}: contradictory neighbors reported ({})", format_claims(.claims))]
    AmbiguousInterface {
        device: String,
        interface: String,
        claims: Vec<ClaimedPeer>,
    },
}

impl TopologyError {
    pub fn code(&self) -> &'static str {
        match self {
            TopologyError::AmbiguousInterface { .. } => "ambiguous-interface",
        }
    }
}

fn format_claims(claims: &[ClaimedPeer]) -> String {
    claims
        .iter()
        .map(|c| format!("{} {}", c.device, c.interface))
        .collect::<Vec<_>>()
        .join(" / ")
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    #[error("{device}: no template matches version {version}{}", .detail.as_deref().map(|d| format!(" ({})", d)).unwrap_or_default())]
    NoTemplateMatch {
        device: String,
        version: String,
        detail: Option<String>,
    },

    /// Same device requested under a second name; the first one is kept
    #[error("{device}: same switch as {kept}, modelled once")]
    DuplicateDevice { device: String, kept: String },

    /// Every device was skipped; `skipped` says why for each
    #[error("no device could be placed in the lab plan")]
    EmptyPlan { skipped: Vec<ModelError> },
}

impl ModelError {
    pub fn code(&self) -> &'static str {
        match self {
            ModelError::NoTemplateMatch { .. } => "no-template-match",
            ModelError::DuplicateDevice { .. } => "duplicate-device",
            ModelError::EmptyPlan { .. } => "empty-plan",
        }
    }
}
