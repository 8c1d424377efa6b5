//! Device query service: the read-only calls the collector makes against a
//! switch. Replies are returned as the device sent them; shape
//! normalization happens in the collector.

pub mod client;
pub mod types;

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::CollectionError;

pub use client::EapiClient;

/// Login used for every switch in a run
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"********")
            .finish()
    }
}

#[async_trait]
pub trait DeviceQueryService: Send + Sync {
    /// `show version` reply
    async fn get_version(&self, device: &str) -> Result<Value, CollectionError>;
    /// `show lldp neighbors` reply
    async fn get_neighbors(&self, device: &str) -> Result<Value, CollectionError>;
    /// `show lldp local-info` reply
    async fn get_local_info(&self, device: &str) -> Result<Value, CollectionError>;
    /// `show startup-config` text, which the lab node boots with
    async fn get_startup_config(&self, device: &str) -> Result<String, CollectionError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_debug_hides_password() {
        let c = Credentials::new("admin", "s3cret");
        let shown = format!("{:?}", c);
        assert!(shown.contains("admin"));
        assert!(!shown.contains("s3cret"));
    }
}
