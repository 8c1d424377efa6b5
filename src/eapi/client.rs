use anyhow::Result;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;

use super::types::*;
use super::{Credentials, DeviceQueryService};
use crate::errors::CollectionError;

/// Arista eAPI client (JSON-RPC over HTTPS)
pub struct EapiClient {
    credentials: Credentials,
    timeout_secs: u64,
    client: Client,
}

impl EapiClient {
    pub fn new(credentials: Credentials, timeout_secs: u64, verify_tls: bool) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .danger_accept_invalid_certs(!verify_tls)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {}", e))?;

        Ok(Self {
            credentials,
            timeout_secs,
            client,
        })
    }

    fn api_url(&self, device: &str) -> String {
        format!("https://{}/command-api", device)
    }

    fn transport_error(&self, device: &str, e: reqwest::Error) -> CollectionError {
        if e.is_timeout() {
            CollectionError::Timeout {
                device: device.to_string(),
                secs: self.timeout_secs,
            }
        } else {
            CollectionError::Unreachable {
                device: device.to_string(),
                detail: e.to_string(),
            }
        }
    }

    /// Run one command and return its single result entry
    async fn run_cmd(&self, device: &str, cmd: &str, format: OutputFormat) -> Result<Value, CollectionError> {
        let request = JsonRpcRequest::run_cmds(&[cmd], format);
        tracing::debug!("{}: runCmds '{}' ({:?})", device, cmd, format);

        let resp = self
            .client
            .post(self.api_url(device))
            .basic_auth(&self.credentials.username, Some(&self.credentials.password))
            .json(&request)
            .send()
            .await
            .map_err(|e| self.transport_error(device, e))?;

        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(CollectionError::Unauthorized { device: device.to_string() });
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(CollectionError::malformed(device, cmd, format!("HTTP {}: {}", status, body.trim())));
        }

        let reply: JsonRpcResponse = resp.json().await.map_err(|e| {
            if e.is_timeout() {
                self.transport_error(device, e)
            } else {
                CollectionError::malformed(device, cmd, format!("not a JSON-RPC reply: {}", e))
            }
        })?;

        if let Some(err) = reply.error {
            return Err(CollectionError::malformed(
                device,
                cmd,
                format!("eAPI error {}: {}", err.code, err.message),
            ));
        }
        reply
            .result
            .and_then(|mut r| if r.is_empty() { None } else { Some(r.swap_remove(0)) })
            .ok_or_else(|| CollectionError::malformed(device, cmd, "reply carries no result"))
    }
}

#[async_trait]
impl DeviceQueryService for EapiClient {
    async fn get_version(&self, device: &str) -> Result<Value, CollectionError> {
        self.run_cmd(device, "show version", OutputFormat::Json).await
    }

    async fn get_neighbors(&self, device: &str) -> Result<Value, CollectionError> {
        self.run_cmd(device, "show lldp neighbors", OutputFormat::Json).await
    }

    async fn get_local_info(&self, device: &str) -> Result<Value, CollectionError> {
        self.run_cmd(device, "show lldp local-info", OutputFormat::Json).await
    }

    async fn get_startup_config(&self, device: &str) -> Result<String, CollectionError> {
        let cmd = "show startup-config";
        let value = self.run_cmd(device, cmd, OutputFormat::Text).await?;
        let text: TextOutput = serde_json::from_value(value)
            .map_err(|e| CollectionError::malformed(device, cmd, format!("no text output: {}", e)))?;
        Ok(text.output)
    }
}
