use serde::{Deserialize, Serialize};
use serde_json::Value;

// --- eAPI JSON-RPC types ---

/// Reply encodings eAPI can produce for `runCmds`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Json,
    Text,
}

#[derive(Debug, Serialize)]
pub struct RunCmdsParams {
    pub version: u32,
    pub cmds: Vec<String>,
    pub format: OutputFormat,
}

#[derive(Debug, Serialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: &'static str,
    pub method: &'static str,
    pub params: RunCmdsParams,
    pub id: String,
}

impl JsonRpcRequest {
    pub fn run_cmds(cmds: &[&str], format: OutputFormat) -> Self {
        Self {
            jsonrpc: "2.0",
            method: "runCmds",
            params: RunCmdsParams {
                version: 1,
                cmds: cmds.iter().map(|c| c.to_string()).collect(),
                format,
            },
            id: uuid::Uuid::new_v4().to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    #[serde(default)]
    pub data: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub result: Option<Vec<Value>>,
    #[serde(default)]
    pub error: Option<JsonRpcError>,
}

/// Text-format command result
#[derive(Debug, Clone, Deserialize)]
pub struct TextOutput {
    pub output: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let req = JsonRpcRequest::run_cmds(&["show version"], OutputFormat::Json);
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(v["method"], "runCmds");
        assert_eq!(v["params"]["version"], 1);
        assert_eq!(v["params"]["format"], "json");
        assert_eq!(v["params"]["cmds"][0], "show version");
    }

    #[test]
    fn test_error_reply_parses() {
        let body = r#"{"jsonrpc":"2.0","id":"1","error":{"code":1002,"message":"CLI command 1 of 1 'show bogus' failed: invalid command"}}"#;
        let resp: JsonRpcResponse = serde_json::from_str(body).unwrap();
        assert!(resp.result.is_none());
        assert_eq!(resp.error.unwrap().code, 1002);
    }
}
