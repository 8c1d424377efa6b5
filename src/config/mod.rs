use std::env;

/// Config holds runtime tuning that is not part of a run's inputs
#[derive(Debug, Clone)]
pub struct Config {
    pub gns3_port: u16,
    pub docker_port: u16,
    pub eapi_timeout_secs: u64,
    pub eapi_verify_tls: bool,
    pub poll_concurrency: usize,
    pub lab_http_timeout_secs: u64,
    pub interface_base_index: u32,
    pub extra_adapters: usize,
    /// "short" (FQDN and short hostname are the same device) or "exact"
    pub identity_match: String,
    /// Interface ceiling applied to every lab template, when set
    pub template_max_interfaces: Option<usize>,
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn load() -> Self {
        Self {
            gns3_port: get_env("GNS3_PORT", "3080").parse().unwrap_or(3080),
            docker_port: get_env("DOCKER_PORT", "2375").parse().unwrap_or(2375),
            eapi_timeout_secs: get_env("EAPI_TIMEOUT_SECS", "20").parse().unwrap_or(20),
            eapi_verify_tls: parse_bool(&get_env("EAPI_VERIFY_TLS", "false")),
            poll_concurrency: get_env("POLL_CONCURRENCY", "20")
                .parse()
                .unwrap_or(20)
                .max(1),
            lab_http_timeout_secs: get_env("LAB_HTTP_TIMEOUT_SECS", "15").parse().unwrap_or(15),
            interface_base_index: get_env("INTERFACE_BASE_INDEX", "1").parse().unwrap_or(1),
            extra_adapters: get_env("EXTRA_ADAPTERS", "2").parse().unwrap_or(2),
            identity_match: get_env("IDENTITY_MATCH", "short").trim().to_lowercase(),
            template_max_interfaces: env::var("TEMPLATE_MAX_INTERFACES")
                .ok()
                .and_then(|v| v.trim().parse().ok()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gns3_port: 3080,
            docker_port: 2375,
            eapi_timeout_secs: 20,
            eapi_verify_tls: false,
            poll_concurrency: 20,
            lab_http_timeout_secs: 15,
            interface_base_index: 1,
            extra_adapters: 2,
            identity_match: "short".to_string(),
            template_max_interfaces: None,
        }
    }
}

fn get_env(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_bool(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("true"));
        assert!(parse_bool(" YES "));
        assert!(parse_bool("1"));
        assert!(!parse_bool("false"));
        assert!(!parse_bool(""));
    }

    #[test]
    fn test_default_matches_unset_environment() {
        let cfg = Config::default();
        assert_eq!(cfg.gns3_port, 3080);
        assert_eq!(cfg.poll_concurrency, 20);
        assert_eq!(cfg.interface_base_index, 1);
    }
}
