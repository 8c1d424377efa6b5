use serde::{Deserialize, Serialize};

/// Template represents a node template available on the lab server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    pub template_id: String,
    pub name: String,
    /// Container image the template runs, e.g. "ceos:4.29.2F"
    pub image: String,
    /// Platform version tag derived from the image
    pub version_tag: String,
    /// Upper bound on Ethernet interfaces, when the template declares one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_interfaces: Option<usize>,
}

impl Template {
    pub fn new(template_id: &str, name: &str, image: &str) -> Self {
        Self {
            template_id: template_id.to_string(),
            name: name.to_string(),
            image: image.to_string(),
            version_tag: version_tag_from_image(image),
            max_interfaces: None,
        }
    }

    pub fn with_max_interfaces(mut self, max: usize) -> Self {
        self.max_interfaces = Some(max);
        self
    }
}

/// PlatformCapabilities is what the lab server can run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlatformCapabilities {
    pub templates: Vec<Template>,
}

impl PlatformCapabilities {
    pub fn new(templates: Vec<Template>) -> Self {
        Self { templates }
    }

    pub fn version_tags(&self) -> Vec<&str> {
        self.templates.iter().map(|t| t.version_tag.as_str()).collect()
    }
}

/// "ceos:4.29.2F" -> "4.29.2F"; images without a tag yield an empty string
pub fn version_tag_from_image(image: &str) -> String {
    match image.rsplit_once(':') {
        Some((_, tag)) if tag != "latest" => tag.trim().to_string(),
        _ => String::new(),
    }
}

/// Reduce a reported platform version to its comparable tag.
/// Build suffixes after the first '-' are dropped ("4.29.3F-31234.2F" -> "4.29.3f").
pub fn normalize_version(version: &str) -> String {
    let v = version.trim();
    let v = v.split('-').next().unwrap_or(v);
    v.to_lowercase()
}
