use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use super::docker::NodeShell;
use super::types::*;
use super::{split_path, LabProvisioner, NodeHandle};
use crate::config::Config;
use crate::models::{NodeSpec, PlatformCapabilities, PortRef, Template};

/// GNS3 server client (REST API v2 + the server's Docker API)
pub struct Gns3Client {
    base_url: String,
    web_url: String,
    client: Client,
    shell: NodeShell,
    max_interfaces: Option<usize>,
}

impl Gns3Client {
    pub fn new(server: &str, config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.lab_http_timeout_secs))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {}", e))?;
        let shell = NodeShell::connect(server, config.docker_port, config.lab_http_timeout_secs)?;

        Ok(Self {
            base_url: format!("http://{}:{}/v2", server, config.gns3_port),
            web_url: format!("http://{}:{}/static/web-ui/server/1/project", server, config.gns3_port),
            client,
            shell,
            max_interfaces: config.template_max_interfaces,
        })
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn check(resp: reqwest::Response, what: &str) -> Result<reqwest::Response> {
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("GNS3 API error {} ({}): {}", status, what, body));
        }
        Ok(resp)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let resp = self.client.get(self.api_url(path)).send().await?;
        Ok(Self::check(resp, path).await?.json().await?)
    }

    async fn post_json<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
        B: serde::Serialize,
    {
        let resp = self.client.post(self.api_url(path)).json(body).send().await?;
        Ok(Self::check(resp, path).await?.json().await?)
    }

    /// POST/PUT/DELETE whose reply body is not needed
    async fn send(&self, req: reqwest::RequestBuilder, what: &str) -> Result<()> {
        let resp = req.send().await?;
        Self::check(resp, what).await?;
        Ok(())
    }

    fn container_of<'a>(&self, node: &'a NodeHandle) -> Result<&'a str> {
        node.container_id
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("node {} has no container", node.name))
    }
}

#[async_trait]
impl LabProvisioner for Gns3Client {
    async fn list_available_templates(&self) -> Result<PlatformCapabilities> {
        let templates: Vec<Gns3Template> = self.get_json("/templates").await?;
        let docker: Vec<Template> = templates
            .into_iter()
            .filter(|t| t.template_type == "docker")
            .filter_map(|t| {
                let image = t.image?;
                let template = Template::new(&t.template_id, &t.name, &image);
                Some(match self.max_interfaces {
                    Some(max) => template.with_max_interfaces(max),
                    None => template,
                })
            })
            .collect();
        tracing::debug!("{} docker templates on the lab server", docker.len());
        Ok(PlatformCapabilities::new(docker))
    }

    async fn create_project(&self, name: &str) -> Result<String> {
        let project: Gns3Project = self
            .post_json("/projects", &ProjectCreate { name: name.to_string() })
            .await?;
        tracing::info!("Created project {} ({})", name, project.project_id);
        Ok(project.project_id)
    }

    async fn create_node(&self, project_id: &str, spec: &NodeSpec) -> Result<NodeHandle> {
        // Adapter count is a template property: size a temporary copy, instantiate it, drop it
        let temp: Gns3Template = self
            .post_json(&format!("/templates/{}/duplicate", spec.template_id), &serde_json::json!({}))
            .await?;
        self.send(
            self.client
                .put(self.api_url(&format!("/templates/{}", temp.template_id)))
                .json(&AdaptersUpdate { adapters: spec.adapters }),
            "set adapters",
        )
        .await?;
        let created: Result<Gns3Node> = self
            .post_json(
                &format!("/projects/{}/templates/{}", project_id, temp.template_id),
                &NodePlacement { x: spec.x, y: spec.y },
            )
            .await;
        self.send(
            self.client.delete(self.api_url(&format!("/templates/{}", temp.template_id))),
            "delete temporary template",
        )
        .await?;
        let node = created?;

        let node_path = format!("/projects/{}/nodes/{}", project_id, node.node_id);
        self.send(
            self.client
                .put(self.api_url(&node_path))
                .json(&NodeRename { name: spec.name.clone() }),
            "rename node",
        )
        .await?;
        // Renaming respawns the container, so read its id afterwards
        let node: Gns3Node = self.get_json(&node_path).await?;

        tracing::info!("Created node {} ({} adapters)", spec.name, spec.adapters);
        Ok(NodeHandle {
            project_id: project_id.to_string(),
            node_id: node.node_id,
            name: spec.name.clone(),
            container_id: node.properties.container_id,
        })
    }

    async fn create_link(&self, a: (&NodeHandle, &PortRef), b: (&NodeHandle, &PortRef)) -> Result<()> {
        let body = LinkCreate {
            nodes: vec![
                LinkNode { node_id: a.0.node_id.clone(), adapter_number: a.1.adapter, port_number: 0 },
                LinkNode { node_id: b.0.node_id.clone(), adapter_number: b.1.adapter, port_number: 0 },
            ],
        };
        self.send(
            self.client
                .post(self.api_url(&format!("/projects/{}/links", a.0.project_id)))
                .json(&body),
            "create link",
        )
        .await
    }

    async fn push_file(&self, node: &NodeHandle, path: &str, bytes: &[u8]) -> Result<()> {
        let (dir, name) = split_path(path)?;
        self.shell.put_file(self.container_of(node)?, dir, name, bytes).await
    }

    async fn start_node(&self, node: &NodeHandle) -> Result<()> {
        let path = format!("/projects/{}/nodes/{}/start", node.project_id, node.node_id);
        self.send(self.client.post(self.api_url(&path)), "start node").await
    }

    async fn stop_node(&self, node: &NodeHandle) -> Result<()> {
        let path = format!("/projects/{}/nodes/{}/stop", node.project_id, node.node_id);
        self.send(self.client.post(self.api_url(&path)), "stop node").await
    }

    async fn exec_command(&self, node: &NodeHandle, command: &str) -> Result<()> {
        self.shell.exec(self.container_of(node)?, command).await
    }

    async fn close_project(&self, project_id: &str) -> Result<()> {
        let path = format!("/projects/{}/close", project_id);
        self.send(self.client.post(self.api_url(&path)), "close project").await
    }

    fn project_url(&self, project_id: &str) -> String {
        format!("{}/{}", self.web_url, project_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_urls() {
        let client = Gns3Client::new("gns3.lab", &Config::default()).unwrap();
        assert_eq!(client.api_url("/templates"), "http://gns3.lab:3080/v2/templates");
        assert_eq!(
            client.project_url("p-1"),
            "http://gns3.lab:3080/static/web-ui/server/1/project/p-1"
        );
    }

    #[tokio::test]
    async fn test_node_without_container_cannot_take_files() {
        let client = Gns3Client::new("gns3.lab", &Config::default()).unwrap();
        let node = NodeHandle {
            project_id: "p".to_string(),
            node_id: "n".to_string(),
            name: "leaf1".to_string(),
            container_id: None,
        };
        let err = client.push_file(&node, "/startup-config", b"end\n").await.unwrap_err();
        assert!(err.to_string().contains("has no container"));
    }
}
