use anyhow::Result;
use bollard::exec::{CreateExecOptions, StartExecOptions, StartExecResults};
use bollard::Docker;
use futures::{Stream, StreamExt};
use std::fmt::Display;

/// Docker API of the lab server, used to reach into node containers
pub struct NodeShell {
    docker: Docker,
}

impl NodeShell {
    pub fn connect(server: &str, port: u16, timeout_secs: u64) -> Result<Self> {
        let docker = Docker::connect_with_http(
            &format!("tcp://{}:{}", server, port),
            timeout_secs,
            bollard::API_DEFAULT_VERSION,
        )
        .map_err(|e| anyhow::anyhow!("Docker API on {} not available: {}", server, e))?;
        Ok(Self { docker })
    }

    /// Copy one file into a container directory
    pub async fn put_file(&self, container: &str, dir: &str, file_name: &str, content: &[u8]) -> Result<()> {
        let tar_bytes = build_tar(&[(file_name, content, 0o644)])?;
        let options = bollard::container::UploadToContainerOptions {
            path: dir.to_string(),
            ..Default::default()
        };
        self.docker
            .upload_to_container(container, Some(options), tar_bytes.into())
            .await
            .map_err(|e| anyhow::anyhow!("Failed to upload {} to {}: {}", file_name, container, e))
    }

    /// Run a shell command in a container and wait for it to finish
    pub async fn exec(&self, container: &str, command: &str) -> Result<()> {
        let exec_config = CreateExecOptions {
            cmd: Some(vec!["sh".to_string(), "-c".to_string(), command.to_string()]),
            attach_stdout: Some(true),
            attach_stderr: Some(true),
            ..Default::default()
        };
        let exec = self
            .docker
            .create_exec(container, exec_config)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to create exec on {}: {}", container, e))?;

        let start_config = StartExecOptions { detach: false, ..Default::default() };
        let mut captured = String::new();
        match self
            .docker
            .start_exec(&exec.id, Some(start_config))
            .await
            .map_err(|e| anyhow::anyhow!("Failed to start exec on {}: {}", container, e))?
        {
            StartExecResults::Attached { output, .. } => {
                captured = drain_output(container, output).await?;
            }
            StartExecResults::Detached => {}
        }

        let inspect = self
            .docker
            .inspect_exec(&exec.id)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to inspect exec on {}: {}", container, e))?;
        match inspect.exit_code {
            Some(0) | None => Ok(()),
            Some(code) => Err(anyhow::anyhow!(
                "'{}' on {} exited with {}: {}",
                command,
                container,
                code,
                captured.trim()
            )),
        }
    }
}

/// Build a tar archive in memory containing files
pub fn build_tar(files: &[(&str, &[u8], u32)]) -> Result<Vec<u8>> {
    let mut archive = tar::Builder::new(Vec::new());
    for &(filename, content, mode) in files {
        let mut header = tar::Header::new_gnu();
        header
            .set_path(filename)
            .map_err(|e| anyhow::anyhow!("tar path error: {}", e))?;
        header.set_size(content.len() as u64);
        header.set_mode(mode);
        header.set_cksum();
        archive
            .append(&header, content)
            .map_err(|e| anyhow::anyhow!("tar append error: {}", e))?;
    }
    archive.finish().map_err(|e| anyhow::anyhow!("tar finish error: {}", e))?;
    archive
        .into_inner()
        .map_err(|e| anyhow::anyhow!("tar inner error: {}", e))
}

/// Collect an exec's output; a broken stream fails the exec
async fn drain_output<S, T, E>(container: &str, mut output: S) -> Result<String>
where
    S: Stream<Item = std::result::Result<T, E>> + Unpin,
    T: Display,
    E: Display,
{
    let mut captured = String::new();
    while let Some(chunk) = output.next().await {
        match chunk {
            Ok(chunk) => captured.push_str(&chunk.to_string()),
            Err(e) => {
                tracing::warn!("{}: exec output stream broke: {}", container, e);
                return Err(anyhow::anyhow!("Lost exec output from {}: {}", container, e));
            }
        }
    }
    Ok(captured)
}
