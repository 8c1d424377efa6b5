//! Input resolution: command line first, interactive prompts for whatever
//! is still missing. The pipeline only ever sees fully resolved inputs.

mod cli;

use std::io::{self, BufRead, Write};

use anyhow::Result;
use async_trait::async_trait;

use crate::eapi::Credentials;
use crate::utils::{is_valid_hostname, parse_switch_list, read_switch_file};

pub use cli::Cli;

/// Everything a run needs
#[derive(Debug, Clone)]
pub struct RunInputs {
    pub switches: Vec<String>,
    pub server: String,
    pub project: String,
    pub credentials: Credentials,
    pub plan_only: bool,
    pub report_path: Option<String>,
}

/// Source of interactive answers
#[async_trait]
pub trait Prompter: Send {
    async fn ask(&mut self, label: &str) -> Result<String>;

    /// Answer that must not be echoed
    async fn ask_secret(&mut self, label: &str) -> Result<String>;
}

/// Prompts on stderr, reads answers from the terminal off the async workers
pub struct StdinPrompter;

fn read_answer(label: &str) -> Result<String> {
    let mut err = io::stderr();
    write!(err, "{}: ", label)?;
    err.flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

#[async_trait]
impl Prompter for StdinPrompter {
    async fn ask(&mut self, label: &str) -> Result<String> {
        let label = label.to_string();
        tokio::task::spawn_blocking(move || read_answer(&label)).await?
    }

    async fn ask_secret(&mut self, label: &str) -> Result<String> {
        let prompt = format!("{}: ", label);
        let answer = tokio::task::spawn_blocking(move || rpassword::prompt_password(prompt)).await??;
        Ok(answer.trim().to_string())
    }
}

async fn required(value: Option<String>, label: &str, prompter: &mut dyn Prompter, secret: bool) -> Result<String> {
    if let Some(v) = value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
        return Ok(v);
    }
    let answer = if secret {
        prompter.ask_secret(label).await?
    } else {
        prompter.ask(label).await?
    };
    if answer.is_empty() {
        anyhow::bail!("{} is required", label);
    }
    Ok(answer)
}

/// Fill in missing inputs
pub async fn resolve(cli: Cli, prompter: &mut dyn Prompter) -> Result<RunInputs> {
    let switches = match (&cli.switches, &cli.file) {
        (Some(list), _) => parse_switch_list(list),
        (None, Some(path)) => read_switch_file(&path.to_string_lossy()).await?,
        (None, None) => parse_switch_list(&prompter.ask("Switches (comma or space separated)").await?),
    };
    if switches.is_empty() {
        anyhow::bail!("no switches to model");
    }
    if let Some(bad) = switches.iter().find(|s| !is_valid_hostname(s)) {
        anyhow::bail!("'{}' is not a valid switch name", bad);
    }

    let server = required(cli.server, "GNS3 server", prompter, false).await?;
    if !is_valid_hostname(&server) {
        anyhow::bail!("'{}' is not a valid server name", server);
    }
    let project = required(cli.project, "Project name", prompter, false).await?;
    let username = required(cli.username, "Switch username", prompter, false).await?;
    let password = required(cli.password, "Switch password", prompter, true).await?;

    Ok(RunInputs {
        switches,
        server,
        project,
        credentials: Credentials::new(&username, &password),
        plan_only: cli.plan_only,
        report_path: cli.report.map(|p| p.to_string_lossy().to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// Answers prompts from a script and remembers what was asked
    struct Scripted {
        answers: VecDeque<String>,
        asked: Vec<String>,
        secrets: usize,
    }

    impl Scripted {
        fn new(answers: &[&str]) -> Self {
            Self {
                answers: answers.iter().map(|a| a.to_string()).collect(),
                asked: Vec::new(),
                secrets: 0,
            }
        }
    }

    #[async_trait]
    impl Prompter for Scripted {
        async fn ask(&mut self, label: &str) -> Result<String> {
            self.asked.push(label.to_string());
            Ok(self.answers.pop_front().unwrap_or_default())
        }

        async fn ask_secret(&mut self, label: &str) -> Result<String> {
            self.secrets += 1;
            self.ask(label).await
        }
    }

    #[tokio::test]
    async fn test_flags_need_no_prompt() {
        let cli = Cli {
            switches: Some("leaf1, leaf2,,".to_string()),
            server: Some("gns3.lab".to_string()),
            project: Some("dc1".to_string()),
            username: Some("admin".to_string()),
            password: Some("pw".to_string()),
            ..Default::default()
        };
        let mut p = Scripted::new(&[]);
        let inputs = resolve(cli, &mut p).await.unwrap();
        assert_eq!(inputs.switches, vec!["leaf1", "leaf2"]);
        assert!(p.asked.is_empty());
        assert_eq!(inputs.credentials.username, "admin");
    }

    #[tokio::test]
    async fn test_missing_values_are_prompted() {
        let cli = Cli { server: Some("10.0.0.5".to_string()), ..Default::default() };
        let mut p = Scripted::new(&["leaf1 spine1", "dc1", "admin", "secret"]);
        let inputs = resolve(cli, &mut p).await.unwrap();
        assert_eq!(inputs.switches, vec!["leaf1", "spine1"]);
        assert_eq!(inputs.project, "dc1");
        assert_eq!(inputs.credentials.password, "secret");
        assert_eq!(p.asked.len(), 4);
        // Only the password goes through the no-echo path
        assert_eq!(p.secrets, 1);
        assert_eq!(p.asked.last().map(String::as_str), Some("Switch password"));
    }

    #[tokio::test]
    async fn test_blank_answers_fail() {
        let mut p = Scripted::new(&["", ""]);
        assert!(resolve(Cli::default(), &mut p).await.is_err());

        let cli = Cli { switches: Some("leaf1".to_string()), ..Default::default() };
        let mut p = Scripted::new(&[""]);
        let err = resolve(cli, &mut p).await.unwrap_err();
        assert!(err.to_string().contains("GNS3 server is required"));
    }

    #[tokio::test]
    async fn test_rejects_shell_metacharacters() {
        let cli = Cli { switches: Some("leaf1;reboot".to_string()), ..Default::default() };
        let mut p = Scripted::new(&[]);
        assert!(resolve(cli, &mut p).await.is_err());
    }
}
