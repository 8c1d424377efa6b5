mod collector;
mod config;
mod eapi;
mod errors;
mod gns3;
mod input;
mod lab;
mod models;
mod pipeline;
mod sanitizer;
mod topology;
mod utils;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::Config;
use eapi::EapiClient;
use gns3::{Gns3Client, LabProvisioner};
use input::{Cli, StdinPrompter};
use topology::resolver_for;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ptov_lab=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cfg = Config::load();
    let cli = Cli::parse();
    let inputs = input::resolve(cli, &mut StdinPrompter).await?;

    let lab = Gns3Client::new(&inputs.server, &cfg)?;
    let caps = lab.list_available_templates().await?;
    tracing::info!("Lab server offers versions: {}", caps.version_tags().join(", "));

    let resolver = resolver_for(&cfg.identity_match);
    let eapi = EapiClient::new(inputs.credentials.clone(), cfg.eapi_timeout_secs, cfg.eapi_verify_tls)?;
    let mut report = pipeline::run(
        &inputs.project,
        &inputs.switches,
        &cfg,
        &eapi,
        resolver.as_ref(),
        &caps,
    )
    .await;

    let mut provision_error = None;
    if let (Some(plan), false) = (report.plan.as_ref(), inputs.plan_only) {
        tracing::info!("Provisioning {} nodes in project {}", plan.nodes.len(), inputs.project);
        match pipeline::apply_plan(plan, &lab, &inputs.project).await {
            Ok(url) => {
                tracing::info!("Lab ready: {}", url);
                report.lab_url = Some(url);
            }
            Err(e) => {
                tracing::error!("Provisioning failed: {:#}", e);
                provision_error = Some(e);
            }
        }
    }

    eprint!("{}", pipeline::render_summary(&report));
    if inputs.plan_only {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    if let Some(path) = &inputs.report_path {
        pipeline::save_report(&report, path).await?;
    }

    if let Some(e) = provision_error {
        return Err(e);
    }
    if report.plan.is_none() {
        anyhow::bail!("no lab could be planned");
    }
    Ok(())
}
