use std::fmt::Write;

use anyhow::Result;

use crate::models::RunReport;

/// Plain-text rendering of a run report for the terminal
pub fn render_summary(report: &RunReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Project: {}", report.project);
    let _ = writeln!(
        out,
        "Devices: {} placed, {} failed",
        report.succeeded_devices.len(),
        report.device_failures.len()
    );
    for name in &report.succeeded_devices {
        let _ = writeln!(out, "  + {}", name);
    }
    for f in &report.device_failures {
        let _ = writeln!(out, "  - {:<24} {:<10} {:<20} {}", f.device, f.stage, f.code, f.reason);
    }

    let _ = writeln!(
        out,
        "Links: {} placed, {} unconfirmed, {} skipped",
        report.succeeded_edges.len(),
        report.unconfirmed_edges.len(),
        report.edge_failures.len()
    );
    for e in &report.succeeded_edges {
        let _ = writeln!(out, "  + {}", e);
    }
    for f in &report.edge_failures {
        let peer = f.peer.as_ref().map(|p| p.to_string()).unwrap_or_else(|| "-".to_string());
        let _ = writeln!(out, "  - {} <-> {} [{}] {}", f.endpoint, peer, f.code, f.reason);
    }

    if let Some(failure) = &report.plan_failure {
        let _ = writeln!(out, "No lab built: {} [{}]", failure.reason, failure.code);
    }
    if let Some(url) = &report.lab_url {
        let _ = writeln!(out, "Lab: {}", url);
    }
    out
}

/// Write the report as pretty JSON
pub async fn save_report(report: &RunReport, path: &str) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    tokio::fs::write(path, json)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to write report {}: {}", path, e))?;
    tracing::info!("Report written to {}", path);
    Ok(())
}
