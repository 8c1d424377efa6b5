//! Pipeline orchestrator: collect -> sanitize -> infer links -> build plan,
//! isolating per-device failures and summarizing them in a `RunReport`.

mod apply;
mod summary;

use std::collections::HashMap;

use chrono::Utc;
use futures::stream::{self, StreamExt};

use crate::collector;
use crate::config::Config;
use crate::eapi::DeviceQueryService;
use crate::errors::{CollectionError, ModelError, TopologyError};
use crate::lab;
use crate::models::{
    stage, DeviceFailure, DeviceMeta, DeviceRecord, EdgeFailure, Endpoint, PlanFailure,
    PlatformCapabilities, ProvisioningPlan, RunReport,
};
use crate::sanitizer;
use crate::topology::{infer_links, IdentityResolver};

pub use apply::apply_plan;
pub use summary::{render_summary, save_report};

/// One pipeline invocation. The fetch cache lives and dies with the run.
pub struct Run<'a> {
    config: &'a Config,
    service: &'a dyn DeviceQueryService,
    resolver: &'a dyn IdentityResolver,
    /// Lowercased device name -> collected record
    cache: HashMap<String, DeviceRecord>,
    /// Device names in the order they were first requested
    requested: Vec<String>,
    report: RunReport,
}

enum DeviceOutcome {
    Collected(DeviceRecord),
    Unsanitized(DeviceRecord, DeviceFailure),
    Failed(CollectionError),
}

impl<'a> Run<'a> {
    pub fn new(
        project: &str,
        config: &'a Config,
        service: &'a dyn DeviceQueryService,
        resolver: &'a dyn IdentityResolver,
    ) -> Self {
        Self {
            config,
            service,
            resolver,
            cache: HashMap::new(),
            requested: Vec::new(),
            report: RunReport::new(project),
        }
    }

    /// Collect and sanitize every device not already in the cache, at most
    /// `poll_concurrency` at a time.
    pub async fn collect(&mut self, devices: &[String]) {
        let mut pending: Vec<String> = Vec::new();
        for name in devices.iter().map(|d| d.trim()).filter(|d| !d.is_empty()) {
            let key = name.to_lowercase();
            if self.requested.iter().any(|r| r.eq_ignore_ascii_case(name)) {
                tracing::debug!("{} already requested in this run", name);
                continue;
            }
            self.requested.push(name.to_string());
            if !self.cache.contains_key(&key) {
                pending.push(name.to_string());
            }
        }
        if pending.is_empty() {
            return;
        }

        tracing::info!("Polling {} switches", pending.len());
        let service = self.service;
        let base = self.config.interface_base_index;
        let outcomes: Vec<(String, DeviceOutcome)> = stream::iter(pending)
            .map(|name| async move {
                let outcome = match collector::collect(&name, service).await {
                    Ok(record) => sanitize_record(record, base),
                    Err(e) => DeviceOutcome::Failed(e),
                };
                (name, outcome)
            })
            .buffer_unordered(self.config.poll_concurrency.max(1))
            .collect()
            .await;
        tracing::info!("Finished polling switches");

        for (name, outcome) in outcomes {
            match outcome {
                DeviceOutcome::Collected(record) => {
                    self.cache.insert(name.to_lowercase(), record);
                }
                DeviceOutcome::Unsanitized(record, failure) => {
                    tracing::warn!("{}: {} [{}]", name, failure.reason, failure.code);
                    self.report.device_failures.push(failure);
                    self.cache.insert(name.to_lowercase(), record);
                }
                DeviceOutcome::Failed(e) => {
                    tracing::warn!("{} [{}]", e, e.code());
                    self.report
                        .device_failures
                        .push(DeviceFailure::new(&name, stage::COLLECT, e.code(), e.to_string()));
                }
            }
        }
    }

    /// Records collected so far, in request order
    pub fn records(&self) -> Vec<DeviceRecord> {
        self.requested
            .iter()
            .filter_map(|name| self.cache.get(&name.to_lowercase()).cloned())
            .collect()
    }

    /// Infer links and build the plan from everything collected so far
    pub fn plan(&mut self, caps: &PlatformCapabilities) -> Option<ProvisioningPlan> {
        let records = self.records();

        let topology = infer_links(&records, self.resolver);
        for err in &topology.errors {
            let TopologyError::AmbiguousInterface { device, interface, .. } = err;
            self.report.edge_failures.push(EdgeFailure::interface(
                Endpoint::new(device, interface),
                stage::TOPOLOGY,
                err.code(),
                err.to_string(),
            ));
        }
        self.report.unconfirmed_edges = topology.unconfirmed().cloned().collect();
        tracing::info!(
            "Inferred {} confirmed links ({} unconfirmed, {} ambiguous interfaces)",
            topology.confirmed().count(),
            self.report.unconfirmed_edges.len(),
            topology.errors.len()
        );

        match lab::build_plan(&records, &topology.edges, caps, self.config.extra_adapters, self.resolver) {
            Ok(built) => {
                self.record_skipped(&built.skipped_devices);
                self.report.edge_failures.extend(built.skipped_links);
                self.report.succeeded_edges = built.linked_edges;
                self.report.succeeded_devices = built.plan.nodes.iter().map(|n| n.name.clone()).collect();
                self.report.plan = Some(built.plan.clone());
                Some(built.plan)
            }
            Err(e) => {
                if let ModelError::EmptyPlan { skipped } = &e {
                    self.record_skipped(skipped);
                }
                tracing::error!("{} [{}]", e, e.code());
                self.report.plan_failure = Some(PlanFailure {
                    code: e.code().to_string(),
                    reason: e.to_string(),
                });
                None
            }
        }
    }

    fn record_skipped(&mut self, skipped: &[ModelError]) {
        for e in skipped {
            if let ModelError::NoTemplateMatch { device, .. } | ModelError::DuplicateDevice { device, .. } = e {
                self.report
                    .device_failures
                    .push(DeviceFailure::new(device, stage::MODEL, e.code(), e.to_string()));
            }
        }
    }

    /// Close the run; the cache is dropped here
    pub fn finish(mut self) -> RunReport {
        self.report.finished_at = Some(Utc::now());
        self.report
    }
}

fn sanitize_record(mut record: DeviceRecord, base: u32) -> DeviceOutcome {
    match sanitizer::sanitize_with_base(&record.startup_config, &DeviceMeta::from(&record), base) {
        Ok(sanitized) => {
            record.sanitized = Some(sanitized);
            DeviceOutcome::Collected(record)
        }
        Err(e) => {
            let failure = DeviceFailure::new(&record.name, stage::SANITIZE, e.code(), e.to_string());
            DeviceOutcome::Unsanitized(record, failure)
        }
    }
}

/// Collect, sanitize, infer and plan for one set of devices
pub async fn run(
    project: &str,
    devices: &[String],
    config: &Config,
    service: &dyn DeviceQueryService,
    resolver: &dyn IdentityResolver,
    caps: &PlatformCapabilities,
) -> RunReport {
    let mut run = Run::new(project, config, service, resolver);
    run.collect(devices).await;
    run.plan(caps);
    run.finish()
}
