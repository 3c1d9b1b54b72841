//! Topology dump rendering

use crate::topology::{Service, TopologyIndex, TopologySummary};
use crate::watcher::ResyncReport;
use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Serialize;
use std::collections::BTreeMap;

/// Output format for `svcmap dump`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Yaml,
}

/// Sorted, printable copy of both topology views
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopologyDump {
    pub summary: TopologySummary,
    pub services: BTreeMap<Service, usize>,
    pub pods: BTreeMap<String, Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resync: Option<ResyncReport>,
}

impl TopologyDump {
    pub fn from_index(index: &TopologyIndex) -> Self {
        let pods = index
            .pod_key_to_service_names()
            .into_iter()
            .map(|(pod, mut services)| {
                services.sort();
                (pod, services)
            })
            .collect();

        Self {
            summary: index.summary(),
            services: index.service_to_pod_num().into_iter().collect(),
            pods,
            resync: None,
        }
    }

    pub fn with_resync(mut self, report: ResyncReport) -> Self {
        self.resync = Some(report);
        self
    }

    pub fn render(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(self).context("Failed to serialize topology as JSON")
            }
            OutputFormat::Yaml => {
                serde_yaml::to_string(self).context("Failed to serialize topology as YAML")
            }
        }
    }
}
