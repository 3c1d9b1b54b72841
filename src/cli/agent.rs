//! Long-running and one-shot cache commands

use super::dump::{OutputFormat, TopologyDump};
use crate::config::Config;
use crate::kube::{
    EndpointSliceLister, create_client, current_context, endpoint_slice_api, resolve_namespace,
    watch_endpoint_slices,
};
use crate::topology::{EndpointStore, EndpointTransform};
use crate::watcher::TopologyCache;
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;

fn new_cache() -> TopologyCache {
    TopologyCache::new(Arc::new(EndpointStore::new(EndpointTransform)))
}

fn log_summary(cache: &TopologyCache) {
    let summary = cache.index().summary();
    if !summary.synced {
        tracing::info!("Topology not initialized yet");
        return;
    }

    let status = cache.status();
    tracing::info!(
        objects = summary.objects,
        services = summary.services,
        pods = summary.pods,
        resyncs = status.successes,
        failures = status.failures,
        "Topology summary"
    );
}

/// Mirror EndpointSlices until interrupted
pub async fn run_agent(config: &Config) -> Result<()> {
    let client = create_client().await?;
    if let Some(context) = current_context() {
        tracing::info!("Connected using context: {}", context);
    }

    let namespace = resolve_namespace(&config.namespace);
    match &namespace {
        Some(ns) => tracing::info!("Watching EndpointSlices in namespace {}", ns),
        None => tracing::info!("Watching EndpointSlices in all namespaces"),
    }

    let api = endpoint_slice_api(client, namespace.as_deref());
    let cache = new_cache();

    if config.resync.watch {
        cache.spawn_watch(watch_endpoint_slices(api.clone()));
    }
    cache.spawn_resync(
        EndpointSliceLister::new(api),
        Duration::from_secs(config.resync.interval_seconds),
    );

    let mut report = tokio::time::interval(Duration::from_secs(
        config.report.interval_seconds.max(1),
    ));
    // First tick completes immediately
    report.tick().await;

    loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                signal.context("Failed to listen for shutdown signal")?;
                tracing::info!("Shutdown requested");
                break;
            }
            _ = report.tick() => log_summary(&cache),
        }
    }

    cache.shutdown().await;
    log_summary(&cache);
    Ok(())
}

/// List once and print both topology views
pub async fn dump_topology(config: &Config, format: OutputFormat) -> Result<()> {
    let client = create_client().await?;
    let namespace = resolve_namespace(&config.namespace);
    let lister = EndpointSliceLister::new(endpoint_slice_api(client, namespace.as_deref()));

    let cache = new_cache();
    cache.resync_now(&lister).await?;

    let dump = TopologyDump::from_index(cache.index()).with_resync(cache.status());
    print!("{}", dump.render(format)?);
    if format == OutputFormat::Json {
        println!();
    }
    Ok(())
}
