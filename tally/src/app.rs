/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, anyhow};
use log::{debug, info};
use tokio::runtime::Handle;

use tally_cache::SweepHandle;
use tally_types::ArcClock;

use crate::config::TallyConfig;
use crate::monitor::{ArcInstrumented, MetadataExtractor};
use crate::poll::Poller;
use crate::publish::{
    PublishError, PublishPipeline, PublishStats, PublishTask, RoundReport, publish_round,
};
use crate::registry::MonitorRegistry;
use crate::self_monitor::CpuUsageMonitor;

/// All the parts of a running publisher, built from the config.
pub struct Tally {
    registry: Arc<MonitorRegistry>,
    extractor: Arc<MetadataExtractor>,
    poller: Arc<Poller>,
    pipeline: Arc<PublishPipeline>,
    cpu_monitor: Option<Arc<CpuUsageMonitor>>,
    poll_interval: Duration,
    sweep_interval: Duration,
}

impl Tally {
    pub fn build(config: &TallyConfig, clock: ArcClock) -> anyhow::Result<Self> {
        let registry = Arc::new(MonitorRegistry::new());
        let extractor = Arc::new(MetadataExtractor::new(config.cache.ttl, clock.clone()));

        let poller = Poller::new(registry.clone(), extractor.clone(), clock.clone())
            .with_filter(config.filter.build())
            .with_common_tags(config.poll.common_tags.clone());

        let stats = Arc::new(PublishStats::default());
        let mut pipeline = PublishPipeline::new(stats.clone());
        for sink_config in &config.sinks {
            let sink = sink_config.build().context(format!(
                "failed to build {} sink {}",
                sink_config.sink_type(),
                sink_config.name()
            ))?;
            let common = sink_config.common();
            pipeline.add_sink(sink, common.batch_size, common.failure_policy);
            debug!(
                "added {} sink {} with batch size {}",
                sink_config.sink_type(),
                sink_config.name(),
                common.batch_size
            );
        }
        registry.register(stats);

        let cpu_monitor = if config.self_monitor.enable {
            // sample twice in each poll interval
            let sample_interval = config.poll.interval / 2;
            let monitor = CpuUsageMonitor::new(&config.self_monitor.windows, sample_interval, clock)
                .map_err(|e| anyhow!("failed to create cpu usage monitor: {e}"))?;
            let monitor = Arc::new(monitor);
            registry.register(monitor.clone());
            Some(monitor)
        } else {
            None
        };

        Ok(Tally {
            registry,
            extractor,
            poller: Arc::new(poller),
            pipeline: Arc::new(pipeline),
            cpu_monitor,
            poll_interval: config.poll.interval,
            sweep_interval: config.cache.sweep_interval,
        })
    }

    #[inline]
    pub fn registry(&self) -> &Arc<MonitorRegistry> {
        &self.registry
    }

    #[inline]
    pub fn pipeline(&self) -> &Arc<PublishPipeline> {
        &self.pipeline
    }

    pub fn register(&self, obj: ArcInstrumented) -> bool {
        self.registry.register(obj)
    }

    pub fn unregister(&self, obj: &ArcInstrumented) -> bool {
        self.extractor.forget(obj);
        self.registry.unregister(obj)
    }

    pub fn publish_once(&self) -> Result<RoundReport, PublishError> {
        publish_round(&self.poller, &self.pipeline)
    }

    pub fn spawn_publish(&self) -> anyhow::Result<PublishTask> {
        info!(
            "start publishing {} sinks every {:?}",
            self.pipeline.sink_count(),
            self.poll_interval
        );
        PublishTask::spawn(self.poller.clone(), self.pipeline.clone(), self.poll_interval)
    }

    pub fn spawn_sweep(&self, handle: Option<Handle>) -> SweepHandle {
        self.extractor.spawn_sweep(self.sweep_interval, handle)
    }

    pub fn uptime_human(&self) -> Option<String> {
        self.cpu_monitor.as_ref().map(|m| m.uptime_human())
    }
}
