/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use anyhow::anyhow;
use log::{debug, info, warn};

use super::{PublishError, PublishPipeline, RoundReport};
use crate::poll::Poller;

const PUBLISH_THREAD_NAME: &str = "tally-publish";

/// Poll once and publish the samples.
pub fn publish_round(
    poller: &Poller,
    pipeline: &PublishPipeline,
) -> Result<RoundReport, PublishError> {
    let samples = poller.poll();
    pipeline.publish(&samples)
}

fn wait_duration(interval: Duration, instant_start: Instant) -> Duration {
    let instant_now = Instant::now();
    match instant_start.checked_add(interval) {
        // re-calculate the duration
        Some(instant_next) => instant_next
            .checked_duration_since(instant_now)
            .unwrap_or_default(),
        None => interval,
    }
}

/// Run publish rounds on a dedicated thread at a fixed interval.
///
/// Rounds run one after another on the thread, so they never overlap.
pub struct PublishTask {
    quit_sender: Option<mpsc::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl PublishTask {
    pub fn spawn(
        poller: Arc<Poller>,
        pipeline: Arc<PublishPipeline>,
        interval: Duration,
    ) -> anyhow::Result<Self> {
        let (quit_sender, quit_receiver) = mpsc::channel::<()>();
        let handle = std::thread::Builder::new()
            .name(PUBLISH_THREAD_NAME.to_string())
            .spawn(move || {
                loop {
                    let instant_start = Instant::now();

                    match publish_round(&poller, &pipeline) {
                        Ok(report) => debug!("published {} samples", report.samples),
                        Err(e) => warn!("{e}"),
                    }

                    match quit_receiver.recv_timeout(wait_duration(interval, instant_start)) {
                        Err(RecvTimeoutError::Timeout) => {}
                        Ok(_) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                info!("publish task stopped");
            })
            .map_err(|e| anyhow!("failed to spawn thread: {e:?}"))?;
        Ok(PublishTask {
            quit_sender: Some(quit_sender),
            handle: Some(handle),
        })
    }

    fn signal_quit(&mut self) {
        if let Some(sender) = self.quit_sender.take() {
            let _ = sender.send(());
        }
    }

    /// Stop scheduling, and wait for the round in progress to finish.
    pub fn stop(mut self) {
        self.signal_quit();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map(|h| h.is_finished()).unwrap_or(true)
    }
}

impl Drop for PublishTask {
    fn drop(&mut self) {
        self.signal_quit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tally_types::{ManualClock, MetricValue};

    use crate::monitor::{BasicCounter, MetadataExtractor, MonitorConfig};
    use crate::registry::MonitorRegistry;
    use crate::sink::MemorySink;

    #[test]
    fn run_and_stop() {
        let clock = Arc::new(ManualClock::default());
        let registry = Arc::new(MonitorRegistry::new());
        let counter = Arc::new(BasicCounter::new(MonitorConfig::counter("ticks")));
        counter.add(3);
        registry.register(counter.clone());

        let extractor = Arc::new(MetadataExtractor::new(Duration::from_secs(60), clock.clone()));
        let poller = Arc::new(Poller::new(registry, extractor, clock));
        let sink = Arc::new(MemorySink::new("mem", 100));
        let mut pipeline = PublishPipeline::default();
        pipeline.add_sink(sink.clone(), crate::publish::DEFAULT_BATCH_SIZE, None);
        let pipeline = Arc::new(pipeline);

        let task = PublishTask::spawn(poller, pipeline.clone(), Duration::from_millis(10)).unwrap();
        for _ in 0..200 {
            if sink.rounds().len() >= 2 {
                break;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        task.stop();

        let rounds = sink.rounds();
        assert!(rounds.len() >= 2);
        assert_eq!(rounds[0][0].value(), &MetricValue::Unsigned(3));

        // nothing runs after stop
        let count = pipeline.stats().snapshot().rounds;
        std::thread::sleep(Duration::from_millis(30));
        assert_eq!(pipeline.stats().snapshot().rounds, count);
    }

    #[test]
    fn wait() {
        let start = Instant::now();
        assert!(wait_duration(Duration::from_secs(10), start) <= Duration::from_secs(10));
        if let Some(past) = Instant::now().checked_sub(Duration::from_secs(20)) {
            assert_eq!(wait_duration(Duration::from_secs(10), past), Duration::ZERO);
        }
    }
}
