/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::fmt;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use log::{debug, warn};
use tally_types::MetricSample;

use super::PublishStats;
use crate::sink::{ArcSink, FailurePolicy, RoundId, SinkError};

pub const DEFAULT_BATCH_SIZE: NonZeroUsize = NonZeroUsize::new(20).unwrap();

struct SinkSlot {
    sink: ArcSink,
    batch_size: NonZeroUsize,
    policy: FailurePolicy,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RoundReport {
    /// samples given to the round
    pub samples: usize,
    /// samples accepted, summed over all sinks
    pub sent: usize,
    /// samples dropped by sinks as they could not be converted
    pub dropped: usize,
    pub failed_batches: usize,
}

#[derive(Debug)]
pub struct SinkFailure {
    pub sink: String,
    /// index of the failed batch, `None` if the flush failed
    pub batch: Option<usize>,
    /// samples not sent to this sink after the failure
    pub skipped: usize,
    pub error: SinkError,
}

impl fmt::Display for SinkFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.batch {
            Some(i) => write!(
                f,
                "sink {} failed at batch #{i}, {} samples skipped: {}",
                self.sink, self.skipped, self.error
            ),
            None => write!(f, "sink {} failed to flush: {}", self.sink, self.error),
        }
    }
}

/// Failures of all fail fast sinks in one round.
#[derive(Debug)]
pub struct PublishError {
    failures: Vec<SinkFailure>,
    report: RoundReport,
}

impl PublishError {
    pub fn failures(&self) -> &[SinkFailure] {
        &self.failures
    }

    pub fn report(&self) -> &RoundReport {
        &self.report
    }
}

impl fmt::Display for PublishError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "publish round failed")?;
        for (i, failure) in self.failures.iter().enumerate() {
            if i == 0 {
                write!(f, ": {failure}")?;
            } else {
                write!(f, "; {failure}")?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for PublishError {}

/// Deliver the samples of one round to all sinks, in batches.
///
/// Each sink gets the samples in order, split into batches of at most
/// its batch size. Nothing is retried. Rounds are not serialized here,
/// each one is given its own `RoundId` so sinks can tell overlapping
/// rounds apart.
pub struct PublishPipeline {
    sinks: Vec<SinkSlot>,
    stats: Arc<PublishStats>,
    next_round: AtomicU64,
}

impl Default for PublishPipeline {
    fn default() -> Self {
        PublishPipeline::new(Arc::new(PublishStats::default()))
    }
}

impl PublishPipeline {
    pub fn new(stats: Arc<PublishStats>) -> Self {
        PublishPipeline {
            sinks: Vec::new(),
            stats,
            next_round: AtomicU64::new(1),
        }
    }

    /// Add a sink, using its own failure policy if `policy` is not set.
    pub fn add_sink(
        &mut self,
        sink: ArcSink,
        batch_size: NonZeroUsize,
        policy: Option<FailurePolicy>,
    ) {
        let policy = policy.unwrap_or_else(|| sink.failure_policy());
        self.sinks.push(SinkSlot {
            sink,
            batch_size,
            policy,
        });
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    pub fn stats(&self) -> &Arc<PublishStats> {
        &self.stats
    }

    pub fn publish(&self, samples: &[MetricSample]) -> Result<RoundReport, PublishError> {
        let round = RoundId::new(self.next_round.fetch_add(1, Ordering::Relaxed));
        let mut report = RoundReport {
            samples: samples.len(),
            ..Default::default()
        };
        let mut failures = Vec::new();

        for slot in &self.sinks {
            let batch_size = slot.batch_size.get();
            let sink_name = slot.sink.name();
            let mut failed = false;

            for (i, batch) in samples.chunks(batch_size).enumerate() {
                match slot.sink.send(round, batch) {
                    Ok(n) => {
                        let n = n.min(batch.len());
                        report.sent += n;
                        report.dropped += batch.len() - n;
                    }
                    Err(e) => {
                        report.failed_batches += 1;
                        self.stats.add_failed_batch();
                        match slot.policy {
                            FailurePolicy::BestEffort => {
                                warn!("sink {sink_name}: failed to send batch #{i}: {e}");
                            }
                            FailurePolicy::FailFast => {
                                let skipped = samples.len().saturating_sub((i + 1) * batch_size);
                                failures.push(SinkFailure {
                                    sink: sink_name.to_string(),
                                    batch: Some(i),
                                    skipped,
                                    error: e,
                                });
                                failed = true;
                                break;
                            }
                        }
                    }
                }
            }

            if let Err(e) = slot.sink.flush(round) {
                if slot.policy == FailurePolicy::FailFast && !failed {
                    failures.push(SinkFailure {
                        sink: sink_name.to_string(),
                        batch: None,
                        skipped: 0,
                        error: e,
                    });
                } else {
                    warn!("sink {sink_name}: failed to flush: {e}");
                }
            }
        }

        self.stats.add_sent(report.sent);
        self.stats.add_dropped(report.dropped);
        self.stats.add_round(!failures.is_empty());
        debug!(
            "publish round {round}: {} samples, {} sent, {} dropped, {} failed batches",
            report.samples, report.sent, report.dropped, report.failed_batches
        );

        if failures.is_empty() {
            Ok(report)
        } else {
            Err(PublishError { failures, report })
        }
    }
}
