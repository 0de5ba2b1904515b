/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::monitor::{Instrumented, MemberSet, MonitorConfig, ValueAccessor};

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublishSnapshot {
    pub rounds: u64,
    pub failed_rounds: u64,
    pub sent: u64,
    pub dropped: u64,
    pub failed_batches: u64,
}

/// Counters of the publish pipeline, also exported as metrics.
#[derive(Default)]
pub struct PublishStats {
    rounds: AtomicU64,
    failed_rounds: AtomicU64,
    sent: AtomicU64,
    dropped: AtomicU64,
    failed_batches: AtomicU64,
}

impl PublishStats {
    pub(super) fn add_round(&self, failed: bool) {
        self.rounds.fetch_add(1, Ordering::Relaxed);
        if failed {
            self.failed_rounds.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(super) fn add_sent(&self, n: usize) {
        self.sent.fetch_add(n as u64, Ordering::Relaxed);
    }

    pub(super) fn add_dropped(&self, n: usize) {
        self.dropped.fetch_add(n as u64, Ordering::Relaxed);
    }

    pub(super) fn add_failed_batch(&self) {
        self.failed_batches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> PublishSnapshot {
        PublishSnapshot {
            rounds: self.rounds.load(Ordering::Relaxed),
            failed_rounds: self.failed_rounds.load(Ordering::Relaxed),
            sent: self.sent.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            failed_batches: self.failed_batches.load(Ordering::Relaxed),
        }
    }
}

impl Instrumented for PublishStats {
    fn declare(self: Arc<Self>, members: &mut MemberSet) {
        let counters: [(&str, fn(&PublishStats) -> &AtomicU64); 5] = [
            ("tally.publish.rounds", |s| &s.rounds),
            ("tally.publish.rounds.failed", |s| &s.failed_rounds),
            ("tally.publish.samples.sent", |s| &s.sent),
            ("tally.publish.samples.dropped", |s| &s.dropped),
            ("tally.publish.batches.failed", |s| &s.failed_batches),
        ];
        for (name, field) in counters {
            members.field(
                MonitorConfig::counter(name),
                ValueAccessor::bind(&self, move |s| field(s).load(Ordering::Relaxed).into()),
            );
        }
    }
}
