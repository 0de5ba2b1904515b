/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use ahash::AHashMap;

use tally_types::MetricSample;

use super::{FailurePolicy, RoundId, Sink, SinkError};

/// Keep the samples of the most recent rounds in memory.
///
/// Batches are collected per round until `flush` of that round, rounds
/// that overlap are kept apart. Closed rounds are ordered by the time
/// they are flushed, and rounds without any sample are not kept.
pub struct MemorySink {
    name: String,
    capacity: usize,
    pending: Mutex<AHashMap<RoundId, Vec<MetricSample>>>,
    rounds: Mutex<VecDeque<Arc<[MetricSample]>>>,
}

impl MemorySink {
    pub fn new(name: &str, capacity: usize) -> Self {
        MemorySink {
            name: name.to_string(),
            capacity,
            pending: Mutex::new(AHashMap::new()),
            rounds: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Retained rounds, oldest first.
    pub fn rounds(&self) -> Vec<Arc<[MetricSample]>> {
        let rounds = self.rounds.lock().unwrap();
        rounds.iter().rev().cloned().collect()
    }

    pub fn latest(&self) -> Option<Arc<[MetricSample]>> {
        let rounds = self.rounds.lock().unwrap();
        rounds.front().cloned()
    }

    /// Count of rounds that got samples but are not flushed yet.
    pub fn pending_rounds(&self) -> usize {
        self.pending.lock().unwrap().len()
    }
}

impl Sink for MemorySink {
    fn name(&self) -> &str {
        &self.name
    }

    fn sink_type(&self) -> &'static str {
        "memory"
    }

    fn failure_policy(&self) -> FailurePolicy {
        FailurePolicy::BestEffort
    }

    fn send(&self, round: RoundId, batch: &[MetricSample]) -> Result<usize, SinkError> {
        if batch.is_empty() {
            return Ok(0);
        }
        let mut pending = self.pending.lock().unwrap();
        pending.entry(round).or_default().extend_from_slice(batch);
        Ok(batch.len())
    }

    fn flush(&self, round: RoundId) -> Result<(), SinkError> {
        let Some(samples) = self.pending.lock().unwrap().remove(&round) else {
            return Ok(());
        };

        let mut rounds = self.rounds.lock().unwrap();
        rounds.push_front(Arc::from(samples));
        rounds.truncate(self.capacity);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tally_types::{DataSourceKind, MetricValue, TagList};

    fn sample(v: u64) -> MetricSample {
        MetricSample::new(
            Arc::from("m"),
            DataSourceKind::Gauge,
            TagList::EMPTY,
            v,
            MetricValue::Unsigned(v),
        )
    }

    fn timestamps(round: &[MetricSample]) -> Vec<u64> {
        round.iter().map(|s| s.timestamp()).collect()
    }

    #[test]
    fn retain_latest_rounds() {
        let sink = MemorySink::new("mem", 2);
        for id in 1..=3 {
            let round = RoundId::new(id);
            sink.send(round, &[sample(id)]).unwrap();
            sink.flush(round).unwrap();
        }

        let rounds = sink.rounds();
        assert_eq!(rounds.len(), 2);
        assert_eq!(rounds[0][0].value(), &MetricValue::Unsigned(2));
        assert_eq!(rounds[1][0].value(), &MetricValue::Unsigned(3));
        assert_eq!(sink.latest().unwrap()[0].timestamp(), 3);
    }

    #[test]
    fn round_spans_batches() {
        let sink = MemorySink::new("mem", 4);
        let round = RoundId::new(1);
        sink.send(round, &[sample(1), sample(2)]).unwrap();
        sink.send(round, &[sample(3)]).unwrap();
        assert!(sink.rounds().is_empty());
        sink.flush(round).unwrap();
        assert_eq!(sink.rounds()[0].len(), 3);

        // empty round
        let round = RoundId::new(2);
        sink.send(round, &[]).unwrap();
        sink.flush(round).unwrap();
        assert_eq!(sink.rounds().len(), 1);
        assert_eq!(sink.pending_rounds(), 0);
    }

    #[test]
    fn overlapping_rounds() {
        let sink = MemorySink::new("mem", 4);
        let first = RoundId::new(1);
        let second = RoundId::new(2);

        sink.send(first, &[sample(1)]).unwrap();
        sink.send(second, &[sample(100)]).unwrap();
        sink.flush(first).unwrap();
        assert_eq!(sink.pending_rounds(), 1);
        sink.send(second, &[sample(101)]).unwrap();
        sink.flush(second).unwrap();

        let rounds = sink.rounds();
        assert_eq!(rounds.len(), 2);
        assert_eq!(timestamps(&rounds[0]), [1]);
        assert_eq!(timestamps(&rounds[1]), [100, 101]);
        assert_eq!(sink.pending_rounds(), 0);
    }

    #[test]
    fn flush_unknown_round() {
        let sink = MemorySink::new("mem", 4);
        sink.send(RoundId::new(1), &[sample(1)]).unwrap();
        sink.flush(RoundId::new(7)).unwrap();
        assert!(sink.rounds().is_empty());
        assert_eq!(sink.pending_rounds(), 1);
    }
}
