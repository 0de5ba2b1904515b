/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::fmt;
use std::io;
use std::str::FromStr;
use std::sync::Arc;

use thiserror::Error;

use tally_types::MetricSample;

mod console;
pub use console::ConsoleSink;

mod discard;
pub use discard::DiscardSink;

mod memory;
pub use memory::MemorySink;

mod statsd;
pub use statsd::{DEFAULT_MAX_PACKET_SIZE, StatsdSink};

mod json_file;
pub use json_file::JsonFileSink;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("rejected by backend: {0}")]
    Rejected(String),
    #[error("sink closed")]
    Closed,
}

/// How the publish pipeline reacts to an error from a sink.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Stop sending the remaining batches of this round to the sink, and
    /// report the error to the caller of the round.
    FailFast,
    /// Log the error and go on with the next batch.
    BestEffort,
}

impl FailurePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailurePolicy::FailFast => "fail_fast",
            FailurePolicy::BestEffort => "best_effort",
        }
    }
}

impl FromStr for FailurePolicy {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "fail_fast" | "failfast" => Ok(FailurePolicy::FailFast),
            "best_effort" | "besteffort" => Ok(FailurePolicy::BestEffort),
            _ => Err(()),
        }
    }
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identify one publish round of a pipeline.
///
/// Rounds may overlap, a sink that groups samples by round should key
/// on this rather than on call order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoundId(u64);

impl RoundId {
    #[inline]
    pub const fn new(id: u64) -> Self {
        RoundId(id)
    }

    #[inline]
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RoundId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A backend that receives batches of samples.
///
/// Value conversion to the representation of the backend is done by the
/// sink, samples that can not be converted are dropped from the batch.
pub trait Sink: Send + Sync {
    fn name(&self) -> &str;

    fn sink_type(&self) -> &'static str;

    /// The policy used when none is configured.
    fn failure_policy(&self) -> FailurePolicy;

    /// Send one batch, returns the count of samples accepted.
    ///
    /// An empty batch should be a no-op.
    fn send(&self, round: RoundId, batch: &[MetricSample]) -> Result<usize, SinkError>;

    /// Called once all batches of `round` have been handed to the sink.
    fn flush(&self, _round: RoundId) -> Result<(), SinkError> {
        Ok(())
    }
}

pub type ArcSink = Arc<dyn Sink>;
