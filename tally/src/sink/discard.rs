/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use tally_types::MetricSample;

use super::{FailurePolicy, RoundId, Sink, SinkError};

pub struct DiscardSink {
    name: String,
}

impl DiscardSink {
    pub fn new(name: &str) -> Self {
        DiscardSink {
            name: name.to_string(),
        }
    }
}

impl Sink for DiscardSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn sink_type(&self) -> &'static str {
        "discard"
    }

    fn failure_policy(&self) -> FailurePolicy {
        FailurePolicy::BestEffort
    }

    fn send(&self, _round: RoundId, batch: &[MetricSample]) -> Result<usize, SinkError> {
        Ok(batch.len())
    }
}
