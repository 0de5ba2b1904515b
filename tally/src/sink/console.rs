/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io::{self, Write};

use tally_types::MetricSample;

use super::{FailurePolicy, RoundId, Sink, SinkError};

/// Print samples to stdout, one line for each.
pub struct ConsoleSink {
    name: String,
}

impl ConsoleSink {
    pub fn new(name: &str) -> Self {
        ConsoleSink {
            name: name.to_string(),
        }
    }
}

pub(super) fn write_sample<W: Write>(w: &mut W, sample: &MetricSample) -> io::Result<()> {
    write!(w, "{} {} {}", sample.timestamp(), sample.name(), sample.value())?;
    if !sample.tags().is_empty() {
        write!(w, " {}", sample.tags())?;
    }
    writeln!(w)
}

impl Sink for ConsoleSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn sink_type(&self) -> &'static str {
        "console"
    }

    fn failure_policy(&self) -> FailurePolicy {
        FailurePolicy::BestEffort
    }

    fn send(&self, _round: RoundId, batch: &[MetricSample]) -> Result<usize, SinkError> {
        if batch.is_empty() {
            return Ok(0);
        }
        let mut stdout = io::stdout().lock();
        for sample in batch {
            write_sample(&mut stdout, sample)?;
        }
        Ok(batch.len())
    }

    fn flush(&self, _round: RoundId) -> Result<(), SinkError> {
        io::stdout().flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use tally_types::{DataSourceKind, MetricValue, Tag, TagList};

    #[test]
    fn line() {
        let sample = MetricSample::new(
            Arc::from("cpu.usage"),
            DataSourceKind::Gauge,
            TagList::from_tags([Tag::new("host", "a").unwrap(), Tag::new("id", "x").unwrap()]),
            1700000000000,
            MetricValue::Double(12.5),
        );
        let mut buf = Vec::new();
        write_sample(&mut buf, &sample).unwrap();
        assert_eq!(buf, b"1700000000000 cpu.usage 12.5 host=a,id=x\n");

        let sample = MetricSample::new(
            Arc::from("up"),
            DataSourceKind::Informational,
            TagList::EMPTY,
            1,
            MetricValue::from("PT1M"),
        );
        buf.clear();
        write_sample(&mut buf, &sample).unwrap();
        assert_eq!(buf, b"1 up PT1M\n");
    }
}
