/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use log::debug;
use serde_json::{Map, Number, Value};

use tally_types::{DataSourceKind, MetricSample, MetricValue};

use super::{FailurePolicy, RoundId, Sink, SinkError};

fn sample_to_json(sample: &MetricSample, value: &MetricValue) -> Option<Value> {
    let number = match value {
        MetricValue::Unsigned(u) => Number::from(*u),
        MetricValue::Signed(i) => Number::from(*i),
        MetricValue::Double(f) => Number::from_f64(*f)?,
        _ => return None,
    };

    let mut map = Map::with_capacity(4);
    map.insert(
        "metric".to_string(),
        Value::String(sample.name().to_string()),
    );
    map.insert(
        "timestamp".to_string(),
        Value::Number(Number::from(sample.timestamp())),
    );
    map.insert("value".to_string(), Value::Number(number));
    let mut tag_map = Map::with_capacity(sample.tags().len() + 1);
    tag_map.insert(
        DataSourceKind::TAG_KEY.to_string(),
        Value::String(sample.kind().as_str().to_string()),
    );
    for tag in sample.tags() {
        tag_map.insert(tag.key().to_string(), Value::String(tag.value().to_string()));
    }
    map.insert("tags".to_string(), Value::Object(tag_map));
    Some(Value::Object(map))
}

/// Append samples to a file as OpenTSDB style json objects, one per line.
pub struct JsonFileSink {
    name: String,
    path: PathBuf,
    writer: Mutex<BufWriter<File>>,
}

impl JsonFileSink {
    pub fn open(name: &str, path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(JsonFileSink {
            name: name.to_string(),
            path: path.to_path_buf(),
            writer: Mutex::new(BufWriter::new(file)),
        })
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Sink for JsonFileSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn sink_type(&self) -> &'static str {
        "json_file"
    }

    fn failure_policy(&self) -> FailurePolicy {
        FailurePolicy::FailFast
    }

    fn send(&self, _round: RoundId, batch: &[MetricSample]) -> Result<usize, SinkError> {
        let mut accepted = 0;
        let mut writer = self.writer.lock().unwrap();
        for sample in batch {
            let v = match sample.value().coerce_numeric() {
                Ok(v) => sample_to_json(sample, &v),
                Err(e) => {
                    debug!(
                        "json file sink {}: drop sample {}: {e}",
                        self.name,
                        sample.name()
                    );
                    continue;
                }
            };
            let Some(v) = v else {
                continue;
            };
            writeln!(writer, "{v}")?;
            accepted += 1;
        }
        Ok(accepted)
    }

    fn flush(&self, _round: RoundId) -> Result<(), SinkError> {
        let mut writer = self.writer.lock().unwrap();
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use tally_types::{Tag, TagList};

    const ROUND: RoundId = RoundId::new(1);

    #[test]
    fn write_lines() {
        let path = std::env::temp_dir().join(format!("tally-json-sink-{}.log", std::process::id()));
        let _ = std::fs::remove_file(&path);

        let sink = JsonFileSink::open("json", &path).unwrap();
        let batch = [
            MetricSample::new(
                Arc::from("conn.bytes"),
                DataSourceKind::Counter,
                TagList::from_tags([Tag::new("id", "c1").unwrap()]),
                1000,
                MetricValue::Unsigned(20),
            ),
            MetricSample::new(
                Arc::from("state"),
                DataSourceKind::Informational,
                TagList::EMPTY,
                1000,
                MetricValue::from("idle"),
            ),
            MetricSample::new(
                Arc::from("ok"),
                DataSourceKind::Gauge,
                TagList::EMPTY,
                1000,
                MetricValue::Bool(true),
            ),
        ];
        assert_eq!(sink.send(ROUND, &batch).unwrap(), 2);
        sink.flush(ROUND).unwrap();

        let content = std::fs::read_to_string(sink.path()).unwrap();
        let lines: Vec<Value> = content
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["metric"], "conn.bytes");
        assert_eq!(lines[0]["timestamp"], 1000);
        assert_eq!(lines[0]["value"], 20);
        assert_eq!(lines[0]["tags"]["id"], "c1");
        assert_eq!(lines[0]["tags"]["type"], "COUNTER");
        assert_eq!(lines[1]["metric"], "ok");
        assert_eq!(lines[1]["value"], 1);

        let _ = std::fs::remove_file(&path);
    }
}
