/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::num::NonZeroUsize;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, anyhow};
use yaml_rust::{Yaml, yaml};

use crate::publish::DEFAULT_BATCH_SIZE;
use crate::sink::{ArcSink, ConsoleSink, DiscardSink, FailurePolicy};

mod memory;
pub use memory::MemorySinkConfig;

mod statsd;
pub use statsd::StatsdSinkConfig;

mod json_file;
pub use json_file::JsonFileSinkConfig;

const CONFIG_KEY_SINK_TYPE: &str = "type";
const CONFIG_KEY_SINK_NAME: &str = "name";

/// Keys shared by all sink types.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SinkCommonConfig {
    pub name: String,
    pub batch_size: NonZeroUsize,
    pub failure_policy: Option<FailurePolicy>,
}

impl SinkCommonConfig {
    fn new(default_name: &str) -> Self {
        SinkCommonConfig {
            name: default_name.to_string(),
            batch_size: DEFAULT_BATCH_SIZE,
            failure_policy: None,
        }
    }

    /// Returns false if the key is not a common one.
    fn set(&mut self, k: &str, v: &Yaml) -> anyhow::Result<bool> {
        match tally_yaml::key::normalize(k).as_str() {
            CONFIG_KEY_SINK_TYPE => Ok(true),
            CONFIG_KEY_SINK_NAME => {
                self.name = tally_yaml::value::as_string(v)?;
                Ok(true)
            }
            "batch_size" => {
                self.batch_size = tally_yaml::value::as_nonzero_usize(v)
                    .context(format!("invalid nonzero usize value for key {k}"))?;
                Ok(true)
            }
            "failure_policy" => {
                let s = tally_yaml::value::as_string(v)?;
                let policy = FailurePolicy::from_str(&s)
                    .map_err(|_| anyhow!("invalid failure policy {s}"))?;
                self.failure_policy = Some(policy);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn check(&self) -> anyhow::Result<()> {
        if self.name.is_empty() {
            return Err(anyhow!("name is not set"));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AnySinkConfig {
    Console(SinkCommonConfig),
    Discard(SinkCommonConfig),
    Memory(MemorySinkConfig),
    Statsd(StatsdSinkConfig),
    JsonFile(JsonFileSinkConfig),
}

impl AnySinkConfig {
    pub fn common(&self) -> &SinkCommonConfig {
        match self {
            AnySinkConfig::Console(c) | AnySinkConfig::Discard(c) => c,
            AnySinkConfig::Memory(c) => &c.common,
            AnySinkConfig::Statsd(c) => &c.common,
            AnySinkConfig::JsonFile(c) => &c.common,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.common().name
    }

    pub fn sink_type(&self) -> &'static str {
        match self {
            AnySinkConfig::Console(_) => "console",
            AnySinkConfig::Discard(_) => "discard",
            AnySinkConfig::Memory(_) => "memory",
            AnySinkConfig::Statsd(_) => "statsd",
            AnySinkConfig::JsonFile(_) => "json_file",
        }
    }

    pub fn build(&self) -> anyhow::Result<ArcSink> {
        match self {
            AnySinkConfig::Console(c) => Ok(Arc::new(ConsoleSink::new(&c.name))),
            AnySinkConfig::Discard(c) => Ok(Arc::new(DiscardSink::new(&c.name))),
            AnySinkConfig::Memory(c) => Ok(c.build()),
            AnySinkConfig::Statsd(c) => c.build(),
            AnySinkConfig::JsonFile(c) => c.build(),
        }
    }
}

fn parse_common(map: &yaml::Hash, default_name: &str) -> anyhow::Result<SinkCommonConfig> {
    let mut common = SinkCommonConfig::new(default_name);
    tally_yaml::foreach_kv(map, |k, v| {
        if common.set(k, v)? {
            Ok(())
        } else {
            Err(anyhow!("invalid key {k}"))
        }
    })?;
    common.check()?;
    Ok(common)
}

fn load_sink(map: &yaml::Hash) -> anyhow::Result<AnySinkConfig> {
    let sink_type = tally_yaml::hash_get_required_str(map, CONFIG_KEY_SINK_TYPE)?;
    match tally_yaml::key::normalize(sink_type).as_str() {
        "console" => {
            let common = parse_common(map, "console")
                .context("failed to load this Console sink")?;
            Ok(AnySinkConfig::Console(common))
        }
        "discard" => {
            let common = parse_common(map, "discard")
                .context("failed to load this Discard sink")?;
            Ok(AnySinkConfig::Discard(common))
        }
        "memory" => {
            let sink = MemorySinkConfig::parse(map).context("failed to load this Memory sink")?;
            Ok(AnySinkConfig::Memory(sink))
        }
        "statsd" => {
            let sink = StatsdSinkConfig::parse(map).context("failed to load this StatsD sink")?;
            Ok(AnySinkConfig::Statsd(sink))
        }
        "json_file" | "jsonfile" => {
            let sink =
                JsonFileSinkConfig::parse(map).context("failed to load this JsonFile sink")?;
            Ok(AnySinkConfig::JsonFile(sink))
        }
        _ => Err(anyhow!("unsupported sink type {sink_type}")),
    }
}

/// Load a list of sink maps, or a single sink map.
pub(super) fn load_all(v: &Yaml, sinks: &mut Vec<AnySinkConfig>) -> anyhow::Result<()> {
    let mut add = |map: &yaml::Hash| -> anyhow::Result<()> {
        let sink = load_sink(map)?;
        if sinks.iter().any(|s| s.name() == sink.name()) {
            return Err(anyhow!("sink with name {} already exists", sink.name()));
        }
        sinks.push(sink);
        Ok(())
    };

    match v {
        Yaml::Hash(map) => add(map),
        Yaml::Array(seq) => {
            for (i, v) in seq.iter().enumerate() {
                let Yaml::Hash(map) = v else {
                    return Err(anyhow!("sink #{i} should be a map"));
                };
                add(map).context(format!("invalid sink #{i}"))?;
            }
            Ok(())
        }
        _ => Err(anyhow!("yaml value type for 'sink' should be 'map' or 'array'")),
    }
}
