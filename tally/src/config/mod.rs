/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::path::Path;

use anyhow::{Context, anyhow};
use yaml_rust::{Yaml, yaml};

mod cache;
mod filter;
mod poll;
mod self_monitor;
mod sink;

pub use cache::CacheConfig;
pub use filter::{FilterConfig, FilterRules};
pub use poll::PollConfig;
pub use self_monitor::SelfMonitorConfig;
pub use sink::{
    AnySinkConfig, JsonFileSinkConfig, MemorySinkConfig, SinkCommonConfig, StatsdSinkConfig,
};

#[derive(Clone, Debug, Default)]
pub struct TallyConfig {
    pub poll: PollConfig,
    pub cache: CacheConfig,
    pub filter: FilterConfig,
    pub self_monitor: SelfMonitorConfig,
    pub sinks: Vec<AnySinkConfig>,
}

impl TallyConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let mut config = TallyConfig::default();
        // allow multiple docs, and treat them as the same
        tally_yaml::foreach_doc(path, |_, doc| config.load_doc(doc))?;
        config.check()?;
        Ok(config)
    }

    pub fn load_str(content: &str) -> anyhow::Result<Self> {
        let mut config = TallyConfig::default();
        tally_yaml::foreach_doc_in_str(content, &mut |_, doc: &Yaml| config.load_doc(doc))?;
        config.check()?;
        Ok(config)
    }

    fn load_doc(&mut self, doc: &Yaml) -> anyhow::Result<()> {
        match doc {
            Yaml::Hash(map) => self.load_map(map),
            _ => Err(anyhow!("yaml doc root should be hash")),
        }
    }

    fn load_map(&mut self, map: &yaml::Hash) -> anyhow::Result<()> {
        tally_yaml::foreach_kv(map, |k, v| match tally_yaml::key::normalize(k).as_str() {
            "poll" => self.poll.parse(v).context("invalid poll config"),
            "cache" => self.cache.parse(v).context("invalid cache config"),
            "filter" => {
                self.filter = FilterConfig::parse(v).context("invalid filter config")?;
                Ok(())
            }
            "self_monitor" => self
                .self_monitor
                .parse(v)
                .context("invalid self monitor config"),
            "sink" | "sinks" => sink::load_all(v, &mut self.sinks),
            _ => Err(anyhow!("invalid key {k} in main conf")),
        })
    }

    fn check(&self) -> anyhow::Result<()> {
        if self.sinks.is_empty() {
            return Err(anyhow!("no sink configured"));
        }
        Ok(())
    }
}
