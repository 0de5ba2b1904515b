/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::Arc;

use anyhow::{Context, anyhow};
use yaml_rust::{Yaml, yaml};

use super::SinkCommonConfig;
use crate::sink::{ArcSink, MemorySink};

const DEFAULT_CAPACITY: usize = 10;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemorySinkConfig {
    pub common: SinkCommonConfig,
    pub capacity: usize,
}

impl MemorySinkConfig {
    pub(super) fn parse(map: &yaml::Hash) -> anyhow::Result<Self> {
        let mut config = MemorySinkConfig {
            common: SinkCommonConfig::new("memory"),
            capacity: DEFAULT_CAPACITY,
        };
        tally_yaml::foreach_kv(map, |k, v| config.set(k, v))?;
        config.check()?;
        Ok(config)
    }

    fn set(&mut self, k: &str, v: &Yaml) -> anyhow::Result<()> {
        if self.common.set(k, v)? {
            return Ok(());
        }
        match tally_yaml::key::normalize(k).as_str() {
            "capacity" | "store_count" => {
                self.capacity = tally_yaml::value::as_nonzero_usize(v)
                    .context(format!("invalid nonzero usize value for key {k}"))?
                    .get();
                Ok(())
            }
            _ => Err(anyhow!("invalid key {k}")),
        }
    }

    fn check(&self) -> anyhow::Result<()> {
        self.common.check()
    }

    pub(super) fn build(&self) -> ArcSink {
        Arc::new(MemorySink::new(&self.common.name, self.capacity))
    }
}
