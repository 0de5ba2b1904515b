/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::anyhow;
use yaml_rust::{Yaml, yaml};

use super::SinkCommonConfig;
use crate::sink::{ArcSink, JsonFileSink};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JsonFileSinkConfig {
    pub common: SinkCommonConfig,
    pub path: PathBuf,
}

impl JsonFileSinkConfig {
    pub(super) fn parse(map: &yaml::Hash) -> anyhow::Result<Self> {
        let mut config = JsonFileSinkConfig {
            common: SinkCommonConfig::new("json_file"),
            path: PathBuf::new(),
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
            "path" => {
                self.path = PathBuf::from(tally_yaml::value::as_string(v)?);
                Ok(())
            }
            _ => Err(anyhow!("invalid key {k}")),
        }
    }

    fn check(&self) -> anyhow::Result<()> {
        self.common.check()?;
        if self.path.as_os_str().is_empty() {
            return Err(anyhow!("path is not set"));
        }
        Ok(())
    }

    pub(super) fn build(&self) -> anyhow::Result<ArcSink> {
        let sink = JsonFileSink::open(&self.common.name, &self.path)
            .map_err(|e| anyhow!("failed to open file {}: {e}", self.path.display()))?;
        Ok(Arc::new(sink))
    }
}
