/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::time::Duration;

use anyhow::{Context, anyhow};
use yaml_rust::Yaml;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelfMonitorConfig {
    pub enable: bool,
    pub windows: Vec<Duration>,
}

impl Default for SelfMonitorConfig {
    fn default() -> Self {
        SelfMonitorConfig {
            enable: true,
            windows: vec![
                Duration::from_secs(60),
                Duration::from_secs(300),
                Duration::from_secs(900),
            ],
        }
    }
}

impl SelfMonitorConfig {
    pub(super) fn parse(&mut self, v: &Yaml) -> anyhow::Result<()> {
        match v {
            Yaml::Hash(map) => tally_yaml::foreach_kv(map, |k, v| self.set(k, v))?,
            _ => {
                self.enable = tally_yaml::value::as_bool(v)?;
            }
        }
        self.check()
    }

    fn set(&mut self, k: &str, v: &Yaml) -> anyhow::Result<()> {
        match tally_yaml::key::normalize(k).as_str() {
            "enable" => {
                self.enable = tally_yaml::value::as_bool(v)?;
                Ok(())
            }
            "windows" => {
                self.windows = tally_yaml::humanize::as_duration_list(v)
                    .context(format!("invalid duration list value for key {k}"))?;
                Ok(())
            }
            _ => Err(anyhow!("invalid key {k}")),
        }
    }

    fn check(&self) -> anyhow::Result<()> {
        if !self.enable {
            return Ok(());
        }
        if self.windows.is_empty() {
            return Err(anyhow!("no window set"));
        }
        if self.windows.iter().any(|w| w.is_zero()) {
            return Err(anyhow!("zero window length is not allowed"));
        }
        Ok(())
    }
}
