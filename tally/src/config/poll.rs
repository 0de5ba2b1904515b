/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::time::Duration;

use anyhow::{Context, anyhow};
use yaml_rust::Yaml;

use tally_types::TagList;

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PollConfig {
    pub interval: Duration,
    pub common_tags: TagList,
}

impl Default for PollConfig {
    fn default() -> Self {
        PollConfig {
            interval: DEFAULT_POLL_INTERVAL,
            common_tags: TagList::EMPTY,
        }
    }
}

impl PollConfig {
    pub(super) fn parse(&mut self, v: &Yaml) -> anyhow::Result<()> {
        match v {
            Yaml::Hash(map) => tally_yaml::foreach_kv(map, |k, v| self.set(k, v))?,
            _ => {
                self.interval = tally_yaml::humanize::as_duration(v)
                    .context("invalid poll interval value")?;
            }
        }
        self.check()
    }

    fn set(&mut self, k: &str, v: &Yaml) -> anyhow::Result<()> {
        match tally_yaml::key::normalize(k).as_str() {
            "interval" => {
                self.interval = tally_yaml::humanize::as_duration(v)
                    .context(format!("invalid humanize duration value for key {k}"))?;
                Ok(())
            }
            "common_tags" | "tags" => {
                self.common_tags = tally_yaml::value::as_tag_list(v)
                    .context(format!("invalid tag list value for key {k}"))?;
                Ok(())
            }
            _ => Err(anyhow!("invalid key {k}")),
        }
    }

    fn check(&self) -> anyhow::Result<()> {
        if self.interval.is_zero() {
            return Err(anyhow!("poll interval should not be zero"));
        }
        Ok(())
    }
}
