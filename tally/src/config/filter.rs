/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::Arc;

use anyhow::{Context, anyhow};
use regex::Regex;
use yaml_rust::Yaml;

use tally_types::TagList;

use crate::filter::{
    AllFilter, AndFilter, ArcMetricFilter, PrefixFilter, RegexFilter, TagFilter,
};

#[derive(Clone, Debug, Default)]
pub struct FilterRules {
    include: Option<Regex>,
    exclude: Option<Regex>,
    prefix: Option<String>,
    tags: TagList,
}

#[derive(Clone, Debug, Default)]
pub enum FilterConfig {
    #[default]
    All,
    Rules(FilterRules),
}

fn as_regex(v: &Yaml) -> anyhow::Result<Regex> {
    if let Yaml::String(s) = v {
        Regex::new(s).map_err(|e| anyhow!("invalid regex {s}: {e}"))
    } else {
        Err(anyhow!("yaml value type for 'regex' should be 'string'"))
    }
}

impl FilterRules {
    fn set(&mut self, k: &str, v: &Yaml) -> anyhow::Result<()> {
        match tally_yaml::key::normalize(k).as_str() {
            "include" => {
                self.include = Some(as_regex(v).context(format!("invalid value for key {k}"))?);
                Ok(())
            }
            "exclude" => {
                self.exclude = Some(as_regex(v).context(format!("invalid value for key {k}"))?);
                Ok(())
            }
            "prefix" => {
                self.prefix = Some(
                    tally_yaml::value::as_string(v)
                        .context(format!("invalid string value for key {k}"))?,
                );
                Ok(())
            }
            "tags" => {
                self.tags = tally_yaml::value::as_tag_list(v)
                    .context(format!("invalid tag list value for key {k}"))?;
                Ok(())
            }
            _ => Err(anyhow!("invalid key {k}")),
        }
    }
}

impl FilterConfig {
    pub(super) fn parse(v: &Yaml) -> anyhow::Result<Self> {
        match v {
            Yaml::String(s) => {
                if tally_yaml::key::normalize(s) == "all" {
                    Ok(FilterConfig::All)
                } else {
                    let rules = FilterRules {
                        include: Some(as_regex(v)?),
                        ..Default::default()
                    };
                    Ok(FilterConfig::Rules(rules))
                }
            }
            Yaml::Hash(map) => {
                let mut rules = FilterRules::default();
                tally_yaml::foreach_kv(map, |k, v| rules.set(k, v))?;
                Ok(FilterConfig::Rules(rules))
            }
            Yaml::Null => Ok(FilterConfig::All),
            _ => Err(anyhow!(
                "yaml value type for 'filter' should be 'string' or 'map'"
            )),
        }
    }

    pub fn build(&self) -> ArcMetricFilter {
        let FilterConfig::Rules(rules) = self else {
            return AllFilter::shared();
        };

        let mut filters: Vec<ArcMetricFilter> = Vec::new();
        if rules.include.is_some() || rules.exclude.is_some() {
            filters.push(Arc::new(RegexFilter::new(
                rules.include.clone(),
                rules.exclude.clone(),
            )));
        }
        if let Some(prefix) = &rules.prefix {
            filters.push(Arc::new(PrefixFilter::new(prefix)));
        }
        if !rules.tags.is_empty() {
            filters.push(Arc::new(TagFilter::new(rules.tags.clone())));
        }
        match filters.len() {
            0 => AllFilter::shared(),
            1 => filters.remove(0),
            _ => Arc::new(AndFilter::new(filters)),
        }
    }
}
