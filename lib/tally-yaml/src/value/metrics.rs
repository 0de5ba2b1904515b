/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::str::FromStr;

use anyhow::{Context, anyhow};
use yaml_rust::Yaml;

use tally_types::{Tag, TagList};

pub fn as_metric_name(v: &Yaml) -> anyhow::Result<String> {
    if let Yaml::String(s) = v {
        if s.is_empty() {
            return Err(anyhow!("empty metric name"));
        }
        if s.chars().any(|c| c.is_whitespace() || c == ':' || c == '|') {
            return Err(anyhow!("invalid char found in metric name {s}"));
        }
        Ok(s.to_string())
    } else {
        Err(anyhow!("yaml value type for 'metric name' should be 'string'"))
    }
}

/// Accepts a map of tags, or a list of 'key=value' strings.
pub fn as_tag_list(v: &Yaml) -> anyhow::Result<TagList> {
    match v {
        Yaml::Hash(map) => {
            let mut tags = Vec::with_capacity(map.len());
            crate::foreach_kv(map, |k, v| {
                let value = crate::value::as_string(v).context("invalid tag value")?;
                let tag = Tag::new(k, value).map_err(|e| anyhow!("invalid tag: {e}"))?;
                tags.push(tag);
                Ok(())
            })?;
            Ok(TagList::from_tags(tags))
        }
        Yaml::Array(seq) => {
            let mut tags = Vec::with_capacity(seq.len());
            for (i, v) in seq.iter().enumerate() {
                let Yaml::String(s) = v else {
                    return Err(anyhow!("tag #{i} should be a 'key=value' string"));
                };
                let tag = Tag::from_str(s).map_err(|e| anyhow!("invalid tag #{i}: {e}"))?;
                tags.push(tag);
            }
            Ok(TagList::from_tags(tags))
        }
        _ => Err(anyhow!(
            "yaml value type for 'tag list' should be 'map' or 'array'"
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn t_tag_list() {
        let v = yaml_doc!("app: web\nshard: 3");
        let tags = as_tag_list(&v).unwrap();
        assert_eq!(tags.len(), 2);
        assert_eq!(tags.get("app"), Some("web"));
        assert_eq!(tags.get("shard"), Some("3"));

        let v = yaml_doc!("['app=web', 'expr=a=b']");
        let tags = as_tag_list(&v).unwrap();
        assert_eq!(tags.get("expr"), Some("a=b"));

        let v = yaml_doc!("['novalue']");
        assert!(as_tag_list(&v).is_err());

        assert!(as_tag_list(&yaml_str!("app=web")).is_err());
    }

    #[test]
    fn t_metric_name() {
        assert_eq!(as_metric_name(&yaml_str!("app.req")).unwrap(), "app.req");
        assert!(as_metric_name(&yaml_str!("a b")).is_err());
        assert!(as_metric_name(&yaml_str!("")).is_err());
        assert!(as_metric_name(&Yaml::Integer(1)).is_err());
    }
}
