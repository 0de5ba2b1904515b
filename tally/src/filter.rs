/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::Arc;

use regex::Regex;

use tally_types::{MetricSample, TagList};

/// Decide whether a sample goes into the current publish round.
pub trait MetricFilter: Send + Sync {
    fn matches(&self, sample: &MetricSample) -> bool;
}

pub type ArcMetricFilter = Arc<dyn MetricFilter>;

pub struct AllFilter;

impl AllFilter {
    pub fn shared() -> ArcMetricFilter {
        Arc::new(AllFilter)
    }
}

impl MetricFilter for AllFilter {
    fn matches(&self, _sample: &MetricSample) -> bool {
        true
    }
}

/// Match on the metric name.
///
/// A name passes if it matches `include` (when set) and does not match
/// `exclude` (when set).
pub struct RegexFilter {
    include: Option<Regex>,
    exclude: Option<Regex>,
}

impl RegexFilter {
    pub fn new(include: Option<Regex>, exclude: Option<Regex>) -> Self {
        RegexFilter { include, exclude }
    }

    pub fn include(regex: Regex) -> Self {
        RegexFilter::new(Some(regex), None)
    }
}

impl MetricFilter for RegexFilter {
    fn matches(&self, sample: &MetricSample) -> bool {
        let name = sample.name();
        if let Some(include) = &self.include {
            if !include.is_match(name) {
                return false;
            }
        }
        if let Some(exclude) = &self.exclude {
            if exclude.is_match(name) {
                return false;
            }
        }
        true
    }
}

pub struct PrefixFilter {
    prefix: String,
}

impl PrefixFilter {
    pub fn new(prefix: &str) -> Self {
        PrefixFilter {
            prefix: prefix.to_string(),
        }
    }
}

impl MetricFilter for PrefixFilter {
    fn matches(&self, sample: &MetricSample) -> bool {
        sample.name().starts_with(&self.prefix)
    }
}

/// All given tags should be present on the sample with the same value.
pub struct TagFilter {
    tags: TagList,
}

impl TagFilter {
    pub fn new(tags: TagList) -> Self {
        TagFilter { tags }
    }
}

impl MetricFilter for TagFilter {
    fn matches(&self, sample: &MetricSample) -> bool {
        let sample_tags = sample.tags();
        self.tags
            .iter()
            .all(|t| sample_tags.get(t.key()) == Some(t.value()))
    }
}

pub struct AndFilter {
    filters: Vec<ArcMetricFilter>,
}

impl AndFilter {
    pub fn new(filters: Vec<ArcMetricFilter>) -> Self {
        AndFilter { filters }
    }
}

impl MetricFilter for AndFilter {
    fn matches(&self, sample: &MetricSample) -> bool {
        self.filters.iter().all(|f| f.matches(sample))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    use tally_types::{DataSourceKind, MetricValue, Tag};

    fn sample(name: &str, tags: &[&str]) -> MetricSample {
        let tags = tags.iter().map(|s| Tag::from_str(s).unwrap()).collect();
        MetricSample::new(
            Arc::from(name),
            DataSourceKind::Gauge,
            tags,
            0,
            MetricValue::Unsigned(1),
        )
    }

    #[test]
    fn all() {
        assert!(AllFilter.matches(&sample("a", &[])));
    }

    #[test]
    fn regex() {
        let f = RegexFilter::new(
            Some(Regex::new("^server\\.").unwrap()),
            Some(Regex::new("\\.debug$").unwrap()),
        );
        assert!(f.matches(&sample("server.requests", &[])));
        assert!(!f.matches(&sample("server.requests.debug", &[])));
        assert!(!f.matches(&sample("client.requests", &[])));

        let f = RegexFilter::new(None, Some(Regex::new("jvm").unwrap()));
        assert!(f.matches(&sample("cpu", &[])));
        assert!(!f.matches(&sample("jvm.gc", &[])));
    }

    #[test]
    fn prefix() {
        let f = PrefixFilter::new("cpu.");
        assert!(f.matches(&sample("cpu.usage", &[])));
        assert!(!f.matches(&sample("cpuusage", &[])));
    }

    #[test]
    fn tags() {
        let f = TagFilter::new(TagList::from_tags([Tag::new("env", "prod").unwrap()]));
        assert!(f.matches(&sample("a", &["env=prod", "id=x"])));
        assert!(!f.matches(&sample("a", &["env=dev"])));
        assert!(!f.matches(&sample("a", &[])));
    }

    #[test]
    fn and() {
        let f = AndFilter::new(vec![
            Arc::new(PrefixFilter::new("cpu")),
            Arc::new(TagFilter::new(TagList::from_tags([
                Tag::new("env", "prod").unwrap()
            ]))),
        ]);
        assert!(f.matches(&sample("cpu.usage", &["env=prod"])));
        assert!(!f.matches(&sample("cpu.usage", &["env=dev"])));
        assert!(!f.matches(&sample("mem", &["env=prod"])));
        assert!(AndFilter::new(Vec::new()).matches(&sample("x", &[])));
    }
}
