/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::Arc;

use tally_types::{DataSourceKind, Tag, TagList};

/// Static description of one exported metric.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MonitorConfig {
    name: Arc<str>,
    kind: DataSourceKind,
    description: Option<Arc<str>>,
    tags: TagList,
}

impl MonitorConfig {
    pub fn new(name: &str, kind: DataSourceKind) -> Self {
        MonitorConfig {
            name: Arc::from(name),
            kind,
            description: None,
            tags: TagList::EMPTY,
        }
    }

    pub fn counter(name: &str) -> Self {
        MonitorConfig::new(name, DataSourceKind::Counter)
    }

    pub fn gauge(name: &str) -> Self {
        MonitorConfig::new(name, DataSourceKind::Gauge)
    }

    pub fn informational(name: &str) -> Self {
        MonitorConfig::new(name, DataSourceKind::Informational)
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(Arc::from(description));
        self
    }

    pub fn with_tag(mut self, tag: Tag) -> Self {
        self.tags = self.tags.with_tag(tag);
        self
    }

    pub fn with_tags(mut self, tags: &TagList) -> Self {
        self.tags = self.tags.union(tags);
        self
    }

    /// Same config with a different name, used by multi metric monitors.
    pub fn rename(&self, name: &str) -> Self {
        MonitorConfig {
            name: Arc::from(name),
            ..self.clone()
        }
    }

    pub fn with_kind(mut self, kind: DataSourceKind) -> Self {
        self.kind = kind;
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub(crate) fn shared_name(&self) -> &Arc<str> {
        &self.name
    }

    #[inline]
    pub fn kind(&self) -> DataSourceKind {
        self.kind
    }

    #[inline]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[inline]
    pub fn tags(&self) -> &TagList {
        &self.tags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build() {
        let c = MonitorConfig::gauge("queue.size")
            .with_description("pending jobs")
            .with_tag(Tag::new("queue", "a").unwrap())
            .with_tag(Tag::new("queue", "b").unwrap());
        assert_eq!(c.name(), "queue.size");
        assert_eq!(c.kind(), DataSourceKind::Gauge);
        assert_eq!(c.description(), Some("pending jobs"));
        assert_eq!(c.tags().len(), 1);
        assert_eq!(c.tags().get("queue"), Some("b"));

        let r = c.rename("queue.max");
        assert_eq!(r.name(), "queue.max");
        assert_eq!(r.tags(), c.tags());
    }
}
