/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::Arc;

use log::{debug, warn};

use tally_types::{ArcClock, MetricSample, Tag, TagList};

use crate::filter::{AllFilter, ArcMetricFilter};
use crate::monitor::MetadataExtractor;
use crate::registry::MonitorRegistry;

pub const TAG_KEY_IDENTITY: &str = "id";

/// Turn the registered objects into metric samples.
pub struct Poller {
    registry: Arc<MonitorRegistry>,
    extractor: Arc<MetadataExtractor>,
    clock: ArcClock,
    filter: ArcMetricFilter,
    common_tags: TagList,
}

impl Poller {
    pub fn new(
        registry: Arc<MonitorRegistry>,
        extractor: Arc<MetadataExtractor>,
        clock: ArcClock,
    ) -> Self {
        Poller {
            registry,
            extractor,
            clock,
            filter: AllFilter::shared(),
            common_tags: TagList::EMPTY,
        }
    }

    pub fn with_filter(mut self, filter: ArcMetricFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Tags added to all samples, tags of the metric win on conflict.
    pub fn with_common_tags(mut self, tags: TagList) -> Self {
        self.common_tags = tags;
        self
    }

    /// Poll all registered objects once.
    ///
    /// Samples are ordered by registration, then by declaration order in
    /// each object. Objects that fail extraction are skipped.
    pub fn poll(&self) -> Vec<MetricSample> {
        let objects = self.registry.snapshot();
        let timestamp = self.clock.now_millis();
        let mut samples = Vec::new();

        for obj in objects.iter() {
            let descriptors = match self.extractor.extract(obj) {
                Ok(d) => d,
                Err(e) => {
                    warn!("skip instrumented object: {e}");
                    continue;
                }
            };

            for d in descriptors.iter() {
                let Some(value) = d.read() else {
                    debug!("object of metric {} dropped while polling", d.name());
                    continue;
                };
                // metric tags > identity > common tags
                let mut tags = self.common_tags.clone();
                if let Some(id) = d.identity() {
                    if let Ok(tag) = Tag::new(TAG_KEY_IDENTITY, id) {
                        tags = tags.with_tag(tag);
                    }
                }
                let tags = tags.union(d.tags());
                let sample =
                    MetricSample::new(d.shared_name().clone(), d.kind(), tags, timestamp, value);
                if self.filter.matches(&sample) {
                    samples.push(sample);
                }
            }
        }
        samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::Duration;

    use tally_types::{DataSourceKind, ManualClock, MetricValue};

    use crate::filter::PrefixFilter;
    use crate::monitor::{
        ArcInstrumented, BasicCounter, Instrumented, MemberSet, MonitorConfig, ValueAccessor,
    };

    struct Connection {
        id: String,
        bytes: AtomicU64,
    }

    impl Instrumented for Connection {
        fn declare(self: Arc<Self>, members: &mut MemberSet) {
            members.identity_field("id", ValueAccessor::bind(&self, |c| c.id.as_str().into()));
            members.field(
                MonitorConfig::counter("conn.bytes"),
                ValueAccessor::bind(&self, |c| c.bytes.load(Ordering::Relaxed).into()),
            );
        }
    }

    struct Broken;

    impl Instrumented for Broken {
        fn declare(self: Arc<Self>, members: &mut MemberSet) {
            members.identity_field("a", ValueAccessor::bind(&self, |_| 1u64.into()));
        }
    }

    struct Pool {
        name: String,
    }

    impl Instrumented for Pool {
        fn declare(self: Arc<Self>, members: &mut MemberSet) {
            members.identity_field("name", ValueAccessor::bind(&self, |p| p.name.as_str().into()));
            members.field(
                MonitorConfig::gauge("pool.size")
                    .with_tag(Tag::new(TAG_KEY_IDENTITY, "pool-main").unwrap()),
                ValueAccessor::bind(&self, |_| 4u64.into()),
            );
            members.field(
                MonitorConfig::gauge("pool.idle"),
                ValueAccessor::bind(&self, |_| 1u64.into()),
            );
        }
    }

    fn new_poller(registry: Arc<MonitorRegistry>, clock: Arc<ManualClock>) -> Poller {
        let extractor = Arc::new(MetadataExtractor::new(
            Duration::from_secs(60),
            clock.clone(),
        ));
        Poller::new(registry, extractor, clock)
    }

    #[test]
    fn poll() {
        let registry = Arc::new(MonitorRegistry::new());
        let clock = Arc::new(ManualClock::default());
        clock.set_millis(1000);

        let c1 = Arc::new(Connection {
            id: "c1".to_string(),
            bytes: AtomicU64::new(10),
        });
        let c2 = Arc::new(Connection {
            id: "c2".to_string(),
            bytes: AtomicU64::new(20),
        });
        registry.register(c1.clone());
        registry.register(c2.clone());
        registry.register(Arc::new(Broken));

        let poller = new_poller(registry, clock.clone()).with_common_tags(TagList::from_tags([
            Tag::new("host", "h1").unwrap(),
            Tag::new("id", "common").unwrap(),
        ]));

        let samples = poller.poll();
        assert_eq!(samples.len(), 2);
        // same name and kind from two objects, two samples
        assert_eq!(samples[0].name(), "conn.bytes");
        assert_eq!(samples[1].name(), "conn.bytes");
        assert_eq!(samples[0].kind(), DataSourceKind::Counter);
        assert_eq!(samples[0].tags().get("id"), Some("c1"));
        assert_eq!(samples[1].tags().get("id"), Some("c2"));
        assert_eq!(samples[0].tags().get("host"), Some("h1"));
        assert_eq!(samples[0].timestamp(), 1000);
        assert_eq!(samples[1].value(), &MetricValue::Unsigned(20));

        c1.bytes.store(15, Ordering::Relaxed);
        clock.set_millis(2000);
        let samples = poller.poll();
        assert_eq!(samples[0].value(), &MetricValue::Unsigned(15));
        assert_eq!(samples[0].timestamp(), 2000);
    }

    #[test]
    fn empty_registry() {
        let registry = Arc::new(MonitorRegistry::new());
        let clock = Arc::new(ManualClock::default());
        let poller = new_poller(registry, clock);
        assert!(poller.poll().is_empty());
    }

    #[test]
    fn filter() {
        let registry = Arc::new(MonitorRegistry::new());
        let clock = Arc::new(ManualClock::default());
        let a: ArcInstrumented = Arc::new(BasicCounter::new(MonitorConfig::counter("app.a")));
        let b: ArcInstrumented = Arc::new(BasicCounter::new(MonitorConfig::counter("sys.b")));
        registry.register(a);
        registry.register(b);

        let poller = new_poller(registry, clock).with_filter(Arc::new(PrefixFilter::new("app.")));
        let samples = poller.poll();
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].name(), "app.a");
    }

    #[test]
    fn metric_id_tag_wins() {
        let registry = Arc::new(MonitorRegistry::new());
        let clock = Arc::new(ManualClock::default());
        registry.register(Arc::new(Pool {
            name: "objname".to_string(),
        }));

        let poller = new_poller(registry, clock)
            .with_common_tags(TagList::from_tags([Tag::new("id", "common").unwrap()]));
        let samples = poller.poll();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].name(), "pool.size");
        assert_eq!(samples[0].tags().get("id"), Some("pool-main"));
        assert_eq!(samples[1].name(), "pool.idle");
        assert_eq!(samples[1].tags().get("id"), Some("objname"));
    }
}
