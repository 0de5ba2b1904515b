/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::monitor::{ArcInstrumented, object_addr};

/// Set of registered instrumented objects.
///
/// Objects are compared by address. Updates swap in a new list, so a
/// snapshot is never seen half updated.
pub struct MonitorRegistry {
    objects: ArcSwap<Vec<ArcInstrumented>>,
}

impl Default for MonitorRegistry {
    fn default() -> Self {
        MonitorRegistry {
            objects: ArcSwap::from_pointee(Vec::new()),
        }
    }
}

impl MonitorRegistry {
    pub fn new() -> Self {
        MonitorRegistry::default()
    }

    /// Returns false if the object was already registered.
    pub fn register(&self, obj: ArcInstrumented) -> bool {
        let addr = object_addr(&obj);
        let mut added = false;
        self.objects.rcu(|old| {
            if old.iter().any(|o| object_addr(o) == addr) {
                added = false;
                Arc::clone(old)
            } else {
                added = true;
                let mut new = Vec::with_capacity(old.len() + 1);
                new.extend(old.iter().cloned());
                new.push(obj.clone());
                Arc::new(new)
            }
        });
        added
    }

    /// Returns false if the object was not registered.
    pub fn unregister(&self, obj: &ArcInstrumented) -> bool {
        let addr = object_addr(obj);
        let mut removed = false;
        self.objects.rcu(|old| {
            if old.iter().any(|o| object_addr(o) == addr) {
                removed = true;
                let new: Vec<ArcInstrumented> = old
                    .iter()
                    .filter(|o| object_addr(o) != addr)
                    .cloned()
                    .collect();
                Arc::new(new)
            } else {
                removed = false;
                Arc::clone(old)
            }
        });
        removed
    }

    pub fn contains(&self, obj: &ArcInstrumented) -> bool {
        let addr = object_addr(obj);
        self.objects.load().iter().any(|o| object_addr(o) == addr)
    }

    /// Point in time copy of the registered objects, in registration order.
    pub fn snapshot(&self) -> Arc<Vec<ArcInstrumented>> {
        self.objects.load_full()
    }

    pub fn len(&self) -> usize {
        self.objects.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.load().is_empty()
    }

    pub fn clear(&self) {
        self.objects.store(Arc::new(Vec::new()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::monitor::{BasicCounter, MonitorConfig};

    fn counter(name: &str) -> ArcInstrumented {
        Arc::new(BasicCounter::new(MonitorConfig::counter(name)))
    }

    #[test]
    fn dedup() {
        let registry = MonitorRegistry::new();
        let a = counter("a");
        assert!(registry.register(a.clone()));
        assert!(!registry.register(a.clone()));
        assert_eq!(registry.len(), 1);

        // same config, different object
        assert!(registry.register(counter("a")));
        assert_eq!(registry.len(), 2);
        assert!(registry.contains(&a));
    }

    #[test]
    fn unregister() {
        let registry = MonitorRegistry::new();
        let a = counter("a");
        let b = counter("b");
        registry.register(a.clone());
        registry.register(b.clone());

        assert!(registry.unregister(&a));
        assert!(!registry.unregister(&a));
        assert!(!registry.contains(&a));
        assert_eq!(registry.len(), 1);

        registry.clear();
        assert!(registry.is_empty());
    }

    #[test]
    fn snapshot_is_stable() {
        let registry = MonitorRegistry::new();
        let a = counter("a");
        registry.register(a.clone());
        let snapshot = registry.snapshot();

        registry.register(counter("b"));
        registry.unregister(&a);
        assert_eq!(snapshot.len(), 1);
        assert_eq!(object_addr(&snapshot[0]), object_addr(&a));
        assert_eq!(registry.len(), 1);
    }
}
