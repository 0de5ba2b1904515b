/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::{Arc, Weak};

use tally_types::{MetricValue, TagList};

/// Read the current value of one member of an instrumented object.
///
/// The accessor only holds a weak reference, `read` returns `None` once
/// the object is gone.
#[derive(Clone)]
pub struct ValueAccessor {
    read: Arc<dyn Fn() -> Option<MetricValue> + Send + Sync>,
}

impl ValueAccessor {
    pub fn bind<T, F>(obj: &Arc<T>, f: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&T) -> MetricValue + Send + Sync + 'static,
    {
        let weak: Weak<T> = Arc::downgrade(obj);
        ValueAccessor {
            read: Arc::new(move || weak.upgrade().map(|o| f(&o))),
        }
    }

    #[inline]
    pub fn read(&self) -> Option<MetricValue> {
        (self.read)()
    }
}

/// Read an object level tag list.
#[derive(Clone)]
pub struct TagsAccessor {
    read: Arc<dyn Fn() -> Option<TagList> + Send + Sync>,
}

impl TagsAccessor {
    pub fn bind<T, F>(obj: &Arc<T>, f: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&T) -> TagList + Send + Sync + 'static,
    {
        let weak: Weak<T> = Arc::downgrade(obj);
        TagsAccessor {
            read: Arc::new(move || weak.upgrade().map(|o| f(&o))),
        }
    }

    #[inline]
    pub fn read(&self) -> Option<TagList> {
        (self.read)()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    #[test]
    fn weak_read() {
        let v = Arc::new(AtomicU64::new(3));
        let accessor = ValueAccessor::bind(&v, |v| v.load(Ordering::Relaxed).into());
        assert_eq!(accessor.read(), Some(MetricValue::Unsigned(3)));
        v.store(4, Ordering::Relaxed);
        assert_eq!(accessor.read(), Some(MetricValue::Unsigned(4)));
        drop(v);
        assert_eq!(accessor.read(), None);
    }
}
