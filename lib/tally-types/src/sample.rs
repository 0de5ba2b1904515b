/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::fmt;
use std::sync::Arc;

use crate::{DataSourceKind, MetricValue, TagList};

/// One observed value of one monitor, taken during a single poll.
#[derive(Clone, Debug, PartialEq)]
pub struct MetricSample {
    name: Arc<str>,
    kind: DataSourceKind,
    tags: TagList,
    timestamp: u64,
    value: MetricValue,
}

impl MetricSample {
    pub fn new(
        name: Arc<str>,
        kind: DataSourceKind,
        tags: TagList,
        timestamp: u64,
        value: MetricValue,
    ) -> Self {
        MetricSample {
            name,
            kind,
            tags,
            timestamp,
            value,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn kind(&self) -> DataSourceKind {
        self.kind
    }

    #[inline]
    pub fn tags(&self) -> &TagList {
        &self.tags
    }

    /// Unix epoch milliseconds
    #[inline]
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    #[inline]
    pub fn value(&self) -> &MetricValue {
        &self.value
    }
}

impl fmt::Display for MetricSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.timestamp, self.name, self.value, self.tags
        )
    }
}
