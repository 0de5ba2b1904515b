/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::fmt;
use std::sync::Arc;

use tally_types::{DataSourceKind, MetricValue, TagList};

use super::{MonitorConfig, ValueAccessor};

#[derive(Clone)]
pub struct MonitorDescriptor {
    config: MonitorConfig,
    tags: TagList,
    identity: Option<Arc<str>>,
    accessor: ValueAccessor,
}

impl MonitorDescriptor {
    pub(super) fn new(
        config: MonitorConfig,
        tags: TagList,
        identity: Option<Arc<str>>,
        accessor: ValueAccessor,
    ) -> Self {
        MonitorDescriptor {
            config,
            tags,
            identity,
            accessor,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        self.config.name()
    }

    #[inline]
    pub(crate) fn shared_name(&self) -> &Arc<str> {
        self.config.shared_name()
    }

    #[inline]
    pub fn kind(&self) -> DataSourceKind {
        self.config.kind()
    }

    #[inline]
    pub fn description(&self) -> Option<&str> {
        self.config.description()
    }

    /// Object tags merged with the metric tags
    #[inline]
    pub fn tags(&self) -> &TagList {
        &self.tags
    }

    #[inline]
    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    /// Read the current value, `None` if the object has been dropped.
    #[inline]
    pub fn read(&self) -> Option<MetricValue> {
        self.accessor.read()
    }
}

impl fmt::Debug for MonitorDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MonitorDescriptor")
            .field("name", &self.name())
            .field("kind", &self.kind())
            .field("tags", &self.tags)
            .field("identity", &self.identity)
            .finish()
    }
}
