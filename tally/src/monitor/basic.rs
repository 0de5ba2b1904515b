/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use portable_atomic::AtomicF64;

use tally_types::DataSourceKind;

use super::{Instrumented, MemberSet, MonitorConfig, ValueAccessor};

pub struct BasicCounter {
    config: MonitorConfig,
    count: AtomicU64,
}

impl BasicCounter {
    pub fn new(config: MonitorConfig) -> Self {
        BasicCounter {
            config: config.with_kind(DataSourceKind::Counter),
            count: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn increment(&self) {
        self.add(1);
    }

    #[inline]
    pub fn add(&self, n: u64) {
        self.count.fetch_add(n, Ordering::Relaxed);
    }

    #[inline]
    pub fn get(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }
}

impl Instrumented for BasicCounter {
    fn declare(self: Arc<Self>, members: &mut MemberSet) {
        members.field(
            self.config.clone(),
            ValueAccessor::bind(&self, |c| c.get().into()),
        );
    }
}

pub struct BasicGauge {
    config: MonitorConfig,
    value: AtomicF64,
}

impl BasicGauge {
    pub fn new(config: MonitorConfig) -> Self {
        BasicGauge {
            config: config.with_kind(DataSourceKind::Gauge),
            value: AtomicF64::new(0.0),
        }
    }

    #[inline]
    pub fn set(&self, v: f64) {
        self.value.store(v, Ordering::Relaxed);
    }

    #[inline]
    pub fn get(&self) -> f64 {
        self.value.load(Ordering::Relaxed)
    }
}

impl Instrumented for BasicGauge {
    fn declare(self: Arc<Self>, members: &mut MemberSet) {
        members.field(
            self.config.clone(),
            ValueAccessor::bind(&self, |g| g.get().into()),
        );
    }
}

pub struct BasicInformational {
    config: MonitorConfig,
    value: Mutex<Arc<str>>,
}

impl BasicInformational {
    pub fn new(config: MonitorConfig) -> Self {
        BasicInformational {
            config: config.with_kind(DataSourceKind::Informational),
            value: Mutex::new(Arc::from("")),
        }
    }

    pub fn set(&self, v: &str) {
        *self.value.lock().unwrap() = Arc::from(v);
    }

    pub fn get(&self) -> Arc<str> {
        self.value.lock().unwrap().clone()
    }
}

impl Instrumented for BasicInformational {
    fn declare(self: Arc<Self>, members: &mut MemberSet) {
        members.field(
            self.config.clone(),
            ValueAccessor::bind(&self, |i| tally_types::MetricValue::Text(i.get())),
        );
    }
}
