/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::monitor::{Instrumented, MemberSet, MonitorConfig, ValueAccessor};

#[derive(Default, Debug, Eq, PartialEq)]
pub struct LogSnapshot {
    pub total: u64,
    pub passed: u64,
    pub size: u64,
    pub format_failed: u64,
    pub channel_closed: u64,
    pub channel_overflow: u64,
    pub io_failed: u64,
}

impl LogSnapshot {
    pub fn dropped(&self) -> u64 {
        self.format_failed + self.channel_closed + self.channel_overflow + self.io_failed
    }
}

#[derive(Default)]
pub struct LogStats {
    total: AtomicU64,
    passed: AtomicU64,
    size: AtomicU64,
    format_failed: AtomicU64,
    channel_closed: AtomicU64,
    channel_overflow: AtomicU64,
    io_failed: AtomicU64,
}

macro_rules! impl_add {
    ($($f:ident => $field:ident),+ $(,)?) => {
        $(
            pub(super) fn $f(&self) {
                self.$field.fetch_add(1, Ordering::Relaxed);
            }
        )+
    };
}

impl LogStats {
    impl_add! {
        add_total => total,
        add_passed => passed,
        add_format_failed => format_failed,
        add_channel_closed => channel_closed,
        add_channel_overflow => channel_overflow,
        add_io_failed => io_failed,
    }

    pub(super) fn add_size(&self, size: usize) {
        self.size.fetch_add(size as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> LogSnapshot {
        LogSnapshot {
            total: self.total.load(Ordering::Relaxed),
            passed: self.passed.load(Ordering::Relaxed),
            size: self.size.load(Ordering::Relaxed),
            format_failed: self.format_failed.load(Ordering::Relaxed),
            channel_closed: self.channel_closed.load(Ordering::Relaxed),
            channel_overflow: self.channel_overflow.load(Ordering::Relaxed),
            io_failed: self.io_failed.load(Ordering::Relaxed),
        }
    }
}

impl Instrumented for LogStats {
    fn declare(self: Arc<Self>, members: &mut MemberSet) {
        members.field(
            MonitorConfig::counter("tally.log.lines.total")
                .with_description("log lines received by the async drain"),
            ValueAccessor::bind(&self, |s| s.total.load(Ordering::Relaxed).into()),
        );
        members.field(
            MonitorConfig::counter("tally.log.lines.passed"),
            ValueAccessor::bind(&self, |s| s.passed.load(Ordering::Relaxed).into()),
        );
        members.field(
            MonitorConfig::counter("tally.log.lines.dropped"),
            ValueAccessor::bind(&self, |s| s.snapshot().dropped().into()),
        );
        members.field(
            MonitorConfig::counter("tally.log.bytes"),
            ValueAccessor::bind(&self, |s| s.size.load(Ordering::Relaxed).into()),
        );
    }
}
