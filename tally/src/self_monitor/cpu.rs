/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tally_stats::{DecayWindow, DecayWindowError};
use tally_types::{ArcClock, MetricValue};

use crate::monitor::{Instrumented, MemberSet, MonitorConfig, ValueAccessor, window_label};

const NANOS_PER_SECOND: f64 = 1_000_000_000.0;

type CpuTimeSource = Box<dyn Fn() -> u64 + Send + Sync>;

/// CPU time used by this process, in nanoseconds.
pub fn process_cpu_time() -> u64 {
    let mut ts = libc::timespec {
        tv_sec: 0,
        tv_nsec: 0,
    };
    let r = unsafe { libc::clock_gettime(libc::CLOCK_PROCESS_CPUTIME_ID, &mut ts) };
    if r != 0 {
        return 0;
    }
    (ts.tv_sec as u64)
        .saturating_mul(1_000_000_000)
        .saturating_add(ts.tv_nsec as u64)
}

/// Process CPU usage in percent of all available CPUs, averaged over
/// decay windows like a load average.
pub struct CpuUsageMonitor {
    window: DecayWindow,
    clock: ArcClock,
    start: Duration,
    cpu_count: usize,
    cpu_time: CpuTimeSource,
}

impl CpuUsageMonitor {
    pub fn new(
        windows: &[Duration],
        sample_interval: Duration,
        clock: ArcClock,
    ) -> Result<Self, DecayWindowError> {
        let cpu_count = thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        CpuUsageMonitor::with_source(
            windows,
            sample_interval,
            clock,
            cpu_count,
            Box::new(process_cpu_time),
        )
    }

    fn with_source(
        windows: &[Duration],
        sample_interval: Duration,
        clock: ArcClock,
        cpu_count: usize,
        cpu_time: CpuTimeSource,
    ) -> Result<Self, DecayWindowError> {
        let window = DecayWindow::new(windows, sample_interval)?;
        let start = clock.now();
        let monitor = CpuUsageMonitor {
            window,
            clock,
            start,
            cpu_count,
            cpu_time,
        };
        monitor.refresh();
        Ok(monitor)
    }

    fn refresh(&self) {
        self.window.update(self.clock.now(), (self.cpu_time)());
    }

    fn rate_to_percent(&self, rate: f64) -> f64 {
        tally_stats::to_percent(rate, NANOS_PER_SECOND * self.cpu_count as f64)
    }

    pub fn current_usage(&self) -> f64 {
        self.refresh();
        self.rate_to_percent(self.window.current_rate())
    }

    pub fn window_usage(&self, index: usize) -> Option<f64> {
        self.refresh();
        self.window
            .windows()
            .get(index)
            .map(|w| self.rate_to_percent(w.get()))
    }

    pub fn uptime(&self) -> Duration {
        self.clock.now().saturating_sub(self.start)
    }

    fn uptime_nanos(&self) -> u64 {
        u64::try_from(self.uptime().as_nanos()).unwrap_or(u64::MAX)
    }

    pub fn uptime_human(&self) -> String {
        tally_stats::format_human(self.uptime_nanos())
    }
}

impl Instrumented for CpuUsageMonitor {
    fn declare(self: Arc<Self>, members: &mut MemberSet) {
        members.field(
            MonitorConfig::gauge("cpu.usage.current")
                .with_description("process cpu usage in percent since last sample"),
            ValueAccessor::bind(&self, |m| m.current_usage().into()),
        );
        for (i, w) in self.window.windows().iter().enumerate() {
            let name = format!("cpu.usage.{}", window_label(w.length()));
            members.field(
                MonitorConfig::gauge(&name),
                ValueAccessor::bind(&self, move |m| m.window_usage(i).unwrap_or_default().into()),
            );
        }
        members.field(
            MonitorConfig::informational("process.uptime"),
            ValueAccessor::bind(&self, |m| {
                MetricValue::from(tally_stats::format_compact(m.uptime_nanos()))
            }),
        );
    }
}
