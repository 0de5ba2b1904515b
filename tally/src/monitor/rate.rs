/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tally_stats::{DecayWindow, DecayWindowError};
use tally_types::{ArcClock, DataSourceKind};

use super::{Instrumented, MemberSet, MonitorConfig, ValueAccessor};

/// Short label of a window length, such as `1m` or `90s`.
pub(crate) fn window_label(length: Duration) -> String {
    let secs = length.as_secs();
    if secs >= 3600 && secs % 3600 == 0 {
        format!("{}h", secs / 3600)
    } else if secs >= 60 && secs % 60 == 0 {
        format!("{}m", secs / 60)
    } else {
        format!("{secs}s")
    }
}

/// A counter that also exports its per second rate, both the latest
/// one and the decayed averages over each window.
///
/// The rate is refreshed when it is read, at most once per sample
/// interval.
pub struct DecayRateCounter {
    config: MonitorConfig,
    count: AtomicU64,
    window: DecayWindow,
    clock: ArcClock,
}

impl DecayRateCounter {
    pub fn new(
        config: MonitorConfig,
        windows: &[Duration],
        sample_interval: Duration,
        clock: ArcClock,
    ) -> Result<Self, DecayWindowError> {
        let window = DecayWindow::new(windows, sample_interval)?;
        let counter = DecayRateCounter {
            config: config.with_kind(DataSourceKind::Counter),
            count: AtomicU64::new(0),
            window,
            clock,
        };
        counter.refresh();
        Ok(counter)
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

    fn refresh(&self) {
        self.window.update(self.clock.now(), self.get());
    }

    pub fn current_rate(&self) -> f64 {
        self.refresh();
        self.window.current_rate()
    }

    pub fn window_rate(&self, index: usize) -> Option<f64> {
        self.refresh();
        self.window.windows().get(index).map(|w| w.get())
    }
}

impl Instrumented for DecayRateCounter {
    fn declare(self: Arc<Self>, members: &mut MemberSet) {
        let name = self.config.name();
        members.field(
            self.config.clone(),
            ValueAccessor::bind(&self, |c| c.get().into()),
        );

        let rate_config = self
            .config
            .rename(&format!("{name}.rate"))
            .with_kind(DataSourceKind::Gauge);
        members.field(
            rate_config.clone(),
            ValueAccessor::bind(&self, |c| c.current_rate().into()),
        );
        for (i, w) in self.window.windows().iter().enumerate() {
            let label = window_label(w.length());
            members.field(
                rate_config.rename(&format!("{name}.rate.{label}")),
                ValueAccessor::bind(&self, move |c| c.window_rate(i).unwrap_or_default().into()),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tally_types::{ManualClock, MetricValue};

    use crate::monitor::{ArcInstrumented, extract};

    #[test]
    fn label() {
        assert_eq!(window_label(Duration::from_secs(60)), "1m");
        assert_eq!(window_label(Duration::from_secs(900)), "15m");
        assert_eq!(window_label(Duration::from_secs(90)), "90s");
        assert_eq!(window_label(Duration::from_secs(7200)), "2h");
    }

    #[test]
    fn rates() {
        let clock = Arc::new(ManualClock::default());
        let counter = Arc::new(
            DecayRateCounter::new(
                MonitorConfig::counter("requests"),
                &[Duration::from_secs(60), Duration::from_secs(300)],
                Duration::from_secs(1),
                clock.clone(),
            )
            .unwrap(),
        );
        let obj: ArcInstrumented = counter.clone();
        let d = extract(&obj).unwrap();
        let names: Vec<&str> = d.iter().map(|d| d.name()).collect();
        assert_eq!(
            names,
            ["requests", "requests.rate", "requests.rate.1m", "requests.rate.5m"]
        );
        assert_eq!(d[1].kind(), DataSourceKind::Gauge);

        counter.add(500);
        clock.set(Duration::from_secs(10));
        assert_eq!(d[0].read(), Some(MetricValue::Unsigned(500)));
        assert_eq!(d[1].read(), Some(MetricValue::Double(50.0)));
        // the first rate seeds all windows
        assert_eq!(d[2].read(), Some(MetricValue::Double(50.0)));
        assert_eq!(d[3].read(), Some(MetricValue::Double(50.0)));
    }
}
