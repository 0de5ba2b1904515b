/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::Mutex;
use std::sync::atomic::Ordering;
use std::time::Duration;

use portable_atomic::AtomicF64;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecayWindowError {
    #[error("no window length set")]
    NoWindow,
    #[error("zero window length")]
    ZeroWindow,
}

pub struct WindowAverage {
    length: Duration,
    value: AtomicF64,
}

impl WindowAverage {
    fn new(length: Duration) -> Self {
        WindowAverage {
            length,
            value: AtomicF64::new(0.0),
        }
    }

    #[inline]
    pub fn length(&self) -> Duration {
        self.length
    }

    #[inline]
    pub fn get(&self) -> f64 {
        self.value.load(Ordering::Relaxed)
    }

    fn decay_to(&self, rate: f64, elapsed: f64) {
        let avg = self.get();
        let alpha = 1.0 - (-elapsed / self.length.as_secs_f64()).exp();
        self.value.store(avg + (rate - avg) * alpha, Ordering::Relaxed);
    }
}

#[derive(Default)]
struct TickState {
    last: Option<(Duration, u64)>,
    seeded: bool,
}

/// Exponentially decayed moving averages over a counter's rate, in the
/// same way as the system load average.
///
/// Ticks are serialized, readers only see each window value atomically
/// and may observe a mix of old and new values across windows.
pub struct DecayWindow {
    sample_interval: Duration,
    current: AtomicF64,
    windows: Vec<WindowAverage>,
    state: Mutex<TickState>,
}

impl DecayWindow {
    pub fn new(windows: &[Duration], sample_interval: Duration) -> Result<Self, DecayWindowError> {
        if windows.is_empty() {
            return Err(DecayWindowError::NoWindow);
        }
        if windows.iter().any(|d| d.is_zero()) {
            return Err(DecayWindowError::ZeroWindow);
        }
        Ok(DecayWindow {
            sample_interval,
            current: AtomicF64::new(0.0),
            windows: windows.iter().map(|d| WindowAverage::new(*d)).collect(),
            state: Mutex::new(TickState::default()),
        })
    }

    /// 1, 5 and 15 minute windows
    pub fn load_average(sample_interval: Duration) -> Self {
        DecayWindow {
            sample_interval,
            current: AtomicF64::new(0.0),
            windows: [60, 300, 900]
                .into_iter()
                .map(|s| WindowAverage::new(Duration::from_secs(s)))
                .collect(),
            state: Mutex::new(TickState::default()),
        }
    }

    #[inline]
    pub fn sample_interval(&self) -> Duration {
        self.sample_interval
    }

    /// Latest instantaneous rate, in counter units per second
    #[inline]
    pub fn current_rate(&self) -> f64 {
        self.current.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn windows(&self) -> &[WindowAverage] {
        &self.windows
    }

    /// Feed the latest raw counter value read at time `now`.
    ///
    /// The first call only records the baseline. Calls that come sooner
    /// than the sample interval after the previous accepted tick are
    /// ignored. Returns true if the averages were updated.
    pub fn update(&self, now: Duration, value: u64) -> bool {
        let mut state = self.state.lock().unwrap();
        let Some((last_time, last_value)) = state.last else {
            state.last = Some((now, value));
            return false;
        };

        let Some(elapsed) = now.checked_sub(last_time) else {
            // clock moved backwards, restart from here
            state.last = Some((now, value));
            return false;
        };
        if elapsed.is_zero() || elapsed < self.sample_interval {
            return false;
        }

        let delta = value.saturating_sub(last_value);
        let elapsed = elapsed.as_secs_f64();
        let rate = delta as f64 / elapsed;
        self.current.store(rate, Ordering::Relaxed);

        if state.seeded {
            for w in &self.windows {
                w.decay_to(rate, elapsed);
            }
        } else {
            for w in &self.windows {
                w.value.store(rate, Ordering::Relaxed);
            }
            state.seeded = true;
        }
        state.last = Some((now, value));
        true
    }
}
