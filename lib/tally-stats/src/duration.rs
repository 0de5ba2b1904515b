/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::fmt::Write;

const NANOS_PER_SECOND: u64 = 1_000_000_000;
const NANOS_PER_MINUTE: u64 = 60 * NANOS_PER_SECOND;
const NANOS_PER_HOUR: u64 = 60 * NANOS_PER_MINUTE;
const NANOS_PER_DAY: u64 = 24 * NANOS_PER_HOUR;
const NANOS_PER_WEEK: u64 = 7 * NANOS_PER_DAY;

struct Split {
    weeks: u64,
    days: u64,
    hours: u64,
    minutes: u64,
    seconds: u64,
}

impl Split {
    fn new(nanos: u64) -> Self {
        let weeks = nanos / NANOS_PER_WEEK;
        let left = nanos % NANOS_PER_WEEK;
        let days = left / NANOS_PER_DAY;
        let left = left % NANOS_PER_DAY;
        let hours = left / NANOS_PER_HOUR;
        let left = left % NANOS_PER_HOUR;
        let minutes = left / NANOS_PER_MINUTE;
        let left = left % NANOS_PER_MINUTE;
        Split {
            weeks,
            days,
            hours,
            minutes,
            seconds: left / NANOS_PER_SECOND,
        }
    }

    fn units(&self) -> [(u64, char, &'static str); 5] {
        [
            (self.weeks, 'W', "week"),
            (self.days, 'D', "day"),
            (self.hours, 'H', "hour"),
            (self.minutes, 'M', "minute"),
            (self.seconds, 'S', "second"),
        ]
    }
}

/// Compact ISO 8601 like form, such as `P6WT1H`.
///
/// Sub second parts are truncated and zero units are left out.
pub fn format_compact(nanos: u64) -> String {
    let split = Split::new(nanos);
    let mut s = String::with_capacity(16);
    s.push('P');
    let units = split.units();
    for (v, c, _) in &units[..2] {
        if *v > 0 {
            let _ = write!(s, "{v}{c}");
        }
    }
    let time_units = &units[2..];
    if time_units.iter().any(|(v, _, _)| *v > 0) {
        s.push('T');
        for (v, c, _) in time_units {
            if *v > 0 {
                let _ = write!(s, "{v}{c}");
            }
        }
    }
    if s.len() == 1 {
        s.push_str("T0S");
    }
    s
}

/// Human readable form, such as `6 weeks, 1 hour`.
pub fn format_human(nanos: u64) -> String {
    let split = Split::new(nanos);
    let mut s = String::with_capacity(32);
    for (v, _, name) in split.units() {
        if v == 0 {
            continue;
        }
        if !s.is_empty() {
            s.push_str(", ");
        }
        let _ = write!(s, "{v} {name}");
        if v > 1 {
            s.push('s');
        }
    }
    if s.is_empty() {
        s.push_str("0 seconds");
    }
    s
}
