/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

mod decay;
pub use decay::{DecayWindow, DecayWindowError, WindowAverage};

mod duration;
pub use duration::{format_compact, format_human};

/// Percent of `used` over `total`, 0 if `total` is 0.
///
/// The result is not clamped, clock skew between the two readings may
/// give values above 100.
pub fn to_percent(used: f64, total: f64) -> f64 {
    if total == 0.0 {
        0.0
    } else {
        100.0 * used / total
    }
}
