/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

mod cpu;
pub use cpu::{CpuUsageMonitor, process_cpu_time};
