/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

mod expiring;
pub use expiring::ExpiringCache;

mod sweep;
pub use sweep::SweepHandle;
