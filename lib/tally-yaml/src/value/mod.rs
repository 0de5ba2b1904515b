/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

mod primary;
pub use primary::{as_bool, as_nonzero_usize, as_string, as_usize};

mod metrics;
pub use metrics::{as_metric_name, as_tag_list};
