/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

mod tag;
pub use tag::{Tag, TagList, TagParseError};

mod value;
pub use value::{CoercionError, MetricValue};

mod kind;
pub use kind::DataSourceKind;

mod sample;
pub use sample::MetricSample;

mod clock;
pub use clock::{ArcClock, Clock, ManualClock, SystemClock};
