/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

mod config;
pub use config::MonitorConfig;

mod accessor;
pub use accessor::{TagsAccessor, ValueAccessor};

mod member;
pub(crate) use member::object_addr;
pub use member::{ArcInstrumented, Instrumented, MemberSet};

mod descriptor;
pub use descriptor::MonitorDescriptor;

mod extract;
pub use extract::{ExtractError, MetadataExtractor, extract};

mod basic;
pub use basic::{BasicCounter, BasicGauge, BasicInformational};

mod rate;
pub(crate) use rate::window_label;
pub use rate::DecayRateCounter;
