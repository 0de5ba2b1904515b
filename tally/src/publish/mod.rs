/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

mod stats;
pub use stats::{PublishSnapshot, PublishStats};

mod pipeline;
pub use pipeline::{DEFAULT_BATCH_SIZE, PublishError, PublishPipeline, RoundReport, SinkFailure};

mod task;
pub use task::{PublishTask, publish_round};
