/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::Arc;

use slog::{Drain, o};
use slog_scope::GlobalLoggerGuard;

mod drain;
mod format;
mod stats;

use drain::LogValue;
pub use drain::{AsyncStdLogger, new_async_logger};
pub use stats::{LogSnapshot, LogStats};

const PROCESS_LOG_THREAD_NAME: &str = "log-process";
const PROCESS_LOG_CHANNEL_CAPACITY: usize = 1024;

/// Keeps the process logger installed until dropped.
pub struct ProcessLogger {
    _scope_guard: GlobalLoggerGuard,
    stats: Arc<LogStats>,
}

impl ProcessLogger {
    pub fn stats(&self) -> Arc<LogStats> {
        Arc::clone(&self.stats)
    }
}

fn verbose_to_level(verbose_level: u8) -> log::Level {
    match verbose_level {
        0 => log::Level::Warn,
        1 => log::Level::Info,
        2 => log::Level::Debug,
        _ => log::Level::Trace,
    }
}

pub fn setup(verbose_level: u8, use_stdout: bool) -> anyhow::Result<ProcessLogger> {
    let drain = new_async_logger(
        PROCESS_LOG_CHANNEL_CAPACITY,
        PROCESS_LOG_THREAD_NAME,
        true,
        use_stdout,
    )
    .map_err(|e| anyhow::anyhow!("failed to spawn log thread: {e}"))?;
    let stats = drain.stats();
    let logger = slog::Logger::root(drain.fuse(), o!());

    let scope_guard = slog_scope::set_global_logger(logger);
    slog_stdlog::init_with_level(verbose_to_level(verbose_level))
        .map_err(|e| anyhow::anyhow!("failed to set std logger: {e}"))?;

    Ok(ProcessLogger {
        _scope_guard: scope_guard,
        stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level() {
        assert_eq!(verbose_to_level(0), log::Level::Warn);
        assert_eq!(verbose_to_level(1), log::Level::Info);
        assert_eq!(verbose_to_level(2), log::Level::Debug);
        assert_eq!(verbose_to_level(9), log::Level::Trace);
    }
}
