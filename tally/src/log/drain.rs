/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io::{self, Write};
use std::sync::Arc;

use chrono::Local;
use flume::{Receiver, Sender, TrySendError};
use slog::{Drain, Level, OwnedKVList, Record};

use super::{LogStats, format};

const LOG_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

pub(super) struct LogValue {
    pub(super) level: Level,
    pub(super) message: String,
    pub(super) kv_pairs: Vec<(String, String)>,
    pub(super) location: Option<String>,
}

impl LogValue {
    fn message_str(&self) -> &str {
        if self.message.is_empty() {
            "()"
        } else {
            &self.message
        }
    }
}

/// A drain that hands formatted records to a dedicated IO thread.
///
/// Records are dropped and counted when the channel is full, logging
/// never blocks the caller.
pub struct AsyncStdLogger {
    sender: Sender<LogValue>,
    append_code_position: bool,
    stats: Arc<LogStats>,
}

impl AsyncStdLogger {
    pub fn stats(&self) -> Arc<LogStats> {
        Arc::clone(&self.stats)
    }
}

impl Drain for AsyncStdLogger {
    type Ok = ();
    type Err = slog::Error;

    fn log(&self, record: &Record, logger_values: &OwnedKVList) -> Result<(), slog::Error> {
        self.stats.add_total();

        match format::format_record(record, logger_values, self.append_code_position) {
            Ok(v) => {
                match self.sender.try_send(v) {
                    Ok(_) => {}
                    Err(TrySendError::Full(_)) => self.stats.add_channel_overflow(),
                    Err(TrySendError::Disconnected(_)) => self.stats.add_channel_closed(),
                }
                Ok(())
            }
            Err(e) => {
                self.stats.add_format_failed();
                Err(e)
            }
        }
    }
}

pub fn new_async_logger(
    channel_capacity: usize,
    thread_name: &str,
    append_code_position: bool,
    use_stdout: bool,
) -> io::Result<AsyncStdLogger> {
    let (sender, receiver) = flume::bounded::<LogValue>(channel_capacity);
    let stats = Arc::new(LogStats::default());

    let io_thread = AsyncIoThread {
        receiver,
        stats: Arc::clone(&stats),
    };
    let _detached_thread = std::thread::Builder::new()
        .name(thread_name.to_string())
        .spawn(move || {
            if use_stdout {
                io_thread.run(io::stdout());
            } else {
                io_thread.run(io::stderr());
            }
        })?;

    Ok(AsyncStdLogger {
        sender,
        append_code_position,
        stats,
    })
}

struct AsyncIoThread {
    receiver: Receiver<LogValue>,
    stats: Arc<LogStats>,
}

impl AsyncIoThread {
    fn run<IO: Write>(&self, mut io: IO) {
        let mut buf: Vec<u8> = Vec::with_capacity(1024);
        while let Ok(v) = self.receiver.recv() {
            buf.clear();
            let _ = write_plain(&mut buf, &v);
            self.write_buf(&mut io, &buf);

            while let Ok(v) = self.receiver.try_recv() {
                buf.clear();
                let _ = write_plain(&mut buf, &v);
                self.write_buf(&mut io, &buf);
            }

            let _ = io.flush();
        }
    }

    fn write_buf<IO: Write>(&self, io: &mut IO, buf: &[u8]) {
        match io.write_all(buf) {
            Ok(_) => {
                self.stats.add_passed();
                self.stats.add_size(buf.len());
            }
            Err(_) => self.stats.add_io_failed(),
        }
    }
}

fn write_plain<IO: Write>(io: &mut IO, v: &LogValue) -> io::Result<()> {
    write!(io, "{}", Local::now().format(LOG_TIME_FORMAT))?;
    write!(io, " {}", v.level)?;
    for (k, v) in &v.kv_pairs {
        write!(io, " {k}: {v},")?;
    }
    write!(io, " {}", v.message_str())?;
    if let Some(location) = &v.location {
        write!(io, " <{location}>")?;
    }
    writeln!(io)
}

#[cfg(test)]
mod tests {
    use super::*;
    use slog::{Logger, o};

    fn test_logger(capacity: usize) -> (Logger, Receiver<LogValue>, Arc<LogStats>) {
        let (sender, receiver) = flume::bounded::<LogValue>(capacity);
        let stats = Arc::new(LogStats::default());
        let drain = AsyncStdLogger {
            sender,
            append_code_position: true,
            stats: Arc::clone(&stats),
        };
        let logger = Logger::root(drain.fuse(), o!("sink" => "memory"));
        (logger, receiver, stats)
    }

    #[test]
    fn format_line() {
        let (logger, receiver, stats) = test_logger(4);
        slog::warn!(logger, "batch failed"; "batch" => 2usize, "ok" => false);

        let v = receiver.try_recv().unwrap();
        assert_eq!(v.level, Level::Warning);
        assert_eq!(v.message, "batch failed");
        assert!(v.kv_pairs.contains(&("sink".to_string(), "memory".to_string())));
        assert!(v.kv_pairs.contains(&("batch".to_string(), "2".to_string())));
        assert!(v.kv_pairs.contains(&("ok".to_string(), "false".to_string())));
        let location = v.location.as_deref().unwrap();
        assert!(location.contains("drain.rs:"));

        let mut buf = Vec::new();
        write_plain(&mut buf, &v).unwrap();
        let line = String::from_utf8(buf).unwrap();
        assert!(line.contains(" WARN "));
        assert!(line.contains(" batch failed <"));
        assert!(line.ends_with(">\n"));
        assert_eq!(stats.snapshot().total, 1);
    }

    #[test]
    fn empty_message() {
        let v = LogValue {
            level: Level::Info,
            message: String::new(),
            kv_pairs: Vec::new(),
            location: None,
        };
        let mut buf = Vec::new();
        write_plain(&mut buf, &v).unwrap();
        let line = String::from_utf8(buf).unwrap();
        assert!(line.ends_with(" INFO ()\n"));
    }

    #[test]
    fn overflow_and_closed() {
        let (logger, receiver, stats) = test_logger(1);
        slog::info!(logger, "first");
        slog::info!(logger, "second");
        assert_eq!(stats.snapshot().channel_overflow, 1);

        drop(receiver);
        slog::info!(logger, "third");
        let snap = stats.snapshot();
        assert_eq!(snap.total, 3);
        assert_eq!(snap.channel_closed, 1);
        assert_eq!(snap.dropped(), 2);
    }

    #[test]
    fn io_thread_writes() {
        let (sender, receiver) = flume::bounded::<LogValue>(4);
        let stats = Arc::new(LogStats::default());
        let io_thread = AsyncIoThread {
            receiver,
            stats: Arc::clone(&stats),
        };
        for msg in ["a", "b"] {
            sender
                .send(LogValue {
                    level: Level::Debug,
                    message: msg.to_string(),
                    kv_pairs: Vec::new(),
                    location: None,
                })
                .unwrap();
        }
        drop(sender);

        let mut out = Vec::new();
        io_thread.run(&mut out);
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains(" DEBG a\n"));
        let snap = stats.snapshot();
        assert_eq!(snap.passed, 2);
        assert_eq!(snap.size, text.len() as u64);
    }
}
