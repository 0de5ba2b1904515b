/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::fmt::Arguments;

use slog::{Key, OwnedKVList, Record, Serializer, KV};

use super::LogValue;

pub(super) fn format_record(
    record: &Record,
    logger_values: &OwnedKVList,
    append_code_position: bool,
) -> Result<LogValue, slog::Error> {
    let mut kv_pairs = Vec::new();
    let mut kv_formatter = FormatterKv(&mut kv_pairs);
    logger_values.serialize(record, &mut kv_formatter)?;
    record.kv().serialize(record, &mut kv_formatter)?;

    let location = if append_code_position {
        match record.file().rsplit_once('/').map(|x| x.1) {
            Some(filename) => Some(format!("{}({filename}:{})", record.module(), record.line())),
            None => Some(record.module().to_string()),
        }
    } else {
        None
    };

    Ok(LogValue {
        level: record.level(),
        message: record.msg().to_string(),
        kv_pairs,
        location,
    })
}

struct FormatterKv<'a>(&'a mut Vec<(String, String)>);

impl Serializer for FormatterKv<'_> {
    fn emit_usize(&mut self, key: Key, value: usize) -> slog::Result {
        let mut buffer = itoa::Buffer::new();
        self.emit_str(key, buffer.format(value))
    }

    fn emit_u64(&mut self, key: Key, value: u64) -> slog::Result {
        let mut buffer = itoa::Buffer::new();
        self.emit_str(key, buffer.format(value))
    }

    fn emit_i64(&mut self, key: Key, value: i64) -> slog::Result {
        let mut buffer = itoa::Buffer::new();
        self.emit_str(key, buffer.format(value))
    }

    fn emit_f64(&mut self, key: Key, value: f64) -> slog::Result {
        let mut buffer = ryu::Buffer::new();
        self.emit_str(key, buffer.format(value))
    }

    fn emit_bool(&mut self, key: Key, value: bool) -> slog::Result {
        self.emit_str(key, if value { "true" } else { "false" })
    }

    fn emit_none(&mut self, _key: Key) -> slog::Result {
        Ok(())
    }

    fn emit_str(&mut self, key: Key, value: &str) -> slog::Result {
        self.0.push((key.to_string(), value.to_string()));
        Ok(())
    }

    fn emit_arguments(&mut self, key: Key, value: &Arguments) -> slog::Result {
        match value.as_str() {
            Some(s) => self.emit_str(key, s),
            None => {
                self.0.push((key.to_string(), value.to_string()));
                Ok(())
            }
        }
    }
}
