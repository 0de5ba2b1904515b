/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, UdpSocket};
#[cfg(test)]
use std::sync::Arc;
use std::sync::Mutex;

use log::debug;

use tally_types::{DataSourceKind, MetricSample, MetricValue};

use super::{FailurePolicy, RoundId, Sink, SinkError};

pub const DEFAULT_MAX_PACKET_SIZE: usize = 1400;

enum StatsdIo {
    Udp { socket: UdpSocket, addr: SocketAddr },
    #[cfg(test)]
    Buf(Arc<Mutex<Vec<Vec<u8>>>>),
}

impl StatsdIo {
    fn send_msg(&self, msg: &[u8]) -> io::Result<usize> {
        match self {
            StatsdIo::Udp { socket, addr } => socket.send_to(msg, *addr),
            #[cfg(test)]
            StatsdIo::Buf(packets) => {
                packets.lock().unwrap().push(msg.to_vec());
                Ok(msg.len())
            }
        }
    }
}

struct PacketBuf {
    max_size: usize,
    buf: Vec<u8>,
}

impl PacketBuf {
    fn emit(&mut self, io: &StatsdIo, line: &[u8]) -> io::Result<()> {
        if self.buf.is_empty() {
            self.buf.extend_from_slice(line);
        } else if self.buf.len() + 1 + line.len() > self.max_size {
            self.flush_buf(io)?;
            self.buf.extend_from_slice(line);
        } else {
            self.buf.push(b'\n');
            self.buf.extend_from_slice(line);
        }
        Ok(())
    }

    fn flush(&mut self, io: &StatsdIo) -> io::Result<()> {
        if self.buf.is_empty() {
            return Ok(());
        }
        self.flush_buf(io)
    }

    fn flush_buf(&mut self, io: &StatsdIo) -> io::Result<()> {
        let r = io.send_msg(&self.buf);
        self.buf.clear();
        r.map(|_| ())
    }
}

/// Send gauges in statsd line format over udp, with dogstatsd style tags.
///
/// Lines are packed into packets of at most `max_packet_size` bytes,
/// the last packet of a round is sent on flush.
pub struct StatsdSink {
    name: String,
    prefix: String,
    io: StatsdIo,
    packet: Mutex<PacketBuf>,
}

fn push_escaped(buf: &mut Vec<u8>, s: &str) {
    for b in s.bytes() {
        match b {
            b':' | b'|' | b',' | b'#' | b'\n' => buf.push(b'_'),
            _ => buf.push(b),
        }
    }
}

fn format_line(buf: &mut Vec<u8>, prefix: &str, sample: &MetricSample, value: &MetricValue) {
    if !prefix.is_empty() {
        push_escaped(buf, prefix);
        buf.push(b'.');
    }
    push_escaped(buf, sample.name());
    buf.push(b':');
    match value {
        MetricValue::Unsigned(u) => buf.extend_from_slice(itoa::Buffer::new().format(*u).as_bytes()),
        MetricValue::Signed(i) => buf.extend_from_slice(itoa::Buffer::new().format(*i).as_bytes()),
        MetricValue::Double(f) => buf.extend_from_slice(ryu::Buffer::new().format(*f).as_bytes()),
        // coerced before
        MetricValue::Bool(b) => buf.push(if *b { b'1' } else { b'0' }),
        MetricValue::Text(s) => buf.extend_from_slice(s.as_bytes()),
    }
    buf.extend_from_slice(b"|g");

    let tags = sample.tags();
    buf.extend_from_slice(b"|#");
    push_escaped(buf, DataSourceKind::TAG_KEY);
    buf.push(b':');
    match tags.get(DataSourceKind::TAG_KEY) {
        Some(v) => push_escaped(buf, v),
        None => buf.extend_from_slice(sample.kind().as_str().as_bytes()),
    }
    for tag in tags.iter().filter(|t| t.key() != DataSourceKind::TAG_KEY) {
        buf.push(b',');
        push_escaped(buf, tag.key());
        buf.push(b':');
        push_escaped(buf, tag.value());
    }
}

impl StatsdSink {
    fn with_io(name: &str, prefix: &str, max_packet_size: usize, io: StatsdIo) -> Self {
        StatsdSink {
            name: name.to_string(),
            prefix: prefix.to_string(),
            io,
            packet: Mutex::new(PacketBuf {
                max_size: max_packet_size,
                buf: Vec::with_capacity(max_packet_size),
            }),
        }
    }

    pub fn udp(
        name: &str,
        addr: SocketAddr,
        prefix: &str,
        max_packet_size: usize,
    ) -> io::Result<Self> {
        let bind_addr = match addr {
            SocketAddr::V4(_) => SocketAddr::new(Ipv4Addr::UNSPECIFIED.into(), 0),
            SocketAddr::V6(_) => SocketAddr::new(Ipv6Addr::UNSPECIFIED.into(), 0),
        };
        let socket = UdpSocket::bind(bind_addr)?;
        Ok(StatsdSink::with_io(
            name,
            prefix,
            max_packet_size,
            StatsdIo::Udp { socket, addr },
        ))
    }

    #[cfg(test)]
    pub(crate) fn buffered(prefix: &str, max_packet_size: usize) -> (Self, Arc<Mutex<Vec<Vec<u8>>>>) {
        let packets = Arc::new(Mutex::new(Vec::new()));
        let sink = StatsdSink::with_io(
            "test",
            prefix,
            max_packet_size,
            StatsdIo::Buf(packets.clone()),
        );
        (sink, packets)
    }
}

impl Sink for StatsdSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn sink_type(&self) -> &'static str {
        "statsd"
    }

    fn failure_policy(&self) -> FailurePolicy {
        FailurePolicy::BestEffort
    }

    fn send(&self, _round: RoundId, batch: &[MetricSample]) -> Result<usize, SinkError> {
        let mut accepted = 0;
        let mut line = Vec::with_capacity(256);
        let mut packet = self.packet.lock().unwrap();
        for sample in batch {
            let value = match sample.value().coerce_numeric() {
                Ok(v) => v,
                Err(e) => {
                    debug!(
                        "statsd sink {}: drop sample {}: {e}",
                        self.name,
                        sample.name()
                    );
                    continue;
                }
            };
            line.clear();
            format_line(&mut line, &self.prefix, sample, &value);
            packet.emit(&self.io, &line)?;
            accepted += 1;
        }
        Ok(accepted)
    }

    fn flush(&self, _round: RoundId) -> Result<(), SinkError> {
        let mut packet = self.packet.lock().unwrap();
        packet.flush(&self.io)?;
        Ok(())
    }
}
