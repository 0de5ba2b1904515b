/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::net::{SocketAddr, ToSocketAddrs};
use std::sync::Arc;

use anyhow::{Context, anyhow};
use yaml_rust::{Yaml, yaml};

use super::SinkCommonConfig;
use crate::sink::{ArcSink, DEFAULT_MAX_PACKET_SIZE, StatsdSink};

const DEFAULT_STATSD_ADDRESS: &str = "127.0.0.1:8125";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatsdSinkConfig {
    pub common: SinkCommonConfig,
    pub address: String,
    pub prefix: String,
    pub max_packet_size: usize,
}

impl StatsdSinkConfig {
    pub(super) fn parse(map: &yaml::Hash) -> anyhow::Result<Self> {
        let mut config = StatsdSinkConfig {
            common: SinkCommonConfig::new("statsd"),
            address: DEFAULT_STATSD_ADDRESS.to_string(),
            prefix: String::new(),
            max_packet_size: DEFAULT_MAX_PACKET_SIZE,
        };
        tally_yaml::foreach_kv(map, |k, v| config.set(k, v))?;
        config.check()?;
        Ok(config)
    }

    fn set(&mut self, k: &str, v: &Yaml) -> anyhow::Result<()> {
        if self.common.set(k, v)? {
            return Ok(());
        }
        match tally_yaml::key::normalize(k).as_str() {
            "address" | "addr" => {
                self.address = tally_yaml::value::as_string(v)?;
                Ok(())
            }
            "prefix" => {
                self.prefix = tally_yaml::value::as_metric_name(v)
                    .context(format!("invalid metric name value for key {k}"))?;
                Ok(())
            }
            "max_packet_size" => {
                self.max_packet_size = tally_yaml::humanize::as_usize(v)
                    .context(format!("invalid humanize usize value for key {k}"))?;
                Ok(())
            }
            _ => Err(anyhow!("invalid key {k}")),
        }
    }

    fn check(&self) -> anyhow::Result<()> {
        self.common.check()?;
        if self.max_packet_size < 64 {
            return Err(anyhow!("max packet size {} is too small", self.max_packet_size));
        }
        Ok(())
    }

    fn resolve_address(&self) -> anyhow::Result<SocketAddr> {
        self.address
            .to_socket_addrs()
            .map_err(|e| anyhow!("failed to resolve address {}: {e}", self.address))?
            .next()
            .ok_or_else(|| anyhow!("no socket address found for {}", self.address))
    }

    pub(super) fn build(&self) -> anyhow::Result<ArcSink> {
        let addr = self.resolve_address()?;
        let sink = StatsdSink::udp(&self.common.name, addr, &self.prefix, self.max_packet_size)
            .map_err(|e| anyhow!("failed to create udp socket: {e}"))?;
        Ok(Arc::new(sink))
    }
}
