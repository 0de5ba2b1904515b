/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, anyhow};
use humanize_rs::ParseError;
use yaml_rust::Yaml;

fn secs_to_duration(s: &str) -> anyhow::Result<Duration> {
    if let Ok(u) = u64::from_str(s) {
        return Ok(Duration::from_secs(u));
    }
    let f = f64::from_str(s).map_err(|_| anyhow!("invalid duration {s}"))?;
    Duration::try_from_secs_f64(f).map_err(|e| anyhow!("invalid duration {s}: {e}"))
}

/// Parse a duration such as `1m30s`; a number without unit is in seconds.
pub fn as_duration(v: &Yaml) -> anyhow::Result<Duration> {
    match v {
        Yaml::String(s) => {
            let s = s.trim();
            match humanize_rs::duration::parse(s) {
                Ok(d) => Ok(d),
                Err(ParseError::MissingUnit) => secs_to_duration(s),
                Err(e) => Err(anyhow!("invalid duration {s}: {e}")),
            }
        }
        Yaml::Integer(i) => u64::try_from(*i)
            .map(Duration::from_secs)
            .map_err(|_| anyhow!("negative duration {i}")),
        Yaml::Real(s) => secs_to_duration(s),
        _ => Err(anyhow!("duration should be a string or a number")),
    }
}

/// A single duration or a list of them.
pub fn as_duration_list(v: &Yaml) -> anyhow::Result<Vec<Duration>> {
    let Yaml::Array(seq) = v else {
        return Ok(vec![as_duration(v)?]);
    };
    seq.iter()
        .enumerate()
        .map(|(i, v)| as_duration(v).context(format!("invalid duration #{i}")))
        .collect()
}
