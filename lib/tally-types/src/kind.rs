/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DataSourceKind {
    /// monotonic value, rate derived by the backend
    Counter,
    /// point in time value
    Gauge,
    /// descriptive, usually non numeric
    Informational,
}

impl DataSourceKind {
    pub const TAG_KEY: &'static str = "type";

    pub fn as_str(&self) -> &'static str {
        match self {
            DataSourceKind::Counter => "COUNTER",
            DataSourceKind::Gauge => "GAUGE",
            DataSourceKind::Informational => "INFORMATIONAL",
        }
    }
}

impl FromStr for DataSourceKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "counter" => Ok(DataSourceKind::Counter),
            "gauge" => Ok(DataSourceKind::Gauge),
            "informational" | "info" => Ok(DataSourceKind::Informational),
            _ => Err(()),
        }
    }
}

impl fmt::Display for DataSourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
