/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoercionError {
    #[error("text value {0:?} is not numeric")]
    NotNumeric(String),
    #[error("non finite float value")]
    NotFinite,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MetricValue {
    Double(f64),
    Signed(i64),
    Unsigned(u64),
    Bool(bool),
    Text(Arc<str>),
}

impl MetricValue {
    pub fn is_numeric(&self) -> bool {
        !matches!(self, MetricValue::Text(_))
    }

    /// Coerce to a float for backends that only accept numbers.
    ///
    /// Booleans map to 0/1 and numeric text is parsed.
    pub fn coerce_f64(&self) -> Result<f64, CoercionError> {
        let f = match self {
            MetricValue::Double(f) => *f,
            MetricValue::Signed(i) => *i as f64,
            MetricValue::Unsigned(u) => *u as f64,
            MetricValue::Bool(true) => 1.0,
            MetricValue::Bool(false) => 0.0,
            MetricValue::Text(s) => f64::from_str(s.trim())
                .map_err(|_| CoercionError::NotNumeric(s.to_string()))?,
        };
        if f.is_finite() {
            Ok(f)
        } else {
            Err(CoercionError::NotFinite)
        }
    }

    /// Like `coerce_f64`, but keeps integers exact when possible.
    pub fn coerce_numeric(&self) -> Result<MetricValue, CoercionError> {
        match self {
            MetricValue::Signed(_) | MetricValue::Unsigned(_) => Ok(self.clone()),
            MetricValue::Bool(b) => Ok(MetricValue::Unsigned(u64::from(*b))),
            MetricValue::Text(s) => {
                let s = s.trim();
                if let Ok(u) = u64::from_str(s) {
                    Ok(MetricValue::Unsigned(u))
                } else if let Ok(i) = i64::from_str(s) {
                    Ok(MetricValue::Signed(i))
                } else {
                    self.coerce_f64().map(MetricValue::Double)
                }
            }
            MetricValue::Double(_) => self.coerce_f64().map(MetricValue::Double),
        }
    }
}

impl From<f64> for MetricValue {
    fn from(v: f64) -> Self {
        MetricValue::Double(v)
    }
}

impl From<i64> for MetricValue {
    fn from(v: i64) -> Self {
        MetricValue::Signed(v)
    }
}

impl From<u64> for MetricValue {
    fn from(v: u64) -> Self {
        MetricValue::Unsigned(v)
    }
}

impl From<usize> for MetricValue {
    fn from(v: usize) -> Self {
        MetricValue::Unsigned(v as u64)
    }
}

impl From<bool> for MetricValue {
    fn from(v: bool) -> Self {
        MetricValue::Bool(v)
    }
}

impl From<&str> for MetricValue {
    fn from(v: &str) -> Self {
        MetricValue::Text(Arc::from(v))
    }
}

impl From<String> for MetricValue {
    fn from(v: String) -> Self {
        MetricValue::Text(Arc::from(v))
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Unsigned(u) => itoa::Buffer::new().format(*u).fmt(f),
            MetricValue::Signed(i) => itoa::Buffer::new().format(*i).fmt(f),
            MetricValue::Double(v) => ryu::Buffer::new().format(*v).fmt(f),
            MetricValue::Bool(b) => b.fmt(f),
            MetricValue::Text(s) => f.write_str(s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coerce() {
        assert_eq!(MetricValue::Unsigned(10).coerce_f64(), Ok(10.0));
        assert_eq!(MetricValue::Signed(-3).coerce_f64(), Ok(-3.0));
        assert_eq!(MetricValue::Bool(true).coerce_f64(), Ok(1.0));
        assert_eq!(MetricValue::Bool(false).coerce_f64(), Ok(0.0));
        assert_eq!(MetricValue::from(" 12.5 ").coerce_f64(), Ok(12.5));
        assert_eq!(
            MetricValue::from("idle").coerce_f64(),
            Err(CoercionError::NotNumeric("idle".to_string()))
        );
        assert_eq!(
            MetricValue::Double(f64::NAN).coerce_f64(),
            Err(CoercionError::NotFinite)
        );
    }

    #[test]
    fn coerce_numeric() {
        assert_eq!(
            MetricValue::from("42").coerce_numeric(),
            Ok(MetricValue::Unsigned(42))
        );
        assert_eq!(
            MetricValue::from("-42").coerce_numeric(),
            Ok(MetricValue::Signed(-42))
        );
        assert_eq!(
            MetricValue::Bool(true).coerce_numeric(),
            Ok(MetricValue::Unsigned(1))
        );
        assert!(MetricValue::from("x").coerce_numeric().is_err());
    }

    #[test]
    fn display() {
        assert_eq!(MetricValue::Unsigned(10).to_string(), "10");
        assert_eq!(MetricValue::Signed(-10).to_string(), "-10");
        assert_eq!(MetricValue::Double(1.0).to_string(), "1.0");
        assert_eq!(MetricValue::Bool(true).to_string(), "true");
        assert_eq!(MetricValue::from("up").to_string(), "up");
    }
}
