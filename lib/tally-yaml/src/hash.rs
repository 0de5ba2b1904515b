/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use ahash::AHashSet;
use anyhow::{Context, anyhow};
use yaml_rust::{Yaml, yaml};

use crate::key;

/// Call `f` on each entry of a map, in document order.
///
/// Keys are passed as written. Two keys that are the same once
/// normalized, such as `batch-size` and `batch_size`, are an error.
pub fn foreach_kv<F>(table: &yaml::Hash, mut f: F) -> anyhow::Result<()>
where
    F: FnMut(&str, &Yaml) -> anyhow::Result<()>,
{
    let mut seen = AHashSet::with_capacity(table.len());
    for (k, v) in table.iter() {
        let Yaml::String(k) = k else {
            return Err(anyhow!("map key {k:?} is not a string"));
        };
        if !seen.insert(key::normalize(k)) {
            return Err(anyhow!("duplicate key {k}"));
        }
        f(k, v).context(format!("invalid value for key {k}"))?;
    }
    Ok(())
}

/// Get the string value of key `k`, which is matched after normalization.
pub fn get_required_str<'a>(map: &'a yaml::Hash, k: &str) -> anyhow::Result<&'a str> {
    let found = map.iter().find_map(|(mk, v)| match mk {
        Yaml::String(s) if key::normalize(s) == k => Some(v),
        _ => None,
    });
    match found {
        Some(Yaml::String(s)) => Ok(s),
        Some(_) => Err(anyhow!("value of key {k} should be a string")),
        None => Err(anyhow!("no required key {k} found in this map")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn foreach_kv_ok() {
        let yaml = yaml_doc!("ttl: 1\nsweep-interval: 2");
        let hash = yaml.as_hash().unwrap();
        let mut result = Vec::new();
        foreach_kv(hash, |k, v| {
            result.push((k.to_owned(), v.as_i64().unwrap()));
            Ok(())
        })
        .unwrap();
        assert_eq!(
            result,
            vec![("ttl".to_string(), 1), ("sweep-interval".to_string(), 2)]
        );
    }

    #[test]
    fn foreach_kv_err() {
        let yaml = yaml_doc!("123: 1");
        let hash = yaml.as_hash().unwrap();
        assert!(foreach_kv(hash, |_, _| Ok(())).is_err());

        let yaml = yaml_doc!("a: 1");
        let hash = yaml.as_hash().unwrap();
        assert!(foreach_kv(hash, |k, _| Err(anyhow!("error at {k}"))).is_err());
    }

    #[test]
    fn foreach_kv_duplicate() {
        let yaml = yaml_doc!("batch_size: 1\nBatch-Size: 2");
        let hash = yaml.as_hash().unwrap();
        let mut count = 0;
        let e = foreach_kv(hash, |_, _| {
            count += 1;
            Ok(())
        })
        .unwrap_err();
        assert_eq!(count, 1);
        assert_eq!(e.to_string(), "duplicate key Batch-Size");
    }

    #[test]
    fn required() {
        let yaml = yaml_doc!("Type: statsd\nport: 8125");
        let hash = yaml.as_hash().unwrap();
        assert_eq!(get_required_str(hash, "type").unwrap(), "statsd");
        assert!(get_required_str(hash, "missing").is_err());
        assert!(get_required_str(hash, "port").is_err());
    }
}
