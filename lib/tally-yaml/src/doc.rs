/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::fs;
use std::path::Path;

use anyhow::{Context, anyhow};
use yaml_rust::{Yaml, YamlLoader};

/// Load all docs in the file and call `f` on each of them in order.
pub fn foreach_doc<F>(path: &Path, mut f: F) -> anyhow::Result<()>
where
    F: FnMut(usize, &Yaml) -> anyhow::Result<()>,
{
    let content = fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read file {}: {e}", path.display()))?;
    foreach_doc_in_str(&content, &mut f).context(format!("invalid yaml file {}", path.display()))
}

pub fn foreach_doc_in_str<F>(content: &str, f: &mut F) -> anyhow::Result<()>
where
    F: FnMut(usize, &Yaml) -> anyhow::Result<()>,
{
    let docs = YamlLoader::load_from_str(content).map_err(|e| anyhow!("invalid yaml: {e}"))?;
    for (i, doc) in docs.iter().enumerate() {
        f(i, doc).context(format!("failed to load yaml doc {i}"))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multi_doc() {
        let content = "a: 1\n---\nb: 2\n";
        let mut seen = Vec::new();
        foreach_doc_in_str(content, &mut |i, doc: &Yaml| {
            seen.push((i, doc.as_hash().map(|h| h.len()).unwrap_or_default()));
            Ok(())
        })
        .unwrap();
        assert_eq!(seen, vec![(0, 1), (1, 1)]);
    }

    #[test]
    fn invalid() {
        assert!(foreach_doc_in_str("a: [", &mut |_, _: &Yaml| Ok(())).is_err());
        assert!(foreach_doc(Path::new("/nonexistent/tally.yaml"), |_, _| Ok(())).is_err());
    }
}
