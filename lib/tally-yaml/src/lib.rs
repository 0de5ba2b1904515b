/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

#[cfg(test)]
#[macro_use]
mod macros;

mod doc;
mod hash;

pub mod humanize;
pub mod key;
pub mod value;

pub use doc::{foreach_doc, foreach_doc_in_str};
pub use hash::{foreach_kv, get_required_str as hash_get_required_str};
