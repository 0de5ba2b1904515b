/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

pub mod app;
pub mod config;
pub mod filter;
pub mod log;
pub mod monitor;
pub mod opts;
pub mod poll;
pub mod publish;
pub mod registry;
pub mod self_monitor;
pub mod sink;

mod build;
