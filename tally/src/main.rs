/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use anyhow::{Context, anyhow};
use log::{debug, error, info, warn};

use tally::app::Tally;
use tally::config::TallyConfig;
use tally_types::SystemClock;

fn main() -> anyhow::Result<()> {
    let Some(proc_args) =
        tally::opts::parse_clap().context("failed to parse command line options")?
    else {
        return Ok(());
    };

    // set up process logger early, only proc args is used inside
    let process_logger = tally::log::setup(proc_args.verbose_level, proc_args.log_stdout)
        .context("failed to setup process logger")?;

    let config = TallyConfig::load(&proc_args.config_file)
        .context(format!("failed to load config, opts: {:?}", &proc_args))?;
    debug!("loaded config from {}", proc_args.config_file.display());

    if proc_args.test_config {
        info!("the format of the config file is ok");
        return Ok(());
    }

    let tally = Tally::build(&config, SystemClock::shared()).context("failed to build publisher")?;
    tally.register(process_logger.stats());

    if proc_args.once {
        return match tally.publish_once() {
            Ok(report) => {
                info!("published {} samples", report.samples);
                Ok(())
            }
            Err(e) => Err(anyhow!("{e}")),
        };
    }

    match tokio_run(&tally) {
        Ok(_) => {
            if let Some(uptime) = tally.uptime_human() {
                info!("quit after running for {uptime}");
            }
            Ok(())
        }
        Err(e) => {
            error!("{e:?}");
            Err(e)
        }
    }
}

fn tokio_run(tally: &Tally) -> anyhow::Result<()> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start runtime")?;
    rt.block_on(async {
        let sweep = tally.spawn_sweep(None);
        let task = tally.spawn_publish()?;

        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("failed to listen for quit signal: {e}");
        }
        info!("quit signal received, stopping");

        tokio::task::spawn_blocking(move || task.stop())
            .await
            .map_err(|e| anyhow!("failed to join publish task: {e}"))?;
        sweep.shutdown().await;
        Ok(())
    })
}
