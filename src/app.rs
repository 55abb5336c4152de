/*
 * This file is part of Sensorpoll.
 *
 * Copyright (C) 2025 Sensorpoll contributors
 *
 * Sensorpoll is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Sensorpoll is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Sensorpoll. If not, see <https://www.gnu.org/licenses/>.
 */

//! Startup sequencing: interval, backend session, chip, working set,
//! interrupt handler, then the poll loop.

use std::io::{self, Write};

use tracing::debug;

use crate::backend::SensorBackend;
use crate::cli::Cli;
use crate::collector::collect_readable;
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::hwmon::HwmonBackend;
use crate::interval::{parse_interval, Interval};
use crate::matcher::{first_match, parse_pattern};
use crate::poll::{self, install_interrupt_handler, CancellationToken};

/// Run against the sysfs backend until interrupted.
pub fn run(cli: &Cli, config: &Config) -> Result<()> {
    let interval = parse_interval(&cli.interval)?;

    let root = cli.sysfs_root.clone().unwrap_or_else(|| config.sysfs_root.clone());
    let backend = HwmonBackend::init(root).map_err(AppError::BackendInit)?;

    let token = CancellationToken::new();
    let mut out = io::stdout().lock();
    let mut err = io::stderr();
    monitor(
        &backend,
        &cli.chip,
        interval,
        &token,
        install_interrupt_handler,
        &mut out,
        &mut err,
    )?;
    Ok(())
}

/// Select the chip, build its working set, install the interrupt handler
/// via `install` and poll until `token` is cancelled. Everything acquired
/// here is released on return, on every path.
pub fn monitor<B, I, O, E>(
    backend: &B,
    chip_pattern: &str,
    interval: Interval,
    token: &CancellationToken,
    install: I,
    out: &mut O,
    err: &mut E,
) -> Result<u64>
where
    B: SensorBackend,
    I: FnOnce(&CancellationToken) -> Result<()>,
    O: Write + ?Sized,
    E: Write + ?Sized,
{
    let pattern = parse_pattern(backend, chip_pattern)?;
    let chip = first_match(backend, &pattern, chip_pattern)?;
    let set = collect_readable(backend, chip)?;

    install(token)?;
    debug!(interval_secs = interval.secs(), points = set.len(), "polling started");

    let cycles = poll::run(backend, chip, &set, interval.as_duration(), token, out, err)?;
    Ok(cycles)
}
