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

//! Command line interface

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "sensorpoll")]
#[command(version)]
#[command(about = "Poll one hwmon chip and print its readings at a fixed interval")]
#[command(long_about = "Poll one hwmon chip and print its readings at a fixed interval

Every cycle prints one `<subfeature>|float|<value>` line per readable
subfeature of the selected chip, then a blank line. Runs until interrupted.

EXAMPLES:
    sensorpoll coretemp-isa-0000 1     Core temperatures every second
    sensorpoll 'nct6775-*' 5           First nct6775 chip every 5 seconds
    sensorpoll '*-i2c-1-*' 2           First chip on i2c adapter 1

ENVIRONMENT VARIABLES:
    RUST_LOG=debug         Enable debug logging on stderr

FILES:
    ~/.config/sensorpoll/config.json   Optional settings (sysfs_root, log_level)")]
pub struct Cli {
    /// Read settings from this file instead of the user config
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// hwmon class directory to scan (overrides the config file)
    #[arg(long, value_name = "DIR")]
    pub sysfs_root: Option<PathBuf>,

    /// Chip selector: prefix-bus-address, any part may be `*`
    #[arg(value_name = "CHIP")]
    pub chip: String,

    /// Polling interval in whole seconds
    #[arg(value_name = "INTERVAL", allow_hyphen_values = true)]
    pub interval: String,
}
