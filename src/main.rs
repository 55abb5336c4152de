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

use std::process::ExitCode;

use clap::Parser;
use tracing::debug;

use sensorpoll::app;
use sensorpoll::cli::Cli;
use sensorpoll::config::load_config;
use sensorpoll::error::AppError;
use sensorpoll::logger;

fn main() -> ExitCode {
    // Wrong argument count exits here with usage on stderr
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", AppError::Config(e));
            return ExitCode::FAILURE;
        }
    };
    logger::init_logging(&config.log_level);

    match app::run(&cli, &config) {
        Ok(()) => {
            eprintln!("Exiting...");
            ExitCode::SUCCESS
        }
        Err(err) => {
            debug!(error = ?err, "fatal error");
            eprintln!("{}", err);
            ExitCode::FAILURE
        }
    }
}
