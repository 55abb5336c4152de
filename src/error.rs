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

//! Error types shared by the discovery and polling pipeline.

use std::io;

use thiserror::Error;

use crate::backend::BackendError;
use crate::interval::IntervalError;

pub type Result<T> = std::result::Result<T, AppError>;

/// Fatal errors. Each one is reported once on stderr and ends the process
/// with a failure status.
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    InvalidInterval(#[from] IntervalError),

    #[error("Error initialising sensors: {0} (code {code})", code = .0.code())]
    BackendInit(#[source] BackendError),

    #[error("Error parsing chip name '{pattern}': {source} (code {code})", code = .source.code())]
    InvalidChipPattern {
        pattern: String,
        #[source]
        source: BackendError,
    },

    #[error("No matching chip found for '{pattern}'")]
    NoMatchingChip { pattern: String },

    #[error("Error collecting subfeatures")]
    ResourceExhausted(#[from] std::collections::TryReserveError),

    #[error("Error setting up signal handler: {0}")]
    SignalSetup(#[from] ctrlc::Error),

    #[error("Configuration error: {0:#}")]
    Config(#[from] anyhow::Error),

    #[error("Error writing output: {0}")]
    Output(#[from] io::Error),
}
