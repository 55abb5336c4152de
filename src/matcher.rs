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

//! Resolve a textual chip selector to one detected chip.

use tracing::{debug, info};

use crate::backend::SensorBackend;
use crate::error::{AppError, Result};

/// Parse `raw` with the backend's chip name syntax.
pub fn parse_pattern<B: SensorBackend>(backend: &B, raw: &str) -> Result<B::Pattern> {
    backend
        .parse_chip_name(raw)
        .map_err(|source| AppError::InvalidChipPattern { pattern: raw.to_string(), source })
}

/// First detected chip matching `pattern`, scanning the registry from its
/// start. Later matches are ignored. The registry is queried exactly once.
pub fn first_match<'a, B: SensorBackend>(
    backend: &'a B,
    pattern: &'a B::Pattern,
    raw: &str,
) -> Result<&'a B::Chip> {
    let mut matches = backend.detected_chips(pattern);
    let chip = matches
        .next()
        .ok_or_else(|| AppError::NoMatchingChip { pattern: raw.to_string() })?;

    if tracing::enabled!(tracing::Level::DEBUG) {
        let ignored: Vec<String> = matches.map(|c| backend.chip_name(c)).collect();
        if !ignored.is_empty() {
            debug!(pattern = raw, ?ignored, "pattern matches several chips, using the first");
        }
    }

    info!(pattern = raw, chip = %backend.chip_name(chip), "chip selected");
    Ok(chip)
}
