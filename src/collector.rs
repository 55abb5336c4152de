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

//! Build the fixed list of readable subfeatures for a chip.

use std::ops::Deref;

use tracing::debug;

use crate::backend::{SensorBackend, Subfeature};
use crate::error::Result;

/// Readable subfeatures of one chip, in backend enumeration order.
/// Built once and never modified afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkingSet {
    points: Vec<Subfeature>,
}

impl Deref for WorkingSet {
    type Target = [Subfeature];

    fn deref(&self) -> &[Subfeature] {
        &self.points
    }
}

/// Walk every feature and subfeature of `chip` and keep the readable ones.
/// An allocation failure discards everything collected so far.
pub fn collect_readable<B: SensorBackend>(backend: &B, chip: &B::Chip) -> Result<WorkingSet> {
    let mut points: Vec<Subfeature> = Vec::new();
    let mut skipped = 0usize;

    for feature in backend.features(chip) {
        for subfeature in backend.subfeatures(chip, &feature) {
            if !subfeature.is_readable() {
                skipped += 1;
                continue;
            }
            points.try_reserve(1)?;
            points.push(subfeature);
        }
    }

    debug!(
        chip = %backend.chip_name(chip),
        readable = points.len(),
        skipped,
        "working set collected"
    );
    Ok(WorkingSet { points })
}
