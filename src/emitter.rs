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

//! One poll cycle: read every point of the working set and print it.

use std::io::{self, Write};

use tracing::{debug, trace};

use crate::backend::SensorBackend;
use crate::collector::WorkingSet;

/// Outcome of one cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub emitted: usize,
    pub failed: usize,
}

/// Read each point once and write `<name>|float|<value>` lines to `out`,
/// followed by a blank line and a flush. A failed read is reported on `err`
/// and the cycle moves on to the next point.
pub fn emit_cycle<B, O, E>(
    backend: &B,
    chip: &B::Chip,
    set: &WorkingSet,
    out: &mut O,
    err: &mut E,
) -> io::Result<CycleReport>
where
    B: SensorBackend,
    O: Write + ?Sized,
    E: Write + ?Sized,
{
    let mut report = CycleReport::default();

    for point in set.iter() {
        match backend.get_value(chip, point.number) {
            Ok(value) => {
                writeln!(out, "{}|float|{}", point.name, format_value(value))?;
                report.emitted += 1;
            }
            Err(e) => {
                debug!(subfeature = %point.name, code = e.code(), "read failed");
                // Best effort: a lost diagnostic must not end the poll loop
                let reported = writeln!(err, "Error getting value for {}: {}", point.name, e);
                if let Err(write_err) = reported {
                    debug!(error = %write_err, "failed to report read failure");
                }
                report.failed += 1;
            }
        }
    }

    writeln!(out)?;
    out.flush()?;
    trace!(emitted = report.emitted, failed = report.failed, "cycle emitted");
    Ok(report)
}

/// Render like C's `%f`: six decimals, `nan`/`inf` spelled in lowercase.
pub fn format_value(value: f64) -> String {
    if value.is_nan() {
        if value.is_sign_negative() { "-nan".to_string() } else { "nan".to_string() }
    } else if value.is_infinite() {
        if value < 0.0 { "-inf".to_string() } else { "inf".to_string() }
    } else {
        format!("{:.6}", value)
    }
}
