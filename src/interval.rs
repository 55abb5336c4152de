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

use std::num::IntErrorKind;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

/// Largest accepted polling period, in seconds.
pub const MAX_INTERVAL_SECS: i64 = i32::MAX as i64;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IntervalError {
    #[error("No digits found in interval")]
    NoDigits,
    #[error("Invalid characters found in interval")]
    InvalidCharacters,
    #[error("Error parsing interval: numerical result out of range")]
    OutOfRange,
    #[error("Interval must be a positive integer")]
    NotPositive,
}

/// Polling period in whole seconds, always in `1..=MAX_INTERVAL_SECS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval(u32);

impl Interval {
    pub fn secs(self) -> u32 {
        self.0
    }

    pub fn as_duration(self) -> Duration {
        Duration::from_secs(u64::from(self.0))
    }
}

impl FromStr for Interval {
    type Err = IntervalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_interval(s)
    }
}

/// Parse a base-10 interval. Leading whitespace and an optional sign are
/// accepted, so "-5" is reported as non-positive rather than as garbage.
/// Everything after that must be digits.
pub fn parse_interval(s: &str) -> Result<Interval, IntervalError> {
    let s = s.trim_start_matches(is_c_space);
    let value = match s.parse::<i64>() {
        Ok(v) => v,
        Err(e) => {
            return Err(match e.kind() {
                IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => IntervalError::OutOfRange,
                _ if !starts_with_digits(s) => IntervalError::NoDigits,
                _ => IntervalError::InvalidCharacters,
            });
        }
    };

    if value <= 0 || value > MAX_INTERVAL_SECS {
        return Err(IntervalError::NotPositive);
    }

    u32::try_from(value)
        .map(Interval)
        .map_err(|_| IntervalError::NotPositive)
}

// C-locale isspace(), vertical tab included
fn is_c_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\x0b' | '\x0c' | '\r')
}

fn starts_with_digits(s: &str) -> bool {
    let unsigned = s.strip_prefix(|c: char| c == '+' || c == '-').unwrap_or(s);
    unsigned.starts_with(|c: char| c.is_ascii_digit())
}
