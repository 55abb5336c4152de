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

//! The sensor backend seam.
//!
//! The polling pipeline only talks to hardware through [`SensorBackend`]. The
//! backend owns the chip registry for the lifetime of its session; chip and
//! pattern values handed out are opaque to callers.

use thiserror::Error;

/// Errors reported by a backend, numbered like the classic hwmon library codes.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendError {
    #[error("Wildcard found in chip name")]
    Wildcards,
    #[error("No such subfeature known")]
    NoEntry,
    #[error("Can't read")]
    AccessRead,
    #[error("Kernel interface error")]
    Kernel,
    #[error("Divide by zero")]
    DivZero,
    #[error("Can't parse chip name")]
    ChipName,
    #[error("Can't parse bus name")]
    BusName,
    #[error("General parse error")]
    Parse,
    #[error("Can't write")]
    AccessWrite,
    #[error("I/O error")]
    Io,
    #[error("Evaluation recurses too deep")]
    Recursion,
}

impl BackendError {
    pub fn code(self) -> i32 {
        match self {
            Self::Wildcards => 1,
            Self::NoEntry => 2,
            Self::AccessRead => 3,
            Self::Kernel => 4,
            Self::DivZero => 5,
            Self::ChipName => 6,
            Self::BusName => 7,
            Self::Parse => 8,
            Self::AccessWrite => 9,
            Self::Io => 10,
            Self::Recursion => 11,
        }
    }
}

/// Capability flags of a subfeature.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Mode {
    pub read: bool,
    pub write: bool,
}

impl Mode {
    pub const R: Mode = Mode { read: true, write: false };
    pub const W: Mode = Mode { read: false, write: true };
    pub const RW: Mode = Mode { read: true, write: true };
}

/// A logical sensor on a chip, e.g. `temp1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feature {
    pub name: String,
    pub number: u32,
}

/// One scalar under a feature, e.g. `temp1_input`. `number` is the id used
/// to request its value from the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subfeature {
    pub name: String,
    pub number: u32,
    pub mode: Mode,
}

impl Subfeature {
    pub fn is_readable(&self) -> bool {
        self.mode.read
    }
}

/// Boxed lazy sequence produced by a backend enumeration call.
pub type Enumeration<'a, T> = Box<dyn Iterator<Item = T> + 'a>;

/// Device discovery and value acquisition.
///
/// Enumerations are finite and consumed once; calling the method again
/// starts a fresh traversal from the first item.
pub trait SensorBackend {
    /// Parsed chip selector.
    type Pattern;
    /// Handle to one detected chip, valid for the backend session.
    type Chip;

    fn parse_chip_name(&self, name: &str) -> Result<Self::Pattern, BackendError>;

    /// Detected chips matching `pattern`, in registry order.
    fn detected_chips<'a>(&'a self, pattern: &'a Self::Pattern) -> Enumeration<'a, &'a Self::Chip>;

    /// Printable chip identifier.
    fn chip_name(&self, chip: &Self::Chip) -> String;

    fn features<'a>(&'a self, chip: &'a Self::Chip) -> Enumeration<'a, Feature>;

    fn subfeatures<'a>(
        &'a self,
        chip: &'a Self::Chip,
        feature: &'a Feature,
    ) -> Enumeration<'a, Subfeature>;

    fn get_value(&self, chip: &Self::Chip, number: u32) -> Result<f64, BackendError>;
}
