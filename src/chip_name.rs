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

//! Chip identifiers (`prefix-bus-address`) and the patterns that select them.

use std::fmt;

use crate::backend::BackendError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusType {
    Isa,
    Pci,
    I2c,
    Spi,
    Virtual,
    Acpi,
    Hid,
    Mdio,
    Scsi,
}

impl BusType {
    pub fn as_str(self) -> &'static str {
        match self {
            BusType::Isa => "isa",
            BusType::Pci => "pci",
            BusType::I2c => "i2c",
            BusType::Spi => "spi",
            BusType::Virtual => "virtual",
            BusType::Acpi => "acpi",
            BusType::Hid => "hid",
            BusType::Mdio => "mdio",
            BusType::Scsi => "scsi",
        }
    }

    fn from_name(s: &str) -> Option<Self> {
        Some(match s {
            "isa" => BusType::Isa,
            "pci" => BusType::Pci,
            "i2c" => BusType::I2c,
            "spi" => BusType::Spi,
            "virtual" => BusType::Virtual,
            "acpi" => BusType::Acpi,
            "hid" => BusType::Hid,
            "mdio" => BusType::Mdio,
            "scsi" => BusType::Scsi,
            _ => return None,
        })
    }

    /// Buses that carry an adapter number between the bus type and the address.
    pub fn has_number(self) -> bool {
        matches!(self, BusType::I2c | BusType::Spi | BusType::Hid | BusType::Scsi)
    }
}

/// Concrete identity of a detected chip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChipName {
    pub prefix: String,
    pub bus: BusType,
    pub nr: u16,
    pub addr: u32,
}

impl fmt::Display for ChipName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bus = self.bus.as_str();
        match self.bus {
            BusType::Isa | BusType::Pci => write!(f, "{}-{}-{:04x}", self.prefix, bus, self.addr),
            BusType::I2c => write!(f, "{}-{}-{}-{:02x}", self.prefix, bus, self.nr, self.addr),
            BusType::Spi | BusType::Hid | BusType::Scsi => {
                write!(f, "{}-{}-{}-{:x}", self.prefix, bus, self.nr, self.addr)
            }
            BusType::Virtual | BusType::Acpi | BusType::Mdio => {
                write!(f, "{}-{}-{:x}", self.prefix, bus, self.addr)
            }
        }
    }
}

/// Chip selector. `None` components are wildcards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChipPattern {
    pub prefix: Option<String>,
    pub bus: Option<BusType>,
    pub nr: Option<u16>,
    pub addr: Option<u32>,
}

impl ChipPattern {
    /// Parse `prefix`, `prefix-*` or `prefix-bus-[nr-]addr`; any component
    /// may be `*`.
    pub fn parse(s: &str) -> Result<Self, BackendError> {
        let (prefix, rest) = match s.split_once('-') {
            Some((p, r)) => (p, Some(r)),
            None => (s, None),
        };
        if prefix.is_empty() {
            return Err(BackendError::ChipName);
        }

        let mut pattern = ChipPattern {
            prefix: (prefix != "*").then(|| prefix.to_string()),
            ..Default::default()
        };

        let rest = match rest {
            None | Some("*") => return Ok(pattern),
            Some(r) => r,
        };

        let (bus_name, rest) = rest.split_once('-').ok_or(BackendError::ChipName)?;
        let bus = if bus_name == "*" {
            None
        } else {
            Some(BusType::from_name(bus_name).ok_or(BackendError::BusName)?)
        };
        pattern.bus = bus;

        let addr = match bus {
            Some(b) if b.has_number() => {
                let (nr, addr) = rest.split_once('-').ok_or(BackendError::ChipName)?;
                pattern.nr = parse_component(nr, 10)?
                    .map(u16::try_from)
                    .transpose()
                    .map_err(|_| BackendError::ChipName)?;
                addr
            }
            _ => rest,
        };
        pattern.addr = parse_component(addr, 16)?;

        Ok(pattern)
    }

    pub fn matches(&self, chip: &ChipName) -> bool {
        self.prefix.as_deref().map_or(true, |p| p == chip.prefix)
            && self.bus.map_or(true, |b| b == chip.bus)
            && self.nr.map_or(true, |n| n == chip.nr)
            && self.addr.map_or(true, |a| a == chip.addr)
    }
}

fn parse_component(s: &str, radix: u32) -> Result<Option<u32>, BackendError> {
    if s == "*" {
        return Ok(None);
    }
    if s.is_empty() || !s.chars().all(|c| c.is_digit(radix)) {
        return Err(BackendError::ChipName);
    }
    u32::from_str_radix(s, radix)
        .map(Some)
        .map_err(|_| BackendError::ChipName)
}
