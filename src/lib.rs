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

//! Sensorpoll - poll a single hwmon chip and print its readings
//!
//! The library exposes the discovery and polling pipeline: chip selection,
//! working-set collection, the per-cycle emitter and the cancellable poll
//! loop, on top of a pluggable sensor backend with a sysfs implementation.

pub mod app;
pub mod backend;
pub mod chip_name;
pub mod cli;
pub mod collector;
pub mod config;
pub mod emitter;
pub mod error;
pub mod hwmon;
pub mod interval;
pub mod logger;
pub mod matcher;
pub mod poll;

#[cfg(test)]
pub mod test_utils;
