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

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::hwmon::DEFAULT_SYSFS_ROOT;

fn default_sysfs_root() -> PathBuf { PathBuf::from(DEFAULT_SYSFS_ROOT) }
fn default_log_level() -> String { "warn".to_string() }

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// hwmon class directory to scan for chips
    #[serde(default = "default_sysfs_root")]
    pub sysfs_root: PathBuf,
    /// tracing filter used when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sysfs_root: default_sysfs_root(),
            log_level: default_log_level(),
        }
    }
}

pub fn config_path() -> Option<PathBuf> {
    if let Ok(xdg) = env::var("XDG_CONFIG_HOME") {
        if !xdg.is_empty() {
            return Some(Path::new(&xdg).join("sensorpoll").join("config.json"));
        }
    }
    env::var("HOME").ok().map(|home| {
        Path::new(&home)
            .join(".config")
            .join("sensorpoll")
            .join("config.json")
    })
}

/// Load `explicit` if given (it must exist), else the user config file if
/// present, else defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    if let Some(path) = explicit {
        return read_config(path);
    }
    match config_path() {
        Some(path) if path.is_file() => read_config(&path),
        _ => Ok(Config::default()),
    }
}

fn read_config(path: &Path) -> Result<Config> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&data).with_context(|| format!("failed to parse {}", path.display()))
}
