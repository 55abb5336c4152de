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

//! sysfs hwmon backend.
//!
//! A session scans the hwmon class directory once and keeps a registry of
//! chips with their features and subfeatures. Values are read from the
//! attribute files on demand and scaled to natural units.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Read};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use tracing::{debug, info, trace};

use crate::backend::{BackendError, Enumeration, Feature, Mode, SensorBackend, Subfeature};
use crate::chip_name::{BusType, ChipName, ChipPattern};

pub const DEFAULT_SYSFS_ROOT: &str = "/sys/class/hwmon";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum FeatureKind {
    In,
    Fan,
    Temp,
    Power,
    Energy,
    Curr,
    Humidity,
    Pwm,
    Vid,
    Intrusion,
    BeepEnable,
}

impl FeatureKind {
    fn from_prefix(prefix: &str) -> Option<Self> {
        Some(match prefix {
            "in" => FeatureKind::In,
            "fan" => FeatureKind::Fan,
            "temp" => FeatureKind::Temp,
            "power" => FeatureKind::Power,
            "energy" => FeatureKind::Energy,
            "curr" => FeatureKind::Curr,
            "humidity" => FeatureKind::Humidity,
            "pwm" => FeatureKind::Pwm,
            "cpu" => FeatureKind::Vid,
            "intrusion" => FeatureKind::Intrusion,
            _ => return None,
        })
    }

    fn feature_name(self, index: u32) -> String {
        match self {
            FeatureKind::In => format!("in{}", index),
            FeatureKind::Fan => format!("fan{}", index),
            FeatureKind::Temp => format!("temp{}", index),
            FeatureKind::Power => format!("power{}", index),
            FeatureKind::Energy => format!("energy{}", index),
            FeatureKind::Curr => format!("curr{}", index),
            FeatureKind::Humidity => format!("humidity{}", index),
            FeatureKind::Pwm => format!("pwm{}", index),
            FeatureKind::Vid => format!("cpu{}_vid", index),
            FeatureKind::Intrusion => format!("intrusion{}", index),
            FeatureKind::BeepEnable => "beep_enable".to_string(),
        }
    }

    /// Canonical subfeature order: main value first, then limits, then flags.
    fn suffix_order(self) -> &'static [&'static str] {
        match self {
            FeatureKind::In | FeatureKind::Curr => &[
                "input", "min", "max", "lcrit", "crit", "average", "lowest", "highest",
                "alarm", "min_alarm", "max_alarm", "beep", "lcrit_alarm", "crit_alarm",
            ],
            FeatureKind::Fan => &[
                "input", "min", "max", "alarm", "fault", "div", "beep", "pulses",
                "min_alarm", "max_alarm",
            ],
            FeatureKind::Temp => &[
                "input", "max", "max_hyst", "min", "min_hyst", "crit", "crit_hyst",
                "lcrit", "lcrit_hyst", "emergency", "emergency_hyst", "lowest", "highest",
                "min_alarm", "max_alarm", "crit_alarm", "emergency_alarm", "lcrit_alarm",
                "alarm", "fault", "type", "offset", "beep",
            ],
            FeatureKind::Power => &[
                "average", "average_highest", "average_lowest", "input", "input_highest",
                "input_lowest", "cap", "cap_hyst", "cap_max", "cap_min", "max", "crit",
                "min", "lcrit", "average_interval", "alarm", "cap_alarm", "max_alarm",
                "crit_alarm", "min_alarm", "lcrit_alarm",
            ],
            FeatureKind::Energy | FeatureKind::Humidity => &["input"],
            FeatureKind::Pwm => &["", "enable", "mode", "freq", "auto_channels_temp"],
            FeatureKind::Vid => &["vid"],
            FeatureKind::Intrusion => &["alarm", "beep"],
            FeatureKind::BeepEnable => &[""],
        }
    }

    fn scale(self, suffix: &str) -> f64 {
        let is_flag = suffix.ends_with("alarm")
            || suffix.ends_with("beep")
            || matches!(
                suffix,
                "fault" | "type" | "enable" | "mode" | "div" | "pulses" | "freq" | "auto_channels_temp"
            );
        if is_flag {
            return 1.0;
        }
        match self {
            FeatureKind::In | FeatureKind::Temp | FeatureKind::Curr | FeatureKind::Humidity | FeatureKind::Vid => 1e3,
            FeatureKind::Power if suffix == "average_interval" => 1e3,
            FeatureKind::Power | FeatureKind::Energy => 1e6,
            FeatureKind::Fan | FeatureKind::Pwm | FeatureKind::Intrusion | FeatureKind::BeepEnable => 1.0,
        }
    }
}

/// Split an attribute file name into feature kind, feature index and
/// subfeature suffix. Labels and unknown attributes yield `None`.
fn parse_attribute(fname: &str) -> Option<(FeatureKind, u32, &str)> {
    if fname == "beep_enable" {
        return Some((FeatureKind::BeepEnable, 0, ""));
    }

    let split = fname.find(|c: char| c.is_ascii_digit())?;
    let (prefix, rest) = fname.split_at(split);
    let kind = FeatureKind::from_prefix(prefix)?;

    let digits_end = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
    let index: u32 = rest[..digits_end].parse().ok()?;
    let suffix = match &rest[digits_end..] {
        "" => "",
        s => s.strip_prefix('_')?,
    };

    let valid = match kind {
        _ if suffix == "label" => false,
        FeatureKind::Pwm => true,
        FeatureKind::Vid => suffix == "vid",
        _ => !suffix.is_empty(),
    };
    valid.then_some((kind, index, suffix))
}

#[derive(Debug)]
struct Attribute {
    feature: u32,
    subfeature: Subfeature,
    path: PathBuf,
    scale: f64,
}

/// One detected chip. Subfeature numbers index `attributes`.
#[derive(Debug)]
pub struct HwmonChip {
    name: ChipName,
    dir: PathBuf,
    features: Vec<Feature>,
    attributes: Vec<Attribute>,
}

impl HwmonChip {
    pub fn name(&self) -> &ChipName {
        &self.name
    }

    pub(crate) fn dir(&self) -> &Path {
        &self.dir
    }
}

/// Backend session over a sysfs hwmon class directory.
#[derive(Debug)]
pub struct HwmonBackend {
    root: PathBuf,
    chips: Vec<HwmonChip>,
    active: bool,
}

impl HwmonBackend {
    /// Open a session and scan all chips under `root`.
    pub fn init(root: impl Into<PathBuf>) -> Result<Self, BackendError> {
        let root = root.into();
        let chips = scan_chips(&root).map_err(|e| {
            debug!(root = %root.display(), error = %e, "cannot read hwmon class directory");
            BackendError::Kernel
        })?;
        for chip in &chips {
            debug!(chip = %chip.name(), dir = %chip.dir().display(), "chip registered");
        }
        info!(root = %root.display(), chips = chips.len(), "sensor backend initialised");
        Ok(Self { root, chips, active: true })
    }

    /// End the session. Safe to call more than once.
    pub fn cleanup(&mut self) {
        if self.active {
            self.chips.clear();
            self.active = false;
            debug!(root = %self.root.display(), "sensor backend cleaned up");
        }
    }

    pub fn chips(&self) -> &[HwmonChip] {
        &self.chips
    }
}

impl Drop for HwmonBackend {
    fn drop(&mut self) {
        self.cleanup();
    }
}

impl SensorBackend for HwmonBackend {
    type Pattern = ChipPattern;
    type Chip = HwmonChip;

    fn parse_chip_name(&self, name: &str) -> Result<ChipPattern, BackendError> {
        ChipPattern::parse(name)
    }

    fn detected_chips<'a>(&'a self, pattern: &'a ChipPattern) -> Enumeration<'a, &'a HwmonChip> {
        Box::new(self.chips.iter().filter(move |c| pattern.matches(&c.name)))
    }

    fn chip_name(&self, chip: &HwmonChip) -> String {
        chip.name.to_string()
    }

    fn features<'a>(&'a self, chip: &'a HwmonChip) -> Enumeration<'a, Feature> {
        Box::new(chip.features.iter().cloned())
    }

    fn subfeatures<'a>(&'a self, chip: &'a HwmonChip, feature: &'a Feature) -> Enumeration<'a, Subfeature> {
        Box::new(
            chip.attributes
                .iter()
                .filter(move |a| a.feature == feature.number)
                .map(|a| a.subfeature.clone()),
        )
    }

    fn get_value(&self, chip: &HwmonChip, number: u32) -> Result<f64, BackendError> {
        let attr = chip
            .attributes
            .get(number as usize)
            .ok_or(BackendError::NoEntry)?;
        if !attr.subfeature.mode.read {
            return Err(BackendError::AccessRead);
        }

        let raw = read_trimmed(&attr.path).map_err(|e| {
            debug!(path = %attr.path.display(), error = %e, "attribute read failed");
            BackendError::Kernel
        })?;
        let value: f64 = raw.parse().map_err(|_| {
            debug!(path = %attr.path.display(), raw = %raw, "attribute is not numeric");
            BackendError::Kernel
        })?;
        Ok(value / attr.scale)
    }
}

fn scan_chips(root: &Path) -> io::Result<Vec<HwmonChip>> {
    let mut entries: Vec<PathBuf> = fs::read_dir(root)?.flatten().map(|e| e.path()).collect();
    entries.sort_by_key(|p| {
        let tag = p.file_name().and_then(|s| s.to_str()).unwrap_or("").to_string();
        (extract_index(&tag, "hwmon", "").unwrap_or(usize::MAX), tag)
    });

    Ok(entries.iter().filter_map(|p| load_chip(p)).collect())
}

fn load_chip(hwmon_dir: &Path) -> Option<HwmonChip> {
    let attr_dir = if hwmon_dir.join("name").is_file() {
        hwmon_dir.to_path_buf()
    } else if hwmon_dir.join("device").join("name").is_file() {
        hwmon_dir.join("device")
    } else {
        debug!(dir = %hwmon_dir.display(), "skipping hwmon entry without name");
        return None;
    };

    let prefix = read_trimmed(attr_dir.join("name")).ok()?;
    let Some((bus, nr, addr)) = detect_bus(hwmon_dir) else {
        debug!(dir = %hwmon_dir.display(), chip = %prefix, "skipping chip on unsupported bus");
        return None;
    };
    let name = ChipName { prefix, bus, nr, addr };

    let (features, attributes) = scan_features(&attr_dir);
    trace!(chip = %name, features = features.len(), subfeatures = attributes.len(), "chip scanned");

    Some(HwmonChip { name, dir: attr_dir, features, attributes })
}

/// Work out bus type, adapter number and address from the `device` link.
fn detect_bus(hwmon_dir: &Path) -> Option<(BusType, u16, u32)> {
    let Ok(dev_path) = fs::canonicalize(hwmon_dir.join("device")) else {
        return Some((BusType::Virtual, 0, 0));
    };
    let dev_name = dev_path.file_name()?.to_str()?.to_string();
    let subsystem = fs::canonicalize(dev_path.join("subsystem")).ok()?;
    let subsystem = subsystem.file_name()?.to_str()?;

    match subsystem {
        "i2c" => {
            let (nr, addr) = dev_name.split_once('-')?;
            Some((BusType::I2c, nr.parse().ok()?, u32::from_str_radix(addr, 16).ok()?))
        }
        "spi" => {
            let (nr, cs) = dev_name.strip_prefix("spi")?.split_once('.')?;
            Some((BusType::Spi, nr.parse().ok()?, cs.parse().ok()?))
        }
        "pci" => {
            // DDDD:BB:SS.F
            let (domain, rest) = dev_name.split_once(':')?;
            let (bus, rest) = rest.split_once(':')?;
            let (slot, func) = rest.split_once('.')?;
            let hex = |s: &str| u32::from_str_radix(s, 16).ok();
            let addr = (hex(domain)? << 16) + (hex(bus)? << 8) + (hex(slot)? << 3) + hex(func)?;
            Some((BusType::Pci, 0, addr))
        }
        "platform" | "of_platform" => {
            let addr = dev_name
                .rsplit_once('.')
                .and_then(|(_, a)| a.parse().ok())
                .unwrap_or(0);
            Some((BusType::Isa, 0, addr))
        }
        "acpi" => Some((BusType::Acpi, 0, 0)),
        "hid" => {
            // BBBB:VVVV:PPPP.IIII
            let (bus, rest) = dev_name.split_once(':')?;
            let (_, id) = rest.rsplit_once('.')?;
            Some((BusType::Hid, u16::from_str_radix(bus, 16).ok()?, u32::from_str_radix(id, 16).ok()?))
        }
        "mdio_bus" => {
            let addr = dev_name
                .rsplit_once(':')
                .and_then(|(_, a)| u32::from_str_radix(a, 16).ok())
                .unwrap_or(0);
            Some((BusType::Mdio, 0, addr))
        }
        "scsi" => {
            // H:C:T:L
            let mut parts = dev_name.split(':');
            let host = parts.next()?.parse().ok()?;
            let target = parts.nth(1)?.parse().ok()?;
            Some((BusType::Scsi, host, target))
        }
        _ => None,
    }
}

struct AttrFile {
    suffix: String,
    name: String,
    path: PathBuf,
    mode: Mode,
}

fn file_mode(path: &Path) -> Option<Mode> {
    let meta = fs::metadata(path).ok()?;
    if !meta.is_file() {
        return None;
    }
    let bits = meta.permissions().mode();
    let mode = Mode { read: bits & 0o400 != 0, write: bits & 0o200 != 0 };
    (mode.read || mode.write).then_some(mode)
}

fn scan_features(dir: &Path) -> (Vec<Feature>, Vec<Attribute>) {
    let mut grouped: BTreeMap<(FeatureKind, u32), Vec<AttrFile>> = BTreeMap::new();

    if let Ok(dir_iter) = fs::read_dir(dir) {
        for file in dir_iter.flatten() {
            let fname = file.file_name();
            let fname = fname.to_string_lossy();
            let Some((kind, index, suffix)) = parse_attribute(&fname) else { continue };
            let path = file.path();
            let Some(mode) = file_mode(&path) else { continue };
            grouped.entry((kind, index)).or_default().push(AttrFile {
                suffix: suffix.to_string(),
                name: fname.to_string(),
                path,
                mode,
            });
        }
    }

    let mut features = Vec::with_capacity(grouped.len());
    let mut attributes = Vec::new();

    for ((kind, index), mut files) in grouped {
        let order = kind.suffix_order();
        files.sort_by(|a, b| {
            let rank = |s: &str| order.iter().position(|o| *o == s).unwrap_or(order.len());
            rank(&a.suffix).cmp(&rank(&b.suffix)).then_with(|| a.suffix.cmp(&b.suffix))
        });

        let feature_number = features.len() as u32;
        features.push(Feature { name: kind.feature_name(index), number: feature_number });

        for f in files {
            let number = attributes.len() as u32;
            attributes.push(Attribute {
                feature: feature_number,
                subfeature: Subfeature { name: f.name, number, mode: f.mode },
                path: f.path,
                scale: kind.scale(&f.suffix),
            });
        }
    }

    (features, attributes)
}

fn read_trimmed<P: AsRef<Path>>(p: P) -> io::Result<String> {
    let mut s = String::new();
    fs::File::open(p)?.read_to_string(&mut s)?;
    Ok(s.trim().to_string())
}

pub fn extract_index(fname: &str, prefix: &str, suffix: &str) -> Option<usize> {
    if fname.starts_with(prefix) && fname.ends_with(suffix) && fname.len() >= prefix.len() + suffix.len() {
        let mid = &fname[prefix.len()..fname.len() - suffix.len()];
        mid.parse().ok()
    } else {
        None
    }
}
