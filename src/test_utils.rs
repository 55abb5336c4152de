/*
 * Test utilities and mock helpers for Sensorpoll
 *
 * This module provides a scripted in-memory backend and builders for fake
 * sysfs hwmon trees that can be used across different test modules.
 */

#[cfg(test)]
pub mod test_utils {
    use crate::backend::{BackendError, Enumeration, Feature, Mode, SensorBackend, Subfeature};
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;
    use std::fs;
    use std::io::{self, Write};
    use std::os::unix::fs::{symlink, PermissionsExt};
    use std::path::PathBuf;
    use tempfile::TempDir;

    /// Scripted result of reading one point.
    #[derive(Debug, Clone)]
    pub enum FakeValue {
        Fixed(f64),
        Error(BackendError),
        /// Fails on the first `n` reads, then returns the value.
        FailFirst(usize, f64),
    }

    #[derive(Debug, Clone)]
    pub struct FakePoint {
        pub name: String,
        pub mode: Mode,
        pub value: FakeValue,
    }

    impl FakePoint {
        pub fn ok(name: &str, value: f64) -> Self {
            Self { name: name.to_string(), mode: Mode::R, value: FakeValue::Fixed(value) }
        }

        pub fn failing(name: &str, err: BackendError) -> Self {
            Self { name: name.to_string(), mode: Mode::R, value: FakeValue::Error(err) }
        }

        pub fn flaky(name: &str, failures: usize, value: f64) -> Self {
            Self { name: name.to_string(), mode: Mode::R, value: FakeValue::FailFirst(failures, value) }
        }

        pub fn write_only(name: &str) -> Self {
            Self { name: name.to_string(), mode: Mode::W, value: FakeValue::Error(BackendError::AccessRead) }
        }
    }

    #[derive(Debug, Clone)]
    pub struct FakeChip {
        pub name: String,
        pub features: Vec<(String, Vec<FakePoint>)>,
    }

    impl FakeChip {
        pub fn new(name: &str) -> Self {
            Self { name: name.to_string(), features: Vec::new() }
        }

        pub fn feature(mut self, name: &str, points: Vec<FakePoint>) -> Self {
            self.features.push((name.to_string(), points));
            self
        }

        fn points(&self) -> impl Iterator<Item = &FakePoint> {
            self.features.iter().flat_map(|(_, points)| points.iter())
        }
    }

    /// Pattern understood by [`FakeBackend`]: exact name, or a prefix followed by `*`.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct FakePattern(String);

    impl FakePattern {
        fn matches(&self, name: &str) -> bool {
            match self.0.strip_suffix('*') {
                Some(prefix) => name.starts_with(prefix),
                None => name == self.0,
            }
        }
    }

    type ReadHook = Box<dyn Fn(&str)>;

    /// In-memory backend. Subfeature numbers are assigned per chip in
    /// declaration order; reads are counted per point name.
    #[derive(Default)]
    pub struct FakeBackend {
        chips: Vec<FakeChip>,
        queries: Cell<usize>,
        reads: RefCell<HashMap<String, usize>>,
        on_read: Option<ReadHook>,
    }

    impl FakeBackend {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn chip(mut self, chip: FakeChip) -> Self {
            self.chips.push(chip);
            self
        }

        /// Run `hook` with the point name before every read.
        pub fn on_read(mut self, hook: impl Fn(&str) + 'static) -> Self {
            self.on_read = Some(Box::new(hook));
            self
        }

        /// Number of `detected_chips` enumerations started.
        pub fn queries(&self) -> usize {
            self.queries.get()
        }

        pub fn read_count(&self, point: &str) -> usize {
            self.reads.borrow().get(point).copied().unwrap_or(0)
        }
    }

    impl SensorBackend for FakeBackend {
        type Pattern = FakePattern;
        type Chip = FakeChip;

        fn parse_chip_name(&self, name: &str) -> Result<FakePattern, BackendError> {
            if name.is_empty() || name.contains(char::is_whitespace) {
                return Err(BackendError::ChipName);
            }
            Ok(FakePattern(name.to_string()))
        }

        fn detected_chips<'a>(&'a self, pattern: &'a FakePattern) -> Enumeration<'a, &'a FakeChip> {
            self.queries.set(self.queries.get() + 1);
            Box::new(self.chips.iter().filter(move |c| pattern.matches(&c.name)))
        }

        fn chip_name(&self, chip: &FakeChip) -> String {
            chip.name.clone()
        }

        fn features<'a>(&'a self, chip: &'a FakeChip) -> Enumeration<'a, Feature> {
            Box::new(chip.features.iter().enumerate().map(|(i, (name, _))| Feature {
                name: name.clone(),
                number: i as u32,
            }))
        }

        fn subfeatures<'a>(&'a self, chip: &'a FakeChip, feature: &'a Feature) -> Enumeration<'a, Subfeature> {
            let first: usize = chip.features[..feature.number as usize]
                .iter()
                .map(|(_, points)| points.len())
                .sum();
            let points = &chip.features[feature.number as usize].1;
            Box::new(points.iter().enumerate().map(move |(i, p)| Subfeature {
                name: p.name.clone(),
                number: (first + i) as u32,
                mode: p.mode,
            }))
        }

        fn get_value(&self, chip: &FakeChip, number: u32) -> Result<f64, BackendError> {
            let point = chip.points().nth(number as usize).ok_or(BackendError::NoEntry)?;
            if let Some(hook) = &self.on_read {
                hook(&point.name);
            }
            let previous = {
                let mut reads = self.reads.borrow_mut();
                let count = reads.entry(point.name.clone()).or_insert(0);
                *count += 1;
                *count - 1
            };
            match point.value {
                FakeValue::Fixed(v) => Ok(v),
                FakeValue::Error(e) => Err(e),
                FakeValue::FailFirst(n, _) if previous < n => Err(BackendError::Kernel),
                FakeValue::FailFirst(_, v) => Ok(v),
            }
        }
    }

    /// Writer that runs a callback on every flush.
    pub struct FlushHook<F: FnMut()> {
        pub buf: Vec<u8>,
        hook: F,
    }

    impl<F: FnMut()> FlushHook<F> {
        pub fn new(hook: F) -> Self {
            Self { buf: Vec::new(), hook }
        }

        pub fn text(&self) -> String {
            String::from_utf8_lossy(&self.buf).into_owned()
        }
    }

    impl<F: FnMut()> Write for FlushHook<F> {
        fn write(&mut self, data: &[u8]) -> io::Result<usize> {
            self.buf.extend_from_slice(data);
            Ok(data.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            (self.hook)();
            Ok(())
        }
    }

    /// Temporary sysfs layout: `<tmp>/class/hwmon/hwmonN`, `<tmp>/devices/*`
    /// and `<tmp>/bus/*`.
    pub struct HwmonFixture {
        dir: TempDir,
    }

    impl HwmonFixture {
        pub fn new() -> Self {
            let dir = TempDir::new().unwrap();
            fs::create_dir_all(dir.path().join("class").join("hwmon")).unwrap();
            Self { dir }
        }

        pub fn root(&self) -> PathBuf {
            self.dir.path().join("class").join("hwmon")
        }

        /// hwmon entry with a `name` attribute and no device link.
        pub fn chip(&self, tag: &str, name: &str) -> ChipFixture {
            let chip = self.bare(tag);
            fs::write(chip.dir.join("name"), format!("{}\n", name)).unwrap();
            chip
        }

        /// hwmon entry without any attributes.
        pub fn bare(&self, tag: &str) -> ChipFixture {
            let dir = self.root().join(tag);
            fs::create_dir_all(&dir).unwrap();
            ChipFixture { dir }
        }

        /// Device node `dev_name` on bus `subsystem`.
        pub fn device(&self, subsystem: &str, dev_name: &str) -> DeviceFixture<'_> {
            let bus = self.dir.path().join("bus").join(subsystem);
            let path = self.dir.path().join("devices").join(dev_name);
            fs::create_dir_all(&bus).unwrap();
            fs::create_dir_all(&path).unwrap();
            symlink(&bus, path.join("subsystem")).unwrap();
            DeviceFixture { fixture: self, path }
        }
    }

    pub struct DeviceFixture<'a> {
        fixture: &'a HwmonFixture,
        path: PathBuf,
    }

    impl DeviceFixture<'_> {
        /// hwmon entry linked to this device, attributes in the hwmon dir.
        pub fn chip(self, tag: &str, name: &str) -> ChipFixture {
            let chip = self.fixture.chip(tag, name);
            symlink(&self.path, chip.dir.join("device")).unwrap();
            chip
        }

        /// hwmon entry whose attributes live in the device dir.
        pub fn chip_in_device(self, tag: &str, name: &str) -> ChipFixture {
            let hwmon = self.fixture.bare(tag);
            symlink(&self.path, hwmon.dir.join("device")).unwrap();
            fs::write(self.path.join("name"), format!("{}\n", name)).unwrap();
            ChipFixture { dir: self.path }
        }
    }

    pub struct ChipFixture {
        dir: PathBuf,
    }

    impl ChipFixture {
        pub fn attr(self, name: &str, value: &str) -> Self {
            fs::write(self.dir.join(name), format!("{}\n", value)).unwrap();
            self
        }

        pub fn write_only(self, name: &str) -> Self {
            let path = self.dir.join(name);
            fs::write(&path, "0\n").unwrap();
            fs::set_permissions(&path, fs::Permissions::from_mode(0o200)).unwrap();
            self
        }
    }
}
