//! Fake IIO tree: sysfs attributes under `<tmp>/sys`, device files under
//! `<tmp>/dev`.

use iio_common::config::HalConfig;
use iio_common::sysfs::IioPaths;
use iio_hal::SensorHal;
use nix::sys::stat::Mode;
use std::fs::{self, File, OpenOptions};
use tempfile::TempDir;

pub struct FakeIio {
    pub dir: TempDir,
    pub paths: IioPaths,
}

impl FakeIio {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("sys")).unwrap();
        fs::create_dir_all(dir.path().join("dev")).unwrap();
        let paths = IioPaths::new(dir.path().join("sys"), dir.path().join("dev"));
        Self { dir, paths }
    }

    pub fn config(&self) -> HalConfig {
        let mut config = HalConfig::with_service_name("iio-hal-it");
        config.paths.sysfs_root = self.dir.path().join("sys");
        config.paths.dev_root = self.dir.path().join("dev");
        config
    }

    pub fn hal(&self) -> SensorHal {
        SensorHal::new(self.config()).expect("create hal")
    }

    /// Device with `name`, buffer switch, trigger selector and a FIFO as
    /// character device.
    pub fn add_device(&self, dev: usize, name: &str) {
        let root = self.paths.device_dir(dev);
        fs::create_dir_all(root.join("scan_elements")).unwrap();
        fs::create_dir_all(root.join("buffer")).unwrap();
        fs::create_dir_all(root.join("trigger")).unwrap();
        fs::write(self.paths.name(dev), format!("{name}\n")).unwrap();
        fs::write(self.paths.buffer_enable(dev), "0\n").unwrap();
        fs::write(self.paths.current_trigger(dev), "none\n").unwrap();
        nix::unistd::mkfifo(&self.paths.dev_file(dev), Mode::S_IRWXU).unwrap();
    }

    pub fn add_scan_channel(&self, dev: usize, stem: &str, spec: &str, index: i64) {
        self.write_scan(dev, &format!("{stem}_type"), spec);
        self.write_scan(dev, &format!("{stem}_index"), &index.to_string());
        self.write_scan(dev, &format!("{stem}_en"), "0");
    }

    pub fn write_scan(&self, dev: usize, attr: &str, value: &str) {
        fs::write(self.paths.scan_element(dev, attr), format!("{value}\n")).unwrap();
    }

    pub fn write_attr(&self, dev: usize, attr: &str, value: &str) {
        fs::write(self.paths.attribute(dev, attr), format!("{value}\n")).unwrap();
    }

    pub fn read_attr(&self, dev: usize, attr: &str) -> String {
        let content = fs::read_to_string(self.paths.attribute(dev, attr)).unwrap();
        content.trim_end().to_string()
    }

    /// Write end of a device FIFO. Only valid while the HAL holds the
    /// device open.
    pub fn writer(&self, dev: usize) -> File {
        OpenOptions::new()
            .write(true)
            .open(self.paths.dev_file(dev))
            .expect("open device fifo for writing")
    }
}
