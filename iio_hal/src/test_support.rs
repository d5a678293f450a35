//! Fake IIO tree for unit tests.

use iio_common::sysfs::IioPaths;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

pub(crate) struct FakeIio {
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

    /// Device directory with `name`, buffer switch and trigger selector.
    pub fn add_device(&self, dev: usize, name: &str) {
        let root = self.paths.device_dir(dev);
        fs::create_dir_all(root.join("scan_elements")).unwrap();
        fs::create_dir_all(root.join("buffer")).unwrap();
        fs::create_dir_all(root.join("trigger")).unwrap();
        fs::write(root.join("name"), format!("{name}\n")).unwrap();
        fs::write(self.paths.buffer_enable(dev), "0\n").unwrap();
        fs::write(self.paths.current_trigger(dev), "none\n").unwrap();
    }

    pub fn add_scan_channel(&self, dev: usize, stem: &str, spec: &str, index: i64, enabled: bool) {
        self.write_scan_attr(dev, &format!("{stem}_type"), spec);
        self.write_scan_attr(dev, &format!("{stem}_index"), &index.to_string());
        self.write_scan_attr(dev, &format!("{stem}_en"), if enabled { "1" } else { "0" });
    }

    pub fn write_scan_attr(&self, dev: usize, attr: &str, value: &str) {
        fs::write(self.paths.scan_element(dev, attr), format!("{value}\n")).unwrap();
    }

    pub fn remove_scan_attr(&self, dev: usize, attr: &str) {
        fs::remove_file(self.paths.scan_element(dev, attr)).unwrap();
    }

    pub fn write_attr(&self, dev: usize, attr: &str, value: &str) {
        fs::write(self.paths.attribute(dev, attr), format!("{value}\n")).unwrap();
    }

    pub fn read(&self, path: PathBuf) -> String {
        fs::read_to_string(path).unwrap().trim_end().to_string()
    }

    /// Pollable FIFO standing in for `/dev/iio:deviceN`.
    pub fn add_dev_fifo(&self, dev: usize) {
        nix::unistd::mkfifo(&self.paths.dev_file(dev), nix::sys::stat::Mode::S_IRWXU).unwrap();
    }

    /// Regular file standing in for the device of a poll-mode sensor.
    pub fn add_dev_file(&self, dev: usize, content: &[u8]) {
        fs::write(self.paths.dev_file(dev), content).unwrap();
    }
}
