//! Sysfs attribute source for USB device information.

use super::{AttributeSource, Child, SourceError};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Default location of USB device entries.
pub const SYSFS_USB_DEVICES: &str = "/sys/bus/usb/devices";

/// Attribute source reading Linux sysfs.
///
/// Handles are sysfs directory paths. Attribute values are file contents with
/// trailing whitespace stripped.
#[derive(Debug, Clone)]
pub struct SysfsSource {
    base_path: PathBuf,
}

impl Default for SysfsSource {
    fn default() -> Self {
        Self::new()
    }
}

impl SysfsSource {
    /// Create a source using the default sysfs path.
    pub fn new() -> Self {
        Self {
            base_path: PathBuf::from(SYSFS_USB_DEVICES),
        }
    }

    /// Create a source with a custom base path (for testing).
    pub fn with_base_path(base_path: impl AsRef<Path>) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    /// Base directory devices are enumerated from.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Enumerate USB device entries (not interfaces) under the base path,
    /// sorted by name.
    pub fn devices(&self) -> Result<Vec<Child<PathBuf>>, SourceError> {
        let entries = std::fs::read_dir(&self.base_path).map_err(|e| SourceError::Children {
            handle: self.base_path.display().to_string(),
            source: e,
        })?;

        let mut devices: Vec<Child<PathBuf>> = entries
            .flatten()
            .filter_map(|entry| {
                let name = entry.file_name().to_string_lossy().to_string();
                let path = entry.path();
                is_usb_device(&path, &name).then_some(Child { name, handle: path })
            })
            .collect();

        devices.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(devices)
    }
}

/// Device entries carry `DEVTYPE=usb_device` in their uevent file. Without a
/// readable uevent, interface entries are recognised by the ':' in their name.
fn is_usb_device(path: &Path, name: &str) -> bool {
    match std::fs::read_to_string(path.join("uevent")) {
        Ok(uevent) => uevent
            .lines()
            .filter_map(|line| line.strip_prefix("DEVTYPE="))
            .any(|devtype| devtype.trim() == "usb_device"),
        Err(_) => !name.contains(':'),
    }
}

impl AttributeSource for SysfsSource {
    type Handle = PathBuf;
    type Stream = BufReader<File>;

    fn attribute(&self, handle: &PathBuf, name: &str) -> Option<String> {
        let content = std::fs::read_to_string(handle.join(name)).ok()?;
        Some(content.trim_end().to_string())
    }

    fn driver(&self, handle: &PathBuf) -> Option<String> {
        let target = std::fs::read_link(handle.join("driver")).ok()?;
        target
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
    }

    fn children(&self, handle: &PathBuf) -> Result<Vec<Child<PathBuf>>, SourceError> {
        let entries = std::fs::read_dir(handle).map_err(|e| SourceError::Children {
            handle: handle.display().to_string(),
            source: e,
        })?;

        // Only real directories: "driver", "port", "subsystem" are symlinks
        let mut children: Vec<Child<PathBuf>> = entries
            .flatten()
            .filter(|entry| entry.file_type().is_ok_and(|t| t.is_dir()))
            .map(|entry| Child {
                name: entry.file_name().to_string_lossy().to_string(),
                handle: entry.path(),
            })
            .collect();

        children.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(children)
    }

    fn descriptors(&self, handle: &PathBuf) -> Result<BufReader<File>, SourceError> {
        let file = File::open(handle.join("descriptors")).map_err(|e| SourceError::Descriptors {
            handle: handle.display().to_string(),
            source: e,
        })?;
        Ok(BufReader::new(file))
    }
}
