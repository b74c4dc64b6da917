//! USB device listing.
//!
//! A library and CLI tool that builds a device → interface → endpoint tree
//! from sysfs, decodes each device's raw descriptor stream, and prints the
//! devices ordered by bus and device number.

pub mod config;
pub mod descriptor;
pub mod model;
pub mod output;
pub mod source;
pub mod topology;

pub use config::Config;
pub use descriptor::{Descriptor, DeviceQualifier, decode};
pub use model::{BusAddress, Device, Endpoint, Interface};
pub use source::{AttributeSource, MemorySource, SysfsSource};
pub use topology::{BuildPolicy, DeviceList, TopologyBuilder};
