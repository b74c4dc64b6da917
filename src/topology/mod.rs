//! Device topology assembly, ordering and lifecycle.

pub mod builder;
pub mod list;
pub mod order;

pub use builder::{BuildError, EP0_NAME, TopologyBuilder};
pub use list::{BuildPolicy, DeviceList};
pub use order::sort_devices;
