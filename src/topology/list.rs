//! The collected device list and its lifecycle.

use super::builder::{BuildError, TopologyBuilder};
use super::order::sort_devices;
use crate::model::Device;
use crate::source::AttributeSource;
use log::warn;

/// What to do when a device cannot be built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BuildPolicy {
    /// Log the failure and continue with the remaining devices.
    #[default]
    Skip,
    /// Stop at the first failure and return it.
    Abort,
}

/// Owned list of built devices.
///
/// Each build call appends to the list through `&mut self`; sharing one list
/// between threads needs external synchronization.
#[derive(Debug, Default)]
pub struct DeviceList {
    devices: Vec<Device>,
}

impl DeviceList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an already-built device.
    pub fn push(&mut self, device: Device) {
        self.devices.push(device);
    }

    /// Build the device behind `handle` and append it.
    pub fn build<S: AttributeSource>(
        &mut self,
        builder: &TopologyBuilder<'_, S>,
        handle: &S::Handle,
    ) -> Result<&Device, BuildError> {
        let device = builder.build_device(handle)?;
        self.devices.push(device);
        Ok(&self.devices[self.devices.len() - 1])
    }

    /// Build and append a device per handle, returning how many were added.
    pub fn collect<S, I>(
        &mut self,
        source: &S,
        handles: I,
        policy: BuildPolicy,
    ) -> Result<usize, BuildError>
    where
        S: AttributeSource,
        I: IntoIterator<Item = S::Handle>,
    {
        let builder = TopologyBuilder::new(source);
        let mut added = 0;

        for handle in handles {
            match self.build(&builder, &handle) {
                Ok(_) => added += 1,
                Err(e) if policy == BuildPolicy::Skip => {
                    warn!("Skipping device: {}", e);
                }
                Err(e) => return Err(e),
            }
        }

        Ok(added)
    }

    /// Reorder the list ascending by (busnum, devnum), keeping input order
    /// among equal keys. Device contents are untouched.
    pub fn sort(&mut self) {
        self.devices = sort_devices(std::mem::take(&mut self.devices));
    }

    /// Drop every device tree and empty the list, returning how many devices
    /// were released.
    pub fn release(&mut self) -> usize {
        let released = self.devices.len();
        self.devices.clear();
        self.devices.shrink_to_fit();
        released
    }

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn iter(&self) -> impl Iterator<Item = &Device> {
        self.devices.iter()
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}
