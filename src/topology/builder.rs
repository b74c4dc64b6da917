//! Assembles device trees from an attribute source.

use crate::descriptor::{DecodeError, decode};
use crate::model::{BusAddress, Device, Endpoint, Interface};
use crate::source::{AttributeSource, Child, SourceError};
use log::{debug, warn};
use thiserror::Error;

/// Child entry holding a device's control endpoint.
pub const EP0_NAME: &str = "ep_00";

/// Errors building a single device.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error("{device}: {source}")]
    Decode {
        device: BusAddress,
        #[source]
        source: DecodeError,
    },
}

/// Builds [`Device`] trees from handles of an [`AttributeSource`].
pub struct TopologyBuilder<'a, S> {
    source: &'a S,
}

impl<'a, S: AttributeSource> TopologyBuilder<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self { source }
    }

    /// Build a device with its ep0, descriptor-derived fields, interfaces and
    /// their endpoints.
    ///
    /// Fails if the device's descriptor stream or child listing is
    /// unavailable. An interface whose endpoints cannot be listed is skipped
    /// with a warning.
    pub fn build_device(&self, handle: &S::Handle) -> Result<Device, BuildError> {
        let mut device = self.read_device(handle);

        let stream = self.source.descriptors(handle)?;
        let records = decode(stream, &mut device).map_err(|source| BuildError::Decode {
            device: device.address,
            source,
        })?;

        device.interfaces = self.build_interfaces(handle)?;

        debug!(
            "{}: {} descriptors, {} interfaces, {} endpoints",
            device.address,
            records.len(),
            device.interfaces.len(),
            device.endpoint_count()
        );

        Ok(device)
    }

    fn read_device(&self, handle: &S::Handle) -> Device {
        let attr = |name: &str| self.source.attribute(handle, name);

        let busnum = attr("busnum");
        let devnum = attr("devnum");

        Device {
            address: BusAddress::parse(busnum.as_deref(), devnum.as_deref()),
            busnum,
            devnum,
            id_vendor: attr("idVendor"),
            id_product: attr("idProduct"),
            manufacturer: attr("manufacturer"),
            product: attr("product"),
            serial: attr("serial"),
            bcd_device: attr("bcdDevice"),
            speed: attr("speed"),
            version: attr("version"),
            maxchild: attr("maxchild"),
            quirks: attr("quirks"),
            driver: self.source.driver(handle),
            b_configuration_value: attr("bConfigurationValue"),
            b_device_class: attr("bDeviceClass"),
            b_device_protocol: attr("bDeviceProtocol"),
            b_device_sub_class: attr("bDeviceSubClass"),
            b_num_configurations: attr("bNumConfigurations"),
            b_num_interfaces: attr("bNumInterfaces"),
            bm_attributes: attr("bmAttributes"),
            b_max_packet_size0: attr("bMaxPacketSize0"),
            b_max_power: attr("bMaxPower"),
            ep0: Endpoint::from_source(self.source, handle, EP0_NAME),
            interfaces: Vec::new(),
            qualifier: None,
        }
    }

    fn build_interfaces(&self, handle: &S::Handle) -> Result<Vec<Interface>, SourceError> {
        let mut interfaces = Vec::new();

        // Interface entries start with a digit (e.g. "1-1:1.0") and carry
        // bInterfaceClass; older kernels have no devtype to go by.
        for child in self.source.children(handle)? {
            if !child.name.starts_with(|c: char| c.is_ascii_digit())
                || !self.source.has_attribute(&child.handle, "bInterfaceClass")
            {
                continue;
            }

            let name = child.name.clone();
            match self.build_interface(child) {
                Ok(interface) => interfaces.push(interface),
                Err(e) => warn!("Skipping interface {}: {}", name, e),
            }
        }

        Ok(interfaces)
    }

    fn build_interface(&self, child: Child<S::Handle>) -> Result<Interface, SourceError> {
        let handle = &child.handle;
        let attr = |name: &str| self.source.attribute(handle, name);

        Ok(Interface {
            b_alternate_setting: attr("bAlternateSetting"),
            b_interface_class: attr("bInterfaceClass"),
            b_interface_number: attr("bInterfaceNumber"),
            b_interface_protocol: attr("bInterfaceProtocol"),
            b_interface_sub_class: attr("bInterfaceSubClass"),
            b_num_endpoints: attr("bNumEndpoints"),
            driver: self.source.driver(handle),
            endpoints: self.build_endpoints(handle)?,
            sysname: child.name,
        })
    }

    fn build_endpoints(&self, handle: &S::Handle) -> Result<Vec<Endpoint>, SourceError> {
        Ok(self
            .source
            .children(handle)?
            .into_iter()
            .filter(|child| child.name.starts_with("ep_"))
            .map(|child| Endpoint::from_source(self.source, handle, &child.name))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{MemorySource, NodeId};

    const DESCRIPTORS: [u8; 18] = [
        9, 0x02, 0x19, 0x00, 1, 1, 0, 0xE0, 0, //
        9, 0x06, 0x00, 0x02, 9, 0, 1, 64, 1,
    ];

    fn hub(src: &mut MemorySource) -> NodeId {
        let dev = src.add_device("usb1");
        for (name, value) in [
            ("busnum", "1"),
            ("devnum", "1"),
            ("idVendor", "1d6b"),
            ("idProduct", "0002"),
            ("manufacturer", "Linux Foundation"),
            ("speed", "480"),
            ("bDeviceClass", "09"),
            ("bMaxPower", "0mA"),
            ("maxchild", "4"),
        ] {
            src.set(dev, name, value);
        }
        src.set_driver(dev, "usb");
        src.set_descriptors(dev, DESCRIPTORS.to_vec());

        let ep0 = src.add_child(dev, "ep_00");
        src.set(ep0, "bEndpointAddress", "00");
        src.set(ep0, "type", "Control");

        let intf = src.add_child(dev, "1-0:1.0");
        src.set(intf, "bInterfaceClass", "09");
        src.set(intf, "bInterfaceNumber", "00");
        src.set(intf, "bNumEndpoints", "01");
        src.set_driver(intf, "hub");
        let ep = src.add_child(intf, "ep_81");
        src.set(ep, "bEndpointAddress", "81");
        src.set(ep, "type", "Interrupt");
        src.add_child(intf, "power");

        src.add_child(dev, "power");
        dev
    }

    #[test]
    fn test_build_device() {
        let mut src = MemorySource::new();
        let dev = hub(&mut src);

        let device = TopologyBuilder::new(&src).build_device(&dev).unwrap();
        assert_eq!(device.address, BusAddress::new(1, 1));
        assert_eq!(device.busnum.as_deref(), Some("1"));
        assert_eq!(device.id_vendor.as_deref(), Some("1d6b"));
        assert_eq!(device.manufacturer.as_deref(), Some("Linux Foundation"));
        assert_eq!(device.maxchild.as_deref(), Some("4"));
        assert_eq!(device.driver.as_deref(), Some("usb"));
        assert_eq!(device.serial, None);

        assert_eq!(device.ep0.name, "ep_00");
        assert_eq!(device.ep0.b_endpoint_address.as_deref(), Some("00"));

        let dq = device.qualifier.as_ref().expect("qualifier decoded");
        assert_eq!(dq.bcd_usb, "02.00");
        assert_eq!(dq.b_device_class, "9");

        assert_eq!(device.interfaces.len(), 1);
        let intf = &device.interfaces[0];
        assert_eq!(intf.sysname, "1-0:1.0");
        assert_eq!(intf.driver.as_deref(), Some("hub"));
        assert_eq!(intf.b_interface_class.as_deref(), Some("09"));
        assert_eq!(intf.endpoints.len(), 1);
        assert_eq!(intf.endpoints[0].name, "ep_81");
        assert_eq!(intf.endpoints[0].address(), Some(0x81));
    }

    #[test]
    fn test_interface_discovery_rules() {
        let mut src = MemorySource::new();
        let dev = hub(&mut src);
        // Digit prefix but no bInterfaceClass: not an interface
        let bogus = src.add_child(dev, "1-0:9.9");
        src.set(bogus, "bInterfaceNumber", "09");
        // bInterfaceClass without digit prefix: not an interface
        let other = src.add_child(dev, "x-1:1.0");
        src.set(other, "bInterfaceClass", "03");
        let second = src.add_child(dev, "1-0:1.1");
        src.set(second, "bInterfaceClass", "03");

        let device = TopologyBuilder::new(&src).build_device(&dev).unwrap();
        let names: Vec<_> = device.interfaces.iter().map(|i| i.sysname.as_str()).collect();
        assert_eq!(names, vec!["1-0:1.0", "1-0:1.1"]);
        assert!(device.interfaces[1].endpoints.is_empty());
        assert_eq!(device.interfaces[1].driver, None);
    }

    #[test]
    fn test_missing_descriptors_fail_device() {
        let mut src = MemorySource::new();
        let dev = src.add_device("2-1");
        src.set(dev, "busnum", "2");

        let err = TopologyBuilder::new(&src).build_device(&dev).unwrap_err();
        assert!(matches!(
            err,
            BuildError::Source(SourceError::Descriptors { .. })
        ));
    }

    #[test]
    fn test_unlistable_device_fails() {
        let mut src = MemorySource::new();
        let dev = hub(&mut src);
        src.fail_children(dev);

        let err = TopologyBuilder::new(&src).build_device(&dev).unwrap_err();
        assert!(matches!(err, BuildError::Source(SourceError::Children { .. })));
    }

    #[test]
    fn test_unlistable_interface_is_skipped() {
        let mut src = MemorySource::new();
        let dev = hub(&mut src);
        let broken = src.add_child(dev, "1-0:1.1");
        src.set(broken, "bInterfaceClass", "03");
        src.fail_children(broken);

        let device = TopologyBuilder::new(&src).build_device(&dev).unwrap();
        assert_eq!(device.interfaces.len(), 1);
        assert_eq!(device.interfaces[0].sysname, "1-0:1.0");
    }

    #[test]
    fn test_truncated_descriptors_keep_device() {
        let mut src = MemorySource::new();
        let dev = hub(&mut src);
        src.set_descriptors(dev, vec![9, 0x06, 0x00, 0x02]);

        let device = TopologyBuilder::new(&src).build_device(&dev).unwrap();
        assert!(device.qualifier.is_none());
        assert_eq!(device.interfaces.len(), 1);
    }
}
