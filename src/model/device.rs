//! USB device and interface data structures.

use super::endpoint::Endpoint;
use super::speed::UsbSpeed;
use crate::descriptor::DeviceQualifier;
use std::fmt;

/// Numeric (bus, device) identity of a device, used as its sort key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BusAddress {
    pub bus: u32,
    pub device: u32,
}

impl BusAddress {
    pub fn new(bus: u32, device: u32) -> Self {
        Self { bus, device }
    }

    /// Parse from the raw busnum/devnum attributes. Missing or non-numeric
    /// values count as 0.
    pub fn parse(busnum: Option<&str>, devnum: Option<&str>) -> Self {
        Self {
            bus: busnum.map(parse_decimal).unwrap_or(0),
            device: devnum.map(parse_decimal).unwrap_or(0),
        }
    }
}

impl fmt::Display for BusAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bus {:03} Device {:03}", self.bus, self.device)
    }
}

/// Leading decimal digits of `s` (after whitespace), saturating on overflow.
fn parse_decimal(s: &str) -> u32 {
    s.trim_start()
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0u32, |acc, digit| {
            acc.saturating_mul(10).saturating_add((digit - b'0') as u32)
        })
}

/// A USB interface of a device.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Interface {
    /// Child entry name (e.g. "1-1:1.0").
    pub sysname: String,
    pub b_alternate_setting: Option<String>,
    pub b_interface_class: Option<String>,
    pub b_interface_number: Option<String>,
    pub b_interface_protocol: Option<String>,
    pub b_interface_sub_class: Option<String>,
    pub b_num_endpoints: Option<String>,
    /// Bound driver name.
    pub driver: Option<String>,
    /// Endpoints in discovery order.
    pub endpoints: Vec<Endpoint>,
}

/// A USB device with its control endpoint and interfaces.
///
/// Attribute values are kept as the raw strings the source returned;
/// `address` holds the parsed numeric form of busnum/devnum.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Device {
    /// Parsed (busnum, devnum).
    pub address: BusAddress,
    pub busnum: Option<String>,
    pub devnum: Option<String>,

    pub id_vendor: Option<String>,
    pub id_product: Option<String>,
    pub manufacturer: Option<String>,
    pub product: Option<String>,
    pub serial: Option<String>,
    pub bcd_device: Option<String>,
    /// Speed in Mbps as reported (e.g. "480").
    pub speed: Option<String>,
    pub version: Option<String>,
    pub maxchild: Option<String>,
    pub quirks: Option<String>,
    pub driver: Option<String>,

    pub b_configuration_value: Option<String>,
    pub b_device_class: Option<String>,
    pub b_device_protocol: Option<String>,
    pub b_device_sub_class: Option<String>,
    pub b_num_configurations: Option<String>,
    pub b_num_interfaces: Option<String>,
    pub bm_attributes: Option<String>,
    pub b_max_packet_size0: Option<String>,
    pub b_max_power: Option<String>,

    /// Endpoint 0, present on every device.
    pub ep0: Endpoint,
    /// Interfaces in discovery order.
    pub interfaces: Vec<Interface>,
    /// Set when the descriptor stream carried a device qualifier.
    pub qualifier: Option<DeviceQualifier>,
}

impl Device {
    /// Sort key: (busnum, devnum) as integers.
    pub fn sort_key(&self) -> BusAddress {
        self.address
    }

    /// Parsed speed, if the attribute is present and recognised.
    pub fn speed_kind(&self) -> Option<UsbSpeed> {
        self.speed.as_deref().and_then(UsbSpeed::from_sysfs)
    }

    /// Total endpoints across all interfaces, excluding ep0.
    pub fn endpoint_count(&self) -> usize {
        self.interfaces.iter().map(|i| i.endpoints.len()).sum()
    }
}
