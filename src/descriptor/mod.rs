//! Raw USB descriptor records.
//!
//! A descriptor stream is a concatenation of records, each laid out as
//! `[bLength][bDescriptorType][payload...]` where `bLength` counts the whole
//! record. Multi-byte fields are little-endian.

pub mod decoder;

pub use decoder::{DecodeError, DescriptorReader, RawRecord, decode};

use crate::model::{Direction, TransferType};
use std::fmt;

/// Descriptor type tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptorType {
    Device,
    Configuration,
    String,
    Interface,
    Endpoint,
    DeviceQualifier,
    OtherSpeedConfiguration,
    InterfacePower,
    Unknown(u8),
}

impl From<u8> for DescriptorType {
    fn from(tag: u8) -> Self {
        match tag {
            0x01 => Self::Device,
            0x02 => Self::Configuration,
            0x03 => Self::String,
            0x04 => Self::Interface,
            0x05 => Self::Endpoint,
            0x06 => Self::DeviceQualifier,
            0x07 => Self::OtherSpeedConfiguration,
            0x08 => Self::InterfacePower,
            other => Self::Unknown(other),
        }
    }
}

/// Configuration descriptor (tag 0x02).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigDescriptor {
    pub b_length: u8,
    pub b_descriptor_type: u8,
    pub w_total_length: u16,
    pub b_num_interfaces: u8,
    pub b_configuration_value: u8,
    pub i_configuration: u8,
    pub bm_attributes: u8,
    /// Maximum power in 2 mA units.
    pub b_max_power: u8,
}

impl ConfigDescriptor {
    pub const LENGTH: usize = 9;

    /// Decode from a record buffer; `None` if it is too short.
    pub fn parse(buf: &[u8]) -> Option<Self> {
        let buf = buf.get(..Self::LENGTH)?;
        Some(Self {
            b_length: buf[0],
            b_descriptor_type: buf[1],
            w_total_length: u16::from_le_bytes([buf[2], buf[3]]),
            b_num_interfaces: buf[4],
            b_configuration_value: buf[5],
            i_configuration: buf[6],
            bm_attributes: buf[7],
            b_max_power: buf[8],
        })
    }

    pub fn self_powered(&self) -> bool {
        self.bm_attributes & 0x40 != 0
    }

    pub fn remote_wakeup(&self) -> bool {
        self.bm_attributes & 0x20 != 0
    }

    /// Maximum power draw in milliamps.
    pub fn max_power_ma(&self) -> u16 {
        self.b_max_power as u16 * 2
    }
}

/// Interface descriptor (tag 0x04).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterfaceDescriptor {
    pub b_length: u8,
    pub b_descriptor_type: u8,
    pub b_interface_number: u8,
    pub b_alternate_setting: u8,
    pub b_num_endpoints: u8,
    pub b_interface_class: u8,
    pub b_interface_sub_class: u8,
    pub b_interface_protocol: u8,
    pub i_interface: u8,
}

impl InterfaceDescriptor {
    pub const LENGTH: usize = 9;

    pub fn parse(buf: &[u8]) -> Option<Self> {
        let buf = buf.get(..Self::LENGTH)?;
        Some(Self {
            b_length: buf[0],
            b_descriptor_type: buf[1],
            b_interface_number: buf[2],
            b_alternate_setting: buf[3],
            b_num_endpoints: buf[4],
            b_interface_class: buf[5],
            b_interface_sub_class: buf[6],
            b_interface_protocol: buf[7],
            i_interface: buf[8],
        })
    }
}

/// Endpoint descriptor (tag 0x05).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndpointDescriptor {
    pub b_length: u8,
    pub b_descriptor_type: u8,
    pub b_endpoint_address: u8,
    pub bm_attributes: u8,
    pub w_max_packet_size: u16,
    pub b_interval: u8,
}

impl EndpointDescriptor {
    pub const LENGTH: usize = 7;

    pub fn parse(buf: &[u8]) -> Option<Self> {
        let buf = buf.get(..Self::LENGTH)?;
        Some(Self {
            b_length: buf[0],
            b_descriptor_type: buf[1],
            b_endpoint_address: buf[2],
            bm_attributes: buf[3],
            w_max_packet_size: u16::from_le_bytes([buf[4], buf[5]]),
            b_interval: buf[6],
        })
    }

    /// Endpoint number (address without direction bit).
    pub fn number(&self) -> u8 {
        self.b_endpoint_address & 0x0F
    }

    pub fn direction(&self) -> Direction {
        Direction::from_address(self.b_endpoint_address)
    }

    pub fn transfer_type(&self) -> TransferType {
        TransferType::from_attributes(self.bm_attributes)
    }
}

/// Device qualifier (tag 0x06): the device's capabilities at its other
/// operating speed. Fields are kept as decimal strings like the rest of the
/// attribute-sourced model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceQualifier {
    pub b_length: String,
    pub b_descriptor_type: String,
    /// Binary-coded USB release, formatted "HH.HH".
    pub bcd_usb: String,
    pub b_device_class: String,
    pub b_device_sub_class: String,
    pub b_device_protocol: String,
    pub b_max_packet_size0: String,
    pub b_num_configurations: String,
}

impl DeviceQualifier {
    pub const LENGTH: usize = 9;

    pub fn parse(buf: &[u8]) -> Option<Self> {
        let buf = buf.get(..Self::LENGTH)?;
        Some(Self {
            b_length: buf[0].to_string(),
            b_descriptor_type: buf[1].to_string(),
            bcd_usb: format!("{:02x}.{:02x}", buf[3], buf[2]),
            b_device_class: buf[4].to_string(),
            b_device_sub_class: buf[5].to_string(),
            b_device_protocol: buf[6].to_string(),
            b_max_packet_size0: buf[7].to_string(),
            b_num_configurations: buf[8].to_string(),
        })
    }
}

/// A decoded descriptor record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Descriptor {
    /// Device descriptor; its fields come from the attribute source instead.
    Device,
    Configuration(ConfigDescriptor),
    /// String descriptor, not decoded.
    String,
    Interface(InterfaceDescriptor),
    Endpoint(EndpointDescriptor),
    DeviceQualifier(DeviceQualifier),
    OtherSpeedConfiguration,
    InterfacePower,
    /// Record with an unrecognised tag, consumed and ignored.
    Unknown { tag: u8, length: u8 },
    /// Record cut short by end of stream, or too short for its layout.
    Malformed {
        tag: Option<u8>,
        declared: u8,
        available: usize,
    },
}

impl Descriptor {
    /// Dispatch a raw record to the parser for its tag.
    pub fn from_record(record: &RawRecord) -> Self {
        let malformed = || Self::Malformed {
            tag: record.tag(),
            declared: record.declared,
            available: record.bytes.len(),
        };

        let Some(tag) = record.tag() else {
            return malformed();
        };
        if record.is_truncated() {
            return malformed();
        }

        let bytes = &record.bytes;
        match DescriptorType::from(tag) {
            DescriptorType::Device => Self::Device,
            DescriptorType::Configuration => ConfigDescriptor::parse(bytes)
                .map(Self::Configuration)
                .unwrap_or_else(malformed),
            DescriptorType::String => Self::String,
            DescriptorType::Interface => InterfaceDescriptor::parse(bytes)
                .map(Self::Interface)
                .unwrap_or_else(malformed),
            DescriptorType::Endpoint => EndpointDescriptor::parse(bytes)
                .map(Self::Endpoint)
                .unwrap_or_else(malformed),
            DescriptorType::DeviceQualifier => DeviceQualifier::parse(bytes)
                .map(Self::DeviceQualifier)
                .unwrap_or_else(malformed),
            DescriptorType::OtherSpeedConfiguration => Self::OtherSpeedConfiguration,
            DescriptorType::InterfacePower => Self::InterfacePower,
            DescriptorType::Unknown(tag) => Self::Unknown {
                tag,
                length: record.declared,
            },
        }
    }
}

impl fmt::Display for ConfigDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Config {} ({} interfaces, wTotalLength {}, bmAttributes 0x{:02x}, {}mA)",
            self.b_configuration_value,
            self.b_num_interfaces,
            self.w_total_length,
            self.bm_attributes,
            self.max_power_ma()
        )
    }
}

impl fmt::Display for InterfaceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Interface {} alt {} class {:02x}:{:02x}:{:02x} ({} endpoints)",
            self.b_interface_number,
            self.b_alternate_setting,
            self.b_interface_class,
            self.b_interface_sub_class,
            self.b_interface_protocol,
            self.b_num_endpoints
        )
    }
}

impl fmt::Display for EndpointDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "EP{:02X} {} {} {}B interval {}",
            self.b_endpoint_address,
            self.transfer_type(),
            self.direction(),
            self.w_max_packet_size,
            self.b_interval
        )
    }
}
