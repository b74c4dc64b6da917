//! USB endpoint model.

use crate::source::AttributeSource;
use std::fmt;

/// USB transfer types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferType {
    Control,
    Isochronous,
    Bulk,
    Interrupt,
}

impl TransferType {
    /// Parse from sysfs 'type' attribute string.
    pub fn from_sysfs(s: &str) -> Option<Self> {
        match s.trim() {
            "Control" => Some(Self::Control),
            "Bulk" => Some(Self::Bulk),
            "Interrupt" => Some(Self::Interrupt),
            "Isoc" | "Isochronous" => Some(Self::Isochronous),
            _ => None,
        }
    }

    /// Decode bits 1:0 of an endpoint's bmAttributes.
    pub fn from_attributes(bm_attributes: u8) -> Self {
        match bm_attributes & 0x03 {
            0 => Self::Control,
            1 => Self::Isochronous,
            2 => Self::Bulk,
            _ => Self::Interrupt,
        }
    }
}

impl fmt::Display for TransferType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Control => "Control",
            Self::Bulk => "Bulk",
            Self::Interrupt => "Interrupt",
            Self::Isochronous => "Isochronous",
        };
        write!(f, "{}", name)
    }
}

/// Endpoint direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    In,
    Out,
    /// Control endpoints carry both directions.
    Both,
}

impl Direction {
    /// Parse from sysfs 'direction' attribute.
    pub fn from_sysfs(s: &str) -> Option<Self> {
        match s.trim() {
            "in" => Some(Self::In),
            "out" => Some(Self::Out),
            "both" => Some(Self::Both),
            _ => None,
        }
    }

    /// Bit 7 of bEndpointAddress.
    pub fn from_address(address: u8) -> Self {
        if address & 0x80 != 0 { Self::In } else { Self::Out }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::In => write!(f, "IN"),
            Self::Out => write!(f, "OUT"),
            Self::Both => write!(f, "BOTH"),
        }
    }
}

/// A USB endpoint as exposed by the attribute source.
///
/// All values are the raw attribute strings; absent attributes stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Endpoint {
    /// Entry name the endpoint was read from (e.g. "ep_81").
    pub name: String,
    pub b_endpoint_address: Option<String>,
    pub b_interval: Option<String>,
    pub b_length: Option<String>,
    pub bm_attributes: Option<String>,
    pub direction: Option<String>,
    /// Transfer type string ("Control", "Bulk", "Interrupt", "Isoc").
    pub transfer_type: Option<String>,
    pub w_max_packet_size: Option<String>,
}

impl Endpoint {
    /// Read an endpoint's attributes from the `name/` entry of `handle`.
    pub fn from_source<S: AttributeSource>(source: &S, handle: &S::Handle, name: &str) -> Self {
        let attr = |field: &str| source.attribute(handle, &format!("{}/{}", name, field));

        Self {
            name: name.to_string(),
            b_endpoint_address: attr("bEndpointAddress"),
            b_interval: attr("bInterval"),
            b_length: attr("bLength"),
            bm_attributes: attr("bmAttributes"),
            direction: attr("direction"),
            transfer_type: attr("type"),
            w_max_packet_size: attr("wMaxPacketSize"),
        }
    }

    /// Endpoint address parsed from its hex attribute.
    pub fn address(&self) -> Option<u8> {
        let raw = self.b_endpoint_address.as_deref()?;
        u8::from_str_radix(raw.trim(), 16).ok()
    }

    /// Direction from the 'direction' attribute, else from the address.
    pub fn direction_kind(&self) -> Option<Direction> {
        self.direction
            .as_deref()
            .and_then(Direction::from_sysfs)
            .or_else(|| self.address().map(Direction::from_address))
    }

    /// Transfer type from the 'type' attribute, else from bmAttributes.
    pub fn transfer_kind(&self) -> Option<TransferType> {
        self.transfer_type
            .as_deref()
            .and_then(TransferType::from_sysfs)
            .or_else(|| {
                let raw = self.bm_attributes.as_deref()?;
                u8::from_str_radix(raw.trim(), 16)
                    .ok()
                    .map(TransferType::from_attributes)
            })
    }
}
