//! Descriptor stream decoding.

use super::Descriptor;
use crate::model::Device;
use log::{debug, warn};
use std::io::{self, Read};
use thiserror::Error;

/// Errors reading a descriptor stream. End of stream is not an error.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("IO error reading descriptors: {0}")]
    Io(#[from] io::Error),
}

/// One length-prefixed record as read from the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    /// Length the record declares for itself.
    pub declared: u8,
    /// Bytes actually read, length byte included. Shorter than `declared`
    /// only when the stream ended inside the record.
    pub bytes: Vec<u8>,
}

impl RawRecord {
    /// Type tag, if the record is long enough to carry one.
    pub fn tag(&self) -> Option<u8> {
        if self.declared < 2 {
            return None;
        }
        self.bytes.get(1).copied()
    }

    pub fn is_truncated(&self) -> bool {
        self.bytes.len() < self.declared as usize
    }
}

/// Splits a byte stream into raw records.
///
/// Never reads past the end of the stream: a record cut short is returned
/// with the bytes that were available and the reader stops afterwards. A
/// length byte below 2 cannot carry a tag and also ends the stream.
pub struct DescriptorReader<R> {
    reader: R,
    done: bool,
}

impl<R: Read> DescriptorReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            done: false,
        }
    }

    /// Read the next record, `Ok(None)` once the stream is exhausted.
    pub fn next_record(&mut self) -> Result<Option<RawRecord>, DecodeError> {
        if self.done {
            return Ok(None);
        }

        let mut length = [0u8; 1];
        if read_up_to(&mut self.reader, &mut length)? == 0 {
            self.done = true;
            return Ok(None);
        }

        let declared = length[0];
        let mut bytes = vec![declared];
        if declared < 2 {
            self.done = true;
            return Ok(Some(RawRecord { declared, bytes }));
        }

        let mut payload = vec![0u8; declared as usize - 1];
        let read = read_up_to(&mut self.reader, &mut payload)?;
        bytes.extend_from_slice(&payload[..read]);
        if read < payload.len() {
            self.done = true;
        }

        Ok(Some(RawRecord { declared, bytes }))
    }
}

impl<R: Read> Iterator for DescriptorReader<R> {
    type Item = Result<RawRecord, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_record() {
            Ok(record) => record.map(Ok),
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Fill `buf` as far as the stream allows, returning the bytes read.
fn read_up_to<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Decode every record in `stream`, attaching a device qualifier to `device`
/// when one is present. Returns the decoded records in stream order.
pub fn decode<R: Read>(stream: R, device: &mut Device) -> Result<Vec<Descriptor>, DecodeError> {
    let mut records = Vec::new();

    for record in DescriptorReader::new(stream) {
        let descriptor = Descriptor::from_record(&record?);
        match &descriptor {
            Descriptor::Configuration(config) => debug!("{}: {}", device.address, config),
            Descriptor::Interface(intf) => debug!("{}: {}", device.address, intf),
            Descriptor::Endpoint(ep) => debug!("{}: {}", device.address, ep),
            Descriptor::DeviceQualifier(dq) => {
                debug!("{}: device qualifier bcdUSB {}", device.address, dq.bcd_usb);
                device.qualifier = Some(dq.clone());
            }
            Descriptor::Malformed {
                tag,
                declared,
                available,
            } => warn!(
                "{}: malformed descriptor (tag {:?}, length {}, {} bytes available)",
                device.address, tag, declared, available
            ),
            _ => {}
        }
        records.push(descriptor);
    }

    Ok(records)
}
