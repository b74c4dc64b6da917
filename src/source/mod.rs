//! Attribute sources: where device handles, named attributes, child entries
//! and raw descriptor streams come from.

mod memory;
mod sysfs;

pub use memory::{MemorySource, NodeId};
pub use sysfs::{SYSFS_USB_DEVICES, SysfsSource};

use std::io::{self, Read};
use thiserror::Error;

/// Errors raised when a source cannot provide a child listing or descriptor
/// stream for a handle.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("cannot list children of {handle}: {source}")]
    Children {
        handle: String,
        #[source]
        source: io::Error,
    },
    #[error("cannot open descriptors of {handle}: {source}")]
    Descriptors {
        handle: String,
        #[source]
        source: io::Error,
    },
}

/// A named child entry of a device or interface handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Child<H> {
    /// Entry name as the source exposes it (e.g. "1-1:1.0", "ep_81").
    pub name: String,
    /// Handle for looking up the child's own attributes.
    pub handle: H,
}

/// Capability to look up string attributes and children of device handles.
///
/// Implementations are read-only; all lookups happen synchronously on the
/// calling thread.
pub trait AttributeSource {
    /// Opaque handle for a device, interface or endpoint entry.
    type Handle;
    /// Byte stream holding a device's raw descriptors.
    type Stream: Read;

    /// Value of a named attribute. Names may address a child entry with a
    /// `/` separator, e.g. `"ep_00/bEndpointAddress"`.
    fn attribute(&self, handle: &Self::Handle, name: &str) -> Option<String>;

    /// Name of the driver bound to the handle, if any.
    fn driver(&self, handle: &Self::Handle) -> Option<String>;

    /// Child entries in the order the source lists them.
    fn children(&self, handle: &Self::Handle) -> Result<Vec<Child<Self::Handle>>, SourceError>;

    /// Open the raw descriptor stream of a device handle.
    fn descriptors(&self, handle: &Self::Handle) -> Result<Self::Stream, SourceError>;

    /// Whether the named attribute exists.
    fn has_attribute(&self, handle: &Self::Handle, name: &str) -> bool {
        self.attribute(handle, name).is_some()
    }
}
