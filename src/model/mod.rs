//! USB data model types.

pub mod device;
pub mod endpoint;
pub mod speed;

pub use device::{BusAddress, Device, Interface};
pub use endpoint::{Direction, Endpoint, TransferType};
pub use speed::UsbSpeed;
