//! High-level flash driver
//!
//! [`SpiFlash`] owns the bus and the clock, remembers what was identified
//! and exposes read, write and erase over the chip's linear address space.

mod address;
mod driver;
mod erase;
mod identify;
mod power;
mod rw;

pub use address::{split_at_top, AddressCursor, Span};
pub use driver::SpiFlash;
pub use erase::EraseSize;
