//! SPI wire-level definitions
//!
//! This module provides the JEDEC/vendor opcodes, status register bits and
//! address width handling shared by every other layer.

mod address;
pub mod opcodes;

pub use address::AddressWidth;
pub use opcodes::*;
