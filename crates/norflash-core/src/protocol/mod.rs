//! Protocol implementations
//!
//! This module contains the bus transaction framing and the SPI25 command
//! sequences (status, write enable, address mode, identification) built on
//! top of it.

mod ident;
mod status;
mod transaction;

pub use ident::*;
pub use status::*;
pub use transaction::*;
