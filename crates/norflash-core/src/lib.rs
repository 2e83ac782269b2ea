//! norflash-core - Driver core for serial NOR flash chips
//!
//! This crate turns the byte-oriented command/address/data protocol spoken by
//! 25-series serial NOR flash chips into addressable read, write and erase
//! operations over one linear address space. It is `no_std` and never
//! allocates.
//!
//! The host only has to provide two collaborators:
//! - a [`bus::SpiBus`] that can drive chip-select and exchange bytes
//! - a [`bus::Clock`] giving monotonic microseconds for busy-wait timeouts
//!
//! # Features
//!
//! - `std` - `std::error::Error` impls and TOML loading of [`DriverConfig`]
//!
//! # Example
//!
//! ```ignore
//! use norflash_core::{DriverConfig, SpiFlash};
//!
//! let mut flash = SpiFlash::new(bus, clock, DriverConfig::default());
//! flash.identify()?;
//! flash.erase_sector(0x1000)?;
//! flash.write(0x1000, b"hello")?;
//!
//! let mut buf = [0u8; 5];
//! flash.read(0x1000, &mut buf)?;
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

#[cfg(feature = "std")]
extern crate std;

pub mod bus;
pub mod chip;
pub mod config;
pub mod error;
pub mod flash;
pub mod protocol;
pub mod spi;

pub use config::{DriverConfig, Timeouts};
pub use error::{Error, Result};
pub use flash::SpiFlash;
