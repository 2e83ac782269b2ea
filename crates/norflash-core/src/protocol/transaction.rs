//! Bus transaction framing
//!
//! A transaction is one chip-select assertion: opcode, then depending on
//! the opcode class a dummy byte and/or an address, then payload. Opening a
//! transaction borrows the [`Transport`] mutably, so a second one cannot be
//! opened while the first is live, and dropping the [`Transaction`] always
//! deselects the chip.

use crate::bus::SpiBus;
use crate::error::Result;
use crate::spi::{opcodes, AddressWidth};

use super::status;

/// What follows the opcode on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framing {
    /// Opcode only
    Command,
    /// Address in the current address width
    Address,
    /// Address that is always 3 bytes regardless of address mode
    LegacyAddress,
    /// One dummy byte, then the address in the current width
    DummyThenAddress,
    /// 3-byte address, then one dummy byte
    LegacyAddressThenDummy,
    /// A fixed number of dummy bytes
    Dummy(u8),
}

/// Framing used for an opcode
pub const fn framing(opcode: u8) -> Framing {
    match opcode {
        opcodes::READ | opcodes::PP | opcodes::SE_20 | opcodes::BE_52 | opcodes::BE_D8 => {
            Framing::Address
        }
        opcodes::FAST_READ => Framing::DummyThenAddress,
        opcodes::REMS => Framing::LegacyAddress,
        opcodes::RDSFDP => Framing::LegacyAddressThenDummy,
        opcodes::RDUID => Framing::Dummy(4),
        _ => Framing::Command,
    }
}

/// Owner of the bus and of the device's current address width
#[derive(Debug)]
pub struct Transport<B> {
    bus: B,
    width: AddressWidth,
}

impl<B: SpiBus> Transport<B> {
    /// Wrap a bus. The device is assumed to be in its 3-byte default.
    pub fn new(bus: B) -> Self {
        Self {
            bus,
            width: AddressWidth::ThreeByte,
        }
    }

    /// Borrow the bus
    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Mutably borrow the bus
    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Give the bus back
    pub fn into_inner(self) -> B {
        self.bus
    }

    /// Address width the device currently expects
    pub fn address_width(&self) -> AddressWidth {
        self.width
    }

    pub(crate) fn set_address_width(&mut self, width: AddressWidth) {
        self.width = width;
    }

    /// Open a transaction: select the chip and send the opcode header
    ///
    /// `address` is ignored for opcodes framed without an address.
    pub fn begin(&mut self, opcode: u8, address: u32) -> Transaction<'_, B> {
        self.bus.acquire();
        self.bus.select();
        self.bus.transfer(opcode);

        let mut buf = [0u8; 4];
        match framing(opcode) {
            Framing::Command => {}
            Framing::Address => {
                self.bus.write_block(self.width.encode(address, &mut buf));
            }
            Framing::LegacyAddress => {
                self.bus
                    .write_block(AddressWidth::ThreeByte.encode(address, &mut buf));
            }
            Framing::DummyThenAddress => {
                self.bus.transfer(opcodes::DUMMY_BYTE);
                self.bus.write_block(self.width.encode(address, &mut buf));
            }
            Framing::LegacyAddressThenDummy => {
                self.bus
                    .write_block(AddressWidth::ThreeByte.encode(address, &mut buf));
                self.bus.transfer(opcodes::DUMMY_BYTE);
            }
            Framing::Dummy(count) => {
                for _ in 0..count {
                    self.bus.transfer(opcodes::DUMMY_BYTE);
                }
            }
        }

        log::trace!(
            "SPI begin 0x{:02X} @0x{:08X} ({:?})",
            opcode,
            address,
            self.width
        );

        Transaction {
            bus: &mut self.bus,
            open: true,
        }
    }

    /// Send a bare opcode as a complete transaction
    pub fn command(&mut self, opcode: u8) {
        self.begin(opcode, 0).end();
    }

    /// Run `f` with the device switched to `width`, restoring 3-byte mode after
    ///
    /// For [`AddressWidth::ThreeByte`] this is a plain call. Otherwise the
    /// device is put into 4-byte mode first and returned to 3-byte mode
    /// afterwards, even if `f` failed. The first error wins.
    pub fn with_address_width<T>(
        &mut self,
        width: AddressWidth,
        f: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        if width == AddressWidth::ThreeByte {
            return f(self);
        }

        status::enter_four_byte(self)?;
        let result = f(self);
        let restored = status::exit_four_byte(self);

        match result {
            Ok(value) => restored.map(|()| value),
            Err(e) => Err(e),
        }
    }
}

/// An open bus transaction (chip selected)
///
/// Closed by [`Transaction::end`] or, on early return, by `Drop`.
pub struct Transaction<'a, B: SpiBus> {
    bus: &'a mut B,
    open: bool,
}

impl<B: SpiBus> Transaction<'_, B> {
    /// Exchange one payload byte
    pub fn transfer(&mut self, byte: u8) -> u8 {
        self.bus.transfer(byte)
    }

    /// Send payload bytes
    pub fn write(&mut self, data: &[u8]) {
        self.bus.write_block(data);
    }

    /// Receive payload bytes
    pub fn read(&mut self, buf: &mut [u8]) {
        self.bus.read_block(buf);
    }

    /// Deselect the chip and release the bus
    pub fn end(mut self) {
        self.close();
    }

    fn close(&mut self) {
        if self.open {
            self.bus.deselect();
            self.bus.release();
            self.open = false;
        }
    }
}

impl<B: SpiBus> Drop for Transaction<'_, B> {
    fn drop(&mut self) {
        self.close();
    }
}
