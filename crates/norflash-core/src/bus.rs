//! Host collaborator traits
//!
//! The driver never touches hardware directly. It needs a way to drive the
//! chip-select line and shift bytes over the serial bus, and a monotonic
//! clock to bound its busy-wait loops. Both are treated as infallible: a
//! failing bus cannot be retried meaningfully at this layer.

/// Byte-exchange primitive for a single flash chip on a serial bus
///
/// Chip select is active low on real parts, so `select()` drives CS low.
/// The driver guarantees every `select()` is followed by exactly one
/// `deselect()` before the next `select()`.
pub trait SpiBus {
    /// Assert chip select
    fn select(&mut self);

    /// Deassert chip select
    fn deselect(&mut self);

    /// Shift one byte out and return the byte shifted in
    fn transfer(&mut self, byte: u8) -> u8;

    /// Shift out a block of bytes, discarding what comes back
    fn write_block(&mut self, data: &[u8]) {
        for &byte in data {
            self.transfer(byte);
        }
    }

    /// Fill `buf` with bytes clocked in while shifting out zeros
    fn read_block(&mut self, buf: &mut [u8]) {
        for byte in buf.iter_mut() {
            *byte = self.transfer(0x00);
        }
    }

    /// Optional: claim the bus and apply clock/mode settings before a transaction
    fn acquire(&mut self) {}

    /// Optional: release the bus after a transaction
    fn release(&mut self) {}
}

/// Monotonic microsecond time source
pub trait Clock {
    /// Current time in microseconds; must never go backwards
    fn now_us(&mut self) -> u64;

    /// Block for at least `us` microseconds
    fn delay_us(&mut self, us: u32);
}

impl<T: SpiBus + ?Sized> SpiBus for &mut T {
    fn select(&mut self) {
        (**self).select()
    }

    fn deselect(&mut self) {
        (**self).deselect()
    }

    fn transfer(&mut self, byte: u8) -> u8 {
        (**self).transfer(byte)
    }

    fn write_block(&mut self, data: &[u8]) {
        (**self).write_block(data)
    }

    fn read_block(&mut self, buf: &mut [u8]) {
        (**self).read_block(buf)
    }

    fn acquire(&mut self) {
        (**self).acquire()
    }

    fn release(&mut self) {
        (**self).release()
    }
}

impl<T: Clock + ?Sized> Clock for &mut T {
    fn now_us(&mut self) -> u64 {
        (**self).now_us()
    }

    fn delay_us(&mut self, us: u32) {
        (**self).delay_us(us)
    }
}
