//! Read and program engine

use crate::bus::{Clock, SpiBus};
use crate::error::{Error, Result};
use crate::protocol;
use crate::spi::opcodes;

use super::{split_at_top, SpiFlash};

/// Bytes pulled per bus block while scanning a range
const SCAN_CHUNK: usize = 64;

/// Physical address of byte `offset` of a request starting at `addr`
fn wrapped_addr(addr: u32, offset: u32, capacity: u32) -> u32 {
    ((u64::from(addr) + u64::from(offset)) % u64::from(capacity)) as u32
}

fn request_len(addr: u32, len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| Error::OutOfBounds {
        addr,
        len: u32::MAX,
    })
}

impl<B: SpiBus, C: Clock> SpiFlash<B, C> {
    /// Read `buf.len()` bytes starting at `addr`
    ///
    /// Uses FAST_READ if enabled in the configuration. A range past the top
    /// of the chip continues at address 0 when wrap-around is allowed.
    pub fn read(&mut self, addr: u32, buf: &mut [u8]) -> Result<()> {
        let fast = self.config.fast_read;
        let result = self.read_inner(addr, buf, fast);
        self.record(result)
    }

    /// Read with FAST_READ regardless of the configuration
    pub fn fast_read(&mut self, addr: u32, buf: &mut [u8]) -> Result<()> {
        let result = self.read_inner(addr, buf, true);
        self.record(result)
    }

    /// Program `data` starting at `addr`
    ///
    /// The target must be erased unless the erased check is disabled. The
    /// write is split at page boundaries and at the top of the chip, and is
    /// read back and compared afterwards if verification is enabled.
    pub fn write(&mut self, addr: u32, data: &[u8]) -> Result<()> {
        let verify = self.config.verify_writes;
        let result = self.write_inner(addr, data, verify);
        self.record(result)
    }

    /// Program `data` and always verify it, regardless of the configuration
    pub fn write_verified(&mut self, addr: u32, data: &[u8]) -> Result<()> {
        let result = self.write_inner(addr, data, true);
        self.record(result)
    }

    /// Check that `len` bytes from `addr` all read as 0xFF
    pub fn is_erased(&mut self, addr: u32, len: u32) -> Result<bool> {
        let result = self.is_erased_inner(addr, len);
        self.record(result)
    }

    fn read_inner(&mut self, addr: u32, buf: &mut [u8], fast: bool) -> Result<()> {
        self.ensure_powered()?;
        let len = request_len(addr, buf.len())?;
        self.check_address(addr, len)?;
        if buf.is_empty() {
            return Ok(());
        }
        self.wait_ready(self.config.timeouts.busy_us)?;

        let opcode = if fast {
            opcodes::FAST_READ
        } else {
            opcodes::READ
        };
        let (head, tail) = split_at_top(addr, len, self.chip.capacity());
        let (head_buf, tail_buf) = buf.split_at_mut(head.len as usize);

        let capacity = self.chip.capacity();
        self.read_span(opcode, head.addr, head_buf)?;
        self.cursor.advance(head.len, capacity);
        if let Some(tail) = tail {
            log::trace!("Read wraps, continuing {} bytes at 0", tail.len);
            self.read_span(opcode, tail.addr, tail_buf)?;
            self.cursor.advance(tail.len, capacity);
        }
        Ok(())
    }

    fn read_span(&mut self, opcode: u8, addr: u32, buf: &mut [u8]) -> Result<()> {
        let width = self.width_for(addr, buf.len() as u32)?;
        self.transport.with_address_width(width, |t| {
            let mut tx = t.begin(opcode, addr);
            tx.read(buf);
            tx.end();
            Ok(())
        })
    }

    /// Stream `len` bytes from `addr` (wrap-aware) through `visit`
    ///
    /// `visit` gets the offset into the request and the byte read; an error
    /// from it stops the scan.
    fn scan(
        &mut self,
        addr: u32,
        len: u32,
        mut visit: impl FnMut(u32, u8) -> Result<()>,
    ) -> Result<()> {
        let (head, tail) = split_at_top(addr, len, self.chip.capacity());
        let mut offset = 0u32;

        for span in core::iter::once(head).chain(tail) {
            let width = self.width_for(span.addr, span.len)?;
            self.transport.with_address_width(width, |t| {
                let mut tx = t.begin(opcodes::READ, span.addr);
                let mut chunk = [0u8; SCAN_CHUNK];
                let mut done = 0u32;
                while done < span.len {
                    let n = (span.len - done).min(SCAN_CHUNK as u32);
                    let part = &mut chunk[..n as usize];
                    tx.read(part);
                    for (i, &byte) in part.iter().enumerate() {
                        visit(offset + done + i as u32, byte)?;
                    }
                    done += n;
                }
                tx.end();
                Ok(())
            })?;
            offset += span.len;
        }
        Ok(())
    }

    fn ensure_erased(&mut self, addr: u32, len: u32) -> Result<()> {
        let capacity = self.chip.capacity();
        self.scan(addr, len, |offset, byte| {
            if byte != 0xFF {
                return Err(Error::NotErased {
                    addr: wrapped_addr(addr, offset, capacity),
                    found: byte,
                });
            }
            Ok(())
        })
    }

    fn is_erased_inner(&mut self, addr: u32, len: u32) -> Result<bool> {
        self.ensure_powered()?;
        self.check_address(addr, len)?;
        if len == 0 {
            return Ok(true);
        }
        self.wait_ready(self.config.timeouts.busy_us)?;

        match self.ensure_erased(addr, len) {
            Ok(()) => Ok(true),
            Err(Error::NotErased { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn verify(&mut self, addr: u32, data: &[u8]) -> Result<()> {
        let capacity = self.chip.capacity();
        self.scan(addr, data.len() as u32, |offset, found| {
            let expected = data[offset as usize];
            if found != expected {
                let at = wrapped_addr(addr, offset, capacity);
                log::warn!(
                    "Verify mismatch at 0x{:08X}: wrote 0x{:02X}, read 0x{:02X}",
                    at,
                    expected,
                    found
                );
                return Err(Error::VerifyFailed {
                    addr: at,
                    expected,
                    found,
                });
            }
            Ok(())
        })
    }

    fn write_inner(&mut self, addr: u32, data: &[u8], verify: bool) -> Result<()> {
        self.ensure_powered()?;
        let len = request_len(addr, data.len())?;
        self.check_address(addr, len)?;
        if data.is_empty() {
            return Ok(());
        }

        self.wait_ready(self.config.timeouts.busy_us)?;
        if !self.config.skip_erased_check {
            self.ensure_erased(addr, len)?;
        }
        self.ensure_not_suspended()?;

        let capacity = self.chip.capacity();
        let mut written = 0usize;
        while written < data.len() {
            let remaining = len - written as u32;
            let chunk_len = self.cursor.next_chunk(remaining, capacity);
            let at = self.cursor.current;
            let chunk = &data[written..written + chunk_len as usize];
            log::trace!("Page program 0x{:08X}+{}", at, chunk_len);

            self.program_page(at, chunk)?;

            self.cursor.advance(chunk_len, capacity);
            written += chunk_len as usize;
        }
        log::debug!("Wrote {} bytes at 0x{:08X}", len, addr);

        if verify {
            self.verify(addr, data)?;
        }
        Ok(())
    }

    /// WREN, PP, then wait for completion, all inside the address-mode bracket
    fn program_page(&mut self, addr: u32, chunk: &[u8]) -> Result<()> {
        let width = self.width_for(addr, chunk.len() as u32)?;
        let timeout = self.config.timeouts.busy_us;
        let poll = self.config.timeouts.poll_interval_us;
        let clock = &mut self.clock;

        self.transport.with_address_width(width, |t| {
            protocol::write_enable(t)?;
            let mut tx = t.begin(opcodes::PP, addr);
            tx.write(chunk);
            tx.end();
            protocol::wait_ready(t, clock, timeout, poll)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrapped_addr() {
        assert_eq!(wrapped_addr(0x100, 0x10, 0x1000), 0x110);
        assert_eq!(wrapped_addr(0xFFC, 6, 0x1000), 2);
    }
}
