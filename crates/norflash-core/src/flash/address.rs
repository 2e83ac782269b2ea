//! Address validation and wrap-around bookkeeping

use crate::error::{Error, Result};
use crate::spi::PAGE_SIZE;

/// A contiguous piece of a request that does not cross the top of the chip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    /// First physical address
    pub addr: u32,
    /// Length in bytes
    pub len: u32,
}

/// Cursor over one top-level operation
///
/// `current` is where the next byte goes. `overflow` is the number of bytes
/// of the request that land past the top of the chip and therefore continue
/// at address 0. It is non-zero only while a wrapping request is in
/// progress and drops to zero as soon as the wrapped part is done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AddressCursor {
    /// Physical address of the next byte
    pub current: u32,
    /// Bytes that wrap to address 0
    pub overflow: u32,
    wrapped: bool,
}

impl AddressCursor {
    /// Validate `size` bytes starting at `addr` against `capacity`
    ///
    /// - capacity 0 means the chip was never identified
    /// - `addr` must lie inside the chip and `size` must not exceed it
    /// - a range reaching the top of the chip is rejected unless wrap-around
    ///   is allowed, in which case the excess continues at address 0
    pub fn check(capacity: u32, addr: u32, size: u32, allow_wrap: bool) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::NotInitialized);
        }

        let out_of_bounds = Error::OutOfBounds { addr, len: size };
        // Stricter than plain wrap-around: a start past the top, or a range
        // longer than the chip, is refused even when wrapping is allowed,
        // since it would revisit addresses within one request.
        if addr >= capacity || size > capacity {
            return Err(out_of_bounds);
        }

        let end = u64::from(addr) + u64::from(size);
        let capacity64 = u64::from(capacity);
        let overflow = if end >= capacity64 {
            if !allow_wrap {
                return Err(out_of_bounds);
            }
            (end - capacity64) as u32
        } else {
            0
        };

        Ok(Self {
            current: addr,
            overflow,
            wrapped: false,
        })
    }

    /// True while part of the request still has to continue at address 0
    pub fn is_wrapping(&self) -> bool {
        self.overflow != 0
    }

    /// Length of the next page program, given `remaining` bytes to go
    ///
    /// Never crosses a page boundary or the top of the chip.
    pub fn next_chunk(&self, remaining: u32, capacity: u32) -> u32 {
        let to_page_end = PAGE_SIZE - (self.current % PAGE_SIZE);
        let to_top = capacity - self.current;
        remaining.min(to_page_end).min(to_top)
    }

    /// Move past `n` bytes just transferred
    pub fn advance(&mut self, n: u32, capacity: u32) {
        if self.wrapped {
            self.current += n;
            self.overflow = self.overflow.saturating_sub(n);
            if self.overflow == 0 {
                self.wrapped = false;
            }
            return;
        }

        self.current += n;
        if self.current >= capacity {
            self.current = 0;
            self.wrapped = self.overflow != 0;
        }
    }
}

/// Split `len` bytes starting at `addr` at the top of the chip
///
/// Returns the part up to the top and, if the range wraps, the part that
/// continues at address 0. `addr` must already be validated.
pub fn split_at_top(addr: u32, len: u32, capacity: u32) -> (Span, Option<Span>) {
    let head_len = len.min(capacity - addr);
    let head = Span {
        addr,
        len: head_len,
    };
    let tail = (head_len < len).then(|| Span {
        addr: 0,
        len: len - head_len,
    });
    (head, tail)
}
