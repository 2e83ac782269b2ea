//! Erase operations

use crate::bus::{Clock, SpiBus};
use crate::config::Timeouts;
use crate::error::{Error, Result};
use crate::protocol;
use crate::spi::{opcodes, AddressWidth, BLOCK_32K_SIZE, BLOCK_64K_SIZE, SECTOR_SIZE};

use super::SpiFlash;

/// Erase granularity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EraseSize {
    /// 4KB sector (0x20)
    Sector,
    /// 32KB block (0x52)
    Block32,
    /// 64KB block (0xD8)
    Block64,
    /// Whole chip (0x60)
    Chip,
}

impl EraseSize {
    /// Erase opcode
    pub const fn opcode(&self) -> u8 {
        match self {
            Self::Sector => opcodes::SE_20,
            Self::Block32 => opcodes::BE_52,
            Self::Block64 => opcodes::BE_D8,
            Self::Chip => opcodes::CE_60,
        }
    }

    /// Size of the erased unit, `None` for the whole chip
    pub const fn bytes(&self) -> Option<u32> {
        match self {
            Self::Sector => Some(SECTOR_SIZE),
            Self::Block32 => Some(BLOCK_32K_SIZE),
            Self::Block64 => Some(BLOCK_64K_SIZE),
            Self::Chip => None,
        }
    }

    /// Completion timeout for this granularity
    pub const fn timeout(&self, timeouts: &Timeouts) -> u32 {
        match self {
            Self::Sector => timeouts.sector_erase_us,
            Self::Block32 => timeouts.block32_erase_us,
            Self::Block64 => timeouts.block64_erase_us,
            Self::Chip => timeouts.chip_erase_us,
        }
    }

    /// Largest unit that starts at `addr` and fits before `end`
    fn largest_fitting(addr: u32, end: u32) -> Self {
        [Self::Block64, Self::Block32]
            .into_iter()
            .find(|size| {
                let unit = size.bytes().unwrap_or(SECTOR_SIZE);
                addr % unit == 0 && u64::from(addr) + u64::from(unit) <= u64::from(end)
            })
            .unwrap_or(Self::Sector)
    }
}

impl<B: SpiBus, C: Clock> SpiFlash<B, C> {
    /// Erase the 4KB sector containing `addr`
    pub fn erase_sector(&mut self, addr: u32) -> Result<()> {
        self.erase(EraseSize::Sector, addr)
    }

    /// Erase the 32KB block containing `addr`
    pub fn erase_block32(&mut self, addr: u32) -> Result<()> {
        self.erase(EraseSize::Block32, addr)
    }

    /// Erase the 64KB block containing `addr`
    pub fn erase_block64(&mut self, addr: u32) -> Result<()> {
        self.erase(EraseSize::Block64, addr)
    }

    /// Erase the whole chip
    pub fn erase_chip(&mut self) -> Result<()> {
        self.erase(EraseSize::Chip, 0)
    }

    /// Erase one unit of the given size containing `addr`
    pub fn erase(&mut self, size: EraseSize, addr: u32) -> Result<()> {
        let result = self.erase_inner(size, addr);
        self.record(result)
    }

    /// Erase every sector touched by `len` bytes from `addr`
    ///
    /// Uses 64KB and 32KB block erases where the range allows, 4KB sector
    /// erases elsewhere. The range must lie inside the chip.
    pub fn erase_section(&mut self, addr: u32, len: u32) -> Result<()> {
        let result = self.erase_section_inner(addr, len);
        self.record(result)
    }

    fn erase_section_inner(&mut self, addr: u32, len: u32) -> Result<()> {
        self.ensure_powered()?;
        self.ensure_identified()?;

        let capacity = self.chip.capacity();
        let end = u64::from(addr) + u64::from(len);
        if addr >= capacity || end > u64::from(capacity) {
            return Err(Error::OutOfBounds { addr, len });
        }
        if len == 0 {
            return Ok(());
        }

        let mut cursor = addr - addr % SECTOR_SIZE;
        let end = (end as u32).div_ceil(SECTOR_SIZE) * SECTOR_SIZE;
        while cursor < end {
            let size = EraseSize::largest_fitting(cursor, end);
            self.erase_inner(size, cursor)?;
            cursor += size.bytes().unwrap_or(SECTOR_SIZE);
        }
        Ok(())
    }

    fn erase_inner(&mut self, size: EraseSize, addr: u32) -> Result<()> {
        self.ensure_powered()?;

        let (base, width) = match size.bytes() {
            Some(unit) => {
                self.check_address(addr, 0)?;
                let base = addr - addr % unit;
                (base, self.width_for(base, unit)?)
            }
            None => {
                self.ensure_identified()?;
                (0, AddressWidth::ThreeByte)
            }
        };

        self.wait_ready(self.config.timeouts.busy_us)?;
        self.ensure_not_suspended()?;

        let timeout = size.timeout(&self.config.timeouts);
        let poll = self.config.timeouts.poll_interval_us;
        let clock = &mut self.clock;

        log::debug!("Erasing {:?} at 0x{:08X}", size, base);
        self.transport.with_address_width(width, |t| {
            protocol::write_enable(t)?;
            t.begin(size.opcode(), base).end();
            protocol::wait_ready(t, clock, timeout, poll)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_largest_fitting() {
        assert_eq!(EraseSize::largest_fitting(0, 0x10000), EraseSize::Block64);
        assert_eq!(EraseSize::largest_fitting(0, 0xF000), EraseSize::Block32);
        assert_eq!(EraseSize::largest_fitting(0x8000, 0x20000), EraseSize::Block32);
        assert_eq!(EraseSize::largest_fitting(0x1000, 0x20000), EraseSize::Sector);
        assert_eq!(EraseSize::largest_fitting(0, 0x1000), EraseSize::Sector);
    }

    #[test]
    fn test_timeouts_by_size() {
        let t = Timeouts::default();
        assert_eq!(EraseSize::Sector.timeout(&t), t.sector_erase_us);
        assert_eq!(EraseSize::Chip.timeout(&t), t.chip_erase_us);
    }
}
