//! Chip identification and setup

use crate::bus::{Clock, SpiBus};
use crate::chip::{resolve_capacity, ChipDescriptor, Manufacturer, UnlockStyle, VendorProfile};
use crate::error::{Error, Result};
use crate::protocol;
use crate::spi::opcodes;

use super::SpiFlash;

/// Settle time between the SST26 global unlock steps
const ULBPR_WREN_DELAY_US: u32 = 10;
const ULBPR_SETTLE_US: u32 = 50;

impl<B: SpiBus, C: Clock> SpiFlash<B, C> {
    /// Identify the attached chip and resolve its capacity from the registry
    pub fn identify(&mut self) -> Result<()> {
        self.identify_with_capacity(None)
    }

    /// Identify the attached chip
    ///
    /// With `capacity` given (and non-zero) the registry lookup is skipped,
    /// which lets chips from vendors outside the allow-list be used.
    pub fn identify_with_capacity(&mut self, capacity: Option<u32>) -> Result<()> {
        let result = self.identify_inner(capacity);
        self.record(result)
    }

    fn identify_inner(&mut self, capacity: Option<u32>) -> Result<()> {
        self.ensure_powered()?;
        self.wait_ready(self.config.timeouts.busy_us)?;

        let (mfr, memory_type, capacity_id) = protocol::read_jedec_id(&mut self.transport);
        log::debug!(
            "JEDEC ID: {:02X} {:02X} {:02X}",
            mfr,
            memory_type,
            capacity_id
        );
        if mfr == 0 {
            self.chip = ChipDescriptor::default();
            return Err(Error::NoResponse);
        }

        self.chip = ChipDescriptor::from_jedec(mfr, memory_type, capacity_id);
        self.profile = Manufacturer::from_id(mfr)
            .map(|m| VendorProfile::select(m, memory_type))
            .unwrap_or_default();

        self.unlock_block_protection()?;

        let size = match capacity {
            Some(size) if size > 0 => size,
            _ => resolve_capacity(mfr, capacity_id)?,
        };
        self.chip.set_capacity(size);

        let signature = protocol::read_sfdp_signature(&mut self.transport);
        self.chip.sfdp = Some(signature);
        if !self.chip.has_sfdp() {
            log::debug!("No SFDP signature (read 0x{:08X})", signature);
        }

        match self.chip.manufacturer() {
            Some(m) => log::info!(
                "Found {} flash, JEDEC ID 0x{:06X}, {} KiB",
                m.name(),
                self.chip.jedec_id(),
                size / 1024
            ),
            None => log::info!(
                "Found flash with JEDEC ID 0x{:06X}, {} KiB (capacity given)",
                self.chip.jedec_id(),
                size / 1024
            ),
        }
        Ok(())
    }

    /// Clear global block protection on parts that power up locked
    fn unlock_block_protection(&mut self) -> Result<()> {
        match self.profile.unlock {
            UnlockStyle::None => Ok(()),
            UnlockStyle::StatusRewrite => {
                let sr1 = protocol::read_status1(&mut self.transport);
                log::debug!("Clearing block protection (SR1 was 0x{:02X})", sr1);
                protocol::write_status1_ewsr(&mut self.transport, sr1 & opcodes::SR1_SST25_KEEP);
                self.wait_ready(self.config.timeouts.busy_us)
            }
            UnlockStyle::GlobalUnlock => {
                log::debug!("Issuing global block protection unlock");
                self.wait_ready(self.config.timeouts.busy_us)?;
                protocol::write_enable(&mut self.transport)?;
                self.clock.delay_us(ULBPR_WREN_DELAY_US);
                self.transport.command(opcodes::ULBPR);
                self.clock.delay_us(ULBPR_SETTLE_US);
                protocol::write_disable(&mut self.transport);
                Ok(())
            }
        }
    }

    /// Read the legacy manufacturer/device ID pair (0x90)
    pub fn read_manufacturer_device_id(&mut self) -> Result<(u8, u8)> {
        let result = self
            .ensure_powered()
            .map(|()| protocol::read_manufacturer_device_id(&mut self.transport));
        self.record(result)
    }

    /// Read the 64-bit factory unique ID
    pub fn read_unique_id(&mut self) -> Result<u64> {
        let result = self.ensure_powered().and_then(|()| {
            self.wait_ready(self.config.timeouts.busy_us)?;
            Ok(protocol::read_unique_id(&mut self.transport))
        });
        self.record(result)
    }

    /// Read the SFDP signature word
    pub fn read_sfdp_signature(&mut self) -> Result<u32> {
        let result = self
            .ensure_powered()
            .map(|()| protocol::read_sfdp_signature(&mut self.transport));
        self.record(result)
    }
}
