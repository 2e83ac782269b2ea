//! Deep power-down and erase/program suspend

use crate::bus::{Clock, SpiBus};
use crate::chip::Quirks;
use crate::error::{Error, Result};
use crate::protocol;
use crate::spi::opcodes;

use super::SpiFlash;

/// tDP: CS high to deep power-down
const POWER_DOWN_DELAY_US: u32 = 3;
/// tRES1: CS high to standby after release
const RELEASE_DELAY_US: u32 = 3;
/// tSUS: suspend/resume latency
const SUSPEND_DELAY_US: u32 = 20;

impl<B: SpiBus, C: Clock> SpiFlash<B, C> {
    /// Put the chip into deep power-down
    ///
    /// Until [`SpiFlash::power_up`] succeeds every other operation fails with
    /// [`Error::PoweredDown`] without touching the bus.
    pub fn power_down(&mut self) -> Result<()> {
        let result = self.power_down_inner();
        self.record(result)
    }

    /// Release the chip from deep power-down
    ///
    /// Success is confirmed by setting and clearing the write enable latch.
    pub fn power_up(&mut self) -> Result<()> {
        let result = self.power_up_inner();
        self.record(result)
    }

    /// Suspend an erase or program in progress
    ///
    /// Does nothing if the chip is idle or already suspended.
    pub fn suspend(&mut self) -> Result<()> {
        let result = self.suspend_inner();
        self.record(result)
    }

    /// Resume a suspended erase or program
    ///
    /// Does nothing if no suspend is active.
    pub fn resume(&mut self) -> Result<()> {
        let result = self.resume_inner();
        self.record(result)
    }

    /// Whether an erase/program suspend is active
    pub fn is_suspended(&mut self) -> Result<bool> {
        let result = self
            .ensure_powered()
            .map(|()| protocol::is_suspended(&mut self.transport, self.profile.quirks));
        self.record(result)
    }

    fn power_down_inner(&mut self) -> Result<()> {
        if self.powered_down {
            return Ok(());
        }
        if self.profile.quirks.contains(Quirks::NO_POWER_DOWN) {
            return Err(Error::Unsupported);
        }

        self.wait_ready(self.config.timeouts.busy_us)?;
        self.transport.command(opcodes::DP);
        self.clock.delay_us(POWER_DOWN_DELAY_US);
        self.powered_down = true;
        log::debug!("Entered deep power-down");
        Ok(())
    }

    fn power_up_inner(&mut self) -> Result<()> {
        self.transport.command(opcodes::RDP);
        self.clock.delay_us(RELEASE_DELAY_US);

        protocol::write_enable(&mut self.transport)?;
        protocol::write_disable(&mut self.transport);
        self.powered_down = false;
        log::debug!("Released from deep power-down");
        Ok(())
    }

    fn suspend_quirks(&self) -> Result<Quirks> {
        let quirks = self.profile.quirks;
        if !quirks.intersects(Quirks::SUSPEND_SR1 | Quirks::SUSPEND_SR2) {
            return Err(Error::Unsupported);
        }
        Ok(quirks)
    }

    fn suspend_inner(&mut self) -> Result<()> {
        self.ensure_powered()?;
        let quirks = self.suspend_quirks()?;

        if protocol::is_suspended(&mut self.transport, quirks) {
            return Ok(());
        }
        if !protocol::is_busy(&mut self.transport) {
            log::debug!("Nothing to suspend");
            return Ok(());
        }

        self.transport.command(opcodes::SUSPEND);
        self.clock.delay_us(SUSPEND_DELAY_US);
        self.wait_ready(self.config.timeouts.busy_us)?;

        if !protocol::is_suspended(&mut self.transport, quirks) {
            return Err(Error::SuspendFailed);
        }
        log::debug!("Suspended");
        Ok(())
    }

    fn resume_inner(&mut self) -> Result<()> {
        self.ensure_powered()?;
        let quirks = self.suspend_quirks()?;

        if !protocol::is_suspended(&mut self.transport, quirks) {
            return Ok(());
        }

        self.transport.command(opcodes::RESUME);
        self.clock.delay_us(SUSPEND_DELAY_US);

        if protocol::is_suspended(&mut self.transport, quirks) {
            return Err(Error::SuspendFailed);
        }
        log::debug!("Resumed");
        Ok(())
    }
}
