//! Driver state, guards and the error slot

use crate::bus::{Clock, SpiBus};
use crate::chip::{ChipDescriptor, VendorProfile};
use crate::config::DriverConfig;
use crate::error::{AddressModeSwitch, Error, Result};
use crate::protocol::{self, Transport};
use crate::spi::AddressWidth;

use super::AddressCursor;

/// Serial NOR flash driver
///
/// Every fallible operation returns a [`Result`] and also records its
/// failure in a last-error slot, readable through [`SpiFlash::last_error`]
/// and [`SpiFlash::error_code`]. A later success does not clear the slot;
/// only [`SpiFlash::clear_error`] does.
pub struct SpiFlash<B: SpiBus, C: Clock> {
    pub(crate) transport: Transport<B>,
    pub(crate) clock: C,
    pub(crate) config: DriverConfig,
    pub(crate) chip: ChipDescriptor,
    pub(crate) profile: VendorProfile,
    pub(crate) cursor: AddressCursor,
    pub(crate) powered_down: bool,
    last_error: Option<Error>,
}

impl<B: SpiBus, C: Clock> SpiFlash<B, C> {
    /// Create a driver. Nothing is sent on the bus until [`SpiFlash::identify`].
    pub fn new(bus: B, clock: C, config: DriverConfig) -> Self {
        Self {
            transport: Transport::new(bus),
            clock,
            config,
            chip: ChipDescriptor::default(),
            profile: VendorProfile::default(),
            cursor: AddressCursor::default(),
            powered_down: false,
            last_error: None,
        }
    }

    /// The identified chip (capacity 0 until identification succeeded)
    pub fn chip(&self) -> &ChipDescriptor {
        &self.chip
    }

    /// Vendor quirks selected at identification
    pub fn profile(&self) -> &VendorProfile {
        &self.profile
    }

    /// Active configuration
    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Total capacity in bytes, 0 until identified
    pub fn capacity(&self) -> u32 {
        self.chip.capacity()
    }

    /// Number of 256-byte pages
    pub fn max_page(&self) -> u32 {
        self.chip.max_page()
    }

    /// The 24-bit JEDEC ID read at identification
    pub fn jedec_id(&self) -> u32 {
        self.chip.jedec_id()
    }

    /// Manufacturer ID read at identification
    pub fn manufacturer_id(&self) -> u8 {
        self.chip.manufacturer_id
    }

    /// Memory type ID read at identification
    pub fn memory_type_id(&self) -> u8 {
        self.chip.memory_type_id
    }

    /// Capacity ID read at identification
    pub fn capacity_id(&self) -> u8 {
        self.chip.capacity_id
    }

    /// Whether the chip is in deep power-down
    pub fn is_powered_down(&self) -> bool {
        self.powered_down
    }

    /// Cursor state of the most recent read/write/erase
    pub fn cursor(&self) -> AddressCursor {
        self.cursor
    }

    /// The most recent failure, if any
    pub fn last_error(&self) -> Option<Error> {
        self.last_error
    }

    /// Numeric code of the most recent failure, 0 if none
    pub fn error_code(&self) -> u8 {
        self.last_error.map_or(0, |e| e.code())
    }

    /// Forget the most recent failure
    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    /// Borrow the bus
    pub fn bus(&self) -> &B {
        self.transport.bus()
    }

    /// Mutably borrow the bus
    pub fn bus_mut(&mut self) -> &mut B {
        self.transport.bus_mut()
    }

    /// Mutably borrow the clock
    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    /// Tear down the driver, handing back the bus and the clock
    pub fn release(self) -> (B, C) {
        (self.transport.into_inner(), self.clock)
    }

    /// Wait until the chip is not busy, up to `timeout_us`
    pub fn wait_until_ready(&mut self, timeout_us: u32) -> Result<()> {
        let result = self.ensure_powered().and_then(|()| self.wait_ready(timeout_us));
        self.record(result)
    }

    /// Read status register 1
    pub fn read_status1(&mut self) -> Result<u8> {
        let result = self
            .ensure_powered()
            .map(|()| protocol::read_status1(&mut self.transport));
        self.record(result)
    }

    /// Read status register 2
    pub fn read_status2(&mut self) -> Result<u8> {
        let result = self
            .ensure_powered()
            .map(|()| protocol::read_status2(&mut self.transport));
        self.record(result)
    }

    /// Read status register 3
    pub fn read_status3(&mut self) -> Result<u8> {
        let result = self
            .ensure_powered()
            .map(|()| protocol::read_status3(&mut self.transport));
        self.record(result)
    }

    /// Clear the write enable latch
    pub fn write_disable(&mut self) -> Result<()> {
        let result = self
            .ensure_powered()
            .map(|()| protocol::write_disable(&mut self.transport));
        self.record(result)
    }

    pub(crate) fn record<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            log::warn!("Flash operation failed: {} (code {})", e, e.code());
            self.last_error = Some(*e);
        }
        result
    }

    pub(crate) fn ensure_powered(&self) -> Result<()> {
        if self.powered_down {
            return Err(Error::PoweredDown);
        }
        Ok(())
    }

    pub(crate) fn ensure_identified(&self) -> Result<()> {
        if self.chip.capacity() == 0 {
            return Err(Error::NotInitialized);
        }
        Ok(())
    }

    /// Validate a request and reset the cursor for it
    pub(crate) fn check_address(&mut self, addr: u32, size: u32) -> Result<AddressCursor> {
        let cursor = AddressCursor::check(
            self.chip.capacity(),
            addr,
            size,
            self.config.allow_address_wrap,
        )?;
        self.cursor = cursor;
        Ok(cursor)
    }

    pub(crate) fn ensure_not_suspended(&mut self) -> Result<()> {
        protocol::check_not_suspended(&mut self.transport, self.profile.quirks)
    }

    pub(crate) fn wait_ready(&mut self, timeout_us: u32) -> Result<()> {
        protocol::wait_ready(
            &mut self.transport,
            &mut self.clock,
            timeout_us,
            self.config.timeouts.poll_interval_us,
        )
    }

    /// Address width needed to reach `len` bytes from `addr`
    pub(crate) fn width_for(&self, addr: u32, len: u32) -> Result<AddressWidth> {
        let width = AddressWidth::required_for(u64::from(addr) + u64::from(len));
        if width == AddressWidth::FourByte && !self.profile.supports_four_byte() {
            log::warn!(
                "0x{:08X}+{} needs 4-byte addressing, which this chip lacks",
                addr,
                len
            );
            return Err(Error::AddressModeFailed(AddressModeSwitch::Enter));
        }
        Ok(width)
    }
}

impl<B: SpiBus, C: Clock> core::fmt::Debug for SpiFlash<B, C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SpiFlash")
            .field("chip", &self.chip)
            .field("profile", &self.profile)
            .field("powered_down", &self.powered_down)
            .field("last_error", &self.last_error)
            .finish_non_exhaustive()
    }
}
