//! norflash-dummy - In-memory serial NOR flash emulator for testing
//!
//! [`DummyFlash`] emulates a 25-series flash chip at the byte level: it only
//! sees chip-select edges and byte exchanges through [`SpiBus`], decodes the
//! command stream the way a real part does, and records every transaction so
//! tests can assert on exactly what went over the wire. [`MockClock`] is a
//! simulated monotonic clock for exercising busy-wait timeouts without real
//! delays.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod clock;

use alloc::vec;
use alloc::vec::Vec;

use norflash_core::bus::SpiBus;
use norflash_core::spi::{opcodes, AddressWidth, PAGE_SIZE};

pub use clock::MockClock;

/// Configuration for the dummy flash
#[derive(Debug, Clone)]
pub struct DummyConfig {
    /// JEDEC manufacturer ID
    pub manufacturer_id: u8,
    /// JEDEC memory type ID
    pub memory_type_id: u8,
    /// JEDEC capacity ID
    pub capacity_id: u8,
    /// Flash size in bytes
    pub size: usize,
    /// Status reads that report busy after each program or erase
    pub busy_polls: u32,
    /// Report busy forever
    pub stuck_busy: bool,
    /// Never set the write enable latch
    pub ignore_write_enable: bool,
    /// Accept EN4B/EX4B
    pub four_byte_capable: bool,
    /// Power up with block protection active; program/erase are ignored until unlocked
    pub write_protected: bool,
    /// Factory unique ID returned by 0x4B
    pub unique_id: u64,
}

impl Default for DummyConfig {
    fn default() -> Self {
        Self {
            manufacturer_id: 0xEF, // Winbond
            memory_type_id: 0x40,
            capacity_id: 0x18, // W25Q128
            size: 16 * 1024 * 1024,
            busy_polls: 1,
            stuck_busy: false,
            ignore_write_enable: false,
            four_byte_capable: true,
            write_protected: false,
            unique_id: 0xD1_6A_2C_09_43_57_81_1E,
        }
    }
}

impl DummyConfig {
    /// Small Winbond part (W25Q80, 1 MiB), handy for wrap-around tests
    pub fn small() -> Self {
        Self {
            capacity_id: 0x14,
            size: 1024 * 1024,
            ..Self::default()
        }
    }

    /// Winbond part beyond the 3-byte address range (W25Q256, 32 MiB)
    pub fn large() -> Self {
        Self {
            capacity_id: 0x19,
            size: 32 * 1024 * 1024,
            ..Self::default()
        }
    }

    /// Microchip SST25 or SST26 family part, write protected at power up
    pub fn microchip(memory_type_id: u8) -> Self {
        Self {
            manufacturer_id: 0xBF,
            memory_type_id,
            capacity_id: 0x14,
            size: 1024 * 1024,
            four_byte_capable: false,
            write_protected: true,
            ..Self::default()
        }
    }
}

/// One chip-select assertion as seen by the emulator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// First byte after select
    pub opcode: u8,
    /// Decoded address, for opcodes that carry one
    pub address: Option<u32>,
    /// Bytes the host sent after the header
    pub payload: Vec<u8>,
    /// Number of bytes exchanged after the header
    pub data_len: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Opcode,
    Header { len: usize },
    Data,
    Ignored,
}

/// Dummy flash chip
///
/// Emulates a flash chip in memory for testing purposes.
pub struct DummyFlash {
    config: DummyConfig,
    data: Vec<u8>,

    write_enabled: bool,
    status_write_enabled: bool,
    busy_remaining: u32,
    stuck_busy: bool,
    in_4byte_mode: bool,
    suspended: bool,
    powered_down: bool,
    protected: bool,

    selected: bool,
    phase: Phase,
    header: heapless::Vec<u8, 8>,
    frame: Option<Frame>,
    cursor: u32,
    frames: Vec<Frame>,
    selects: usize,
}

impl DummyFlash {
    /// Create a new dummy flash with the given configuration, fully erased
    ///
    /// A zero `size` gives a chip with no storage: data reads return 0xFF
    /// and program/erase change nothing.
    pub fn new(config: DummyConfig) -> Self {
        let data = vec![0xFF; config.size];
        Self {
            stuck_busy: config.stuck_busy,
            protected: config.write_protected,
            config,
            data,
            write_enabled: false,
            status_write_enabled: false,
            busy_remaining: 0,
            in_4byte_mode: false,
            suspended: false,
            powered_down: false,
            selected: false,
            phase: Phase::Opcode,
            header: heapless::Vec::new(),
            frame: None,
            cursor: 0,
            frames: Vec::new(),
            selects: 0,
        }
    }

    /// Create a new dummy flash with default configuration (W25Q128)
    pub fn new_default() -> Self {
        Self::new(DummyConfig::default())
    }

    /// Create a dummy flash with pre-filled data
    pub fn with_data(config: DummyConfig, initial_data: &[u8]) -> Self {
        let mut flash = Self::new(config);
        let len = core::cmp::min(initial_data.len(), flash.data.len());
        flash.data[..len].copy_from_slice(&initial_data[..len]);
        flash
    }

    /// Get a reference to the flash data
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Get a mutable reference to the flash data
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Take the flash data, consuming the emulator
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// Get the configuration
    pub fn config(&self) -> &DummyConfig {
        &self.config
    }

    /// Every completed transaction so far
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Forget recorded transactions
    pub fn clear_frames(&mut self) {
        self.frames.clear();
    }

    /// Number of chip-select assertions so far
    pub fn select_count(&self) -> usize {
        self.selects
    }

    /// Opcodes of the recorded transactions, in order
    pub fn opcodes(&self) -> Vec<u8> {
        self.frames.iter().map(|f| f.opcode).collect()
    }

    /// Make the chip report busy forever, or stop doing so
    pub fn set_stuck_busy(&mut self, stuck: bool) {
        self.stuck_busy = stuck;
    }

    /// Start an internal operation that stays busy for `polls` status reads
    pub fn start_busy(&mut self, polls: u32) {
        self.busy_remaining = polls;
    }

    /// Whether block protection is active
    pub fn is_protected(&self) -> bool {
        self.protected
    }

    /// Whether the emulated chip is in 4-byte address mode
    pub fn in_4byte_mode(&self) -> bool {
        self.in_4byte_mode
    }

    /// Whether the emulated chip is in deep power-down
    pub fn is_powered_down(&self) -> bool {
        self.powered_down
    }

    /// Whether an erase/program suspend is active
    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    fn busy(&self) -> bool {
        self.stuck_busy || (self.busy_remaining > 0 && !self.suspended)
    }

    fn address_width(&self) -> AddressWidth {
        if self.in_4byte_mode {
            AddressWidth::FourByte
        } else {
            AddressWidth::ThreeByte
        }
    }

    /// Bytes between the opcode and the data phase
    fn header_len(&self, opcode: u8) -> usize {
        let addr = self.address_width().bytes();
        match opcode {
            opcodes::READ | opcodes::PP | opcodes::SE_20 | opcodes::BE_52 | opcodes::BE_D8 => addr,
            opcodes::FAST_READ => 1 + addr,
            opcodes::REMS => 3,
            opcodes::RDSFDP => 4,
            opcodes::RDUID => 4,
            _ => 0,
        }
    }

    /// Decode the address from the collected header bytes
    fn header_address(&self, opcode: u8) -> Option<u32> {
        let bytes: &[u8] = match opcode {
            opcodes::FAST_READ => &self.header[1..],
            opcodes::RDSFDP => &self.header[..3],
            opcodes::READ
            | opcodes::PP
            | opcodes::SE_20
            | opcodes::BE_52
            | opcodes::BE_D8
            | opcodes::REMS => &self.header[..],
            _ => return None,
        };
        Some(bytes.iter().fold(0u32, |acc, &b| (acc << 8) | u32::from(b)))
    }

    fn status1(&self) -> u8 {
        let mut sr1 = 0;
        if self.busy() {
            sr1 |= opcodes::SR1_WIP;
        }
        if self.write_enabled {
            sr1 |= opcodes::SR1_WEL;
        }
        if self.suspended && self.config.manufacturer_id == 0xBF {
            sr1 |= opcodes::SR1_WSE;
        }
        sr1
    }

    fn status2(&self) -> u8 {
        if self.suspended && self.config.manufacturer_id != 0xBF {
            opcodes::SR2_SUS
        } else {
            0
        }
    }

    fn status3(&self) -> u8 {
        if self.in_4byte_mode {
            opcodes::SR3_ADS
        } else {
            0
        }
    }

    fn begin_data(&mut self) {
        let opcode = self.frame.as_ref().map_or(0, |f| f.opcode);
        let address = self.header_address(opcode);
        if let Some(frame) = self.frame.as_mut() {
            frame.address = address;
        }
        self.cursor = address.unwrap_or(0);
        self.phase = Phase::Data;
    }

    /// Byte returned during the data phase; `index` counts from 0
    fn data_out(&mut self, opcode: u8, index: usize) -> u8 {
        match opcode {
            opcodes::RDID => [
                self.config.manufacturer_id,
                self.config.memory_type_id,
                self.config.capacity_id,
            ][index % 3],
            opcodes::RDSR => {
                let sr1 = self.status1();
                if !self.stuck_busy && !self.suspended && self.busy_remaining > 0 {
                    self.busy_remaining -= 1;
                }
                sr1
            }
            opcodes::RDSR2 => self.status2(),
            opcodes::RDSR3 => self.status3(),
            opcodes::READ | opcodes::FAST_READ => {
                let size = self.data.len() as u32;
                if size == 0 {
                    return 0xFF;
                }
                let byte = self.data[(self.cursor % size) as usize];
                self.cursor = (self.cursor + 1) % size;
                byte
            }
            opcodes::REMS => {
                [self.config.manufacturer_id, self.config.capacity_id.wrapping_sub(1)][index % 2]
            }
            opcodes::RDUID => self
                .config
                .unique_id
                .to_be_bytes()
                .get(index)
                .copied()
                .unwrap_or(0xFF),
            opcodes::RDSFDP => {
                let offset = self.cursor as usize + index;
                b"SFDP".get(offset).copied().unwrap_or(0xFF)
            }
            _ => 0xFF,
        }
    }

    /// Run the command once chip select goes high
    fn execute(&mut self, frame: &Frame) {
        let opcode = frame.opcode;
        let status_write = self.status_write_enabled;
        self.status_write_enabled = false;

        if self.busy() && !matches!(opcode, opcodes::RDSR | opcodes::SUSPEND) {
            log::trace!("dummy: ignoring 0x{:02X} while busy", opcode);
            return;
        }

        match opcode {
            opcodes::WREN => self.write_enabled = !self.config.ignore_write_enable,
            opcodes::WRDI => self.write_enabled = false,
            opcodes::EWSR => self.status_write_enabled = true,
            opcodes::WRSR => {
                if (self.write_enabled || status_write) && !frame.payload.is_empty() {
                    // BP0..BP3
                    self.protected = frame.payload[0] & 0x3C != 0;
                    self.write_enabled = false;
                }
            }
            opcodes::ULBPR => {
                if self.write_enabled {
                    self.protected = false;
                    self.write_enabled = false;
                }
            }
            opcodes::EN4B => {
                if self.config.four_byte_capable {
                    self.in_4byte_mode = true;
                }
            }
            opcodes::EX4B => self.in_4byte_mode = false,
            opcodes::DP => self.powered_down = true,
            opcodes::RDP => self.powered_down = false,
            opcodes::SUSPEND => {
                if self.busy_remaining > 0 {
                    self.suspended = true;
                }
            }
            opcodes::RESUME => self.suspended = false,
            opcodes::PP => self.program(frame),
            opcodes::SE_20 => self.erase(frame, 4 * 1024),
            opcodes::BE_52 => self.erase(frame, 32 * 1024),
            opcodes::BE_D8 => self.erase(frame, 64 * 1024),
            opcodes::CE_60 | opcodes::CE_C7 => {
                if self.modify_allowed() {
                    let size = self.data.len();
                    self.erase_range(0, size);
                }
            }
            _ => {}
        }
    }

    fn modify_allowed(&mut self) -> bool {
        let allowed = self.write_enabled && !self.protected && !self.suspended;
        self.write_enabled = false;
        allowed
    }

    fn program(&mut self, frame: &Frame) {
        if !self.modify_allowed() {
            log::trace!("dummy: page program rejected");
            return;
        }
        let size = self.data.len() as u32;
        if size == 0 {
            return;
        }
        let addr = frame.address.unwrap_or(0) % size;
        let page = addr - addr % PAGE_SIZE;

        // Flash programming: can only change 1 -> 0, wraps inside the page
        for (i, &byte) in frame.payload.iter().enumerate() {
            let offset = (addr % PAGE_SIZE + i as u32) % PAGE_SIZE;
            self.data[((page + offset) % size) as usize] &= byte;
        }
        self.busy_remaining = self.config.busy_polls;
    }

    fn erase(&mut self, frame: &Frame, erase_size: usize) {
        if !self.modify_allowed() {
            log::trace!("dummy: erase rejected");
            return;
        }
        if self.data.is_empty() {
            return;
        }
        let addr = frame.address.unwrap_or(0) as usize % self.data.len();
        let aligned = addr & !(erase_size - 1);
        self.erase_range(aligned, erase_size);
    }

    fn erase_range(&mut self, start: usize, len: usize) {
        let start = core::cmp::min(start, self.data.len());
        let end = core::cmp::min(start + len, self.data.len());
        for byte in &mut self.data[start..end] {
            *byte = 0xFF;
        }
        self.busy_remaining = self.config.busy_polls;
    }
}

impl SpiBus for DummyFlash {
    fn select(&mut self) {
        self.selected = true;
        self.selects += 1;
        self.phase = Phase::Opcode;
        self.header.clear();
        self.frame = None;
    }

    fn deselect(&mut self) {
        if !self.selected {
            return;
        }
        self.selected = false;
        if let Some(frame) = self.frame.take() {
            if self.phase != Phase::Ignored {
                self.execute(&frame);
            }
            self.frames.push(frame);
        }
    }

    fn transfer(&mut self, byte: u8) -> u8 {
        if !self.selected {
            return 0xFF;
        }

        match self.phase {
            Phase::Opcode => {
                self.frame = Some(Frame {
                    opcode: byte,
                    address: None,
                    payload: Vec::new(),
                    data_len: 0,
                });
                if self.powered_down && byte != opcodes::RDP {
                    self.phase = Phase::Ignored;
                    return 0xFF;
                }
                match self.header_len(byte) {
                    0 => self.begin_data(),
                    len => self.phase = Phase::Header { len },
                }
                0xFF
            }
            Phase::Header { len } => {
                // Header lengths never exceed the buffer
                let _ = self.header.push(byte);
                if self.header.len() == len {
                    self.begin_data();
                }
                0xFF
            }
            Phase::Data => {
                let (opcode, index) = match self.frame.as_mut() {
                    Some(frame) => {
                        frame.payload.push(byte);
                        frame.data_len += 1;
                        (frame.opcode, frame.data_len - 1)
                    }
                    None => return 0xFF,
                };
                self.data_out(opcode, index)
            }
            Phase::Ignored => {
                if let Some(frame) = self.frame.as_mut() {
                    frame.data_len += 1;
                }
                0xFF
            }
        }
    }
}
