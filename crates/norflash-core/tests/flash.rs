//! Read, write and erase against the byte-level emulator

use norflash_core::error::AddressModeSwitch;
use norflash_core::spi::opcodes;
use norflash_core::{DriverConfig, Error, SpiFlash, Timeouts};
use norflash_dummy::{DummyConfig, DummyFlash, MockClock};

type Flash = SpiFlash<DummyFlash, MockClock>;

fn identified(chip: DummyFlash, config: DriverConfig) -> Flash {
    let mut flash = SpiFlash::new(chip, MockClock::with_step(1), config);
    flash.identify().unwrap();
    flash.bus_mut().clear_frames();
    flash
}

fn default_flash() -> Flash {
    identified(DummyFlash::new_default(), DriverConfig::default())
}

fn pattern(len: usize, seed: u8) -> Vec<u8> {
    (0..len)
        .map(|i| (i as u8).wrapping_mul(31).wrapping_add(seed))
        .collect()
}

#[test]
fn test_round_trip() {
    let mut flash = default_flash();

    for (i, &(addr, len)) in [
        (0u32, 1usize),
        (0x1000, 2),
        (0x2010, 255),
        (0x3000, 256),
        (0x40F0, 257),
        (0x5001, 1000),
        (0x6000, 1024),
    ]
    .iter()
    .enumerate()
    {
        let data = pattern(len, i as u8);
        flash.write(addr, &data).unwrap();

        let mut buf = vec![0u8; len];
        flash.read(addr, &mut buf).unwrap();
        assert_eq!(buf, data, "round trip at 0x{:X}+{}", addr, len);
    }
    assert_eq!(flash.error_code(), 0);
}

#[test]
fn test_read_is_idempotent() {
    let mut flash = default_flash();
    flash.write(0x100, &pattern(300, 7)).unwrap();

    let mut first = [0u8; 512];
    let mut second = [0u8; 512];
    flash.read(0x80, &mut first).unwrap();
    flash.read(0x80, &mut second).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_page_split_chunks() {
    let mut flash = default_flash();
    let data = pattern(20, 1);
    flash.write(250, &data).unwrap();

    let bus = flash.bus();
    let programs: Vec<_> = bus
        .frames()
        .iter()
        .filter(|f| f.opcode == opcodes::PP)
        .map(|f| (f.address, f.payload.len()))
        .collect();
    assert_eq!(programs, vec![(Some(250), 6), (Some(256), 14)]);

    // Busy check, erased check, suspend check, two gated chunks, verify
    assert_eq!(
        bus.opcodes(),
        vec![
            opcodes::RDSR,
            opcodes::READ,
            opcodes::RDSR2,
            opcodes::WREN,
            opcodes::RDSR,
            opcodes::PP,
            opcodes::RDSR,
            opcodes::RDSR,
            opcodes::WREN,
            opcodes::RDSR,
            opcodes::PP,
            opcodes::RDSR,
            opcodes::RDSR,
            opcodes::READ,
        ]
    );
    assert_eq!(&bus.data()[250..270], &data[..]);
}

#[test]
fn test_empty_write_sends_nothing() {
    let mut flash = default_flash();
    flash.write(0x100, &[]).unwrap();
    assert!(flash.bus().frames().is_empty());
}

#[test]
fn test_not_erased_guard() {
    let mut image = vec![0xFF; 0x200];
    image[0x105] = 0x00;
    let chip = DummyFlash::with_data(DummyConfig::small(), &image);
    let mut flash = identified(chip, DriverConfig::default());

    let err = flash.write(0x100, &[0xAA; 16]).unwrap_err();
    assert_eq!(
        err,
        Error::NotErased {
            addr: 0x105,
            found: 0x00
        }
    );
    assert_eq!(flash.error_code(), 0x07);
    assert!(!flash.bus().opcodes().contains(&opcodes::PP));
    assert_eq!(flash.bus().data()[0x100], 0xFF);
}

#[test]
fn test_skip_erased_check_then_verify_fails() {
    let mut image = vec![0xFF; 0x200];
    image[0x102] = 0x0F;
    let chip = DummyFlash::with_data(DummyConfig::small(), &image);
    let config = DriverConfig::default().with_skip_erased_check(true);
    let mut flash = identified(chip, config);

    let err = flash.write(0x100, &[0xF0; 4]).unwrap_err();
    assert_eq!(
        err,
        Error::VerifyFailed {
            addr: 0x102,
            expected: 0xF0,
            found: 0x00
        }
    );
    assert!(flash.bus().opcodes().contains(&opcodes::PP));
}

#[test]
fn test_verification_can_be_disabled() {
    let config = DriverConfig::default().with_verify_writes(false);
    let mut flash = identified(DummyFlash::new_default(), config);
    flash.write(0x40, &[1, 2, 3]).unwrap();
    assert_eq!(
        flash.bus().opcodes().last().copied(),
        Some(opcodes::RDSR),
        "no read-back after the last busy poll"
    );
}

#[test]
fn test_out_of_bounds_without_wrap_sends_nothing() {
    let config = DriverConfig::default().with_address_wrap(false);
    let mut flash = identified(DummyFlash::new(DummyConfig::small()), config);
    let capacity = flash.capacity();
    let selects = flash.bus().select_count();

    let mut buf = [0u8; 16];
    assert_eq!(
        flash.read(capacity - 16, &mut buf),
        Err(Error::OutOfBounds {
            addr: capacity - 16,
            len: 16
        })
    );
    assert!(flash.write(capacity - 8, &[0u8; 16]).is_err());
    assert!(flash.erase_sector(capacity).is_err());
    assert_eq!(flash.bus().select_count(), selects);
    assert_eq!(flash.error_code(), 0x05);
}

#[test]
fn test_write_wraps_to_zero() {
    let mut flash = identified(DummyFlash::new(DummyConfig::small()), DriverConfig::default());
    let capacity = flash.capacity();
    let data = pattern(10, 3);

    flash.write(capacity - 4, &data).unwrap();
    assert_eq!(flash.cursor().overflow, 0);

    let image = flash.bus().data();
    assert_eq!(&image[(capacity - 4) as usize..], &data[..4]);
    assert_eq!(&image[..6], &data[4..]);

    let mut buf = [0u8; 10];
    flash.read(capacity - 4, &mut buf).unwrap();
    assert_eq!(&buf[..], &data[..]);
}

#[test]
fn test_overflow_remainder() {
    let mut flash = identified(DummyFlash::new(DummyConfig::small()), DriverConfig::default());
    let capacity = flash.capacity();
    let mut buf = [0u8; 0x30];
    flash.read(capacity - 0x10, &mut buf).unwrap();
    assert_eq!(flash.cursor().overflow, 0);
    assert_eq!(flash.cursor().current, 0x20);

    // A range that only reaches the top is not a wrap
    let mut top = [0u8; 0x10];
    flash.read(capacity - 0x10, &mut top).unwrap();
    assert_eq!(flash.cursor().overflow, 0);
    assert_eq!(flash.cursor().current, 0);
}

#[test]
fn test_uninitialized_rejects_everything() {
    let mut flash = SpiFlash::new(
        DummyFlash::new_default(),
        MockClock::new(),
        DriverConfig::default(),
    );
    let mut buf = [0u8; 4];
    assert_eq!(flash.read(0, &mut buf), Err(Error::NotInitialized));
    assert_eq!(flash.write(0, &buf), Err(Error::NotInitialized));
    assert_eq!(flash.erase_chip(), Err(Error::NotInitialized));
    assert_eq!(flash.bus().select_count(), 0);
}

#[test]
fn test_erase_sector_aligns_down() {
    let chip = DummyFlash::with_data(DummyConfig::small(), &[0u8; 0x3000]);
    let mut flash = identified(chip, DriverConfig::default());

    flash.erase_sector(0x1234).unwrap();

    let erase = flash
        .bus()
        .frames()
        .iter()
        .find(|f| f.opcode == opcodes::SE_20)
        .cloned()
        .unwrap();
    assert_eq!(erase.address, Some(0x1000));

    let image = flash.bus().data();
    assert!(image[0x1000..0x2000].iter().all(|&b| b == 0xFF));
    assert!(image[..0x1000].iter().all(|&b| b == 0x00));
    assert!(image[0x2000..0x3000].iter().all(|&b| b == 0x00));
}

#[test]
fn test_erase_then_rewrite() {
    let mut flash = default_flash();
    flash.write(0x8000, &[0x00; 8]).unwrap();
    assert!(matches!(
        flash.write(0x8000, &[0x55; 8]),
        Err(Error::NotErased { .. })
    ));

    flash.erase_block32(0x8000).unwrap();
    assert!(flash.is_erased(0x8000, 0x8000).unwrap());
    flash.write(0x8000, &[0x55; 8]).unwrap();
}

#[test]
fn test_erase_section_picks_largest_units() {
    let mut flash = default_flash();
    flash.erase_section(0x1800, 0x1F000).unwrap();

    let erases: Vec<_> = flash
        .bus()
        .frames()
        .iter()
        .filter(|f| matches!(f.opcode, opcodes::SE_20 | opcodes::BE_52 | opcodes::BE_D8))
        .map(|f| (f.opcode, f.address.unwrap_or(0)))
        .collect();

    let mut expected: Vec<_> = (1..8).map(|i| (opcodes::SE_20, i * 0x1000)).collect();
    expected.push((opcodes::BE_52, 0x8000));
    expected.push((opcodes::BE_D8, 0x10000));
    expected.push((opcodes::SE_20, 0x20000));
    assert_eq!(erases, expected);
}

#[test]
fn test_erase_chip() {
    let chip = DummyFlash::with_data(DummyConfig::small(), &[0x12; 0x100]);
    let mut flash = identified(chip, DriverConfig::default());
    flash.erase_chip().unwrap();
    assert!(flash.bus().opcodes().contains(&opcodes::CE_60));
    assert!(flash.bus().data().iter().all(|&b| b == 0xFF));
}

#[test]
fn test_fast_read_framing() {
    let config = DriverConfig::default().with_fast_read(true);
    let mut flash = identified(DummyFlash::new_default(), config);
    flash.write(0x200, &[9, 8, 7]).unwrap();
    flash.bus_mut().clear_frames();

    let mut buf = [0u8; 3];
    flash.read(0x200, &mut buf).unwrap();
    assert_eq!(buf, [9, 8, 7]);

    let frame = flash.bus().frames().last().cloned().unwrap();
    assert_eq!(frame.opcode, opcodes::FAST_READ);
    assert_eq!(frame.address, Some(0x200));
}

#[test]
fn test_four_byte_bracket() {
    let mut flash = identified(DummyFlash::new(DummyConfig::large()), DriverConfig::default());
    let addr = 0x0100_0000;
    flash.write(addr, &[0xA5; 8]).unwrap();

    let ops = flash.bus().opcodes();
    let pp = ops.iter().position(|&op| op == opcodes::PP).unwrap();
    let en4b = ops[..pp].iter().rposition(|&op| op == opcodes::EN4B).unwrap();
    let wren = ops[..pp].iter().rposition(|&op| op == opcodes::WREN).unwrap();
    let ex4b = pp + ops[pp..].iter().position(|&op| op == opcodes::EX4B).unwrap();
    assert!(en4b < wren);
    // The busy wait runs before leaving 4-byte mode
    assert!(ops[pp + 1..ex4b].contains(&opcodes::RDSR));

    assert!(!flash.bus().in_4byte_mode());
    let mut buf = [0u8; 8];
    flash.read(addr, &mut buf).unwrap();
    assert_eq!(buf, [0xA5; 8]);
    assert_eq!(&flash.bus().data()[addr as usize..addr as usize + 8], &[0xA5; 8]);
}

#[test]
fn test_low_addresses_stay_three_byte() {
    let mut flash = identified(DummyFlash::new(DummyConfig::large()), DriverConfig::default());
    flash.write(0x10, &[1]).unwrap();
    assert!(!flash.bus().opcodes().contains(&opcodes::EN4B));
}

#[test]
fn test_four_byte_unsupported() {
    // Cypress part without EN4B support in the vendor profile
    let chip = DummyFlash::new(DummyConfig {
        manufacturer_id: 0x01,
        ..DummyConfig::large()
    });
    let mut flash = identified(chip, DriverConfig::default());
    let mut buf = [0u8; 4];
    assert_eq!(
        flash.read(0x0100_0000, &mut buf),
        Err(Error::AddressModeFailed(AddressModeSwitch::Enter))
    );
    assert_eq!(flash.error_code(), 0x0D);
}

#[test]
fn test_write_enable_failure() {
    let chip = DummyFlash::new(DummyConfig {
        ignore_write_enable: true,
        ..DummyConfig::small()
    });
    let mut flash = identified(chip, DriverConfig::default());
    assert_eq!(flash.write(0, &[0]), Err(Error::WriteEnableFailed));
    assert_eq!(flash.erase_sector(0), Err(Error::WriteEnableFailed));
    assert!(!flash.bus().opcodes().contains(&opcodes::PP));
}

#[test]
fn test_busy_timeout_not_before_deadline() {
    let timeouts = Timeouts {
        busy_us: 1000,
        ..Timeouts::default()
    };
    let config = DriverConfig::default().with_timeouts(timeouts);
    let mut flash = SpiFlash::new(DummyFlash::new_default(), MockClock::with_step(100), config);

    // Busy for nine polls: still ready 100us before the deadline
    flash.bus_mut().start_busy(9);
    flash.wait_until_ready(1000).unwrap();

    flash.bus_mut().clear_frames();
    flash.bus_mut().set_stuck_busy(true);
    let start = flash.clock_mut().now();
    assert_eq!(flash.wait_until_ready(1000), Err(Error::BusyTimeout));

    let polls = flash
        .bus()
        .frames()
        .iter()
        .filter(|f| f.opcode == opcodes::RDSR)
        .count();
    assert_eq!(polls, 10);
    assert!(flash.clock_mut().now() - start >= 1000);
    assert_eq!(flash.error_code(), 0x04);
}

#[test]
fn test_erase_timeout_follows_granularity() {
    let timeouts = Timeouts {
        sector_erase_us: 1000,
        block64_erase_us: 10_000,
        chip_erase_us: 100_000,
        ..Timeouts::default()
    };
    let config = DriverConfig::default().with_timeouts(timeouts);
    // Each erase keeps the chip busy for 5000us of polling
    let chip = DummyFlash::new(DummyConfig {
        busy_polls: 50,
        ..DummyConfig::small()
    });
    let mut flash = SpiFlash::new(chip, MockClock::with_step(100), config);
    flash.identify().unwrap();

    assert_eq!(flash.erase_sector(0), Err(Error::BusyTimeout));
    assert_eq!(flash.last_error(), Some(Error::BusyTimeout));
    assert_eq!(flash.error_code(), 0x04);

    flash.clear_error();
    flash.erase_block64(0x10000).unwrap();
    flash.erase_chip().unwrap();
    assert_eq!(flash.error_code(), 0);
}

#[test]
fn test_four_byte_mode_restored_after_failure() {
    let chip = DummyFlash::new(DummyConfig {
        ignore_write_enable: true,
        ..DummyConfig::large()
    });
    let mut flash = identified(chip, DriverConfig::default());

    assert_eq!(
        flash.write(0x0100_0000, &[0x5A; 4]),
        Err(Error::WriteEnableFailed)
    );

    let ops = flash.bus().opcodes();
    let wren = ops.iter().rposition(|&op| op == opcodes::WREN).unwrap();
    let en4b = ops[..wren].iter().rposition(|&op| op == opcodes::EN4B).unwrap();
    assert!(!ops[en4b + 1..wren].contains(&opcodes::EX4B));
    assert!(ops[wren..].contains(&opcodes::EX4B));
    assert!(!ops.contains(&opcodes::PP));
    assert!(!flash.bus().in_4byte_mode());
    assert_eq!(flash.error_code(), 0x06);
}

#[test]
fn test_error_slot_is_sticky() {
    let mut flash = default_flash();
    let capacity = flash.capacity();
    let mut buf = [0u8; 1];

    assert!(flash.read(capacity, &mut buf).is_err());
    assert_eq!(flash.error_code(), 0x05);

    flash.read(0, &mut buf).unwrap();
    assert_eq!(flash.last_error(), Some(Error::OutOfBounds { addr: capacity, len: 1 }));

    flash.clear_error();
    assert_eq!(flash.error_code(), 0);
}
