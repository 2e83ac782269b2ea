//! Identification, capacity lookup and vendor setup

use norflash_core::chip::Manufacturer;
use norflash_core::spi::opcodes;
use norflash_core::{DriverConfig, Error, SpiFlash};
use norflash_dummy::{DummyConfig, DummyFlash, MockClock};

fn driver(config: DummyConfig) -> SpiFlash<DummyFlash, MockClock> {
    SpiFlash::new(
        DummyFlash::new(config),
        MockClock::with_step(1),
        DriverConfig::default(),
    )
}

#[test]
fn test_identify_winbond_16mib() {
    let mut flash = driver(DummyConfig::default());
    flash.identify().unwrap();

    assert_eq!(flash.capacity(), 16 * 1024 * 1024);
    assert_eq!(flash.max_page(), 65536);
    assert_eq!(flash.jedec_id(), 0xEF4018);
    assert_eq!(flash.chip().manufacturer(), Some(Manufacturer::Winbond));
    assert!(flash.chip().supported);
    assert!(flash.chip().has_sfdp());
    assert!(flash.profile().supports_four_byte());
}

#[test]
fn test_unknown_capacity_id() {
    let mut flash = driver(DummyConfig {
        capacity_id: 0xFF,
        ..DummyConfig::default()
    });
    assert_eq!(
        flash.identify(),
        Err(Error::UnknownCapacity { capacity_id: 0xFF })
    );
    assert_eq!(flash.capacity(), 0);
    assert_eq!(flash.error_code(), 0x03);

    let mut buf = [0u8; 1];
    assert_eq!(flash.read(0, &mut buf), Err(Error::NotInitialized));
}

#[test]
fn test_unknown_manufacturer() {
    let config = DummyConfig {
        manufacturer_id: 0xC2,
        ..DummyConfig::small()
    };
    let mut flash = driver(config.clone());
    assert_eq!(
        flash.identify(),
        Err(Error::UnknownChip { manufacturer: 0xC2 })
    );

    // A caller-supplied capacity bypasses the registry
    let mut flash = driver(config);
    flash.identify_with_capacity(Some(1024 * 1024)).unwrap();
    assert_eq!(flash.capacity(), 1024 * 1024);
    assert_eq!(flash.chip().manufacturer(), None);

    flash.write(0x10, b"mx").unwrap();
    let mut buf = [0u8; 2];
    flash.read(0x10, &mut buf).unwrap();
    assert_eq!(&buf, b"mx");
}

#[test]
fn test_no_response() {
    let mut flash = driver(DummyConfig {
        manufacturer_id: 0x00,
        ..DummyConfig::default()
    });
    assert_eq!(flash.identify(), Err(Error::NoResponse));
    assert_eq!(flash.error_code(), 0x0B);
}

#[test]
fn test_sst25_status_rewrite_unlock() {
    let mut flash = driver(DummyConfig::microchip(0x25));
    assert!(flash.bus().is_protected());
    flash.identify().unwrap();
    assert!(!flash.bus().is_protected());

    let frames = flash.bus().frames();
    let ewsr = frames
        .iter()
        .position(|f| f.opcode == opcodes::EWSR)
        .unwrap();
    assert_eq!(frames[ewsr + 1].opcode, opcodes::WRSR);
    assert_eq!(frames[ewsr + 1].payload, vec![0x00]);

    flash.write(0x100, &[0x42]).unwrap();
    assert_eq!(flash.bus().data()[0x100], 0x42);
}

#[test]
fn test_sst26_global_unlock() {
    let mut flash = driver(DummyConfig::microchip(0x26));
    flash.identify().unwrap();
    assert!(!flash.bus().is_protected());

    let ops = flash.bus().opcodes();
    let ulbpr = ops.iter().position(|&op| op == opcodes::ULBPR).unwrap();
    assert_eq!(&ops[ulbpr - 2..ulbpr], &[opcodes::WREN, opcodes::RDSR]);
    assert_eq!(ops[ulbpr + 1], opcodes::WRDI);
    assert!(flash.clock_mut().total_delay() >= 60);
}

#[test]
fn test_other_vendors_skip_unlock() {
    let mut flash = driver(DummyConfig::small());
    flash.identify().unwrap();
    let ops = flash.bus().opcodes();
    assert!(!ops.contains(&opcodes::ULBPR));
    assert!(!ops.contains(&opcodes::EWSR));
}

#[test]
fn test_unique_and_legacy_ids() {
    let mut flash = driver(DummyConfig::default());
    flash.identify().unwrap();

    assert_eq!(flash.read_unique_id(), Ok(0xD16A_2C09_4357_811E));
    assert_eq!(flash.read_manufacturer_device_id(), Ok((0xEF, 0x17)));

    let frame = flash.bus().frames().last().cloned().unwrap();
    assert_eq!(frame.opcode, opcodes::REMS);
    assert_eq!(frame.address, Some(0));
}

#[test]
fn test_status_registers() {
    let mut flash = driver(DummyConfig::large());
    flash.identify().unwrap();
    assert_eq!(flash.read_status1(), Ok(0));
    assert_eq!(flash.read_status2(), Ok(0));
    assert_eq!(flash.read_status3(), Ok(0));
}
