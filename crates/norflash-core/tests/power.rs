//! Deep power-down and suspend/resume

use norflash_core::spi::opcodes;
use norflash_core::{DriverConfig, Error, SpiFlash};
use norflash_dummy::{DummyConfig, DummyFlash, MockClock};

fn identified(config: DummyConfig) -> SpiFlash<DummyFlash, MockClock> {
    let mut flash = SpiFlash::new(
        DummyFlash::new(config),
        MockClock::with_step(1),
        DriverConfig::default(),
    );
    flash.identify().unwrap();
    flash.bus_mut().clear_frames();
    flash
}

#[test]
fn test_power_down_guard() {
    let mut flash = identified(DummyConfig::small());
    flash.power_down().unwrap();
    assert!(flash.is_powered_down());
    assert!(flash.bus().is_powered_down());

    let selects = flash.bus().select_count();
    let mut buf = [0u8; 4];
    assert_eq!(flash.read(0, &mut buf), Err(Error::PoweredDown));
    assert_eq!(flash.write(0, &buf), Err(Error::PoweredDown));
    assert_eq!(flash.erase_sector(0), Err(Error::PoweredDown));
    assert_eq!(flash.erase_chip(), Err(Error::PoweredDown));
    assert_eq!(flash.read_status1(), Err(Error::PoweredDown));
    assert_eq!(flash.bus().select_count(), selects);
    assert_eq!(flash.error_code(), 0x0F);

    flash.power_up().unwrap();
    assert!(!flash.is_powered_down());
    flash.write(0, &[1, 2]).unwrap();
    flash.read(0, &mut buf[..2]).unwrap();
    assert_eq!(&buf[..2], &[1, 2]);
}

#[test]
fn test_power_up_confirms_with_write_enable() {
    let mut flash = identified(DummyConfig::small());
    flash.power_down().unwrap();
    flash.bus_mut().clear_frames();

    flash.power_up().unwrap();
    assert_eq!(
        flash.bus().opcodes(),
        vec![opcodes::RDP, opcodes::WREN, opcodes::RDSR, opcodes::WRDI]
    );
}

#[test]
fn test_power_down_unsupported_on_microchip() {
    let mut flash = identified(DummyConfig::microchip(0x26));
    assert_eq!(flash.power_down(), Err(Error::Unsupported));
    assert!(!flash.is_powered_down());
    assert_eq!(flash.error_code(), 0x0C);
}

#[test]
fn test_suspend_blocks_program_until_resume() {
    let mut flash = identified(DummyConfig::small());
    flash.bus_mut().start_busy(1000);

    flash.suspend().unwrap();
    assert_eq!(flash.is_suspended(), Ok(true));
    assert!(flash.bus().opcodes().contains(&opcodes::SUSPEND));

    assert_eq!(flash.write(0x10, &[0]), Err(Error::Suspended));
    assert_eq!(flash.erase_sector(0), Err(Error::Suspended));
    assert!(!flash.bus().opcodes().contains(&opcodes::PP));

    // Reads are still allowed while suspended
    let mut buf = [0u8; 1];
    flash.read(0x10, &mut buf).unwrap();

    flash.resume().unwrap();
    assert_eq!(flash.is_suspended(), Ok(false));
    assert!(!flash.bus().is_suspended());
}

#[test]
fn test_suspend_when_idle_is_a_no_op() {
    let mut flash = identified(DummyConfig::small());
    flash.suspend().unwrap();
    assert!(!flash.bus().opcodes().contains(&opcodes::SUSPEND));
    flash.resume().unwrap();
    assert!(!flash.bus().opcodes().contains(&opcodes::RESUME));
}

#[test]
fn test_microchip_suspend_reported_in_sr1() {
    let mut flash = identified(DummyConfig::microchip(0x26));
    flash.bus_mut().start_busy(1000);
    flash.suspend().unwrap();
    assert_eq!(flash.read_status1().map(|sr| sr & opcodes::SR1_WSE), Ok(opcodes::SR1_WSE));
    flash.resume().unwrap();
}

#[test]
fn test_suspend_unsupported_without_flag() {
    let mut flash = identified(DummyConfig {
        manufacturer_id: 0x20,
        ..DummyConfig::small()
    });
    assert_eq!(flash.suspend(), Err(Error::Unsupported));
}
