//! Open the emulated chip behind an image file and identify it

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use norflash_core::bus::Clock;
use norflash_core::chip::capacity_for_id;
use norflash_core::{DriverConfig, SpiFlash};
use norflash_dummy::{DummyConfig, DummyFlash};

use crate::cli::Cli;
use crate::error::{CliError, Result};

/// Wall-clock time source for the driver's busy-wait loops
pub struct StdClock {
    start: Instant,
}

impl StdClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for StdClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for StdClock {
    fn now_us(&mut self) -> u64 {
        self.start.elapsed().as_micros() as u64
    }

    fn delay_us(&mut self, us: u32) {
        std::thread::sleep(Duration::from_micros(u64::from(us)));
    }
}

/// A driver bound to an image file
pub struct Session {
    pub flash: SpiFlash<DummyFlash, StdClock>,
    image: PathBuf,
}

/// Chip size requested on the command line
///
/// `--size` wins, else the length of an existing image. `None` leaves the
/// size to the capacity table. The same value sizes the emulator and
/// overrides the capacity found at identification, so the driver never
/// addresses more than the image holds.
pub fn resolve_size(size: Option<u32>, image_len: Option<usize>) -> Result<Option<u32>> {
    let size = match (size, image_len) {
        (Some(size), _) => Some(size),
        (None, Some(len)) => Some(u32::try_from(len).map_err(|_| {
            CliError::InvalidArguments(format!("image of {} bytes is too large", len))
        })?),
        (None, None) => None,
    };

    if size == Some(0) {
        return Err(CliError::InvalidArguments(
            "flash size is zero (empty image?), pass --size".into(),
        ));
    }
    Ok(size)
}

/// Emulator settings from the command line
///
/// Without an explicit size the capacity ID in `--jedec` picks one.
pub fn dummy_config(jedec: u32, size: Option<u32>) -> Result<DummyConfig> {
    let [_, manufacturer_id, memory_type_id, capacity_id] = jedec.to_be_bytes();
    let size: u32 = match size {
        Some(0) => {
            return Err(CliError::InvalidArguments("flash size must not be zero".into()));
        }
        Some(size) => size,
        None => capacity_for_id(capacity_id).ok_or_else(|| {
            CliError::InvalidArguments(format!(
                "capacity ID 0x{:02X} is not in the table, pass --size",
                capacity_id
            ))
        })?,
    };
    let size = size as usize;

    Ok(DummyConfig {
        manufacturer_id,
        memory_type_id,
        capacity_id,
        size,
        four_byte_capable: size > 16 * 1024 * 1024,
        ..DummyConfig::default()
    })
}

/// Hint printed after a failed open
pub fn open_hint(err: &CliError) -> Option<&'static str> {
    match err {
        CliError::Flash(e) if e.is_setup_error() => {
            Some("check --jedec, or pass --size for a part missing from the capacity table")
        }
        _ => None,
    }
}

fn load_config(path: Option<&Path>) -> Result<DriverConfig> {
    match path {
        Some(path) => DriverConfig::load(path).map_err(|source| CliError::Config {
            path: path.to_path_buf(),
            source,
        }),
        None => Ok(DriverConfig::default()),
    }
}

fn load_image(path: &Path) -> Result<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(data) => Ok(Some(data)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(CliError::io(path, e)),
    }
}

impl Session {
    /// Load the image, build the emulator and identify the chip
    pub fn open(cli: &Cli) -> Result<Self> {
        let config = load_config(cli.config.as_deref())?;
        let image = load_image(&cli.image)?;
        let size = resolve_size(cli.size, image.as_ref().map(Vec::len))?;
        let dummy = dummy_config(cli.jedec, size)?;

        let chip = match &image {
            Some(data) => {
                log::debug!("Loaded {} bytes from {}", data.len(), cli.image.display());
                DummyFlash::with_data(dummy, data)
            }
            None => {
                log::info!("{} not found, starting erased", cli.image.display());
                DummyFlash::new(dummy)
            }
        };

        let mut flash = SpiFlash::new(chip, StdClock::new(), config);
        flash.identify_with_capacity(size)?;

        Ok(Self {
            flash,
            image: cli.image.clone(),
        })
    }

    /// Write the emulated chip contents back to the image
    pub fn save(self) -> Result<()> {
        let (chip, _) = self.flash.release();
        fs::write(&self.image, chip.data()).map_err(|e| CliError::io(&self.image, e))?;
        log::debug!("Saved image to {}", self.image.display());
        Ok(())
    }
}
