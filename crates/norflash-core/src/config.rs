//! Runtime driver configuration
//!
//! Behaviour that used to be chosen at build time (address wrap-around,
//! erase pre-check, read-back verification) is selected here at
//! construction, so it can be changed without rebuilding.
//!
//! With the `std` feature the configuration can be loaded from TOML:
//!
//! ```toml
//! allow_address_wrap = false
//! verify_writes = true
//! skip_erased_check = false
//! fast_read = true
//!
//! [timeouts]
//! busy_us = 20000
//! chip_erase_us = 100000000
//! ```

/// Busy-wait limits, in microseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "std", serde(default))]
pub struct Timeouts {
    /// Reads, page programs and register writes
    pub busy_us: u32,
    /// 4KB sector erase (typical 45-400ms)
    pub sector_erase_us: u32,
    /// 32KB block erase (typical 120-1600ms)
    pub block32_erase_us: u32,
    /// 64KB block erase (typical 150-2000ms)
    pub block64_erase_us: u32,
    /// Whole chip erase (typical 25-100s for large chips)
    pub chip_erase_us: u32,
    /// Delay between status polls; 0 spins
    pub poll_interval_us: u32,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            busy_us: 10_000,
            sector_erase_us: 1_000_000,
            block32_erase_us: 4_000_000,
            block64_erase_us: 4_000_000,
            chip_erase_us: 200_000_000,
            poll_interval_us: 0,
        }
    }
}

/// Driver behaviour switches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "std", serde(default))]
pub struct DriverConfig {
    /// Let a range that runs past the top of the chip continue at address 0
    pub allow_address_wrap: bool,
    /// Read back and compare after every write
    pub verify_writes: bool,
    /// Skip checking that the write target is erased (faster, less safe)
    pub skip_erased_check: bool,
    /// Use FAST_READ instead of READ
    pub fast_read: bool,
    /// Busy-wait limits
    pub timeouts: Timeouts,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            allow_address_wrap: true,
            verify_writes: true,
            skip_erased_check: false,
            fast_read: false,
            timeouts: Timeouts::default(),
        }
    }
}

impl DriverConfig {
    /// Set address wrap-around
    pub fn with_address_wrap(mut self, allow: bool) -> Self {
        self.allow_address_wrap = allow;
        self
    }

    /// Set read-back verification of writes
    pub fn with_verify_writes(mut self, verify: bool) -> Self {
        self.verify_writes = verify;
        self
    }

    /// Set whether the erased pre-check is skipped
    pub fn with_skip_erased_check(mut self, skip: bool) -> Self {
        self.skip_erased_check = skip;
        self
    }

    /// Set FAST_READ usage
    pub fn with_fast_read(mut self, fast: bool) -> Self {
        self.fast_read = fast;
        self
    }

    /// Replace the timeouts
    pub fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }
}

#[cfg(feature = "std")]
pub use toml_config::ConfigError;

#[cfg(feature = "std")]
mod toml_config {
    use std::fmt;
    use std::fs;
    use std::io;
    use std::path::Path;

    use super::DriverConfig;

    /// Error loading a configuration file
    #[derive(Debug)]
    pub enum ConfigError {
        /// I/O error reading the file
        Io(io::Error),
        /// TOML parsing error
        Parse(toml::de::Error),
    }

    impl From<io::Error> for ConfigError {
        fn from(e: io::Error) -> Self {
            ConfigError::Io(e)
        }
    }

    impl From<toml::de::Error> for ConfigError {
        fn from(e: toml::de::Error) -> Self {
            ConfigError::Parse(e)
        }
    }

    impl fmt::Display for ConfigError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                ConfigError::Io(e) => write!(f, "I/O error: {}", e),
                ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            }
        }
    }

    impl std::error::Error for ConfigError {}

    impl DriverConfig {
        /// Parse a configuration from TOML text; missing keys keep their defaults
        pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
            Ok(toml::from_str(content)?)
        }

        /// Load a configuration from a TOML file
        pub fn load(path: &Path) -> Result<Self, ConfigError> {
            let content = fs::read_to_string(path)?;
            Self::from_toml_str(&content)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DriverConfig::default();
        assert!(config.allow_address_wrap);
        assert!(config.verify_writes);
        assert!(!config.skip_erased_check);
        assert!(config.timeouts.chip_erase_us > config.timeouts.sector_erase_us);
    }

    #[test]
    fn test_builder() {
        let config = DriverConfig::default()
            .with_address_wrap(false)
            .with_skip_erased_check(true);
        assert!(!config.allow_address_wrap);
        assert!(config.skip_erased_check);
    }

    #[cfg(feature = "std")]
    #[test]
    fn test_partial_toml() {
        let config = DriverConfig::from_toml_str(
            r#"
            allow_address_wrap = false

            [timeouts]
            busy_us = 500
            "#,
        )
        .unwrap();
        assert!(!config.allow_address_wrap);
        assert!(config.verify_writes);
        assert_eq!(config.timeouts.busy_us, 500);
        assert_eq!(config.timeouts.sector_erase_us, 1_000_000);
    }

    #[cfg(feature = "std")]
    #[test]
    fn test_bad_toml() {
        assert!(matches!(
            DriverConfig::from_toml_str("verify_writes = \"yes\""),
            Err(ConfigError::Parse(_))
        ));
    }
}
