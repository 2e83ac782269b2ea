//! CLI argument parsing

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Parse a string as a hex or decimal u32
pub fn parse_hex_u32(s: &str) -> Result<u32, String> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16).map_err(|e| format!("Invalid hex value: {}", e))
    } else {
        s.parse::<u32>().map_err(|e| format!("Invalid number: {}", e))
    }
}

/// Parse a size with an optional K/M suffix (e.g. "512K", "16M", "0x100000")
pub fn parse_size(s: &str) -> Result<u32, String> {
    let (digits, multiplier) = match s.chars().last() {
        Some('K') | Some('k') => (&s[..s.len() - 1], 1024),
        Some('M') | Some('m') => (&s[..s.len() - 1], 1024 * 1024),
        _ => (s, 1),
    };
    parse_hex_u32(digits)?
        .checked_mul(multiplier)
        .ok_or_else(|| format!("Size too large: {}", s))
}

/// Parse a 24-bit JEDEC ID given as 6 hex digits (e.g. "EF4018")
pub fn parse_jedec(s: &str) -> Result<u32, String> {
    let hex = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    if hex.len() != 6 {
        return Err(format!("JEDEC ID must be 6 hex digits, got {:?}", s));
    }
    u32::from_str_radix(hex, 16).map_err(|e| format!("Invalid JEDEC ID: {}", e))
}

#[derive(Parser)]
#[command(name = "norflash")]
#[command(author, version, about = "Serial NOR flash driver tool", long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Driver configuration file (TOML)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Flash image backing the emulated chip; created if missing
    #[arg(long, global = true, default_value = "flash.bin")]
    pub image: PathBuf,

    /// Chip size (e.g. 1M, 16M); skips the capacity table when given
    #[arg(long, global = true, value_parser = parse_size)]
    pub size: Option<u32>,

    /// JEDEC ID the emulated chip reports
    #[arg(long, global = true, value_parser = parse_jedec, default_value = "EF4018")]
    pub jedec: u32,

    #[command(subcommand)]
    pub command: Commands,
}

/// Erase granularity
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EraseUnit {
    /// 4KB sector
    Sector,
    /// 32KB block
    Block32,
    /// 64KB block
    Block64,
    /// Whole chip
    Chip,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Identify the flash chip
    Probe,

    /// Read flash contents to file
    Read {
        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Start address (defaults to 0)
        #[arg(long, value_parser = parse_hex_u32)]
        start: Option<u32>,

        /// Number of bytes (defaults to the rest of the chip)
        #[arg(long, value_parser = parse_hex_u32)]
        length: Option<u32>,
    },

    /// Write file to flash
    Write {
        /// Input file path
        #[arg(short, long)]
        input: PathBuf,

        /// Start address (defaults to 0)
        #[arg(long, value_parser = parse_hex_u32)]
        start: Option<u32>,

        /// Erase the covered sectors before writing
        #[arg(long)]
        erase: bool,
    },

    /// Erase flash
    ///
    /// Without options the whole chip is erased. With --start and --length
    /// every sector touched by the range is erased. With --unit and --start
    /// one unit containing the address is erased.
    Erase {
        /// Start address
        #[arg(long, value_parser = parse_hex_u32)]
        start: Option<u32>,

        /// Length in bytes
        #[arg(long, value_parser = parse_hex_u32)]
        length: Option<u32>,

        /// Erase a single unit of this size
        #[arg(long, value_enum)]
        unit: Option<EraseUnit>,
    },

    /// Show the status registers
    Status,

    /// Show the factory unique ID
    UniqueId,
}
