//! Address width types

/// Address width for addressed SPI commands
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AddressWidth {
    /// 3-byte (24-bit) address - the power-on default, reaches 16 MiB
    #[default]
    ThreeByte,
    /// 4-byte (32-bit) address
    FourByte,
}

impl AddressWidth {
    /// First address that 3-byte addressing cannot reach
    pub const THREE_BYTE_LIMIT: u32 = 16 * 1024 * 1024;

    /// Returns the number of address bytes
    pub const fn bytes(&self) -> usize {
        match self {
            Self::ThreeByte => 3,
            Self::FourByte => 4,
        }
    }

    /// Width required to reach every byte below `end` (exclusive)
    pub const fn required_for(end: u64) -> Self {
        if end > Self::THREE_BYTE_LIMIT as u64 {
            Self::FourByte
        } else {
            Self::ThreeByte
        }
    }

    /// Encode an address big-endian into `buf`, returning the used prefix
    pub fn encode<'b>(&self, address: u32, buf: &'b mut [u8; 4]) -> &'b [u8] {
        *buf = address.to_be_bytes();
        match self {
            Self::ThreeByte => &buf[1..],
            Self::FourByte => &buf[..],
        }
    }
}
