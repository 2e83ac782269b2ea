//! Read command implementation

use std::fs;
use std::path::Path;

use crate::error::{CliError, Result};
use crate::session::Session;

use super::{pieces, progress_bar};

/// Read `length` bytes from `start` into a file
pub fn run_read(
    session: &mut Session,
    output: &Path,
    start: Option<u32>,
    length: Option<u32>,
) -> Result<()> {
    let flash = &mut session.flash;
    let start = start.unwrap_or(0);
    let length = match length {
        Some(length) => length,
        None => flash.capacity().checked_sub(start).ok_or_else(|| {
            CliError::InvalidArguments(format!("start 0x{:08X} is beyond the chip", start))
        })?,
    };

    let mut data = vec![0u8; length as usize];
    let pb = progress_bar(u64::from(length), "Reading")?;

    let allow_wrap = flash.config().allow_address_wrap;
    for (addr, range) in pieces(flash.capacity(), allow_wrap, start, length)? {
        let end = range.end;
        flash.read(addr, &mut data[range])?;
        pb.set_position(end as u64);
    }
    pb.finish_with_message("Read complete");

    fs::write(output, &data).map_err(|e| CliError::io(output, e))?;
    println!("Wrote {} bytes to {:?}", data.len(), output);
    Ok(())
}
