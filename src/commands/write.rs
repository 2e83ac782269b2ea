//! Write command implementation

use std::fs;
use std::path::Path;

use crate::error::{CliError, Result};
use crate::session::Session;

use super::{pieces, progress_bar};

/// Program a file at `start`, optionally erasing the covered sectors first
pub fn run_write(session: &mut Session, input: &Path, start: Option<u32>, erase: bool) -> Result<()> {
    let data = fs::read(input).map_err(|e| CliError::io(input, e))?;
    let start = start.unwrap_or(0);
    let len = u32::try_from(data.len())
        .map_err(|_| CliError::InvalidArguments(format!("{:?} is too large", input)))?;
    let flash = &mut session.flash;

    if erase && len > 0 {
        let pb = progress_bar(u64::from(len), "Erasing")?;
        flash.erase_section(start, len)?;
        pb.finish_with_message("Erase complete");
    }

    let pb = progress_bar(u64::from(len), "Writing")?;
    let allow_wrap = flash.config().allow_address_wrap;
    for (addr, range) in pieces(flash.capacity(), allow_wrap, start, len)? {
        let end = range.end;
        flash.write(addr, &data[range])?;
        pb.set_position(end as u64);
    }
    pb.finish_with_message("Write complete");

    println!("Wrote {} bytes at 0x{:08X}", data.len(), start);
    Ok(())
}
