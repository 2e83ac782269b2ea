//! CLI command implementations
//!
//! Each command runs against an identified [`crate::session::Session`].
//! Long-running transfers are split into 4 KiB pieces so progress can be
//! shown between driver calls.

mod erase;
mod probe;
mod read;
mod status;
mod write;

pub use erase::run_erase;
pub use probe::run_probe;
pub use read::run_read;
pub use status::{run_status, run_unique_id};
pub use write::run_write;

use std::ops::Range;

use indicatif::{ProgressBar, ProgressStyle};
use norflash_core::flash::AddressCursor;

use crate::error::Result;

/// Transfer size between progress updates
const CHUNK_SIZE: usize = 4096;

/// Split a `len`-byte transfer at `start` into progress-sized pieces
///
/// The whole range is checked against the driver's address rules up front.
/// Piece addresses continue at 0 past the top of the chip, the same way the
/// driver wraps a single call.
fn pieces(
    capacity: u32,
    allow_wrap: bool,
    start: u32,
    len: u32,
) -> Result<impl Iterator<Item = (u32, Range<usize>)>> {
    AddressCursor::check(capacity, start, len, allow_wrap)?;

    let step = CHUNK_SIZE.min(capacity as usize);
    let len = len as usize;
    Ok((0..len).step_by(step).map(move |offset| {
        let addr = (u64::from(start) + offset as u64) % u64::from(capacity);
        (addr as u32, offset..len.min(offset + step))
    }))
}

/// Byte-count progress bar
fn progress_bar(total: u64, phase: &str) -> Result<ProgressBar> {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(&format!(
                "{{spinner:.green}} [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{bytes}}/{{total_bytes}} ({{bytes_per_sec}}, {{eta}}) {}",
                phase
            ))?
            .progress_chars("#>-"),
    );
    Ok(pb)
}
