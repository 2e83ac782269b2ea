//! Flash chip identification data
//!
//! This module provides the descriptor of the attached chip, the static
//! registry mapping JEDEC IDs to capacities, and the per-vendor quirk
//! profile consulted by the rest of the driver.

mod features;
mod registry;
mod types;

pub use features::{Quirks, UnlockStyle, VendorProfile};
pub use registry::*;
pub use types::ChipDescriptor;
