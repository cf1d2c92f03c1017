//! Mapping of physical inputs onto the console's virtual inputs.
//!
//! - [`input_mapping`] - textual physical input identifiers and device identities
//! - [`target`] - the console's virtual targets and pad register layout
//! - [`table`] - the physical → virtual translation table

pub mod error;
pub mod input_mapping;
pub mod table;
pub mod target;

pub use error::MappingError;
pub use input_mapping::{DeviceFramework, DeviceIdentity, DeviceKind, InputMapping};
pub use table::MappingTable;
pub use target::{PadState, VirtualTarget, MAX_CIRCLE_PAD_POS};
