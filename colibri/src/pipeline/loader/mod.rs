mod mobility_source;
mod property_source;
mod target_source;

pub use mobility_source::{read_mobility_file, RawTraceRow};
pub use property_source::{read_property_file, RawListingRow};
pub use target_source::{read_target_file, RawTargetRow};
