mod location_error;

pub mod cell_ops;
pub mod hex_id;

pub use location_error::LocationError;
