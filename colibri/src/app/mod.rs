mod colibri_app;

pub mod enrich;
pub mod evaluate;
pub mod features;

pub use colibri_app::{ColibriApp, ColibriOperation};
