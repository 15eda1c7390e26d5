//! CLI command implementations.

pub mod convert;
pub mod doctor;
pub mod target;
