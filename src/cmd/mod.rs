//! Command-line argument definitions, one module per binary.

pub mod driver;
pub mod worker;
