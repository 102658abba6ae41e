//! Command-line host for a vault

pub mod commands;

pub use commands::*;
