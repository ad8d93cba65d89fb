//! Command-line interface module.

pub(crate) mod args;
pub mod check;
pub mod serve;

pub use args::{Cli, Commands};
