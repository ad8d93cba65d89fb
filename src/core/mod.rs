//! Core types - pure abstractions shared across the codebase.

mod state;
pub mod url;

pub use state::{is_shutdown, register_server, setup_shutdown_handler};
