//! Utility modules shared by the gate host.

pub mod hash;
pub mod html;
pub mod mime;
pub mod path;
