//! Configuration section definitions.
//!
//! Each module corresponds to a section in `sitegate.toml`:
//!
//! | Module   | TOML Section | Purpose                                   |
//! |----------|--------------|-------------------------------------------|
//! | `access` | `[access]`   | Raw URL forwarding, login short-circuit   |
//! | `errors` | `[errors]`   | Error page URLs, server-side redirects    |
//! | `serve`  | `[serve]`    | HTTP host, static root, catalog           |

mod access;
mod errors;
mod serve;

pub use access::AccessConfig;
pub use errors::ErrorPagesConfig;
pub use serve::ServeConfig;
