//! Config field path used in diagnostics.

use owo_colors::{OwoColorize, Stream};
use std::fmt;

/// Dotted path of a config field, e.g. `errors.no_access_url`.
///
/// Sections declare their paths as associated constants:
///
/// ```ignore
/// impl ServeConfig {
///     const PORT: FieldPath = FieldPath::new("serve.port");
/// }
///
/// diag.error(Self::PORT, "port must be between 1 and 65535");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldPath(pub &'static str);

impl FieldPath {
    #[inline]
    pub const fn new(path: &'static str) -> Self {
        Self(path)
    }

    #[inline]
    pub const fn as_str(&self) -> &'static str {
        self.0
    }

    /// Top-level section of the path (`errors` for `errors.no_access_url`).
    pub fn section(&self) -> &'static str {
        self.0.split('.').next().unwrap_or(self.0)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let quoted = format!("`{}`", self.0);
        write!(
            f,
            "{}",
            quoted.if_supports_color(Stream::Stderr, |t| t.bright_blue())
        )
    }
}

impl AsRef<str> for FieldPath {
    fn as_ref(&self) -> &str {
        self.0
    }
}
