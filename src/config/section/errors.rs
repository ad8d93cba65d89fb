//! `[errors]` section configuration.
//!
//! Error pages the gate sends failed requests to.
//!
//! # Example
//!
//! ```toml
//! [errors]
//! item_not_found_url = "/service/notfound"    # Missing item
//! no_access_url = "/service/noaccess"         # Site, item or layout access denied
//! layout_not_found_url = "/service/nolayout"  # Item without a usable layout
//! server_side_redirect = false                # Rewrite instead of redirecting the client
//! ```

use crate::config::{ConfigDiagnostics, FieldPath};
use crate::core::url::is_external_url;
use serde::{Deserialize, Serialize};

/// Error page settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErrorPagesConfig {
    /// Target for requests whose item does not exist.
    pub item_not_found_url: String,

    /// Target for access denials.
    pub no_access_url: String,

    /// Target for items without a usable layout.
    pub layout_not_found_url: String,

    /// Serve error pages through an internal rewrite.
    pub server_side_redirect: bool,
}

impl ErrorPagesConfig {
    const ITEM_NOT_FOUND_URL: FieldPath = FieldPath::new("errors.item_not_found_url");
    const NO_ACCESS_URL: FieldPath = FieldPath::new("errors.no_access_url");
    const LAYOUT_NOT_FOUND_URL: FieldPath = FieldPath::new("errors.layout_not_found_url");

    fn urls(&self) -> [(FieldPath, &str); 3] {
        [
            (Self::ITEM_NOT_FOUND_URL, self.item_not_found_url.as_str()),
            (Self::NO_ACCESS_URL, self.no_access_url.as_str()),
            (Self::LAYOUT_NOT_FOUND_URL, self.layout_not_found_url.as_str()),
        ]
    }

    /// Error URLs must be set; rewrites can only target local paths.
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        for (field, url) in self.urls() {
            if url.trim().is_empty() {
                diag.error(field, "error page URL must not be empty");
            } else if self.server_side_redirect && is_external_url(url) {
                diag.error_with_hint(
                    field,
                    format!("`{url}` is external and cannot be served by rewrite"),
                    "use a site-root path or set `server_side_redirect = false`",
                );
            }
        }
    }
}

impl Default for ErrorPagesConfig {
    fn default() -> Self {
        Self {
            item_not_found_url: "/service/notfound".into(),
            no_access_url: "/service/noaccess".into(),
            layout_not_found_url: "/service/nolayout".into(),
            server_side_redirect: false,
        }
    }
}
