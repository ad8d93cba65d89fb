//! `[access]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [access]
//! save_raw_url = true          # Pass the original URL to error pages as `url=`
//! login_short_circuit = false  # Login redirect ends item-failure handling
//! ```
//!
//! `login_short_circuit = false` keeps the established behaviour: a
//! permission failure on a site with a login page logs the login redirect
//! and then still ends on the no-access page.

use serde::{Deserialize, Serialize};

/// Access failure settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessConfig {
    /// Append the raw request URL to item failure redirects.
    pub save_raw_url: bool,

    /// Make the login redirect final.
    pub login_short_circuit: bool,
}

#[cfg(test)]
mod tests {
    use crate::config::test_parse_config;

    #[test]
    fn test_access_config_defaults() {
        let config = test_parse_config("");
        assert!(!config.access.save_raw_url);
        assert!(!config.access.login_short_circuit);
    }

    #[test]
    fn test_access_config() {
        let config =
            test_parse_config("[access]\nsave_raw_url = true\nlogin_short_circuit = true");
        assert!(config.access.save_raw_url);
        assert!(config.access.login_short_circuit);
    }
}
