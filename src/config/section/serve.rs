//! `[serve]` section configuration.
//!
//! Contains HTTP host settings.
//!
//! # Example
//!
//! ```toml
//! [serve]
//! interface = "127.0.0.1"     # Network interface (127.0.0.1 = localhost only)
//! port = 5380                 # HTTP port number
//! root = "public"             # Static files for served and rewritten requests
//! catalog = "catalog.toml"    # Tenant catalog
//! reload = true               # Pick up config and catalog edits while running
//! ```
//!
//! Use `interface = "0.0.0.0"` to make the server accessible from LAN.

use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

use crate::config::{ConfigDiagnostics, FieldPath};
use serde::{Deserialize, Serialize};

/// HTTP host settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServeConfig {
    /// Network interface to bind.
    /// - `127.0.0.1` (default): localhost only
    /// - `0.0.0.0`: all interfaces (LAN accessible)
    pub interface: IpAddr,

    /// HTTP port number.
    pub port: u16,

    /// Static file root (relative to the config file).
    pub root: PathBuf,

    /// Tenant catalog file (relative to the config file).
    pub catalog: PathBuf,

    /// Poll config and catalog for changes.
    pub reload: bool,

    /// Seconds between reload polls.
    pub reload_interval: u64,
}

impl ServeConfig {
    const PORT: FieldPath = FieldPath::new("serve.port");
    const RELOAD_INTERVAL: FieldPath = FieldPath::new("serve.reload_interval");

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.port == 0 {
            diag.error(Self::PORT, "port must be between 1 and 65535");
        }
        if self.reload && self.reload_interval == 0 {
            diag.error_with_hint(
                Self::RELOAD_INTERVAL,
                "reload interval must be at least 1 second",
                "set `reload = false` to disable reloading",
            );
        }
    }
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            interface: IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)),
            port: 5380,
            root: PathBuf::from("public"),
            catalog: PathBuf::from("catalog.toml"),
            reload: true,
            reload_interval: 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv6Addr;

    use crate::config::test_parse_config;

    #[test]
    fn test_serve_config() {
        let config =
            test_parse_config("[serve]\ninterface = \"0.0.0.0\"\nport = 8080\nreload = false");

        assert_eq!(
            config.serve.interface,
            IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0))
        );
        assert_eq!(config.serve.port, 8080);
        assert!(!config.serve.reload);
    }

    #[test]
    fn test_serve_config_defaults() {
        let config = test_parse_config("");

        assert_eq!(
            config.serve.interface,
            IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))
        );
        assert_eq!(config.serve.port, 5380);
        assert_eq!(config.serve.root, PathBuf::from("public"));
        assert_eq!(config.serve.catalog, PathBuf::from("catalog.toml"));
        assert!(config.serve.reload);
    }

    #[test]
    fn test_serve_config_ipv6() {
        let config = test_parse_config("[serve]\ninterface = \"::1\"");
        assert_eq!(
            config.serve.interface,
            IpAddr::V6(Ipv6Addr::new(0, 0, 0, 0, 0, 0, 0, 1))
        );
    }

    #[test]
    fn test_serve_config_validate() {
        let mut diag = ConfigDiagnostics::new();
        ServeConfig::default().validate(&mut diag);
        assert!(diag.is_empty());

        let bad = ServeConfig {
            port: 0,
            reload_interval: 0,
            ..Default::default()
        };
        bad.validate(&mut diag);
        assert_eq!(diag.len(), 2);
    }
}
