//! Gate configuration management for `sitegate.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── access     # [access]
//! │   ├── errors     # [errors]
//! │   └── serve      # [serve]
//! ├── types/         # Utility types
//! │   ├── error      # ConfigError, ConfigDiagnostics
//! │   ├── field      # FieldPath
//! │   └── handle     # Global config handle
//! └── mod.rs         # GateConfig (this file)
//! ```
//!
//! # Sections
//!
//! | Section     | Purpose                                        |
//! |-------------|------------------------------------------------|
//! | `[errors]`  | Error page URLs, server-side redirects         |
//! | `[access]`  | Raw URL forwarding, login short-circuit        |
//! | `[serve]`   | HTTP host (interface, port, root, catalog)     |

pub mod section;
pub mod types;
mod util;

use util::find_config_file;

// Re-export from types/
pub use types::{ConfigDiagnostics, ConfigError, FieldPath, cfg, init_config, reload_config};

use section::{AccessConfig, ErrorPagesConfig, ServeConfig};

use crate::{
    cli::{Cli, Commands},
    gate::GateSettings,
    log,
    utils::path::normalize_path,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing sitegate.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GateConfig {
    /// CLI arguments reference (internal use only)
    #[serde(skip)]
    pub cli: Option<&'static Cli>,

    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root directory - parent of config file (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    /// Error page targets
    #[serde(default)]
    pub errors: ErrorPagesConfig,

    /// Access failure handling
    #[serde(default)]
    pub access: AccessConfig,

    /// HTTP host settings
    #[serde(default)]
    pub serve: ServeConfig,
}

impl GateConfig {
    /// Load configuration from CLI arguments.
    ///
    /// Searches upward from cwd for the config file. Without one, defaults
    /// are used and the project root is the current directory.
    pub fn load(cli: &'static Cli) -> Result<Self> {
        crate::logger::set_verbose(cli.verbose);

        let cwd = std::env::current_dir().context("Failed to get current working directory")?;
        let (config_path, exists) = match find_config_file(&cli.config) {
            Some(path) => (path, true),
            None => (cwd.join(&cli.config), false),
        };

        let mut config = if exists {
            Self::from_path(&config_path)?
        } else {
            crate::debug!("config"; "{} not found, using defaults", cli.config.display());
            Self::default()
        };

        let root = if exists {
            config_path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or(cwd)
        } else {
            cwd
        };

        config.config_path = config_path;
        config.cli = Some(cli);
        config.finalize(cli, &root);
        config.validate()?;

        Ok(config)
    }

    /// Finalize configuration after loading.
    fn finalize(&mut self, cli: &Cli, root: &Path) {
        self.apply_command_options(cli);
        self.normalize_paths(root);
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;

        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>)> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })
        .map_err(ConfigError::Toml)?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring: {}", display_path, fields.join(", "));
    }

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        &self.root
    }

    /// Absolute path of the tenant catalog.
    pub fn catalog_path(&self) -> &Path {
        &self.serve.catalog
    }

    /// Absolute path of the static file root.
    pub fn static_root(&self) -> &Path {
        &self.serve.root
    }

    /// Gate behaviour derived from `[errors]` and `[access]`.
    pub fn gate_settings(&self) -> GateSettings {
        GateSettings {
            item_not_found_url: self.errors.item_not_found_url.clone(),
            no_access_url: self.errors.no_access_url.clone(),
            layout_not_found_url: self.errors.layout_not_found_url.clone(),
            save_raw_url: self.access.save_raw_url,
            server_side_redirect: self.errors.server_side_redirect,
            login_short_circuit: self.access.login_short_circuit,
        }
    }

    // ========================================================================
    // cli configuration updates
    // ========================================================================

    /// Apply command-specific configuration options.
    fn apply_command_options(&mut self, cli: &Cli) {
        Self::update_option(&mut self.serve.catalog, cli.catalog.as_ref());

        match &cli.command {
            Commands::Serve {
                interface,
                port,
                reload,
            } => {
                Self::update_option(&mut self.serve.interface, interface.as_ref());
                Self::update_option(&mut self.serve.port, port.as_ref());
                Self::update_option(&mut self.serve.reload, reload.as_ref());
            }
            // Check runs once; nothing to poll
            Commands::Check { .. } => self.serve.reload = false,
        }
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    // ========================================================================
    // path normalization
    // ========================================================================

    /// Normalize all paths relative to root directory.
    fn normalize_paths(&mut self, root: &Path) {
        let root = normalize_path(root);
        self.config_path = normalize_path(&self.config_path);
        self.serve.root = Self::expand_path(&self.serve.root, &root);
        self.serve.catalog = Self::expand_path(&self.serve.catalog, &root);
        self.root = root;
    }

    /// Expand `~` and resolve relative paths against `root`.
    fn expand_path(path: &Path, root: &Path) -> PathBuf {
        let expanded = shellexpand::tilde(&path.to_string_lossy()).into_owned();
        let path = PathBuf::from(expanded);
        let full_path = if path.is_relative() {
            root.join(&path)
        } else {
            path
        };
        normalize_path(&full_path)
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Validate configuration.
    ///
    /// Collects all validation errors and returns them at once.
    pub fn validate(&self) -> Result<()> {
        let mut diag = ConfigDiagnostics::new();

        self.errors.validate(&mut diag);
        self.serve.validate(&mut diag);

        if !self.serve.catalog.is_file() {
            diag.error_with_hint(
                FieldPath::new("serve.catalog"),
                format!("catalog `{}` not found", self.serve.catalog.display()),
                "create it or pass `--catalog <PATH>`",
            );
        }
        if matches!(self.cli.map(|c| &c.command), Some(Commands::Serve { .. }))
            && !self.serve.root.is_dir()
        {
            diag.warn(
                FieldPath::new("serve.root"),
                format!(
                    "static root `{}` does not exist, every served path will be 404",
                    self.serve.root.display()
                ),
            );
        }

        diag.print_warnings();

        diag.into_result()
            .map_err(|e| ConfigError::Diagnostics(e).into())
    }
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse config without path normalization.
/// Panics if there are unknown fields (to catch config typos in tests).
#[cfg(test)]
pub fn test_parse_config(extra: &str) -> GateConfig {
    let (parsed, ignored) = GateConfig::parse_with_ignored(extra).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn leak_cli(args: &[&str]) -> &'static Cli {
        Box::leak(Box::new(Cli::parse_from(args.iter().copied())))
    }

    #[test]
    fn test_from_str_invalid_toml() {
        let result = GateConfig::from_str("[errors\nno_access_url = \"/x\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_gate_config_default() {
        let config = GateConfig::default();

        assert!(config.cli.is_none());
        assert_eq!(config.config_path, PathBuf::new());
        assert_eq!(config.serve.port, 5380);
        assert!(!config.access.save_raw_url);
    }

    #[test]
    fn test_gate_settings_mapping() {
        let config = test_parse_config(
            "[errors]\nno_access_url = \"/denied\"\nserver_side_redirect = true\n\
             [access]\nsave_raw_url = true\nlogin_short_circuit = true",
        );
        let settings = config.gate_settings();
        assert_eq!(settings.no_access_url, "/denied");
        assert_eq!(settings.item_not_found_url, "/service/notfound");
        assert!(settings.server_side_redirect);
        assert!(settings.save_raw_url);
        assert!(settings.login_short_circuit);
    }

    #[test]
    fn test_unknown_fields_detected() {
        let content = "[errors]\nno_access_url = \"/x\"\n[unknown_section]\nfield = \"value\"";
        let (config, ignored) = GateConfig::parse_with_ignored(content).unwrap();

        assert_eq!(config.errors.no_access_url, "/x");
        assert!(ignored.iter().any(|f| f.contains("unknown_section")));
    }

    #[test]
    fn test_no_unknown_fields() {
        let (_, ignored) = GateConfig::parse_with_ignored("[serve]\nport = 1").unwrap();
        assert!(ignored.is_empty());
    }

    #[test]
    fn test_finalize_applies_cli_and_root() {
        let dir = tempfile::tempdir().unwrap();
        let cli = leak_cli(&["sitegate", "serve", "-p", "9000", "--catalog", "tenants.toml"]);

        let mut config = test_parse_config("[serve]\nport = 5380\nroot = \"www\"");
        config.finalize(cli, dir.path());

        let root = normalize_path(dir.path());
        assert_eq!(config.serve.port, 9000);
        assert_eq!(config.serve.root, root.join("www"));
        assert_eq!(config.serve.catalog, root.join("tenants.toml"));
        assert_eq!(config.get_root(), root);
    }

    #[test]
    fn test_check_disables_reload() {
        let dir = tempfile::tempdir().unwrap();
        let cli = leak_cli(&["sitegate", "check", "/"]);
        let mut config = GateConfig::default();
        config.finalize(cli, dir.path());
        assert!(!config.serve.reload);
    }

    #[test]
    fn test_validate_missing_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let cli = leak_cli(&["sitegate", "check", "/"]);
        let mut config = GateConfig::default();
        config.finalize(cli, dir.path());
        assert!(config.validate().is_err());

        fs::write(dir.path().join("catalog.toml"), "").unwrap();
        assert!(config.validate().is_ok());
    }
}
