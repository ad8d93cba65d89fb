//! Tenant catalog: sites, devices, layouts and items from a TOML file.
//!
//! Stands in for the upstream resolvers. The catalog answers the gate's
//! collaborator questions (`SiteAccess`, `LayoutStore`) and turns an HTTP
//! request into a `RequestContext` (see `resolve`).

mod error;
pub mod model;
mod resolve;

pub use error::CatalogError;
pub use resolve::IncomingRequest;

use model::{CatalogFile, DeviceEntry, ItemEntry, LayoutEntry, SiteEntry};

use crate::gate::collab::{LayoutQuery, LayoutRecord, LayoutStore, SiteAccess};
use crate::gate::context::UserIdentity;
use rustc_hash::{FxHashMap, FxHashSet};
use std::{fs, path::Path};

/// Loaded and indexed catalog.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    file: CatalogFile,
    /// Lowercased site name → index into `file.sites`.
    sites: FxHashMap<String, usize>,
    /// Layout id → index into `file.layouts`.
    layouts: FxHashMap<String, usize>,
    /// (lowercased site name, lowercased path) → index into `file.items`.
    items: FxHashMap<(String, String), usize>,
}

impl Catalog {
    /// Load a catalog file from disk.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let content =
            fs::read_to_string(path).map_err(|err| CatalogError::Io(path.to_path_buf(), err))?;
        Self::from_str(&content)
    }

    /// Parse and index a catalog from TOML text.
    pub fn from_str(content: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = toml::from_str(content)?;
        Self::from_file(file)
    }

    pub fn from_file(file: CatalogFile) -> Result<Self, CatalogError> {
        let mut catalog = Self {
            file,
            ..Self::default()
        };
        catalog.index()?;
        Ok(catalog)
    }

    /// Build lookup tables, rejecting duplicates and dangling references.
    fn index(&mut self) -> Result<(), CatalogError> {
        for (i, site) in self.file.sites.iter().enumerate() {
            if self.sites.insert(site.name.to_lowercase(), i).is_some() {
                return Err(CatalogError::Validation(format!(
                    "duplicate site `{}`",
                    site.name
                )));
            }
        }

        let mut device_names = FxHashSet::default();
        let mut defaults = 0;
        for device in &self.file.devices {
            if !device_names.insert(device.name.to_lowercase()) {
                return Err(CatalogError::Validation(format!(
                    "duplicate device `{}`",
                    device.name
                )));
            }
            defaults += usize::from(device.default);
        }
        if defaults > 1 {
            return Err(CatalogError::Validation(
                "more than one device is marked `default`".into(),
            ));
        }

        for (i, layout) in self.file.layouts.iter().enumerate() {
            if self.layouts.insert(layout.id.clone(), i).is_some() {
                return Err(CatalogError::Validation(format!(
                    "duplicate layout `{}`",
                    layout.id
                )));
            }
        }

        for (i, item) in self.file.items.iter().enumerate() {
            if !self.sites.contains_key(&item.site.to_lowercase()) {
                return Err(CatalogError::Validation(format!(
                    "item `{}` refers to unknown site `{}`",
                    item.path, item.site
                )));
            }
            for device in item.layouts.keys() {
                if !device_names.contains(&device.to_lowercase()) {
                    return Err(CatalogError::Validation(format!(
                        "item `{}` assigns a layout to unknown device `{}`",
                        item.path, device
                    )));
                }
            }
            let key = (item.site.to_lowercase(), normalize_item_path(&item.path));
            if self.items.insert(key, i).is_some() {
                return Err(CatalogError::Validation(format!(
                    "duplicate item `{}` in site `{}`",
                    item.path, item.site
                )));
            }
        }

        Ok(())
    }

    pub fn site(&self, name: &str) -> Option<&SiteEntry> {
        self.sites
            .get(&name.to_lowercase())
            .map(|&i| &self.file.sites[i])
    }

    /// Site serving `host` (port ignored), falling back to a `*` site.
    pub fn site_for_host(&self, host: &str) -> Option<&SiteEntry> {
        let host = host.split(':').next().unwrap_or(host);
        let sites = &self.file.sites;
        sites
            .iter()
            .find(|s| s.hosts.iter().any(|h| h.eq_ignore_ascii_case(host)))
            .or_else(|| sites.iter().find(|s| s.hosts.iter().any(|h| h == "*")))
    }

    /// Device by name, or the default device when `name` is `None`.
    pub fn device(&self, name: Option<&str>) -> Option<&DeviceEntry> {
        let devices = &self.file.devices;
        match name {
            Some(name) => devices.iter().find(|d| d.name.eq_ignore_ascii_case(name)),
            None => devices.iter().find(|d| d.default),
        }
    }

    pub fn layout(&self, id: &str) -> Option<&LayoutEntry> {
        self.layouts.get(id).map(|&i| &self.file.layouts[i])
    }

    pub fn item(&self, site: &str, path: &str) -> Option<&ItemEntry> {
        let key = (site.to_lowercase(), normalize_item_path(path));
        self.items.get(&key).map(|&i| &self.file.items[i])
    }

    pub fn item_count(&self) -> usize {
        self.file.items.len()
    }
}

impl SiteAccess for Catalog {
    fn can_enter(&self, site_name: &str, user: &UserIdentity) -> bool {
        self.site(site_name)
            .is_none_or(|site| site.enter.allows(user))
    }
}

impl LayoutStore for Catalog {
    fn fetch_layout(&self, query: LayoutQuery<'_>) -> anyhow::Result<Option<LayoutRecord>> {
        // Catalog layouts carry a single version, which is the latest one.
        let record = self
            .layout(query.id)
            .filter(|l| l.in_database(&query.database.name))
            .filter(|l| l.has_language(query.language))
            .map(|l| LayoutRecord::new(l.id.clone(), l.path.clone(), l.read.allows(query.user)));
        Ok(record)
    }
}

/// Lowercase, drop a trailing slash (root stays `/`).
fn normalize_item_path(path: &str) -> String {
    let trimmed = path.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_lowercase()
    } else {
        format!("/{}", trimmed.to_lowercase())
    }
}

// ============================================================================
// Test Helpers
// ============================================================================

#[cfg(test)]
pub(crate) const TEST_CATALOG: &str = r#"
[[site]]
name = "shop"
hosts = ["shop.local", "www.shop.local"]
login_page = "/login"
enter = ["*"]

[[site]]
name = "intranet"
hosts = ["*"]
database = "master"
enter = ["sitecore\\admin"]

[[device]]
id = "{DEV-DEFAULT}"
name = "default"
path = "/devices/default"
default = true

[[device]]
id = "{DEV-PRINT}"
name = "print"
path = "/devices/print"

[[layout]]
id = "{L-MAIN}"
path = "/layouts/main"
file = "/layouts/main.html"

[[layout]]
id = "{L-STAFF}"
path = "/layouts/staff"
file = "/layouts/staff.html"
read = ["extranet\\staff"]

[[layout]]
id = "{L-DA}"
path = "/layouts/danish"
file = "/layouts/danish.html"
languages = ["da"]

[[item]]
site = "shop"
path = "/"
id = "{I-HOME}"
layouts = { default = "{L-MAIN}" }

[[item]]
site = "shop"
path = "/products"
id = "{I-PRODUCTS}"
layouts = { default = "{L-MAIN}", print = "{L-STAFF}" }

[[item]]
site = "shop"
path = "/orders"
id = "{I-ORDERS}"
read = ["extranet\\bob"]
layouts = { default = "{L-MAIN}" }

[[item]]
site = "shop"
path = "/bare"
id = "{I-BARE}"

[[item]]
site = "shop"
path = "/about.html"
id = "{I-ABOUT}"
file = "/about.html"

[[item]]
site = "shop"
path = "/sale"
id = "{I-SALE}"
redirect = "https://deals.example.com/sale"

[[item]]
site = "shop"
path = "/nyheder"
id = "{I-NEWS}"
layouts = { default = "{L-DA}" }
"#;

#[cfg(test)]
pub(crate) fn test_catalog() -> Catalog {
    Catalog::from_str(TEST_CATALOG).unwrap()
}
