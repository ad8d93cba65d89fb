//! Catalog file entries.
//!
//! # Example
//!
//! ```toml
//! [[site]]
//! name = "shop"
//! hosts = ["shop.local"]
//! login_page = "/login"
//! enter = ["*"]
//!
//! [[device]]
//! id = "{FE5D7FDF}"
//! name = "default"
//! default = true
//!
//! [[layout]]
//! id = "{14030E9F}"
//! file = "/layouts/main.html"
//! read = ["*"]
//!
//! [[item]]
//! site = "shop"
//! path = "/products"
//! id = "{0DE95AE4}"
//! layouts = { default = "{14030E9F}" }
//! ```

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::gate::context::UserIdentity;

/// Users allowed by a rule. `*` matches everyone, names match case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessList(Vec<String>);

impl AccessList {
    pub fn everyone() -> Self {
        Self(vec!["*".to_string()])
    }

    pub fn allows(&self, user: &UserIdentity) -> bool {
        self.0
            .iter()
            .any(|entry| entry == "*" || entry.eq_ignore_ascii_case(&user.name))
    }
}

impl Default for AccessList {
    fn default() -> Self {
        Self::everyone()
    }
}

impl<S: Into<String>> FromIterator<S> for AccessList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// `[[site]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SiteEntry {
    pub name: String,
    /// Host names served by this site; `*` makes it the fallback site.
    #[serde(default)]
    pub hosts: Vec<String>,
    #[serde(default)]
    pub login_page: String,
    #[serde(default = "default_database")]
    pub database: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub enter: AccessList,
}

/// `[[device]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeviceEntry {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub path: String,
    /// Picked when the request does not ask for a device.
    #[serde(default)]
    pub default: bool,
}

/// `[[layout]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LayoutEntry {
    pub id: String,
    #[serde(default)]
    pub path: String,
    /// Physical file that renders items using this layout.
    pub file: String,
    #[serde(default)]
    pub read: AccessList,
    /// Languages the layout has a version in; empty means all.
    #[serde(default)]
    pub languages: Vec<String>,
    /// Database holding the layout; `None` means every database.
    #[serde(default)]
    pub database: Option<String>,
}

impl LayoutEntry {
    pub fn has_language(&self, language: &str) -> bool {
        self.languages.is_empty()
            || self
                .languages
                .iter()
                .any(|l| l.eq_ignore_ascii_case(language))
    }

    pub fn in_database(&self, database: &str) -> bool {
        self.database
            .as_deref()
            .is_none_or(|db| db.eq_ignore_ascii_case(database))
    }
}

/// `[[item]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ItemEntry {
    pub site: String,
    pub path: String,
    pub id: String,
    #[serde(default)]
    pub read: AccessList,
    /// Device name → layout id.
    #[serde(default)]
    pub layouts: FxHashMap<String, String>,
    /// Physical file served directly, bypassing layouts.
    #[serde(default)]
    pub file: Option<String>,
    /// External URL the item points at.
    #[serde(default)]
    pub redirect: Option<String>,
}

/// Whole catalog file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogFile {
    #[serde(default, rename = "site")]
    pub sites: Vec<SiteEntry>,
    #[serde(default, rename = "device")]
    pub devices: Vec<DeviceEntry>,
    #[serde(default, rename = "layout")]
    pub layouts: Vec<LayoutEntry>,
    #[serde(default, rename = "item")]
    pub items: Vec<ItemEntry>,
}

fn default_database() -> String {
    "web".to_string()
}

fn default_language() -> String {
    "en".to_string()
}
