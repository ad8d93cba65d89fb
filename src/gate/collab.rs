//! Collaborators injected into the gate.

use super::context::{Database, UserIdentity};
use anyhow::Result;

/// Site-level access rules.
pub trait SiteAccess: Send + Sync {
    /// Whether `user` may enter the site called `site_name`.
    fn can_enter(&self, site_name: &str, user: &UserIdentity) -> bool;
}

/// Version selector for layout lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Version {
    Latest,
}

/// Arguments of a layout record lookup.
///
/// The lookup itself runs with security checks disabled; read rights for
/// `user` are reported on the returned record instead.
#[derive(Debug, Clone, Copy)]
pub struct LayoutQuery<'a> {
    pub id: &'a str,
    pub language: &'a str,
    pub version: Version,
    pub database: &'a Database,
    pub user: &'a UserIdentity,
}

/// Layout (rendering) record as stored in the content database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutRecord {
    pub id: String,
    pub path: String,
    readable: bool,
}

impl LayoutRecord {
    pub fn new(id: impl Into<String>, path: impl Into<String>, readable: bool) -> Self {
        Self {
            id: id.into(),
            path: path.into(),
            readable,
        }
    }

    /// Read check for the user the record was fetched for.
    #[inline]
    pub fn can_read(&self) -> bool {
        self.readable
    }
}

/// Layout record storage.
pub trait LayoutStore: Send + Sync {
    /// Fetch a layout record, `Ok(None)` when it does not exist.
    fn fetch_layout(&self, query: LayoutQuery<'_>) -> Result<Option<LayoutRecord>>;
}
