//! In-memory collaborators and request builders for gate tests.

use super::collab::{LayoutQuery, LayoutRecord, LayoutStore, SiteAccess, Version};
use super::context::{
    Database, DeviceDescriptor, ItemDescriptor, RequestContext, SiteDescriptor, UserIdentity,
};
use super::{GateSettings, MemoryAudit, RequestGate};
use anyhow::{Result, bail};
use parking_lot::Mutex;
use std::sync::Arc;

pub const DEVICE_ID: &str = "{DEV-DEFAULT}";

/// Sites listed here refuse every user.
#[derive(Debug, Clone, Default)]
pub struct StaticSites {
    denied: Vec<String>,
}

impl SiteAccess for StaticSites {
    fn can_enter(&self, site_name: &str, _user: &UserIdentity) -> bool {
        !self.denied.iter().any(|s| s == site_name)
    }
}

/// Recorded lookup: (id, language, version, database).
pub type LookupLog = (String, String, Version, String);

#[derive(Debug, Clone, Default)]
pub struct StaticLayouts {
    records: Vec<(String, bool)>,
    fail: bool,
    lookups: Arc<Mutex<Vec<LookupLog>>>,
}

impl LayoutStore for StaticLayouts {
    fn fetch_layout(&self, query: LayoutQuery<'_>) -> Result<Option<LayoutRecord>> {
        self.lookups.lock().push((
            query.id.to_string(),
            query.language.to_string(),
            query.version,
            query.database.name.clone(),
        ));
        if self.fail {
            bail!("layout store offline");
        }
        Ok(self
            .records
            .iter()
            .find(|(id, _)| id == query.id)
            .map(|(id, readable)| LayoutRecord::new(id.clone(), "/layouts/main", *readable)))
    }
}

/// Gate wiring with a shared in-memory audit.
pub struct Fixture {
    pub settings: GateSettings,
    pub sites: StaticSites,
    pub layouts: StaticLayouts,
    pub audit: Arc<MemoryAudit>,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            settings: GateSettings::default(),
            sites: StaticSites::default(),
            layouts: StaticLayouts::default(),
            audit: Arc::new(MemoryAudit::new()),
        }
    }

    pub fn deny_enter(mut self, site: &str) -> Self {
        self.sites.denied.push(site.to_string());
        self
    }

    pub fn with_layout(mut self, id: &str, readable: bool) -> Self {
        self.layouts.records.push((id.to_string(), readable));
        self
    }

    pub fn failing_layouts(mut self) -> Self {
        self.layouts.fail = true;
        self
    }

    pub fn with_settings(mut self, f: impl FnOnce(&mut GateSettings)) -> Self {
        f(&mut self.settings);
        self
    }

    pub fn lookups(&self) -> Vec<LookupLog> {
        self.layouts.lookups.lock().clone()
    }

    pub fn gate(&self) -> RequestGate {
        RequestGate::new(
            self.settings.clone(),
            Arc::new(self.sites.clone()),
            Arc::new(self.layouts.clone()),
            self.audit.clone(),
        )
    }
}

/// Request on `site` for `user`, nothing resolved beyond the site.
pub fn ctx_for(site: &str, user: &str, url: &str) -> RequestContext {
    let mut ctx = RequestContext::new(url, UserIdentity::new(user));
    ctx.site = Some(SiteDescriptor::new(site));
    ctx.database = Some(Database { name: "web".into() });
    ctx
}

pub fn device() -> DeviceDescriptor {
    DeviceDescriptor {
        id: DEVICE_ID.into(),
        name: "default".into(),
        path: "/devices/default".into(),
    }
}

pub fn item(id: &str) -> ItemDescriptor {
    ItemDescriptor {
        id: id.into(),
        uri: format!("gate://web/{id}?lang=en&ver=1"),
        layouts: Vec::new(),
    }
}

pub fn item_with_layout(id: &str, device_id: &str, layout_id: &str) -> ItemDescriptor {
    let mut item = item(id);
    item.layouts.push((device_id.into(), layout_id.into()));
    item
}

/// Decoded value of `key` in a redirect target's query.
pub fn param(target: &str, key: &str) -> Option<String> {
    let (_, query) = crate::core::url::split_path_query(target);
    crate::core::url::query_param(query, key)
}

/// All decoded keys of a redirect target's query, in order.
pub fn keys(target: &str) -> Vec<String> {
    let (_, query) = crate::core::url::split_path_query(target);
    url::form_urlencoded::parse(query.as_bytes())
        .map(|(k, _)| k.into_owned())
        .collect()
}
