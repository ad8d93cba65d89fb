//! Per-request input to the gate.
//!
//! Everything here is produced upstream (tenant, user, item and device
//! resolution) and only read by the gate.

use serde::Serialize;

/// Rendering mode of the current request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PageMode {
    #[default]
    Normal,
    Preview,
}

impl PageMode {
    #[inline]
    pub const fn is_preview(self) -> bool {
        matches!(self, Self::Preview)
    }
}

/// Authenticated (or anonymous) caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserIdentity {
    pub name: String,
}

impl UserIdentity {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn anonymous() -> Self {
        Self::new("anonymous")
    }
}

/// Tenant the request was resolved to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SiteDescriptor {
    pub name: String,
    /// Empty when the site has no login page.
    pub login_page: String,
}

impl SiteDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            login_page: String::new(),
        }
    }

    pub fn with_login_page(mut self, login_page: impl Into<String>) -> Self {
        self.login_page = login_page.into();
        self
    }

    #[inline]
    pub fn has_login_page(&self) -> bool {
        !self.login_page.is_empty()
    }
}

/// Rendering target used to pick a layout variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceDescriptor {
    pub id: String,
    pub name: String,
    /// Path of the device definition in the content tree.
    pub path: String,
}

/// Content node resolved for the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemDescriptor {
    pub id: String,
    pub uri: String,
    /// Device id → layout id.
    pub layouts: Vec<(String, String)>,
}

impl ItemDescriptor {
    /// Layout assigned to `device`, or `""` when none is assigned.
    pub fn layout_id_for(&self, device: &DeviceDescriptor) -> &str {
        self.layouts
            .iter()
            .find(|(device_id, _)| *device_id == device.id)
            .map_or("", |(_, layout)| layout.as_str())
    }
}

/// Content database the request reads from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Database {
    pub name: String,
}

/// Result of page resolution: the physical file that renders the request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PageContext {
    /// Empty when nothing could be resolved.
    pub file_path: String,
}

/// Everything the gate reads for one request.
#[derive(Debug, Clone, Serialize)]
pub struct RequestContext {
    pub site: Option<SiteDescriptor>,
    pub user: UserIdentity,
    pub mode: PageMode,
    pub item: Option<ItemDescriptor>,
    pub device: Option<DeviceDescriptor>,
    pub database: Option<Database>,
    pub language: String,
    /// Raw request URL as received (path and query).
    pub raw_url: String,
    /// Pipeline-resolved item path (site prefix and language stripped).
    pub local_path: String,
    /// Local path of the request URL itself.
    pub request_path: String,
    pub path_info: String,
    /// Query string forwarded on rewrites, without the leading `?`.
    pub query_string: String,
    pub permission_denied: bool,
    pub page: Option<PageContext>,
}

impl RequestContext {
    /// Context for `raw_url` with no site, item or device resolved yet.
    pub fn new(raw_url: impl Into<String>, user: UserIdentity) -> Self {
        let raw_url = raw_url.into();
        let (path, query) = crate::core::url::split_path_query(&raw_url);
        let (path, query) = (path.to_string(), query.to_string());
        Self {
            site: None,
            user,
            mode: PageMode::Normal,
            item: None,
            device: None,
            database: None,
            language: "en".to_string(),
            raw_url,
            local_path: path.clone(),
            request_path: path,
            path_info: String::new(),
            query_string: query,
            permission_denied: false,
            page: Some(PageContext::default()),
        }
    }

    /// Tenant name, or `""` when no tenant was resolved.
    #[inline]
    pub fn site_name(&self) -> &str {
        self.site.as_ref().map_or("", |site| site.name.as_str())
    }

    #[inline]
    pub fn user_name(&self) -> &str {
        &self.user.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(id: &str) -> DeviceDescriptor {
        DeviceDescriptor {
            id: id.into(),
            name: "default".into(),
            path: "/devices/default".into(),
        }
    }

    #[test]
    fn test_layout_id_for() {
        let item = ItemDescriptor {
            id: "{I}".into(),
            uri: "gate://web/{I}".into(),
            layouts: vec![("{D1}".into(), "{L1}".into())],
        };
        assert_eq!(item.layout_id_for(&device("{D1}")), "{L1}");
        assert_eq!(item.layout_id_for(&device("{D2}")), "");
    }

    #[test]
    fn test_request_context_new_splits_url() {
        let ctx = RequestContext::new("/shop/cart?x=1", UserIdentity::anonymous());
        assert_eq!(ctx.local_path, "/shop/cart");
        assert_eq!(ctx.request_path, "/shop/cart");
        assert_eq!(ctx.query_string, "x=1");
        assert_eq!(ctx.site_name(), "");
        assert_eq!(ctx.user_name(), "anonymous");
        assert!(ctx.page.is_some());
    }

    #[test]
    fn test_site_login_page() {
        assert!(!SiteDescriptor::new("shop").has_login_page());
        assert!(SiteDescriptor::new("shop").with_login_page("/login").has_login_page());
    }
}
