//! Request resolution: HTTP request → `RequestContext`.
//!
//! | Input                       | Resolves                               |
//! |-----------------------------|----------------------------------------|
//! | `Host` header               | site (exact host, then `*` fallback)   |
//! | `X-Sitegate-User` header    | user (default `anonymous`)             |
//! | `sc_mode=preview`           | preview mode                           |
//! | `sc_device=<name>`          | device (default device otherwise)      |
//! | `sc_lang=<code>`            | language (site language otherwise)     |
//! | path                        | item, permission-denied flag           |
//! | item + device               | physical file path                     |

use super::Catalog;
use super::model::{ItemEntry, SiteEntry};
use crate::core::url::{query_param, split_path_query};
use crate::gate::context::{
    Database, DeviceDescriptor, ItemDescriptor, PageContext, PageMode, RequestContext,
    SiteDescriptor, UserIdentity,
};

/// The parts of an HTTP request resolution looks at.
#[derive(Debug, Clone, Default)]
pub struct IncomingRequest {
    pub host: Option<String>,
    /// Request target: path plus optional query.
    pub url: String,
    pub user: Option<String>,
}

impl IncomingRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }
}

impl Catalog {
    /// Build the gate's input for `request`.
    pub fn resolve_request(&self, request: &IncomingRequest) -> RequestContext {
        let user = request
            .user
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .map_or_else(UserIdentity::anonymous, UserIdentity::new);

        let mut ctx = RequestContext::new(request.url.clone(), user);
        let (path, query) = split_path_query(&request.url);
        ctx.local_path = decode_path(path);

        if query_param(query, "sc_mode").is_some_and(|m| m.eq_ignore_ascii_case("preview")) {
            ctx.mode = PageMode::Preview;
        }

        let site = match request.host.as_deref() {
            Some(host) => self.site_for_host(host),
            None => self.site_for_host(""),
        };
        let Some(site) = site else {
            return ctx;
        };

        ctx.site = Some(SiteDescriptor::new(&site.name).with_login_page(&site.login_page));
        ctx.database = Some(Database {
            name: site.database.clone(),
        });
        ctx.language = query_param(query, "sc_lang").unwrap_or_else(|| site.language.clone());

        let device = self.device(query_param(query, "sc_device").as_deref());
        ctx.device = device.map(|d| DeviceDescriptor {
            id: d.id.clone(),
            name: d.name.clone(),
            path: d.path.clone(),
        });

        if let Some(entry) = self.item(&site.name, &ctx.local_path) {
            if entry.read.allows(&ctx.user) {
                ctx.item = Some(self.item_descriptor(site, entry, &ctx.language));
            } else {
                ctx.permission_denied = true;
            }
        }

        ctx.page = Some(PageContext {
            file_path: self.file_path(&ctx),
        });
        ctx
    }

    fn item_descriptor(&self, site: &SiteEntry, entry: &ItemEntry, language: &str) -> ItemDescriptor {
        let mut layouts: Vec<(String, String)> = entry
            .layouts
            .iter()
            .filter_map(|(device, layout)| {
                self.device(Some(device))
                    .map(|d| (d.id.clone(), layout.clone()))
            })
            .collect();
        layouts.sort();

        ItemDescriptor {
            id: entry.id.clone(),
            uri: format!("gate://{}/{}?lang={}&ver=1", site.database, entry.id, language),
            layouts,
        }
    }

    /// Physical file for the resolved item, `""` when none is usable.
    fn file_path(&self, ctx: &RequestContext) -> String {
        let Some(item) = &ctx.item else {
            return String::new();
        };
        let Some(entry) = self.item(ctx.site_name(), &ctx.local_path) else {
            return String::new();
        };

        if let Some(redirect) = &entry.redirect {
            return redirect.clone();
        }
        if let Some(file) = &entry.file {
            return file.clone();
        }

        let Some(device) = &ctx.device else {
            return String::new();
        };
        let layout_id = item.layout_id_for(device);
        match self.layout(layout_id) {
            Some(layout)
                if layout.read.allows(&ctx.user)
                    && layout.has_language(&ctx.language)
                    && ctx
                        .database
                        .as_ref()
                        .is_some_and(|db| layout.in_database(&db.name)) =>
            {
                layout.file.clone()
            }
            _ => String::new(),
        }
    }
}

/// Percent-decode a request path, keeping it as-is when not valid UTF-8.
fn decode_path(path: &str) -> String {
    percent_encoding::percent_decode_str(path)
        .decode_utf8()
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}

#[cfg(test)]
mod tests {
    use super::super::test_catalog;
    use super::*;

    fn shop(url: &str) -> IncomingRequest {
        IncomingRequest::new(url).with_host("shop.local")
    }

    #[test]
    fn test_resolve_site_user_and_defaults() {
        let catalog = test_catalog();
        let ctx = catalog.resolve_request(&shop("/products?x=1"));

        assert_eq!(ctx.site_name(), "shop");
        assert_eq!(ctx.site.as_ref().unwrap().login_page, "/login");
        assert_eq!(ctx.user_name(), "anonymous");
        assert_eq!(ctx.database.as_ref().unwrap().name, "web");
        assert_eq!(ctx.language, "en");
        assert_eq!(ctx.mode, PageMode::Normal);
        assert_eq!(ctx.local_path, "/products");
        assert_eq!(ctx.query_string, "x=1");
        assert_eq!(ctx.raw_url, "/products?x=1");
        assert_eq!(ctx.device.as_ref().unwrap().name, "default");
    }

    #[test]
    fn test_resolve_item_and_layout_file() {
        let catalog = test_catalog();
        let ctx = catalog.resolve_request(&shop("/products"));

        let item = ctx.item.as_ref().unwrap();
        assert_eq!(item.id, "{I-PRODUCTS}");
        assert_eq!(item.uri, "gate://web/{I-PRODUCTS}?lang=en&ver=1");
        assert_eq!(ctx.page.as_ref().unwrap().file_path, "/layouts/main.html");
        assert!(!ctx.permission_denied);
    }

    #[test]
    fn test_resolve_unreadable_layout_leaves_path_empty() {
        let catalog = test_catalog();
        let ctx = catalog.resolve_request(&shop("/products?sc_device=print"));

        assert_eq!(ctx.device.as_ref().unwrap().id, "{DEV-PRINT}");
        assert!(ctx.item.is_some());
        assert_eq!(ctx.page.as_ref().unwrap().file_path, "");

        let staff = catalog.resolve_request(&shop("/products?sc_device=print").with_user("extranet\\staff"));
        assert_eq!(staff.page.as_ref().unwrap().file_path, "/layouts/staff.html");
    }

    #[test]
    fn test_resolve_permission_denied_item() {
        let catalog = test_catalog();
        let ctx = catalog.resolve_request(&shop("/orders?sc_mode=preview"));

        assert!(ctx.item.is_none());
        assert!(ctx.permission_denied);
        assert_eq!(ctx.mode, PageMode::Preview);

        let bob = catalog.resolve_request(&shop("/orders").with_user("extranet\\bob"));
        assert!(bob.item.is_some());
        assert!(!bob.permission_denied);
    }

    #[test]
    fn test_resolve_missing_item() {
        let catalog = test_catalog();
        let ctx = catalog.resolve_request(&shop("/nothing/here"));
        assert!(ctx.item.is_none());
        assert!(!ctx.permission_denied);
        assert_eq!(ctx.page.as_ref().unwrap().file_path, "");
    }

    #[test]
    fn test_resolve_direct_file_and_redirect() {
        let catalog = test_catalog();

        let about = catalog.resolve_request(&shop("/about.html"));
        assert_eq!(about.page.as_ref().unwrap().file_path, "/about.html");

        let sale = catalog.resolve_request(&shop("/sale"));
        assert_eq!(
            sale.page.as_ref().unwrap().file_path,
            "https://deals.example.com/sale"
        );
    }

    #[test]
    fn test_resolve_language_switch() {
        let catalog = test_catalog();
        let en = catalog.resolve_request(&shop("/nyheder"));
        assert_eq!(en.page.as_ref().unwrap().file_path, "");

        let da = catalog.resolve_request(&shop("/nyheder?sc_lang=da"));
        assert_eq!(da.language, "da");
        assert_eq!(da.page.as_ref().unwrap().file_path, "/layouts/danish.html");
    }

    #[test]
    fn test_resolve_fallback_site_and_decoding() {
        let catalog = test_catalog();
        let ctx = catalog.resolve_request(
            &IncomingRequest::new("/Caf%C3%A9").with_host("unknown.test"),
        );
        assert_eq!(ctx.site_name(), "intranet");
        assert_eq!(ctx.database.as_ref().unwrap().name, "master");
        assert_eq!(ctx.local_path, "/Café");
    }

    #[test]
    fn test_resolve_blank_user_is_anonymous() {
        let catalog = test_catalog();
        let ctx = catalog.resolve_request(&shop("/").with_user("   "));
        assert_eq!(ctx.user_name(), "anonymous");
    }

    #[test]
    fn test_resolve_without_any_site() {
        let catalog = Catalog::default();
        let ctx = catalog.resolve_request(&IncomingRequest::new("/x"));
        assert!(ctx.site.is_none());
        assert!(ctx.device.is_none());
        assert_eq!(ctx.page.as_ref().unwrap().file_path, "");
    }
}
