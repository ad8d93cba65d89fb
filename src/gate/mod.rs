//! Request gate: the terminal decision for a resolved request.
//!
//! Precedence, top to bottom, first match wins:
//!
//! | Condition                                   | Outcome                         |
//! |---------------------------------------------|---------------------------------|
//! | site present, user cannot enter it          | no-access redirect (`site:enter`) |
//! | preview mode and permission denied          | login / no-access / not-found   |
//! | physical path is an external URL            | permanent redirect              |
//! | physical path differs from request path     | internal rewrite                |
//! | physical path equals request path           | serve                           |
//! | no physical path, no item                   | login / no-access / not-found   |
//! | no physical path, item resolved             | no-layout / no-access redirect  |
//!
//! The gate holds no per-request state. Everything it reads comes from the
//! `RequestContext`; everything it needs to look up goes through the injected
//! collaborators.

pub mod audit;
pub mod collab;
pub mod context;
mod error;
mod item;
mod layout;
pub mod outcome;
mod site;

#[cfg(test)]
pub(crate) mod testing;

pub use audit::{AuditEntry, AuditSink, LogAudit, MemoryAudit};
pub use collab::{LayoutStore, SiteAccess};
pub use context::RequestContext;
pub use error::GateError;
pub use outcome::{NoAccessKind, NoAccessTarget, Outcome, RedirectReason};

use crate::core::url::{is_external_url, same_local_path, split_path_query};
use std::sync::Arc;

/// Marker appended when the failing right is entering the site.
pub const SITE_ENTER_RIGHT: &str = "site:enter";

/// Redirect targets and switches read by the gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateSettings {
    pub item_not_found_url: String,
    pub no_access_url: String,
    pub layout_not_found_url: String,
    /// Append the original request URL as `url=` on item failures.
    pub save_raw_url: bool,
    /// Rewrite to error pages instead of redirecting the client.
    pub server_side_redirect: bool,
    /// Let the login redirect end item-failure handling.
    pub login_short_circuit: bool,
}

impl Default for GateSettings {
    fn default() -> Self {
        Self {
            item_not_found_url: "/service/notfound".to_string(),
            no_access_url: "/service/noaccess".to_string(),
            layout_not_found_url: "/service/nolayout".to_string(),
            save_raw_url: false,
            server_side_redirect: false,
            login_short_circuit: false,
        }
    }
}

/// Final stage of request processing.
pub struct RequestGate {
    settings: GateSettings,
    sites: Arc<dyn SiteAccess>,
    layouts: Arc<dyn LayoutStore>,
    audit: Arc<dyn AuditSink>,
}

impl RequestGate {
    pub fn new(
        settings: GateSettings,
        sites: Arc<dyn SiteAccess>,
        layouts: Arc<dyn LayoutStore>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            settings,
            sites,
            layouts,
            audit,
        }
    }

    /// Decide the terminal outcome for `ctx`.
    pub fn process(&self, ctx: &RequestContext) -> Result<Outcome, GateError> {
        if let Some(site) = &ctx.site
            && !self.sites.can_enter(&site.name, &ctx.user)
        {
            return self.handle_site_access_denied(site, ctx);
        }

        // A preview request with denied permission never reaches rewrite or serve.
        if ctx.mode.is_preview() && ctx.permission_denied {
            return self.handle_item_not_found(ctx);
        }

        let page = ctx.page.as_ref().ok_or(GateError::MissingPageContext)?;
        let file_path = page.file_path.as_str();

        if !file_path.is_empty() {
            if is_external_url(file_path) {
                return Ok(Outcome::permanent_redirect(file_path));
            }
            if !same_local_path(file_path, &ctx.request_path) {
                return Ok(Outcome::RewritePath {
                    path: file_path.to_string(),
                    path_info: ctx.path_info.clone(),
                    query: ctx.query_string.clone(),
                });
            }
            return Ok(Outcome::Serve);
        }

        if ctx.item.is_none() {
            return self.handle_item_not_found(ctx);
        }
        self.handle_layout_not_found(ctx)
    }

    /// Turn an error-page URL into the effect the settings ask for.
    fn error_outcome(&self, url: String) -> Outcome {
        if self.settings.server_side_redirect {
            let (path, query) = split_path_query(&url);
            return Outcome::RewritePath {
                path: path.to_string(),
                path_info: String::new(),
                query: query.to_string(),
            };
        }
        Outcome::redirect(url)
    }

    /// Emit the warning line for a failure outcome.
    fn warn(&self, reason: RedirectReason, details: &str, ctx: &RequestContext) {
        let mut message = String::from(reason.describe());
        if !details.is_empty() {
            message.push(' ');
            message.push_str(details);
        }
        message.push_str(&format!(
            " Requested url: {}, User: {}, Website: {}",
            ctx.raw_url,
            ctx.user_name(),
            ctx.site_name()
        ));
        self.audit.record(AuditEntry::warn(message));
    }

    fn trace(&self, message: impl Into<String>) {
        self.audit.record(AuditEntry::debug(message));
    }
}

#[cfg(test)]
mod tests {
    use super::context::{PageContext, PageMode, SiteDescriptor};
    use super::testing::*;
    use super::*;

    #[test]
    fn test_site_enter_denied_wins_over_everything() {
        let fx = Fixture::new().deny_enter("shop");
        let mut ctx = ctx_for("shop", "anonymous", "/home");
        ctx.mode = PageMode::Preview;
        ctx.permission_denied = true;
        ctx.page = Some(PageContext {
            file_path: "https://elsewhere.test/".into(),
        });

        let outcome = fx.gate().process(&ctx).unwrap();
        let url = outcome.redirect_url().unwrap();
        assert!(url.starts_with("/service/noaccess?"));
        assert_eq!(param(url, "right").as_deref(), Some("site:enter"));
        assert!(!url.starts_with("/login"));
    }

    #[test]
    fn test_no_site_skips_enter_check() {
        let fx = Fixture::new().deny_enter("shop");
        let mut ctx = ctx_for("shop", "anonymous", "/home");
        ctx.site = None;
        ctx.page = Some(PageContext {
            file_path: "/home".into(),
        });

        assert_eq!(fx.gate().process(&ctx).unwrap(), Outcome::Serve);
    }

    #[test]
    fn test_preview_permission_denied_never_serves() {
        for file_path in ["", "/home", "/layouts/main.html", "https://x.test/"] {
            let fx = Fixture::new();
            let mut ctx = ctx_for("shop", "bob", "/home");
            ctx.mode = PageMode::Preview;
            ctx.permission_denied = true;
            ctx.item = Some(item("{I}"));
            ctx.page = Some(PageContext {
                file_path: file_path.into(),
            });

            let outcome = fx.gate().process(&ctx).unwrap();
            assert!(
                matches!(outcome, Outcome::Redirect { permanent: false, .. }),
                "{file_path}: {outcome:?}"
            );
        }
    }

    #[test]
    fn test_preview_without_denial_falls_through() {
        let fx = Fixture::new();
        let mut ctx = ctx_for("shop", "bob", "/home");
        ctx.mode = PageMode::Preview;
        ctx.page = Some(PageContext {
            file_path: "/HOME".into(),
        });
        assert_eq!(fx.gate().process(&ctx).unwrap(), Outcome::Serve);
    }

    #[test]
    fn test_permission_denied_outside_preview_uses_path() {
        let fx = Fixture::new();
        let mut ctx = ctx_for("shop", "bob", "/home");
        ctx.permission_denied = true;
        ctx.page = Some(PageContext {
            file_path: "/home".into(),
        });
        assert_eq!(fx.gate().process(&ctx).unwrap(), Outcome::Serve);
    }

    #[test]
    fn test_external_path_redirects_permanently() {
        let fx = Fixture::new();
        let mut ctx = ctx_for("shop", "bob", "/home");
        ctx.page = Some(PageContext {
            file_path: "https://cdn.example.com/landing?a=1".into(),
        });

        assert_eq!(
            fx.gate().process(&ctx).unwrap(),
            Outcome::permanent_redirect("https://cdn.example.com/landing?a=1")
        );
        assert!(fx.audit.warnings().is_empty());
    }

    #[test]
    fn test_malformed_absolute_path_is_not_redirected() {
        let fx = Fixture::new();
        let mut ctx = ctx_for("shop", "bob", "/home");
        ctx.page = Some(PageContext {
            file_path: "http:/x".into(),
        });

        let outcome = fx.gate().process(&ctx).unwrap();
        assert!(matches!(outcome, Outcome::RewritePath { ref path, .. } if path == "http:/x"));
    }

    #[test]
    fn test_internal_path_rewrites() {
        let fx = Fixture::new();
        let mut ctx = ctx_for("shop", "bob", "/home?tab=2");
        ctx.path_info = "/extra".into();
        ctx.page = Some(PageContext {
            file_path: "/layouts/main.html".into(),
        });

        assert_eq!(
            fx.gate().process(&ctx).unwrap(),
            Outcome::RewritePath {
                path: "/layouts/main.html".into(),
                path_info: "/extra".into(),
                query: "tab=2".into(),
            }
        );
    }

    #[test]
    fn test_same_path_serves_case_insensitively() {
        let fx = Fixture::new();
        let mut ctx = ctx_for("shop", "bob", "/Products/List.html");
        ctx.page = Some(PageContext {
            file_path: "/products/list.HTML".into(),
        });
        assert_eq!(fx.gate().process(&ctx).unwrap(), Outcome::Serve);
        assert!(fx.audit.entries().is_empty());
    }

    #[test]
    fn test_empty_path_without_item_is_not_found() {
        let fx = Fixture::new();
        let ctx = ctx_for("shop", "bob", "/missing");

        let outcome = fx.gate().process(&ctx).unwrap();
        let url = outcome.redirect_url().unwrap();
        assert!(url.starts_with("/service/notfound?"));
        assert_eq!(param(url, "item").as_deref(), Some("/missing"));
        assert_eq!(param(url, "user").as_deref(), Some("bob"));
        assert_eq!(param(url, "site").as_deref(), Some("shop"));
    }

    #[test]
    fn test_empty_path_with_item_is_layout_failure() {
        let fx = Fixture::new();
        let mut ctx = ctx_for("shop", "bob", "/home");
        ctx.item = Some(item("{I}"));

        let outcome = fx.gate().process(&ctx).unwrap();
        assert!(
            outcome
                .redirect_url()
                .unwrap()
                .starts_with("/service/nolayout?")
        );
    }

    #[test]
    fn test_missing_page_context_is_fatal() {
        let fx = Fixture::new();
        let mut ctx = ctx_for("shop", "bob", "/home");
        ctx.page = None;

        let err = fx.gate().process(&ctx).unwrap_err();
        assert!(matches!(err, GateError::MissingPageContext));
        assert!(fx.audit.entries().is_empty());
    }

    #[test]
    fn test_process_is_idempotent() {
        let fx = Fixture::new();
        let mut ctx = ctx_for("shop", "bob", "/secret?x=1");
        ctx.site = Some(SiteDescriptor::new("shop").with_login_page("/login"));
        ctx.mode = PageMode::Preview;
        ctx.permission_denied = true;

        let gate = fx.gate();
        let first = gate.process(&ctx).unwrap();
        let first_audit = fx.audit.take();
        let second = gate.process(&ctx).unwrap();
        let second_audit = fx.audit.take();

        assert_eq!(first, second);
        assert_eq!(first_audit, second_audit);
    }

    #[test]
    fn test_every_input_combination_yields_an_outcome() {
        for bits in 0u8..32 {
            let enter_denied = bits & 1 != 0;
            let preview_denied = bits & 2 != 0;
            let item_missing = bits & 4 != 0;
            let path_resolved = bits & 8 != 0;
            let layout_unreadable = bits & 16 != 0;

            let mut fx = Fixture::new().with_layout("{L}", !layout_unreadable);
            if enter_denied {
                fx = fx.deny_enter("shop");
            }
            let mut ctx = ctx_for("shop", "bob", "/home");
            if preview_denied {
                ctx.mode = PageMode::Preview;
                ctx.permission_denied = true;
            }
            if !item_missing {
                ctx.item = Some(item_with_layout("{I}", DEVICE_ID, "{L}"));
            }
            ctx.device = Some(device());
            if path_resolved {
                ctx.page = Some(PageContext {
                    file_path: "/layouts/main.html".into(),
                });
            }

            let outcome = fx.gate().process(&ctx);
            assert!(outcome.is_ok(), "combination {bits:05b} failed: {outcome:?}");
        }
    }
}
