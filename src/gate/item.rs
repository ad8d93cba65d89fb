//! Item resolution failure: missing item or denied item permission.

use super::context::RequestContext;
use super::{
    GateError, NoAccessKind, NoAccessTarget, Outcome, RedirectReason, RequestGate,
    SITE_ENTER_RIGHT,
};
use crate::core::url::add_query_string;

impl RequestGate {
    /// Pick the page a permission failure is sent to.
    ///
    /// The login page wins when the site has one and the user may enter the
    /// site: they are signed in as someone without rights to this item.
    pub fn no_access_target(&self, ctx: &RequestContext) -> NoAccessTarget {
        if let Some(site) = &ctx.site
            && site.has_login_page()
        {
            if self.sites.can_enter(&site.name, &ctx.user) {
                self.trace(format!("Redirecting to login page \"{}\".", site.login_page));
                return NoAccessTarget {
                    url: site.login_page.clone(),
                    kind: NoAccessKind::Login,
                };
            }
            self.trace(format!(
                "Redirecting to the 'No Access' page as the current user '{}' does not have sufficient rights to enter the '{}' site.",
                ctx.user_name(),
                site.name
            ));
            return NoAccessTarget {
                url: self.settings.no_access_url.clone(),
                kind: NoAccessKind::SiteEnterDenied,
            };
        }

        self.trace("Redirecting to \"No Access\" page as no login page was found.");
        NoAccessTarget {
            url: self.settings.no_access_url.clone(),
            kind: NoAccessKind::NoAccess,
        }
    }

    /// Redirect for a request whose item is missing or not readable.
    pub fn handle_item_not_found(&self, ctx: &RequestContext) -> Result<Outcome, GateError> {
        let mut params = vec![
            ("item", ctx.local_path.as_str()),
            ("user", ctx.user_name()),
            ("site", ctx.site_name()),
        ];
        if self.settings.save_raw_url {
            params.push(("url", ctx.raw_url.as_str()));
        }

        if !ctx.permission_denied {
            let url = add_query_string(&self.settings.item_not_found_url, &params);
            self.warn(RedirectReason::ItemNotFound, "", ctx);
            return Ok(self.error_outcome(url));
        }

        let target = self.no_access_target(ctx);
        if target.kind == NoAccessKind::SiteEnterDenied {
            params.push(("right", SITE_ENTER_RIGHT));
        }

        if target.is_login() {
            let login_url = add_query_string(&target.url, &params);
            self.warn(RedirectReason::Login, "", ctx);
            if self.settings.login_short_circuit {
                return Ok(self.error_outcome(login_url));
            }
            // Without the short-circuit the login redirect is superseded:
            // both lines are logged and the no-access page is final.
            let url = add_query_string(&self.settings.no_access_url, &params);
            self.warn(RedirectReason::NoAccess, "", ctx);
            return Ok(self.error_outcome(url));
        }

        let url = add_query_string(&target.url, &params);
        self.warn(RedirectReason::NoAccess, "", ctx);
        Ok(self.error_outcome(url))
    }
}
