//! Site-level access denial.

use super::context::{RequestContext, SiteDescriptor};
use super::{GateError, Outcome, RedirectReason, RequestGate, SITE_ENTER_RIGHT};
use crate::core::url::add_query_string;

impl RequestGate {
    /// Redirect a user who may not enter `site` to the no-access page.
    pub fn handle_site_access_denied(
        &self,
        site: &SiteDescriptor,
        ctx: &RequestContext,
    ) -> Result<Outcome, GateError> {
        let url = add_query_string(
            &self.settings.no_access_url,
            &[
                ("item", ctx.local_path.as_str()),
                ("user", ctx.user_name()),
                ("site", site.name.as_str()),
                ("right", SITE_ENTER_RIGHT),
            ],
        );
        self.warn(RedirectReason::SiteAccessDenied, "", ctx);
        Ok(self.error_outcome(url))
    }
}
