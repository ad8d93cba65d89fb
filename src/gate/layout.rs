//! Layout resolution failure: item found, nothing to render it with.

use super::collab::{LayoutQuery, Version};
use super::context::RequestContext;
use super::{GateError, Outcome, RedirectReason, RequestGate};
use crate::core::url::add_query_string;
use std::fmt::Write;

impl RequestGate {
    /// Redirect for a resolved item with no usable layout.
    ///
    /// A layout that exists but is not readable by the user sends them to the
    /// no-access page instead of the no-layout page.
    pub fn handle_layout_not_found(&self, ctx: &RequestContext) -> Result<Outcome, GateError> {
        let device_name = ctx.device.as_ref().map_or("", |d| d.name.as_str());
        let mut layout_id = "";
        let mut details = String::new();
        let mut no_access_url = None;

        if let Some(item) = &ctx.item {
            let _ = write!(details, "Item: {}", item.uri);

            if let Some(device) = &ctx.device {
                let _ = write!(details, " Device: {} ({})", device.id, device.path);
                layout_id = item.layout_id_for(device);

                if !layout_id.is_empty() {
                    let database = ctx.database.as_ref().ok_or(GateError::MissingDatabase)?;
                    let record = self
                        .layouts
                        .fetch_layout(LayoutQuery {
                            id: layout_id,
                            language: &ctx.language,
                            version: Version::Latest,
                            database,
                            user: &ctx.user,
                        })
                        .map_err(|source| GateError::Lookup {
                            id: layout_id.to_string(),
                            source,
                        })?;

                    if let Some(record) = record
                        && !record.can_read()
                    {
                        let marker = format!("Layout: {} (item: {})", layout_id, ctx.local_path);
                        no_access_url = Some(add_query_string(
                            &self.settings.no_access_url,
                            &[
                                ("item", marker.as_str()),
                                ("user", ctx.user_name()),
                                ("site", ctx.site_name()),
                                ("device", device_name),
                            ],
                        ));
                    }
                }
            }
        }

        let outcome = match no_access_url {
            Some(url) => {
                // Logged as an access denial naming the layout, not as a missing layout.
                let details = format!("Layout: {layout_id} {details}");
                self.warn(RedirectReason::LayoutNoAccess, &details, ctx);
                url
            }
            None => {
                self.warn(RedirectReason::LayoutNotFound, &details, ctx);
                add_query_string(
                    &self.settings.layout_not_found_url,
                    &[
                        ("item", ctx.local_path.as_str()),
                        ("layout", layout_id),
                        ("device", device_name),
                    ],
                )
            }
        };

        Ok(self.error_outcome(outcome))
    }
}
