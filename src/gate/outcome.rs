//! Terminal effects the gate can produce.

use serde::Serialize;

/// The one effect produced per request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    /// Continue serving the resolved resource as-is.
    Serve,
    /// Internal rewrite, no client-visible redirect.
    RewritePath {
        path: String,
        path_info: String,
        query: String,
    },
    /// Client redirect.
    Redirect { url: String, permanent: bool },
}

impl Outcome {
    pub fn redirect(url: impl Into<String>) -> Self {
        Self::Redirect {
            url: url.into(),
            permanent: false,
        }
    }

    pub fn permanent_redirect(url: impl Into<String>) -> Self {
        Self::Redirect {
            url: url.into(),
            permanent: true,
        }
    }

    /// Redirect target, if this outcome is a redirect.
    pub fn redirect_url(&self) -> Option<&str> {
        match self {
            Self::Redirect { url, .. } => Some(url),
            _ => None,
        }
    }
}

/// Why a failure page was chosen. Drives the audit message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectReason {
    ItemNotFound,
    Login,
    NoAccess,
    SiteAccessDenied,
    LayoutNotFound,
    LayoutNoAccess,
}

impl RedirectReason {
    /// Human-readable outcome used as the audit line prefix.
    pub const fn describe(self) -> &'static str {
        match self {
            Self::ItemNotFound => "Request is redirected to document not found page.",
            Self::Login => "Request is redirected to login page.",
            Self::NoAccess | Self::SiteAccessDenied | Self::LayoutNoAccess => {
                "Request is redirected to access denied page."
            }
            Self::LayoutNotFound => "Request is redirected to no layout page.",
        }
    }
}

/// Which page a permission failure points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoAccessKind {
    /// Site login page; the user can enter the site but lacks item rights.
    Login,
    /// Configured no-access page, no login page on the site.
    NoAccess,
    /// Configured no-access page; the user cannot enter the site at all.
    SiteEnterDenied,
}

/// Base URL for a permission failure plus the kind of page it is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoAccessTarget {
    pub url: String,
    pub kind: NoAccessKind,
}

impl NoAccessTarget {
    #[inline]
    pub fn is_login(&self) -> bool {
        self.kind == NoAccessKind::Login
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redirect_constructors() {
        assert_eq!(
            Outcome::redirect("/a"),
            Outcome::Redirect {
                url: "/a".into(),
                permanent: false
            }
        );
        assert_eq!(
            Outcome::permanent_redirect("https://x.test"),
            Outcome::Redirect {
                url: "https://x.test".into(),
                permanent: true
            }
        );
        assert_eq!(Outcome::redirect("/a").redirect_url(), Some("/a"));
        assert_eq!(Outcome::Serve.redirect_url(), None);
    }

    #[test]
    fn test_outcome_json_shape() {
        let json = serde_json::to_value(Outcome::redirect("/n")).unwrap();
        assert_eq!(json["kind"], "redirect");
        assert_eq!(json["url"], "/n");
        assert_eq!(json["permanent"], false);
    }
}
