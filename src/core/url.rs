//! URL helpers for redirect targets.
//!
//! - Query-string construction: values are percent-encoded on the way out
//! - Path comparison: case-insensitive, the way request paths are matched
//! - External URL detection for resolved physical paths

use std::borrow::Cow;

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

/// Characters escaped inside a query value.
///
/// `:`, `/`, `(`, `)` and `@` pass through, so `right=site:enter` and item
/// paths stay as written.
const QUERY_VALUE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'+')
    .add(b'<')
    .add(b'=')
    .add(b'>')
    .add(b'?')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Percent-encode a single query value.
#[inline]
pub fn encode_query_value(value: &str) -> Cow<'_, str> {
    utf8_percent_encode(value, QUERY_VALUE).into()
}

/// Append `key=value` pairs to `base`, keeping any existing query and fragment.
///
/// # Examples
/// ```ignore
/// add_query_string("/noaccess", &[("user", "bob")])       -> "/noaccess?user=bob"
/// add_query_string("/login?x=1", &[("site", "shop")])     -> "/login?x=1&site=shop"
/// add_query_string("/login#top", &[("site", "shop")])     -> "/login?site=shop#top"
/// ```
pub fn add_query_string(base: &str, pairs: &[(&str, &str)]) -> String {
    if pairs.is_empty() {
        return base.to_string();
    }

    let (head, fragment) = match base.split_once('#') {
        Some((head, fragment)) => (head, Some(fragment)),
        None => (base, None),
    };

    let mut url = String::with_capacity(head.len() + pairs.len() * 16);
    url.push_str(head);

    let mut separator = match head.find('?') {
        None => Some('?'),
        Some(_) if head.ends_with('?') || head.ends_with('&') => None,
        Some(_) => Some('&'),
    };

    for (key, value) in pairs {
        if let Some(sep) = separator {
            url.push(sep);
        }
        url.push_str(&encode_query_value(key));
        url.push('=');
        url.push_str(&encode_query_value(value));
        separator = Some('&');
    }

    if let Some(fragment) = fragment {
        url.push('#');
        url.push_str(fragment);
    }

    url
}

/// Check whether a resolved path is an absolute URL pointing off-site.
///
/// Accepts `http`/`https` URLs with a host and protocol-relative `//host/...`.
/// Site-root paths (`/layouts/main.html`) and relative paths are internal.
pub fn is_external_url(path: &str) -> bool {
    let path = path.trim();
    if path.starts_with("//") {
        return path.len() > 2;
    }

    // `Url::parse` repairs `http:/x` into `http://x/`; only a literal `://` counts.
    let Some((scheme, rest)) = path.split_once("://") else {
        return false;
    };
    if !scheme.eq_ignore_ascii_case("http") && !scheme.eq_ignore_ascii_case("https") {
        return false;
    }
    if rest.is_empty() || rest.starts_with(['/', '\\']) {
        return false;
    }

    url::Url::parse(path).is_ok_and(|parsed| parsed.has_host())
}

/// Compare two local paths case-insensitively.
#[inline]
pub fn same_local_path(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// Split a request target into `(path, query)` without the leading `?`.
#[inline]
pub fn split_path_query(target: &str) -> (&str, &str) {
    target.split_once('?').unwrap_or((target, ""))
}

/// Look up a decoded query parameter by name (first occurrence wins).
pub fn query_param(query: &str, key: &str) -> Option<String> {
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}
