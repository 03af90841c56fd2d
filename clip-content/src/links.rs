//! Shared link-target policy.
//!
//! The parser and both renderers apply the same check: a link target is
//! usable when it is length-bounded and either carries an allow-listed
//! scheme or is a scheme-less relative path or fragment. Anything else
//! degrades the span to plain formatted text on both sides, so a target
//! that survives parsing is guaranteed to render.

use crate::model::limits::MAX_URL_LEN;
use url::Url;

const ALLOWED_SCHEMES: [&str; 4] = ["http", "https", "mailto", "tel"];

/// Whether a link target may be carried through to rendered output.
pub fn is_safe_target(target: &str) -> bool {
    let target = target.trim();
    if target.is_empty() || target.len() > MAX_URL_LEN {
        return false;
    }

    // Fragments and relative paths have no scheme to check.
    if target.starts_with('#')
        || target.starts_with('/')
        || target.starts_with("./")
        || target.starts_with("../")
        || target.starts_with('?')
    {
        return true;
    }

    match Url::parse(target) {
        Ok(url) => ALLOWED_SCHEMES.contains(&url.scheme()),
        // Scheme-less text like "docs/page.html" is treated as relative;
        // anything with an unparseable explicit scheme is rejected.
        Err(_) => !target.contains(':'),
    }
}
