//! Share-link decoding.
//!
//! TeraBox hands out two link shapes: the long query form
//! (`...?shareid=123&uk=456`) and the short path form (`/s/<token>`). Both are
//! accepted; the query form wins when a text carries both.

use once_cell::sync::Lazy;
use regex::Regex;

/// Substring a message must contain before it is treated as a share link.
pub const DOMAIN_MARKER: &str = "terabox";

static QUERY_FORM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"shareid=(\d+).*uk=(\d+)").expect("valid regex"));
static PATH_FORM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/s/([A-Za-z0-9_\-]+)").expect("valid regex"));

/// Decoded identity of a shared item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareReference {
    /// Numeric share id plus the owner's numeric id.
    Pair { share_id: String, owner_id: String },
    /// Opaque short-link token; the owner is unknown.
    Token { share_token: String },
}

impl ShareReference {
    /// Value sent as `shareid` to the save endpoint.
    pub fn share_id(&self) -> &str {
        match self {
            ShareReference::Pair { share_id, .. } => share_id,
            ShareReference::Token { share_token } => share_token,
        }
    }

    /// Owner id, if the link carried one.
    pub fn owner_id(&self) -> Option<&str> {
        match self {
            ShareReference::Pair { owner_id, .. } => Some(owner_id),
            ShareReference::Token { .. } => None,
        }
    }
}

/// True when the text mentions the TeraBox domain (case-sensitive).
pub fn mentions_domain(text: &str) -> bool {
    text.contains(DOMAIN_MARKER)
}

/// Extracts a [`ShareReference`] from free text.
///
/// ```
/// use tbx_core::links::{extract, ShareReference};
///
/// assert_eq!(
///     extract("https://www.terabox.com/s/1AbC-12_3"),
///     Some(ShareReference::Token { share_token: "1AbC-12_3".into() })
/// );
/// assert_eq!(extract("https://www.terabox.com/main"), None);
/// ```
pub fn extract(text: &str) -> Option<ShareReference> {
    if let Some(caps) = QUERY_FORM.captures(text) {
        return Some(ShareReference::Pair {
            share_id: caps[1].to_string(),
            owner_id: caps[2].to_string(),
        });
    }
    PATH_FORM
        .captures(text)
        .map(|caps| ShareReference::Token {
            share_token: caps[1].to_string(),
        })
}
