//! Parsing of pasted TeraBox cookies into the canonical `BDUSS=..; STOKEN=..;` form.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

/// Name of the authentication cookie; its presence marks a message as a login attempt.
pub const AUTH_MARKER: &str = "BDUSS";
/// Name of the session cookie; required alongside [`AUTH_MARKER`].
pub const SESSION_MARKER: &str = "STOKEN";

static SEPARATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?:;|\r?\n)\s*").expect("valid regex"));

/// Normalizes free-form cookie text.
///
/// When both `BDUSS` and `STOKEN` are found (keys matched case-insensitively),
/// the canonical string is returned. Otherwise the trimmed input is handed back
/// untouched, so callers must re-check [`has_session_marker`] before trusting it.
///
/// ```
/// use tbx_core::credentials::normalize;
///
/// let raw = " stoken = s-1 ;bduss=b-1; PANPSC=x ";
/// assert_eq!(normalize(raw), "BDUSS=b-1; STOKEN=s-1;");
/// assert_eq!(normalize("BDUSS=only "), "BDUSS=only");
/// ```
pub fn normalize(raw: &str) -> String {
    let trimmed = raw.trim();
    let mut parts: HashMap<&'static str, &str> = HashMap::new();

    for segment in SEPARATOR.split(trimmed) {
        let Some((key, value)) = segment.split_once('=') else {
            continue;
        };
        let key = key.trim();
        if key.eq_ignore_ascii_case(AUTH_MARKER) {
            parts.insert(AUTH_MARKER, value.trim());
        } else if key.eq_ignore_ascii_case(SESSION_MARKER) {
            parts.insert(SESSION_MARKER, value.trim());
        }
    }

    match (parts.get(AUTH_MARKER), parts.get(SESSION_MARKER)) {
        (Some(bduss), Some(stoken)) => {
            format!("{AUTH_MARKER}={bduss}; {SESSION_MARKER}={stoken};")
        }
        _ => trimmed.to_string(),
    }
}

/// True when the text carries the session cookie name (case-sensitive).
pub fn has_session_marker(secret: &str) -> bool {
    secret.contains(SESSION_MARKER)
}

/// True when the text looks like a cookie submission (case-sensitive).
pub fn has_auth_marker(text: &str) -> bool {
    text.contains(AUTH_MARKER)
}
