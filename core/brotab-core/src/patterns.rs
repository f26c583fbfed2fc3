//! Compiled regex patterns for parsing tab listings and tab ids.
//!
//! Compiled once on first use.

use once_cell::sync::Lazy;
use regex::Regex;

/// `prefix.window_id.tab_id`, e.g. `a.12.345`.
pub static RE_COMPOSITE_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z0-9_-]+)\.(\d+)\.(\d+)$").unwrap());

/// `prefix` or `prefix.window_id`, the target argument of `bt open`.
pub static RE_PREFIX_WINDOW: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z0-9_-]+)\.?(\d+)?$").unwrap());

/// Separators between tab ids piped on stdin.
pub static RE_ID_SEPARATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t\r\n]+").unwrap());
