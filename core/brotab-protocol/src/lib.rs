//! HTTP wire formats for brotab mediators.
//!
//! This crate is shared by the command-line client and any mediator
//! implementation to prevent format drift. Mediators answer with plain text
//! (one tab line per line) except for `update_tabs`, which takes a JSON file
//! upload.

use serde::{Deserialize, Serialize};
use url::form_urlencoded;

pub const DEFAULT_HTTP_IFACE: &str = "127.0.0.1";
pub const DEFAULT_MIN_HTTP_PORT: u16 = 4625;
pub const DEFAULT_MAX_HTTP_PORT: u16 = DEFAULT_MIN_HTTP_PORT + 10;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
pub const MAX_NUMBER_OF_TABS: usize = 5000;

/// Browser name reported for a mediator that did not answer `get_browser`.
pub const UNKNOWN_BROWSER: &str = "<ERROR>";

/// Multipart field carrying the JSON update list.
pub const UPDATES_FIELD: &str = "updates";
/// Multipart field carrying newline-separated URLs to open.
pub const URLS_FIELD: &str = "urls";

#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("invalid update payload: {0}")]
    Json(#[from] serde_json::Error),
}

// ═══════════════════════════════════════════════════════════════════════════════
// Payload types
// ═══════════════════════════════════════════════════════════════════════════════

/// One tab move: take `tab_id`, put it into `window_id` at `new_index`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MoveTriplet {
    pub tab_id: u64,
    pub window_id: u64,
    pub new_index: usize,
}

/// Properties accepted by the browser's `tabs.update` call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TabProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub muted: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pinned: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlighted: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_discardable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opener_tab_id: Option<String>,
}

impl TabProperties {
    pub fn is_empty(&self) -> bool {
        *self == TabProperties::default()
    }
}

/// One element of the JSON array uploaded to `/update_tabs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabUpdate {
    pub tab_id: u64,
    pub properties: TabProperties,
}

// ═══════════════════════════════════════════════════════════════════════════════
// Routes
// ═══════════════════════════════════════════════════════════════════════════════

/// Mediator endpoints used by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    ListTabs,
    CloseTabs(Vec<u64>),
    MoveTabs(Vec<MoveTriplet>),
    UpdateTabs,
    OpenUrls { window_id: Option<u64> },
    ActivateTab { tab_id: u64, focused: bool },
    GetActiveTabs,
    GetPid,
    GetBrowser,
}

impl Route {
    /// Request path including any query string.
    pub fn path(&self) -> String {
        match self {
            Route::ListTabs => "/list_tabs".to_string(),
            Route::CloseTabs(ids) => format!("/close_tabs/{}", encode_tab_ids(ids)),
            Route::MoveTabs(triplets) => {
                let encoded: String =
                    form_urlencoded::byte_serialize(encode_move_triplets(triplets).as_bytes())
                        .collect();
                format!("/move_tabs/{}", encoded)
            }
            Route::UpdateTabs => "/update_tabs".to_string(),
            Route::OpenUrls { window_id: None } => "/open_urls".to_string(),
            Route::OpenUrls {
                window_id: Some(window_id),
            } => format!("/open_urls/{}", window_id),
            Route::ActivateTab { tab_id, focused } => {
                if *focused {
                    format!("/activate_tab/{}?focused=1", tab_id)
                } else {
                    format!("/activate_tab/{}", tab_id)
                }
            }
            Route::GetActiveTabs => "/get_active_tabs".to_string(),
            Route::GetPid => "/get_pid".to_string(),
            Route::GetBrowser => "/get_browser".to_string(),
        }
    }

    /// Whether the route is a multipart POST rather than a GET.
    pub fn is_upload(&self) -> bool {
        matches!(self, Route::UpdateTabs | Route::OpenUrls { .. })
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Encoding
// ═══════════════════════════════════════════════════════════════════════════════

pub fn encode_tab_ids(ids: &[u64]) -> String {
    ids.iter()
        .map(u64::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

pub fn encode_move_triplets(triplets: &[MoveTriplet]) -> String {
    triplets
        .iter()
        .map(|t| format!("{} {} {}", t.tab_id, t.window_id, t.new_index))
        .collect::<Vec<_>>()
        .join(",")
}

pub fn encode_updates(updates: &[TabUpdate]) -> Result<String, ProtocolError> {
    Ok(serde_json::to_string(updates)?)
}

/// Splits a plain-text mediator response into lines, keeping at most `limit`.
pub fn response_lines(body: &str, limit: usize) -> Vec<String> {
    body.lines()
        .filter(|line| !line.is_empty())
        .take(limit)
        .map(str::to_string)
        .collect()
}
