//! HTTP client for one mediator.
//!
//! A mediator serves one browser instance on one port. The client prepends
//! its prefix (`a.`, `b.`, ...) to every tab line and tab id it returns, so
//! ids stay unique when several browsers are connected.

use std::fmt;
use std::time::Duration;

use brotab_protocol::{
    encode_updates, response_lines, MoveTriplet, ProtocolError, Route, TabUpdate,
    UNKNOWN_BROWSER, UPDATES_FIELD, URLS_FIELD,
};
use reqwest::blocking::{multipart, Client, RequestBuilder};
use tracing::{debug, info};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),

    #[error("Request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Mediator at {url} answered HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("Unexpected response from {url}: {body:?}")]
    InvalidResponse { url: String, body: String },

    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

pub type Result<T> = std::result::Result<T, ClientError>;

pub struct MediatorClient {
    prefix: String,
    host: String,
    port: u16,
    http: Client,
    pid: Option<u32>,
    browser: String,
}

impl MediatorClient {
    /// Builds a client without contacting the mediator.
    pub fn new(prefix: impl Into<String>, host: &str, port: u16, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ClientError::Build)?;
        Ok(Self {
            prefix: prefix.into(),
            host: host.to_string(),
            port,
            http,
            pid: None,
            browser: UNKNOWN_BROWSER.to_string(),
        })
    }

    /// Builds a client and asks the mediator for its pid and browser name.
    ///
    /// A mediator that does not answer is kept but reported as not ready.
    pub fn connect(
        prefix: impl Into<String>,
        host: &str,
        port: u16,
        timeout: Duration,
    ) -> Result<Self> {
        let mut client = Self::new(prefix, host, port, timeout)?;
        client.pid = client
            .get_pid()
            .map_err(|err| info!(client = %client.address(), error = %err, "get_pid failed"))
            .ok();
        if let Ok(browser) = client
            .get_browser()
            .map_err(|err| info!(client = %client.address(), error = %err, "get_browser failed"))
        {
            client.browser = browser;
        }
        Ok(client)
    }

    /// Prefix letter, without the trailing dot.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    pub fn browser(&self) -> &str {
        &self.browser
    }

    pub fn is_ready(&self) -> bool {
        self.pid.is_some()
    }

    /// Whether a tab line or id belongs to this mediator.
    pub fn prefix_match(&self, tab: &str) -> bool {
        tab.strip_prefix(self.prefix.as_str())
            .is_some_and(|rest| rest.starts_with('.'))
    }

    pub fn filter_tabs<S: AsRef<str>>(&self, tabs: &[S]) -> Vec<String> {
        tabs.iter()
            .map(AsRef::as_ref)
            .filter(|tab| self.prefix_match(tab))
            .map(str::to_string)
            .collect()
    }

    fn prefix_tabs(&self, lines: Vec<String>) -> Vec<String> {
        lines
            .into_iter()
            .map(|line| format!("{}.{}", self.prefix, line))
            .collect()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Endpoints
    // ─────────────────────────────────────────────────────────────────────

    pub fn list_tabs(&self, limit: usize) -> Result<Vec<String>> {
        let body = self.get(&Route::ListTabs)?;
        Ok(self.prefix_tabs(response_lines(&body, limit)))
    }

    pub fn close_tabs(&self, tab_ids: &[u64]) -> Result<()> {
        info!(client = %self.address(), tabs = ?tab_ids, "Closing tabs");
        self.get(&Route::CloseTabs(tab_ids.to_vec())).map(drop)
    }

    pub fn move_tabs(&self, triplets: &[MoveTriplet]) -> Result<()> {
        info!(client = %self.address(), moves = ?triplets, "Moving tabs");
        self.get(&Route::MoveTabs(triplets.to_vec())).map(drop)
    }

    /// Returns the prefixed ids of the updated tabs.
    pub fn update_tabs(&self, updates: &[TabUpdate]) -> Result<Vec<String>> {
        info!(client = %self.address(), updates = updates.len(), "Updating tabs");
        let body = self.post(&Route::UpdateTabs, UPDATES_FIELD, encode_updates(updates)?)?;
        Ok(self.prefix_tabs(response_lines(&body, usize::MAX)))
    }

    /// Opens `urls` in `window_id`, or the focused window. Returns the
    /// prefixed ids of the new tabs.
    pub fn open_urls(&self, urls: &[String], window_id: Option<u64>) -> Result<Vec<String>> {
        info!(client = %self.address(), urls = urls.len(), window = ?window_id, "Opening urls");
        let body = self.post(&Route::OpenUrls { window_id }, URLS_FIELD, urls.join("\n"))?;
        Ok(self.prefix_tabs(response_lines(&body, usize::MAX)))
    }

    pub fn activate_tab(&self, tab_id: u64, focused: bool) -> Result<()> {
        self.get(&Route::ActivateTab { tab_id, focused }).map(drop)
    }

    /// Prefixed `window.tab` ids of the active tab in each window.
    pub fn get_active_tabs(&self) -> Result<Vec<String>> {
        let body = self.get(&Route::GetActiveTabs)?;
        let ids = body
            .trim()
            .split(',')
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect();
        Ok(self.prefix_tabs(ids))
    }

    pub fn get_pid(&self) -> Result<u32> {
        let route = Route::GetPid;
        let body = self.get(&route)?;
        body.trim()
            .parse()
            .map_err(|_| ClientError::InvalidResponse {
                url: self.url(&route),
                body,
            })
    }

    pub fn get_browser(&self) -> Result<String> {
        Ok(self.get(&Route::GetBrowser)?.trim().to_string())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Transport
    // ─────────────────────────────────────────────────────────────────────

    fn url(&self, route: &Route) -> String {
        format!("http://{}:{}{}", self.host, self.port, route.path())
    }

    fn get(&self, route: &Route) -> Result<String> {
        let url = self.url(route);
        debug!(url = %url, "GET");
        self.send(&url, self.http.get(&url))
    }

    /// Uploads `content` as a file part named `field`.
    fn post(&self, route: &Route, field: &'static str, content: String) -> Result<String> {
        debug_assert!(route.is_upload());
        let url = self.url(route);
        debug!(url = %url, "POST");
        let part = multipart::Part::text(content).file_name(field);
        let form = multipart::Form::new().part(field, part);
        self.send(&url, self.http.post(&url).multipart(form))
    }

    fn send(&self, url: &str, request: RequestBuilder) -> Result<String> {
        let response = request.send().map_err(|source| ClientError::Request {
            url: url.to_string(),
            source,
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().map_err(|source| ClientError::Request {
            url: url.to_string(),
            source,
        })
    }
}

impl fmt::Display for MediatorClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pid = self
            .pid()
            .map_or_else(|| "-1".to_string(), |pid| pid.to_string());
        write!(
            f,
            "{}.\t{}\t{}\t{}",
            self.prefix,
            self.address(),
            pid,
            self.browser()
        )
    }
}

impl fmt::Debug for MediatorClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediatorClient")
            .field("prefix", &self.prefix)
            .field("address", &self.address())
            .field("pid", &self.pid)
            .field("browser", &self.browser)
            .finish()
    }
}
