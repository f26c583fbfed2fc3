//! Tab records and composite tab ids.
//!
//! A tab is listed as one tab-separated line:
//!
//! ```text
//! prefix.window_id.tab_id<TAB>title<TAB>url
//! ```
//!
//! The prefix names the mediator that owns the tab. Tab ids are unique only
//! within one prefix, so the composite id is what identifies a tab across
//! every connected browser.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ReconcileError, Result};
use crate::patterns::{RE_COMPOSITE_ID, RE_ID_SEPARATOR};

/// Composite id `prefix.window_id.tab_id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TabId {
    pub prefix: String,
    pub window_id: u64,
    pub tab_id: u64,
}

impl TabId {
    pub fn new(prefix: impl Into<String>, window_id: u64, tab_id: u64) -> Self {
        Self {
            prefix: prefix.into(),
            window_id,
            tab_id,
        }
    }
}

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.prefix, self.window_id, self.tab_id)
    }
}

impl FromStr for TabId {
    type Err = ReconcileError;

    fn from_str(value: &str) -> Result<Self> {
        let invalid = || ReconcileError::InvalidTabId {
            id: value.to_string(),
        };
        let captures = RE_COMPOSITE_ID.captures(value).ok_or_else(invalid)?;
        Ok(TabId {
            prefix: captures[1].to_string(),
            window_id: captures[2].parse().map_err(|_| invalid())?,
            tab_id: captures[3].parse().map_err(|_| invalid())?,
        })
    }
}

impl TryFrom<String> for TabId {
    type Error = ReconcileError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<TabId> for String {
    fn from(id: TabId) -> String {
        id.to_string()
    }
}

/// One browser tab as listed by a mediator.
///
/// Equality and hashing cover every field, which is the same as comparing
/// [`Tab::line`]: position in a list never takes part.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tab {
    pub prefix: String,
    pub window_id: u64,
    pub tab_id: u64,
    pub title: String,
    pub url: String,
}

impl Tab {
    pub fn new(
        prefix: impl Into<String>,
        window_id: u64,
        tab_id: u64,
        title: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            prefix: prefix.into(),
            window_id,
            tab_id,
            title: title.into(),
            url: url.into(),
        }
    }

    pub fn id(&self) -> TabId {
        TabId::new(self.prefix.clone(), self.window_id, self.tab_id)
    }

    /// Canonical line form, used both for editing and for exact matching.
    pub fn line(&self) -> String {
        format!(
            "{}.{}.{}\t{}\t{}",
            self.prefix, self.window_id, self.tab_id, self.title, self.url
        )
    }

    pub fn from_line(line: &str) -> Result<Self> {
        let mut fields = line.splitn(3, '\t');
        let (ids, title, url) = match (fields.next(), fields.next(), fields.next()) {
            (Some(ids), Some(title), Some(url)) => (ids, title, url),
            _ => {
                return Err(ReconcileError::MalformedLine {
                    line: line.to_string(),
                    reason: "expected id, title and url separated by tabs".to_string(),
                })
            }
        };

        let id: TabId = ids.parse().map_err(|_| ReconcileError::MalformedLine {
            line: line.to_string(),
            reason: format!("bad composite id {:?}", ids),
        })?;

        Ok(Tab {
            prefix: id.prefix,
            window_id: id.window_id,
            tab_id: id.tab_id,
            title: title.to_string(),
            url: url.to_string(),
        })
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.line())
    }
}

/// Parses listing lines into tabs. Blank lines are skipped so a trailing
/// newline left by an editor does not count as a tab.
///
/// Tab characters are never trimmed: a tab with an empty url still ends in
/// a separator.
pub fn parse_tab_lines<S: AsRef<str>>(lines: &[S]) -> Result<Vec<Tab>> {
    lines
        .iter()
        .map(|line| {
            line.as_ref()
                .trim_matches(|c: char| c == ' ' || c == '\r' || c == '\n')
        })
        .filter(|line| !line.is_empty())
        .map(Tab::from_line)
        .collect()
}

/// Splits whitespace-separated tab ids, e.g. the first column piped on stdin.
pub fn split_tab_ids(text: &str) -> Vec<String> {
    RE_ID_SEPARATOR
        .split(text)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
