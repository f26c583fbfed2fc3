//! Commands inferred by reconciliation and sent to mediators.

use serde::{Deserialize, Serialize};

use brotab_protocol::{MoveTriplet, TabProperties, TabUpdate};

use crate::tab::TabId;

/// Close one tab, identified by its composite id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeleteCommand(pub TabId);

impl DeleteCommand {
    pub fn id(&self) -> &TabId {
        &self.0
    }
}

impl std::fmt::Display for DeleteCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Move `tab_id` into `window_id` at `new_index`.
///
/// `new_index` is a position in the whole listing, and a sequence of moves
/// only makes sense when replayed in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MoveCommand {
    pub tab_id: u64,
    pub window_id: u64,
    pub new_index: usize,
}

impl MoveCommand {
    pub fn new(tab_id: u64, window_id: u64, new_index: usize) -> Self {
        Self {
            tab_id,
            window_id,
            new_index,
        }
    }

    pub fn to_wire(&self) -> MoveTriplet {
        MoveTriplet {
            tab_id: self.tab_id,
            window_id: self.window_id,
            new_index: self.new_index,
        }
    }
}

impl From<(u64, u64, usize)> for MoveCommand {
    fn from((tab_id, window_id, new_index): (u64, u64, usize)) -> Self {
        Self::new(tab_id, window_id, new_index)
    }
}

/// Change properties of one tab.
///
/// Inference only ever sets `url`; the other properties come from updates
/// issued directly on the command line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateCommand {
    pub tab_id: TabId,
    #[serde(default)]
    pub properties: TabProperties,
}

impl UpdateCommand {
    pub fn url(tab_id: TabId, url: impl Into<String>) -> Self {
        Self {
            tab_id,
            properties: TabProperties {
                url: Some(url.into()),
                ..TabProperties::default()
            },
        }
    }

    /// Mediators address tabs by numeric id only.
    pub fn to_wire(&self) -> TabUpdate {
        TabUpdate {
            tab_id: self.tab_id.tab_id,
            properties: self.properties.clone(),
        }
    }
}

/// Any single inferred command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Delete(DeleteCommand),
    Move(MoveCommand),
    Update(UpdateCommand),
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::Delete(cmd) => write!(f, "close {}", cmd),
            Command::Move(cmd) => write!(
                f,
                "move {} to window {} index {}",
                cmd.tab_id, cmd.window_id, cmd.new_index
            ),
            Command::Update(cmd) => match serde_json::to_string(&cmd.properties) {
                Ok(properties) => write!(f, "update {} {}", cmd.tab_id, properties),
                Err(_) => write!(f, "update {}", cmd.tab_id),
            },
        }
    }
}
