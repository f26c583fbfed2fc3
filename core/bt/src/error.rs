use brotab_core::error::{ConfigError, EditorError};
use brotab_core::ReconcileError;

use crate::mediator_client::ClientError;

#[derive(Debug, thiserror::Error)]
pub enum BtError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Reconcile(#[from] ReconcileError),

    #[error(transparent)]
    Editor(#[from] EditorError),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("No mediator with prefix {0:?}")]
    UnknownPrefix(String),

    #[error("Invalid target {0:?}: expected PREFIX or PREFIX.WINDOW")]
    InvalidTarget(String),

    #[error("Invalid update list: {0}")]
    InvalidUpdates(#[from] serde_json::Error),

    #[error("I/O error: {context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("{failed} mediator(s) failed to apply commands: {prefixes}")]
    Dispatch { failed: usize, prefixes: String },
}

impl BtError {
    /// Process exit status: 2 once commands may have been partly applied,
    /// 1 for everything caught before dispatch.
    pub fn exit_code(&self) -> i32 {
        match self {
            BtError::Dispatch { .. } => 2,
            _ => 1,
        }
    }
}
