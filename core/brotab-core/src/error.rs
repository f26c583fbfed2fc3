//! Error types for brotab-core operations.

use std::path::PathBuf;

// ═══════════════════════════════════════════════════════════════════════════════
// Reconciliation Errors
// ═══════════════════════════════════════════════════════════════════════════════

/// All errors raised while parsing, inferring or replaying tab commands.
///
/// Every variant is fatal for the reconciliation it came from: callers must
/// not dispatch any command once one of these has been returned.
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    // ─────────────────────────────────────────────────────────────────────
    // Parsing
    // ─────────────────────────────────────────────────────────────────────
    #[error("Malformed tab line {line:?}: {reason}")]
    MalformedLine { line: String, reason: String },

    #[error("Invalid tab id: {id:?}")]
    InvalidTabId { id: String },

    // ─────────────────────────────────────────────────────────────────────
    // Inference
    // ─────────────────────────────────────────────────────────────────────
    /// A tab in the edited list matches no tab in the listed one, neither by
    /// exact line nor by (tab id, title).
    #[error("Could not find line: {line:?}")]
    LookupFailure { line: String },

    // ─────────────────────────────────────────────────────────────────────
    // Application
    // ─────────────────────────────────────────────────────────────────────
    #[error("Tab not found: {tab_id}")]
    TabNotFound { tab_id: u64 },

    #[error("Cannot move tab {tab_id} to index {index}: list has {len} tabs")]
    IndexOutOfRange {
        tab_id: u64,
        index: usize,
        len: usize,
    },

    #[error("Replaying commands did not reproduce the edited tabs: {details}")]
    ReplayMismatch { details: String },
}

/// Convenience type alias for Results using ReconcileError.
pub type Result<T> = std::result::Result<T, ReconcileError>;

// ═══════════════════════════════════════════════════════════════════════════════
// Environment Errors
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file unreadable: {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Config file malformed: {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: dotenvy::Error,
    },

    #[error("Config value malformed: {key}={value:?}")]
    Malformed { key: String, value: String },

    #[error("Port range is empty: {min}..{max}")]
    EmptyPortRange { min: u16, max: u16 },
}

#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error("Editor command is empty")]
    NoEditor,

    #[error("Failed to launch editor {editor:?}: {source}")]
    Launch {
        editor: String,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}
