//! # brotab-core
//!
//! Tab-state reconciliation for the brotab command-line client.
//!
//! Given the tabs listed before a user edit and the tabs parsed from the
//! edited text, the engine infers the delete, move and update commands that
//! turn one into the other, and can replay those commands against an
//! in-memory tab list.
//!
//! ## Design Principles
//!
//! - **Synchronous**: No async runtime dependency. Inference is pure and runs
//!   on in-memory lists.
//! - **Infer before apply**: [`infer_all`] either returns every command list
//!   or an error; callers never see a partial result.
//! - **Explicit context**: configuration is a value ([`ClientConfig`]) passed
//!   down by the caller, never a process-wide global.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use brotab_core::{infer_all, parse_tab_lines};
//!
//! let before = parse_tab_lines(&listed)?;
//! let after = parse_tab_lines(&edited)?;
//! let plan = infer_all(&before, &after)?;
//! ```

pub mod apply;
pub mod commands;
pub mod config;
pub mod editor;
pub mod error;
pub mod index;
pub mod lis;
pub mod patterns;
pub mod reconcile;
pub mod tab;

pub use apply::{apply_all, apply_deletes, apply_moves, apply_updates};
pub use commands::{Command, DeleteCommand, MoveCommand, UpdateCommand};
pub use config::ClientConfig;
pub use editor::{edit_tabs_in_editor, EditOutcome};
pub use error::{ReconcileError, Result};
pub use lis::longest_increasing_subsequence;
pub use reconcile::{infer_all, infer_deletes, infer_moves, infer_updates, Reconciliation};
pub use tab::{parse_tab_lines, split_tab_ids, Tab, TabId};

pub use brotab_protocol::TabProperties;
