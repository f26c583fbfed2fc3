//! Replays inferred commands against an in-memory tab list.
//!
//! Each function takes the list by reference and returns a new one. The
//! engine uses them between inference stages; tests use them to check that
//! a command sequence really turns one snapshot into the other.

use crate::commands::{DeleteCommand, MoveCommand, UpdateCommand};
use crate::error::{ReconcileError, Result};
use crate::reconcile::Reconciliation;
use crate::tab::{Tab, TabId};

fn position_of(tabs: &[Tab], tab_id: u64) -> Result<usize> {
    tabs.iter()
        .position(|tab| tab.tab_id == tab_id)
        .ok_or(ReconcileError::TabNotFound { tab_id })
}

/// Composite ids carry the prefix, so match on it as well as the tab id.
fn position_of_id(tabs: &[Tab], id: &TabId) -> Result<usize> {
    tabs.iter()
        .position(|tab| tab.tab_id == id.tab_id && tab.prefix == id.prefix)
        .ok_or(ReconcileError::TabNotFound { tab_id: id.tab_id })
}

pub fn apply_deletes(tabs: &[Tab], deletes: &[DeleteCommand]) -> Result<Vec<Tab>> {
    let mut tabs = tabs.to_vec();
    for delete in deletes {
        let index = position_of_id(&tabs, delete.id())?;
        tabs.remove(index);
    }
    Ok(tabs)
}

/// Order matters: every move sees the list as left by the previous one.
pub fn apply_moves(tabs: &[Tab], moves: &[MoveCommand]) -> Result<Vec<Tab>> {
    let mut tabs = tabs.to_vec();
    for command in moves {
        let from = position_of(&tabs, command.tab_id)?;
        let mut tab = tabs.remove(from);
        if command.new_index > tabs.len() {
            return Err(ReconcileError::IndexOutOfRange {
                tab_id: command.tab_id,
                index: command.new_index,
                len: tabs.len() + 1,
            });
        }
        tab.window_id = command.window_id;
        tabs.insert(command.new_index, tab);
    }
    Ok(tabs)
}

/// Only `url` has a local counterpart; the other properties are browser
/// state that a listing does not show.
pub fn apply_updates(tabs: &[Tab], updates: &[UpdateCommand]) -> Result<Vec<Tab>> {
    let mut tabs = tabs.to_vec();
    for update in updates {
        let index = position_of_id(&tabs, &update.tab_id)?;
        if let Some(url) = &update.properties.url {
            tabs[index].url = url.clone();
        }
    }
    Ok(tabs)
}

/// Deletes, then moves, then updates.
pub fn apply_all(tabs: &[Tab], plan: &Reconciliation) -> Result<Vec<Tab>> {
    let tabs = apply_deletes(tabs, &plan.deletes)?;
    let tabs = apply_moves(&tabs, &plan.moves)?;
    apply_updates(&tabs, &plan.updates)
}
