//! Infers the commands that turn listed tabs into edited tabs.
//!
//! # Pipeline
//!
//! ```text
//! before ──infer_deletes──▶ apply_deletes ──infer_moves──▶ apply_moves ──infer_updates──▶ plan
//! ```
//!
//! Each stage sees the list as left by the previous one, so deletes always
//! precede moves and moves precede updates.
//!
//! # Move inference
//!
//! Every edited tab is located in the listed tabs (see [`TabLookup`]),
//! giving the old index of each new position. Tabs on a longest increasing
//! subsequence of those old indices are already in relative order and stay
//! put; every other tab moves, as does any tab whose window changed.
//!
//! Moves are emitted downward first (target at or before the old index, in
//! scan order), then upward in reverse scan order. That policy is a tuned
//! heuristic rather than a proven one, and some reorders defeat it. The
//! engine replays the result and, when a tab would land in the wrong place,
//! re-emits the same moving tabs in ascending target order, each inserted
//! right after its predecessor in the edited list. That order is always
//! correct and never longer.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::apply::{apply_deletes, apply_moves, apply_updates};
use crate::commands::{Command, DeleteCommand, MoveCommand, UpdateCommand};
use crate::error::{ReconcileError, Result};
use crate::index::{identity_key, identity_mapper, TabLookup};
use crate::lis::longest_increasing_subsequence;
use crate::tab::Tab;

/// Commands inferred from one before/after pair.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    pub deletes: Vec<DeleteCommand>,
    pub moves: Vec<MoveCommand>,
    pub updates: Vec<UpdateCommand>,
}

impl Reconciliation {
    pub fn is_empty(&self) -> bool {
        self.deletes.is_empty() && self.moves.is_empty() && self.updates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.deletes.len() + self.moves.len() + self.updates.len()
    }

    /// All commands in the order they must be executed.
    pub fn commands(&self) -> impl Iterator<Item = Command> + '_ {
        self.deletes
            .iter()
            .cloned()
            .map(Command::Delete)
            .chain(self.moves.iter().copied().map(Command::Move))
            .chain(self.updates.iter().cloned().map(Command::Update))
    }
}

/// Tabs whose `(tab_id, title)` no longer appears in `after`, scanning
/// `before` from the end.
pub fn infer_deletes(before: &[Tab], after: &[Tab]) -> Vec<DeleteCommand> {
    let remaining = identity_mapper(after);
    before
        .iter()
        .rev()
        .filter(|tab| !remaining.contains(&identity_key(tab)))
        .map(|tab| DeleteCommand(tab.id()))
        .collect()
}

/// Moves that reorder `before` (already without deleted tabs) into `after`.
pub fn infer_moves(before: &[Tab], after: &[Tab]) -> Result<Vec<MoveCommand>> {
    let lookup = TabLookup::new(before);
    let reordered = after
        .iter()
        .map(|tab| lookup.lookup(tab))
        .collect::<Result<Vec<usize>>>()?;

    let in_order: HashSet<usize> = longest_increasing_subsequence(&reordered)
        .into_iter()
        .collect();

    let mut moving = Vec::new();
    let mut upward = Vec::new();
    let mut downward = Vec::new();

    for (new_index, &old_index) in reordered.iter().enumerate() {
        let tab_before = &before[old_index];
        let tab_after = &after[new_index];

        let index_changed = !in_order.contains(&old_index);
        let window_changed = tab_before.window_id != tab_after.window_id;
        if !(index_changed || window_changed) {
            continue;
        }

        let command = MoveCommand::new(tab_before.tab_id, tab_after.window_id, new_index);
        if new_index > old_index {
            upward.push(command);
        } else {
            downward.push(command);
        }
        moving.push(new_index);
    }

    let mut moves = downward;
    moves.extend(upward.into_iter().rev());

    if lands_on_target(before, after, &moves) {
        return Ok(moves);
    }

    warn!(
        moves = moves.len(),
        "Move order heuristic missed the target; using anchored order"
    );
    Ok(anchored_moves(before, after, &reordered, &moving))
}

/// URL changes between positionally aligned lists.
///
/// Call after moves have been applied to `before`. Only the url is compared;
/// other properties are not visible in a listing.
pub fn infer_updates(before: &[Tab], after: &[Tab]) -> Vec<UpdateCommand> {
    before
        .iter()
        .zip(after)
        .filter(|(tab_before, tab_after)| tab_before.url != tab_after.url)
        .map(|(_, tab_after)| UpdateCommand::url(tab_after.id(), tab_after.url.clone()))
        .collect()
}

/// Infers deletes, moves and updates, in that order.
///
/// Either every list is returned or nothing is: the plan is replayed against
/// `before` and must reproduce `after` exactly.
pub fn infer_all(before: &[Tab], after: &[Tab]) -> Result<Reconciliation> {
    let deletes = infer_deletes(before, after);
    let without_deleted = apply_deletes(before, &deletes)?;
    debug!(deletes = deletes.len(), "Inferred delete commands");

    let moves = infer_moves(&without_deleted, after)?;
    let reordered = apply_moves(&without_deleted, &moves)?;
    debug!(moves = moves.len(), "Inferred move commands");

    let updates = infer_updates(&reordered, after);
    debug!(updates = updates.len(), "Inferred update commands");

    let replayed = apply_updates(&reordered, &updates)?;
    if let Some(details) = describe_mismatch(&replayed, after) {
        return Err(ReconcileError::ReplayMismatch { details });
    }

    Ok(Reconciliation {
        deletes,
        moves,
        updates,
    })
}

/// Whether replaying `moves` puts every tab at its target position and window.
fn lands_on_target(before: &[Tab], after: &[Tab], moves: &[MoveCommand]) -> bool {
    match apply_moves(before, moves) {
        Ok(tabs) => {
            tabs.len() == after.len()
                && tabs.iter().zip(after).all(|(actual, expected)| {
                    actual.tab_id == expected.tab_id && actual.window_id == expected.window_id
                })
        }
        Err(_) => false,
    }
}

/// Re-emits the moving tabs in ascending target order, each placed right
/// after its predecessor in `after`.
///
/// Every tab before the current target is either unmoved or already placed,
/// so the predecessor is settled and the insert point is final.
fn anchored_moves(
    before: &[Tab],
    after: &[Tab],
    reordered: &[usize],
    moving: &[usize],
) -> Vec<MoveCommand> {
    let mut current: Vec<u64> = before.iter().map(|tab| tab.tab_id).collect();
    let mut moves = Vec::with_capacity(moving.len());

    for &new_index in moving {
        let tab_id = before[reordered[new_index]].tab_id;
        if let Some(from) = current.iter().position(|&id| id == tab_id) {
            current.remove(from);
        }

        let target = match new_index.checked_sub(1) {
            None => 0,
            Some(previous) => {
                let anchor = before[reordered[previous]].tab_id;
                current
                    .iter()
                    .position(|&id| id == anchor)
                    .map(|position| position + 1)
                    .unwrap_or(new_index.min(current.len()))
            }
        };

        current.insert(target, tab_id);
        moves.push(MoveCommand::new(tab_id, after[new_index].window_id, target));
    }

    moves
}

fn describe_mismatch(actual: &[Tab], expected: &[Tab]) -> Option<String> {
    if actual.len() != expected.len() {
        return Some(format!(
            "expected {} tabs, got {}",
            expected.len(),
            actual.len()
        ));
    }

    actual
        .iter()
        .zip(expected)
        .position(|(a, e)| a != e)
        .map(|position| {
            format!(
                "at position {}: expected {:?}, got {:?}",
                position,
                expected[position].line(),
                actual[position].line()
            )
        })
}
