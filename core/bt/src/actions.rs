//! Subcommand bodies. Each writes its results to `out` and leaves stdin
//! handling to the caller.

use std::collections::BTreeMap;
use std::io::Write;

use brotab_core::patterns::RE_PREFIX_WINDOW;
use brotab_core::{edit_tabs_in_editor, split_tab_ids, ClientConfig, EditOutcome, TabId, UpdateCommand};
use brotab_protocol::MAX_NUMBER_OF_TABS;
use tracing::{info, warn};

use crate::error::BtError;
use crate::mediators::{DispatchReport, Mediators};

type Result<T> = std::result::Result<T, BtError>;

const DUPLICATE_RECIPES: &str = "\
Show duplicates by Title:
bt list | sort -k2 | awk -F$'\\t' '{ if (a[$2]++ > 0) print }' | cut -f1 | bt close

Show duplicates by URL:
bt list | sort -k3 | awk -F$'\\t' '{ if (a[$3]++ > 0) print }' | cut -f1 | bt close
";

fn write_lines<S: AsRef<str>>(out: &mut impl Write, lines: &[S]) -> Result<()> {
    for line in lines {
        writeln!(out, "{}", line.as_ref()).map_err(|source| BtError::Io {
            context: "write output",
            source,
        })?;
    }
    Ok(())
}

fn check(report: DispatchReport) -> Result<()> {
    info!(applied = ?report.succeeded, failed = report.failed.len(), "Dispatch finished");
    if report.is_success() {
        return Ok(());
    }
    let prefixes = report
        .failed
        .iter()
        .map(|(prefix, err)| format!("{}: {}", prefix, err))
        .collect::<Vec<_>>()
        .join("; ");
    Err(BtError::Dispatch {
        failed: report.failed.len(),
        prefixes,
    })
}

pub fn list(mediators: &Mediators, out: &mut impl Write) -> Result<()> {
    info!("Listing tabs");
    write_lines(out, &mediators.list_tabs(MAX_NUMBER_OF_TABS))
}

/// Lists tabs, lets the user edit them and applies the difference.
pub fn move_tabs(
    mediators: &Mediators,
    config: &ClientConfig,
    dry_run: bool,
    out: &mut impl Write,
) -> Result<()> {
    let before = mediators.list_tabs(MAX_NUMBER_OF_TABS);
    let after = match edit_tabs_in_editor(&config.editor, &before)? {
        EditOutcome::Edited(lines) => lines,
        EditOutcome::Aborted => return Ok(()),
    };

    let plans = mediators.plan(&before, &after)?;
    if dry_run {
        for plan in &plans {
            let lines: Vec<String> = plan
                .plan
                .commands()
                .map(|command| format!("{}: {}", plan.client.prefix(), command))
                .collect();
            write_lines(out, &lines)?;
        }
        return Ok(());
    }

    check(mediators.dispatch(&plans))
}

/// Closes tabs named in `args`, or in `input` when `args` is empty.
pub fn close(mediators: &Mediators, args: &[String], input: &str) -> Result<()> {
    let raw = if args.is_empty() {
        split_tab_ids(input.trim())
    } else {
        args.to_vec()
    };
    let ids = raw
        .iter()
        .map(|id| id.parse::<TabId>())
        .collect::<std::result::Result<Vec<_>, _>>()?;
    info!(tabs = ids.len(), "Closing tabs");
    check(mediators.close_tabs(&ids))
}

pub fn activate(mediators: &Mediators, id: &str, focused: bool) -> Result<()> {
    let id: TabId = id.parse()?;
    let client = mediators
        .get_by_prefix(&id.prefix)
        .ok_or_else(|| BtError::UnknownPrefix(id.prefix.clone()))?;
    client.activate_tab(id.tab_id, focused)?;
    Ok(())
}

pub fn active(mediators: &Mediators, out: &mut impl Write) -> Result<()> {
    write_lines(out, &mediators.get_active_tabs())
}

/// Opens one url per non-blank `input` line in `target` (`a` or `a.WINDOW`).
pub fn open(mediators: &Mediators, target: &str, input: &str, out: &mut impl Write) -> Result<()> {
    let captures = RE_PREFIX_WINDOW
        .captures(target)
        .ok_or_else(|| BtError::InvalidTarget(target.to_string()))?;
    let prefix = &captures[1];
    let window_id = match captures.get(2) {
        Some(window) => Some(
            window
                .as_str()
                .parse::<u64>()
                .map_err(|_| BtError::InvalidTarget(target.to_string()))?,
        ),
        None => None,
    };

    let client = mediators
        .get_by_prefix(prefix)
        .ok_or_else(|| BtError::UnknownPrefix(prefix.to_string()))?;
    let urls: Vec<String> = input
        .lines()
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .map(str::to_string)
        .collect();
    if urls.is_empty() {
        warn!("No urls to open");
        return Ok(());
    }

    let ids = client.open_urls(&urls, window_id)?;
    write_lines(out, &ids)
}

/// Applies a JSON array of `{"tab_id": "a.1.2", "properties": {...}}`.
pub fn update(mediators: &Mediators, input: &str, out: &mut impl Write) -> Result<()> {
    let updates: Vec<UpdateCommand> = serde_json::from_str(input)?;
    let (ids, report) = mediators.update_tabs(&updates);
    write_lines(out, &ids)?;
    check(report)
}

/// Tab count per `prefix.window`, sorted.
pub fn windows(mediators: &Mediators, out: &mut impl Write) -> Result<()> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for line in mediators.list_tabs(MAX_NUMBER_OF_TABS) {
        let id = line.split('\t').next().unwrap_or_default();
        match id.parse::<TabId>() {
            Ok(id) => *counts
                .entry(format!("{}.{}", id.prefix, id.window_id))
                .or_default() += 1,
            Err(err) => warn!(line = %line, error = %err, "Skipping unparsable tab"),
        }
    }
    let lines: Vec<String> = counts
        .into_iter()
        .map(|(window, count)| format!("{}\t{}", window, count))
        .collect();
    write_lines(out, &lines)
}

pub fn clients(mediators: &Mediators, out: &mut impl Write) -> Result<()> {
    let lines: Vec<String> = mediators.clients().iter().map(ToString::to_string).collect();
    write_lines(out, &lines)
}

pub fn duplicates(out: &mut impl Write) -> Result<()> {
    write!(out, "{}", DUPLICATE_RECIPES).map_err(|source| BtError::Io {
        context: "write output",
        source,
    })
}
