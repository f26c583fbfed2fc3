//! Round-trips tab lines through the user's editor.

use std::io::Write;
use std::process::Command;

use tracing::{debug, info};

use crate::error::EditorError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    /// Lines as saved by the editor, without line terminators.
    Edited(Vec<String>),
    /// The editor exited with a failure status; nothing should change.
    Aborted,
}

/// Writes `lines` to a temporary file, runs `editor` on it and reads the
/// result back.
///
/// `editor` may carry arguments (`"code --wait"`); the file path is appended
/// last. The temporary file is removed when this returns.
pub fn edit_tabs_in_editor(editor: &str, lines: &[String]) -> Result<EditOutcome, EditorError> {
    let mut words = editor.split_whitespace();
    let program = words.next().ok_or(EditorError::NoEditor)?;

    let mut file = tempfile::Builder::new()
        .prefix("brotab-")
        .suffix(".txt")
        .tempfile()
        .map_err(|source| EditorError::Io {
            context: "create temporary file".to_string(),
            source,
        })?;
    for line in lines {
        writeln!(file, "{}", line).map_err(|source| EditorError::Io {
            context: format!("write {}", file.path().display()),
            source,
        })?;
    }
    file.flush().map_err(|source| EditorError::Io {
        context: format!("flush {}", file.path().display()),
        source,
    })?;

    debug!(editor = %editor, path = %file.path().display(), "Launching editor");
    let status = Command::new(program)
        .args(words)
        .arg(file.path())
        .status()
        .map_err(|source| EditorError::Launch {
            editor: editor.to_string(),
            source,
        })?;

    if !status.success() {
        info!(status = ?status.code(), "Editor exited with failure; discarding edits");
        return Ok(EditOutcome::Aborted);
    }

    // Editors often replace the file rather than write in place, so read by path.
    let content = fs_err::read_to_string(file.path()).map_err(|source| EditorError::Io {
        context: "read edited file".to_string(),
        source,
    })?;
    Ok(EditOutcome::Edited(
        content.lines().map(str::to_string).collect(),
    ))
}
