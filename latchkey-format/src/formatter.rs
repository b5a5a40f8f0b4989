//! Renders a [`ToolResult`] (or a disambiguation/confirmation need) into
//! the sentence shown to the user.
//!
//! Mutation actions (`write`, `append`, `move`, `copy`, `delete`,
//! `delete_by_pattern`, `create`, `organize`) always carry a
//! [`Verification`]; a result missing one, or with `passed: false`, is
//! rendered as an error regardless of what `status` claims.

use latchkey_core::entity::Entity;
use latchkey_core::tool_result::{Outcome, Status, ToolAction, ToolResult};
use std::path::Path;

const MAX_LIST_ITEMS: usize = 8;
const MAX_READ_LINES: usize = 60;
const MAX_DISAMBIGUATION_ITEMS: usize = 5;

fn basename(path: &str) -> &str {
    Path::new(path).file_name().and_then(|n| n.to_str()).unwrap_or(path)
}

fn parent_dir(path: &str) -> String {
    Path::new(path)
        .parent()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn mutation_needs_verification(action: ToolAction) -> bool {
    matches!(
        action,
        ToolAction::Write
            | ToolAction::Append
            | ToolAction::Move
            | ToolAction::Copy
            | ToolAction::Delete
            | ToolAction::DeleteByPattern
            | ToolAction::Create
            | ToolAction::Organize
    )
}

/// Renders tool results, disambiguation prompts, and confirmation
/// requests into user-facing sentences.
pub struct ResponseFormatter;

impl ResponseFormatter {
    /// Render a completed tool call. A mutation action with no
    /// verification, or a failed one, is always rendered as an error —
    /// a `status: Success` claim never overrides a failed post-condition.
    pub fn format_tool_result(result: &ToolResult) -> String {
        if mutation_needs_verification(result.action) {
            match &result.verification {
                Some(v) if !v.passed => {
                    tracing::warn!(action = ?result.action, details = %v.details, "mutation failed post-condition check");
                    return Self::format_error(&format!("verification failed: {}", v.details));
                }
                None => {
                    tracing::warn!(action = ?result.action, "mutation result missing verification, refusing to claim success");
                    return Self::format_error("verification was not recorded for this action");
                }
                Some(_) => {}
            }
        }

        match result.status {
            Status::Error => Self::format_error(result.error.as_deref().unwrap_or("the operation failed")),
            Status::Success => Self::render_success(result),
        }
    }

    /// The fixed "I'm not sure" message for when no tool result exists to
    /// format (e.g. a read/no-op conversational turn).
    pub fn format_no_match() -> String {
        "I'm not sure which file you mean. Can you specify the path or name?".to_string()
    }

    /// The fixed message shown when a new confirmation or disambiguation
    /// would be set while one is already outstanding.
    pub fn format_pending_action_conflict() -> String {
        "I'm still waiting on your answer to the previous question. \
         Please reply yes, no, or pick one of the options first."
            .to_string()
    }

    /// A one-alternative or many-alternative disambiguation prompt.
    pub fn format_disambiguation(alternatives: &[Entity], action: &str) -> String {
        if alternatives.len() == 1 {
            let e = &alternatives[0];
            return format!(
                "Did you mean {} ({})? Reply yes or specify another file.",
                e.display_name, e.absolute_path
            );
        }

        let mut out = format!("I found {} files. Which one do you want to {action}?", alternatives.len());
        for (i, e) in alternatives.iter().take(MAX_DISAMBIGUATION_ITEMS).enumerate() {
            out.push_str(&format!("\n{}) {} ({})", i + 1, e.display_name, e.absolute_path));
        }
        if alternatives.len() > MAX_DISAMBIGUATION_ITEMS {
            out.push_str(&format!("\n...and {} more", alternatives.len() - MAX_DISAMBIGUATION_ITEMS));
        }
        out.push_str("\nReply with the number, or specify a path.");
        out
    }

    /// A yes/no confirmation prompt for a single-path action
    /// (delete, overwrite).
    pub fn format_confirmation_request(tool_name: &str, path: &str) -> String {
        let verb = action_verb(tool_name);
        format!("{verb} {path}? (yes/no)")
    }

    /// A yes/no confirmation prompt for a source→destination action
    /// (move/rename). The verb is "Rename" when source and destination
    /// share a parent directory, "Move" otherwise.
    pub fn format_confirmation_request_for_path(tool_name: &str, source: &str, destination: &str) -> String {
        let verb = if tool_name == "move_file" && parent_dir(source) == parent_dir(destination) {
            "Rename"
        } else {
            action_verb(tool_name)
        };
        format!("{verb} {source} \u{2192} {destination}? (yes/no)")
    }

    fn render_success(result: &ToolResult) -> String {
        match &result.output {
            Outcome::List { path, items } => Self::render_list(path, items),
            Outcome::Read { path, lines, truncated } => Self::render_read(path, lines, *truncated),
            Outcome::Search { matches, truncated } => Self::render_search(matches, *truncated),
            Outcome::Mutation { before_paths, after_paths, pattern } => {
                Self::render_mutation(result.action, before_paths, after_paths, pattern.as_deref())
            }
            Outcome::Organize { moved } => {
                let folders: std::collections::HashSet<&str> = moved
                    .iter()
                    .filter_map(|(_, dest)| Path::new(dest).parent().and_then(|p| p.to_str()))
                    .collect();
                format!("Organized {} file(s) into {} folder(s).", moved.len(), folders.len())
            }
            Outcome::SystemInfo { info } => {
                let parts: Vec<String> = info.iter().map(|(k, v)| format!("{k}: {v}")).collect();
                format!("System info — {}", parts.join(", "))
            }
            Outcome::Shell { stdout, exit_code, .. } => {
                if *exit_code == 0 {
                    format!("Command finished.\n{stdout}")
                } else {
                    format!("Command exited with code {exit_code}.\n{stdout}")
                }
            }
            Outcome::None => String::new(),
        }
    }

    fn render_list(path: &str, items: &[latchkey_core::tool_result::ListItem]) -> String {
        let mut out = format!("Found {} item(s) in {}:", items.len(), basename(path));
        for (i, item) in items.iter().take(MAX_LIST_ITEMS).enumerate() {
            let kind = if item.is_dir { "folder".to_string() } else {
                item.size_bytes.map(|s| format!("file, {s} bytes")).unwrap_or_else(|| "file".to_string())
            };
            out.push_str(&format!("\n{}) {} ({kind})", i + 1, item.name));
        }
        if items.len() > MAX_LIST_ITEMS {
            out.push_str(&format!("\n...and {} more", items.len() - MAX_LIST_ITEMS));
        }
        out
    }

    fn render_read(path: &str, lines: &[String], truncated: bool) -> String {
        let shown: Vec<&String> = lines.iter().take(MAX_READ_LINES).collect();
        let mut out = format!("Here are the first {} line(s) from {}:", shown.len(), basename(path));
        for line in &shown {
            out.push('\n');
            out.push_str(line);
        }
        if truncated || lines.len() > MAX_READ_LINES {
            out.push_str("\n... (truncated)");
        }
        out
    }

    fn render_search(matches: &[latchkey_core::tool_result::ListItem], truncated: bool) -> String {
        let mut out = format!("Found {} match(es).", matches.len());
        for (i, m) in matches.iter().take(MAX_LIST_ITEMS).enumerate() {
            out.push_str(&format!("\n{}) {}", i + 1, m.path));
        }
        if truncated {
            out.push_str("\n...and more (search capped)");
        }
        out
    }

    fn render_mutation(action: ToolAction, before: &[String], after: &[String], pattern: Option<&str>) -> String {
        match action {
            ToolAction::Move => {
                let src = before.first().map(|s| s.as_str()).unwrap_or("?");
                let dst = after.first().map(|s| s.as_str()).unwrap_or("?");
                if parent_dir(src) == parent_dir(dst) {
                    format!("Renamed '{}' \u{2192} '{}' in {}.", basename(src), basename(dst), parent_dir(dst))
                } else {
                    format!("Moved '{}' to {}.", basename(src), parent_dir(dst))
                }
            }
            ToolAction::Copy => {
                let dst = after.first().map(|s| s.as_str()).unwrap_or("?");
                format!("Copied '{}' to {}.", before.first().map(|s| basename(s)).unwrap_or("?"), parent_dir(dst))
            }
            ToolAction::Delete => format!("Deleted '{}'.", before.first().map(|s| basename(s)).unwrap_or("?")),
            ToolAction::DeleteByPattern => {
                format!("Deleted {} item(s) matching '{}'.", before.len(), pattern.unwrap_or(""))
            }
            ToolAction::Write => {
                let dst = after.first().map(|s| s.as_str()).unwrap_or("?");
                format!("Wrote '{}' in {}.", basename(dst), parent_dir(dst))
            }
            ToolAction::Append => {
                let dst = after.first().map(|s| s.as_str()).unwrap_or("?");
                format!("Appended to '{}' in {}.", basename(dst), parent_dir(dst))
            }
            ToolAction::Create => {
                let dst = after.first().map(|s| s.as_str()).unwrap_or("?");
                format!("Created folder '{}' in {}.", basename(dst), parent_dir(dst))
            }
            _ => String::new(),
        }
    }

    fn format_error(detail: &str) -> String {
        format!("I couldn't complete that: {detail}.")
    }
}

fn action_verb(tool_name: &str) -> &'static str {
    match tool_name {
        "delete_file" | "delete" | "delete_by_pattern" => "Delete",
        "move_file" | "move" => "Move",
        "write_file" | "write" | "overwrite" => "Overwrite",
        "copy_file" | "copy" => "Copy",
        _ => "Run",
    }
}
