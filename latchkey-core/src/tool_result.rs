//! The outcome of a single tool invocation.

use serde::{Deserialize, Serialize};

/// Which filesystem (or filesystem-adjacent) operation produced a result.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolAction {
    /// `list_directory`.
    List,
    /// `read_file`.
    Read,
    /// `write_file`.
    Write,
    /// `append_file`.
    Append,
    /// `move_file`.
    Move,
    /// `copy_file`.
    Copy,
    /// `delete_file`.
    Delete,
    /// `delete_by_pattern`.
    DeleteByPattern,
    /// `create_directory`.
    Create,
    /// `search_files`.
    Search,
    /// `organize_files`.
    Organize,
    /// `get_system_info`.
    SystemInfo,
    /// `run_shell_command`.
    Shell,
}

/// Whether the reported post-condition on disk matches what the tool
/// claims to have done. `passed = false` always surfaces as an error to
/// the caller — verification failure is never silently swallowed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verification {
    /// Whether the post-condition check passed.
    pub passed: bool,
    /// Human-readable detail, logged and folded into the error message
    /// when `passed` is false.
    pub details: String,
}

impl Verification {
    /// A passing verification with no noteworthy detail.
    pub fn ok() -> Self {
        Self {
            passed: true,
            details: String::new(),
        }
    }

    /// A failing verification.
    pub fn failed(details: impl Into<String>) -> Self {
        Self {
            passed: false,
            details: details.into(),
        }
    }
}

/// One entry in a directory listing or search result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListItem {
    /// Basename.
    pub name: String,
    /// Absolute path.
    pub path: String,
    /// Whether this entry is a directory.
    pub is_dir: bool,
    /// Size in bytes, for files.
    pub size_bytes: Option<u64>,
}

/// Closed set of action-specific post-condition payloads. Every tool
/// result carries exactly one of these, tagged by `action`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    /// `list_directory`: the directory listed and its entries, in the
    /// order the filesystem returned them.
    List {
        /// The directory listed.
        path: String,
        /// Its entries, in the order the filesystem returned them.
        items: Vec<ListItem>,
    },
    /// `read_file`: the path opened and the lines returned (capped at the
    /// formatter's line budget; `truncated` marks when more remain).
    Read {
        /// The path opened.
        path: String,
        /// The lines returned.
        lines: Vec<String>,
        /// Whether more lines remain beyond the formatter's budget.
        truncated: bool,
    },
    /// `search_files`: every match found, and whether the result set was
    /// capped.
    Search {
        /// Matching entries found.
        matches: Vec<ListItem>,
        /// Whether the result set was capped.
        truncated: bool,
    },
    /// `write_file`/`append_file`/`move_file`/`copy_file`/`delete_file`/
    /// `delete_by_pattern`/`create_directory`: a mutation. `before_paths`
    /// and `after_paths` record what existed pre- and post-operation.
    /// `pattern` is set only for `delete_by_pattern`.
    Mutation {
        /// Paths that existed before the operation.
        before_paths: Vec<String>,
        /// Paths that exist after the operation.
        after_paths: Vec<String>,
        /// The pattern matched, set only for `delete_by_pattern`.
        pattern: Option<String>,
    },
    /// `organize_files`: one mutation outcome per file moved.
    Organize {
        /// `(from, to)` pairs, one per file moved.
        moved: Vec<(String, String)>,
    },
    /// `get_system_info`: a flat key-value snapshot.
    SystemInfo {
        /// The key-value snapshot.
        info: serde_json::Map<String, serde_json::Value>,
    },
    /// `run_shell_command`: captured stdout/stderr and the exit code.
    Shell {
        /// Captured standard output.
        stdout: String,
        /// Captured standard error.
        stderr: String,
        /// Process exit code.
        exit_code: i32,
    },
    /// No action ran (e.g. a conversational turn with no tool call).
    None,
}

/// Coarse success/error status, independent of the detailed [`Outcome`].
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// The tool ran and its post-condition held.
    Success,
    /// The tool failed, or its post-condition verification failed.
    Error,
}

/// The full record of one tool invocation, as produced by the tool
/// executor and consumed by the response formatter and action guard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// Success or error.
    pub status: Status,
    /// Which tool ran.
    pub action: ToolAction,
    /// The action-specific post-condition payload.
    pub output: Outcome,
    /// Error detail, set iff `status == Error`.
    pub error: Option<String>,
    /// Paths that existed in the affected location before the operation.
    pub before_paths: Vec<String>,
    /// Paths that exist in the affected location after the operation.
    pub after_paths: Vec<String>,
    /// Post-condition verification. Absent only for read-only actions
    /// where no mutation was claimed.
    pub verification: Option<Verification>,
    /// A pre-rendered sentence the orchestrator may use verbatim, set by
    /// the response formatter once it has seen this result.
    pub message_user: Option<String>,
}

impl ToolResult {
    /// Union of `before_paths` and `after_paths`, deduplicated — every
    /// path touched by the operation, for audit logging.
    pub fn changed_paths(&self) -> Vec<String> {
        let mut changed: Vec<String> = self
            .before_paths
            .iter()
            .chain(self.after_paths.iter())
            .cloned()
            .collect();
        changed.sort();
        changed.dedup();
        changed
    }

    /// Whether this result reports success.
    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }
}
