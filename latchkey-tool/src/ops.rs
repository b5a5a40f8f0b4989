//! The filesystem and shell tools themselves.
//!
//! Every operation here does three things in order: resolve and guard the
//! path(s), perform the mutation (atomically, where applicable), and
//! verify the claimed post-condition actually holds before reporting
//! success.

use crate::atomic::atomic_write;
use crate::guard::PathGuard;
use crate::registry::ToolDyn;
use crate::verify;
use latchkey_core::{DomainError, ListItem, Outcome, Status, ToolAction, ToolResult, Verification};
use serde::Deserialize;
use serde_json::json;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

fn path_of(value: &serde_json::Value, field: &str) -> Result<PathBuf, DomainError> {
    value
        .get(field)
        .and_then(|v| v.as_str())
        .map(PathBuf::from)
        .ok_or_else(|| DomainError::InvalidArgument(format!("missing '{field}' parameter")))
}

fn string_of(value: &serde_json::Value, field: &str) -> Result<String, DomainError> {
    value
        .get(field)
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .ok_or_else(|| DomainError::InvalidArgument(format!("missing '{field}' parameter")))
}

async fn list_entries(dir: &Path) -> Result<Vec<ListItem>, DomainError> {
    let mut entries = Vec::new();
    let mut reader = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| DomainError::NotFound(format!("'{}': {e}", dir.display())))?;
    while let Some(entry) = reader
        .next_entry()
        .await
        .map_err(|e| DomainError::PermissionDenied(e.to_string()))?
    {
        let meta = entry.metadata().await.ok();
        entries.push(ListItem {
            name: entry.file_name().to_string_lossy().into_owned(),
            path: entry.path().to_string_lossy().into_owned(),
            is_dir: meta.as_ref().map(|m| m.is_dir()).unwrap_or(false),
            size_bytes: meta.as_ref().filter(|m| m.is_file()).map(|m| m.len()),
        });
    }
    Ok(entries)
}

fn result(action: ToolAction, output: Outcome, verification: Verification, before: Vec<String>, after: Vec<String>) -> ToolResult {
    let status = if verification.passed {
        Status::Success
    } else {
        Status::Error
    };
    let error = if verification.passed {
        None
    } else {
        Some(verification.details.clone())
    };
    ToolResult {
        status,
        action,
        output,
        error,
        before_paths: before,
        after_paths: after,
        verification: Some(verification),
        message_user: None,
    }
}

macro_rules! impl_tool_dyn {
    ($ty:ident, $name:literal, $desc:literal, $schema:expr) => {
        impl ToolDyn for $ty {
            fn name(&self) -> &str {
                $name
            }
            fn description(&self) -> &str {
                $desc
            }
            fn input_schema(&self) -> serde_json::Value {
                $schema
            }
            fn call(
                &self,
                input: serde_json::Value,
            ) -> Pin<Box<dyn Future<Output = Result<serde_json::Value, DomainError>> + Send + '_>>
            {
                Box::pin(async move {
                    tracing::debug!(tool = $name, "tool execution start");
                    let result = self.execute(input).await;
                    match &result {
                        Ok(r) => tracing::debug!(tool = $name, status = ?r.status, "tool execution complete"),
                        Err(e) => tracing::warn!(tool = $name, error = %e, "tool execution failed"),
                    }
                    let result = result?;
                    // `ToolResult` is a plain data struct — serialization
                    // cannot actually fail, but the signature still needs
                    // a `DomainError` on the error side.
                    serde_json::to_value(result)
                        .map_err(|e| DomainError::InvalidArgument(format!("serialization: {e}")))
                })
            }
        }
    };
}

/// Reads a file's contents. Read-only — no verification beyond `passed: true`.
pub struct ReadFileTool {
    /// Path allowlist enforcement for this tool's operations.
    pub guard: Arc<PathGuard>,
}

impl ReadFileTool {
    async fn execute(&self, input: serde_json::Value) -> Result<ToolResult, DomainError> {
        let raw = path_of(&input, "path")?;
        let path = self.guard.check(&raw)?;
        let contents = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| DomainError::NotFound(format!("'{}': {e}", path.display())))?;
        let lines: Vec<String> = contents.lines().map(str::to_string).collect();
        Ok(ToolResult {
            status: Status::Success,
            action: ToolAction::Read,
            output: Outcome::Read {
                path: path.to_string_lossy().into_owned(),
                lines,
                truncated: false,
            },
            error: None,
            before_paths: vec![path.to_string_lossy().into_owned()],
            after_paths: vec![path.to_string_lossy().into_owned()],
            verification: Some(Verification::ok()),
            message_user: None,
        })
    }
}

impl_tool_dyn!(
    ReadFileTool,
    "read_file",
    "Read the contents of a text file.",
    json!({"type": "object", "required": ["path"], "properties": {"path": {"type": "string"}}})
);

/// Lists a directory's immediate children.
pub struct ListDirectoryTool {
    /// Path allowlist enforcement for this tool's operations.
    pub guard: Arc<PathGuard>,
}

impl ListDirectoryTool {
    async fn execute(&self, input: serde_json::Value) -> Result<ToolResult, DomainError> {
        let raw = path_of(&input, "path")?;
        let path = self.guard.check(&raw)?;
        let items = list_entries(&path).await?;
        Ok(ToolResult {
            status: Status::Success,
            action: ToolAction::List,
            output: Outcome::List {
                path: path.to_string_lossy().into_owned(),
                items,
            },
            error: None,
            before_paths: vec![],
            after_paths: vec![],
            verification: Some(Verification::ok()),
            message_user: None,
        })
    }
}

impl_tool_dyn!(
    ListDirectoryTool,
    "list_directory",
    "List the files and folders directly inside a directory.",
    json!({"type": "object", "required": ["path"], "properties": {"path": {"type": "string"}}})
);

/// Writes (overwriting) a file's contents atomically.
pub struct WriteFileTool {
    /// Path allowlist enforcement for this tool's operations.
    pub guard: Arc<PathGuard>,
}

impl WriteFileTool {
    async fn execute(&self, input: serde_json::Value) -> Result<ToolResult, DomainError> {
        let raw = path_of(&input, "path")?;
        let content = string_of(&input, "content")?;
        let path = self.guard.check(&raw)?;
        let before = if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            vec![path.to_string_lossy().into_owned()]
        } else {
            vec![]
        };
        atomic_write(&path, content.clone().into_bytes())
            .await
            .map_err(|e| DomainError::PermissionDenied(e.to_string()))?;
        let verification = verify::expect_contents(&path, content.as_bytes()).await;
        Ok(result(
            ToolAction::Write,
            Outcome::Mutation {
                before_paths: before.clone(),
                after_paths: vec![path.to_string_lossy().into_owned()],
                pattern: None,
            },
            verification,
            before,
            vec![path.to_string_lossy().into_owned()],
        ))
    }
}

impl_tool_dyn!(
    WriteFileTool,
    "write_file",
    "Create or overwrite a file with the given content.",
    json!({"type": "object", "required": ["path", "content"], "properties": {"path": {"type": "string"}, "content": {"type": "string"}}})
);

/// Appends to a file, creating it if absent.
pub struct AppendFileTool {
    /// Path allowlist enforcement for this tool's operations.
    pub guard: Arc<PathGuard>,
}

impl AppendFileTool {
    async fn execute(&self, input: serde_json::Value) -> Result<ToolResult, DomainError> {
        use tokio::io::AsyncWriteExt;
        let raw = path_of(&input, "path")?;
        let content = string_of(&input, "content")?;
        let path = self.guard.check(&raw)?;
        let before = if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            vec![path.to_string_lossy().into_owned()]
        } else {
            vec![]
        };
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|e| DomainError::PermissionDenied(e.to_string()))?;
        file.write_all(content.as_bytes())
            .await
            .map_err(|e| DomainError::PermissionDenied(e.to_string()))?;
        let verification = verify::expect_exists(&path).await;
        Ok(result(
            ToolAction::Append,
            Outcome::Mutation {
                before_paths: before.clone(),
                after_paths: vec![path.to_string_lossy().into_owned()],
                pattern: None,
            },
            verification,
            before,
            vec![path.to_string_lossy().into_owned()],
        ))
    }
}

impl_tool_dyn!(
    AppendFileTool,
    "append_file",
    "Append content to the end of a file, creating it if needed.",
    json!({"type": "object", "required": ["path", "content"], "properties": {"path": {"type": "string"}, "content": {"type": "string"}}})
);

/// Moves or renames a file or folder.
pub struct MoveFileTool {
    /// Path allowlist enforcement for this tool's operations.
    pub guard: Arc<PathGuard>,
}

impl MoveFileTool {
    async fn execute(&self, input: serde_json::Value) -> Result<ToolResult, DomainError> {
        let src_raw = path_of(&input, "source")?;
        let dst_raw = path_of(&input, "destination")?;
        let src = self.guard.check(&src_raw)?;
        let dst = self.guard.check(&dst_raw)?;
        tokio::fs::rename(&src, &dst)
            .await
            .map_err(|e| DomainError::NotFound(format!("'{}': {e}", src.display())))?;
        let gone = verify::expect_absent(&src).await;
        let verification = if gone.passed {
            verify::expect_exists(&dst).await
        } else {
            gone
        };
        Ok(result(
            ToolAction::Move,
            Outcome::Mutation {
                before_paths: vec![src.to_string_lossy().into_owned()],
                after_paths: vec![dst.to_string_lossy().into_owned()],
                pattern: None,
            },
            verification,
            vec![src.to_string_lossy().into_owned()],
            vec![dst.to_string_lossy().into_owned()],
        ))
    }
}

impl_tool_dyn!(
    MoveFileTool,
    "move_file",
    "Move or rename a file or folder.",
    json!({"type": "object", "required": ["source", "destination"], "properties": {"source": {"type": "string"}, "destination": {"type": "string"}}})
);

/// Copies a file.
pub struct CopyFileTool {
    /// Path allowlist enforcement for this tool's operations.
    pub guard: Arc<PathGuard>,
}

impl CopyFileTool {
    async fn execute(&self, input: serde_json::Value) -> Result<ToolResult, DomainError> {
        let src_raw = path_of(&input, "source")?;
        let dst_raw = path_of(&input, "destination")?;
        let src = self.guard.check(&src_raw)?;
        let dst = self.guard.check(&dst_raw)?;
        tokio::fs::copy(&src, &dst)
            .await
            .map_err(|e| DomainError::NotFound(format!("'{}': {e}", src.display())))?;
        let verification = verify::expect_exists(&dst).await;
        Ok(result(
            ToolAction::Copy,
            Outcome::Mutation {
                before_paths: vec![src.to_string_lossy().into_owned()],
                after_paths: vec![dst.to_string_lossy().into_owned()],
                pattern: None,
            },
            verification,
            vec![src.to_string_lossy().into_owned()],
            vec![dst.to_string_lossy().into_owned()],
        ))
    }
}

impl_tool_dyn!(
    CopyFileTool,
    "copy_file",
    "Copy a file to a new location.",
    json!({"type": "object", "required": ["source", "destination"], "properties": {"source": {"type": "string"}, "destination": {"type": "string"}}})
);

/// Deletes a single file or empty directory.
pub struct DeleteFileTool {
    /// Path allowlist enforcement for this tool's operations.
    pub guard: Arc<PathGuard>,
}

impl DeleteFileTool {
    async fn execute(&self, input: serde_json::Value) -> Result<ToolResult, DomainError> {
        let raw = path_of(&input, "path")?;
        let path = self.guard.check(&raw)?;
        let meta = tokio::fs::metadata(&path)
            .await
            .map_err(|e| DomainError::NotFound(format!("'{}': {e}", path.display())))?;
        if meta.is_dir() {
            tokio::fs::remove_dir_all(&path)
                .await
                .map_err(|e| DomainError::PermissionDenied(e.to_string()))?;
        } else {
            tokio::fs::remove_file(&path)
                .await
                .map_err(|e| DomainError::PermissionDenied(e.to_string()))?;
        }
        let verification = verify::expect_absent(&path).await;
        Ok(result(
            ToolAction::Delete,
            Outcome::Mutation {
                before_paths: vec![path.to_string_lossy().into_owned()],
                after_paths: vec![],
                pattern: None,
            },
            verification,
            vec![path.to_string_lossy().into_owned()],
            vec![],
        ))
    }
}

impl_tool_dyn!(
    DeleteFileTool,
    "delete_file",
    "Delete a file or folder.",
    json!({"type": "object", "required": ["path"], "properties": {"path": {"type": "string"}}})
);

/// Deletes every entry in a directory matching a glob pattern.
pub struct DeleteByPatternTool {
    /// Path allowlist enforcement for this tool's operations.
    pub guard: Arc<PathGuard>,
}

impl DeleteByPatternTool {
    async fn execute(&self, input: serde_json::Value) -> Result<ToolResult, DomainError> {
        let dir_raw = path_of(&input, "directory")?;
        let pattern = string_of(&input, "pattern")?;
        let dir = self.guard.check(&dir_raw)?;
        let matcher = glob::Pattern::new(&pattern)
            .map_err(|e| DomainError::InvalidArgument(format!("bad pattern '{pattern}': {e}")))?;
        let entries = list_entries(&dir).await?;
        let mut before = Vec::new();
        for entry in &entries {
            if matcher.matches(&entry.name) {
                before.push(entry.path.clone());
            }
        }
        for path in &before {
            let p = Path::new(path);
            let meta = tokio::fs::metadata(p).await;
            match meta {
                Ok(m) if m.is_dir() => {
                    let _ = tokio::fs::remove_dir_all(p).await;
                }
                Ok(_) => {
                    let _ = tokio::fs::remove_file(p).await;
                }
                Err(_) => {}
            }
        }
        let mut still_present = Vec::new();
        for path in &before {
            if tokio::fs::try_exists(path).await.unwrap_or(false) {
                still_present.push(path.clone());
            }
        }
        let verification = if still_present.is_empty() {
            Verification::ok()
        } else {
            Verification::failed(format!("{} entries matching '{pattern}' remain", still_present.len()))
        };
        Ok(result(
            ToolAction::DeleteByPattern,
            Outcome::Mutation {
                before_paths: before.clone(),
                after_paths: vec![],
                pattern: Some(pattern),
            },
            verification,
            before,
            vec![],
        ))
    }
}

impl_tool_dyn!(
    DeleteByPatternTool,
    "delete_by_pattern",
    "Delete every file in a directory matching a glob pattern (e.g. '*.tmp').",
    json!({"type": "object", "required": ["directory", "pattern"], "properties": {"directory": {"type": "string"}, "pattern": {"type": "string"}}})
);

/// Creates a directory, including any missing parents.
pub struct CreateDirectoryTool {
    /// Path allowlist enforcement for this tool's operations.
    pub guard: Arc<PathGuard>,
}

impl CreateDirectoryTool {
    async fn execute(&self, input: serde_json::Value) -> Result<ToolResult, DomainError> {
        let raw = path_of(&input, "path")?;
        let path = self.guard.check(&raw)?;
        tokio::fs::create_dir_all(&path)
            .await
            .map_err(|e| DomainError::PermissionDenied(e.to_string()))?;
        let verification = verify::expect_exists(&path).await;
        Ok(result(
            ToolAction::Create,
            Outcome::Mutation {
                before_paths: vec![],
                after_paths: vec![path.to_string_lossy().into_owned()],
                pattern: None,
            },
            verification,
            vec![],
            vec![path.to_string_lossy().into_owned()],
        ))
    }
}

impl_tool_dyn!(
    CreateDirectoryTool,
    "create_directory",
    "Create a directory, including missing parent directories.",
    json!({"type": "object", "required": ["path"], "properties": {"path": {"type": "string"}}})
);

const DEFAULT_SEARCH_MAX_RESULTS: usize = 50;

/// Searches a directory tree for entries matching a glob pattern, e.g.
/// `*.txt` or the recursive `**/*.py`.
pub struct SearchFilesTool {
    /// Path allowlist enforcement for this tool's operations.
    pub guard: Arc<PathGuard>,
}

impl SearchFilesTool {
    async fn execute(&self, input: serde_json::Value) -> Result<ToolResult, DomainError> {
        let dir_raw = path_of(&input, "directory")?;
        let pattern = string_of(&input, "pattern")?;
        let max_results = input
            .get("max_results")
            .and_then(|v| v.as_u64())
            .map(|n| n as usize)
            .unwrap_or(DEFAULT_SEARCH_MAX_RESULTS);
        let dir = self.guard.check(&dir_raw)?;

        let full_pattern = dir.join(&pattern).to_string_lossy().into_owned();
        let paths = glob::glob(&full_pattern)
            .map_err(|e| DomainError::InvalidArgument(format!("bad pattern '{pattern}': {e}")))?;

        let mut matches = Vec::new();
        let mut truncated = false;
        for entry in paths {
            if matches.len() >= max_results {
                truncated = true;
                break;
            }
            let Ok(path) = entry else { continue };
            let is_dir = tokio::fs::metadata(&path).await.map(|m| m.is_dir()).unwrap_or(false);
            let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default().to_string();
            matches.push(ListItem { name, path: path.to_string_lossy().into_owned(), is_dir, size_bytes: None });
        }

        Ok(ToolResult {
            status: Status::Success,
            action: ToolAction::Search,
            output: Outcome::Search { matches, truncated },
            error: None,
            before_paths: vec![],
            after_paths: vec![],
            verification: Some(Verification::ok()),
            message_user: None,
        })
    }
}

impl_tool_dyn!(
    SearchFilesTool,
    "search_files",
    "Recursively search a directory tree for entries matching a glob pattern (e.g. '**/*.py').",
    json!({
        "type": "object",
        "required": ["directory", "pattern"],
        "properties": {
            "directory": {"type": "string"},
            "pattern": {"type": "string"},
            "max_results": {"type": "integer"}
        }
    })
);

/// Groups a directory's files into subfolders named after their extension.
pub struct OrganizeFilesTool {
    /// Path allowlist enforcement for this tool's operations.
    pub guard: Arc<PathGuard>,
}

impl OrganizeFilesTool {
    async fn execute(&self, input: serde_json::Value) -> Result<ToolResult, DomainError> {
        let dir_raw = path_of(&input, "directory")?;
        let dir = self.guard.check(&dir_raw)?;
        let entries = list_entries(&dir).await?;
        let mut moved = Vec::new();
        for entry in entries.iter().filter(|e| !e.is_dir) {
            let ext = Path::new(&entry.name)
                .extension()
                .and_then(|e| e.to_str())
                .map(str::to_lowercase)
                .unwrap_or_else(|| "other".to_string());
            let subdir = dir.join(&ext);
            tokio::fs::create_dir_all(&subdir)
                .await
                .map_err(|e| DomainError::PermissionDenied(e.to_string()))?;
            let dest = subdir.join(&entry.name);
            tokio::fs::rename(&entry.path, &dest)
                .await
                .map_err(|e| DomainError::PermissionDenied(e.to_string()))?;
            moved.push((entry.path.clone(), dest.to_string_lossy().into_owned()));
        }
        let mut failures = Vec::new();
        for (_, dest) in &moved {
            if !tokio::fs::try_exists(dest).await.unwrap_or(false) {
                failures.push(dest.clone());
            }
        }
        let verification = if failures.is_empty() {
            Verification::ok()
        } else {
            Verification::failed(format!("{} files failed to land at their destination", failures.len()))
        };
        let before: Vec<String> = moved.iter().map(|(b, _)| b.clone()).collect();
        let after: Vec<String> = moved.iter().map(|(_, a)| a.clone()).collect();
        Ok(result(
            ToolAction::Organize,
            Outcome::Organize { moved },
            verification,
            before,
            after,
        ))
    }
}

impl_tool_dyn!(
    OrganizeFilesTool,
    "organize_files",
    "Group the files directly inside a directory into subfolders by extension.",
    json!({"type": "object", "required": ["directory"], "properties": {"directory": {"type": "string"}}})
);

/// Reports a small, read-only snapshot of the host environment.
pub struct GetSystemInfoTool;

impl GetSystemInfoTool {
    async fn execute(&self, _input: serde_json::Value) -> Result<ToolResult, DomainError> {
        let mut info = serde_json::Map::new();
        info.insert("os".into(), json!(std::env::consts::OS));
        info.insert("arch".into(), json!(std::env::consts::ARCH));
        info.insert(
            "cwd".into(),
            json!(std::env::current_dir().map(|p| p.to_string_lossy().into_owned()).unwrap_or_default()),
        );
        info.insert("home".into(), json!(std::env::var("HOME").unwrap_or_default()));
        Ok(ToolResult {
            status: Status::Success,
            action: ToolAction::SystemInfo,
            output: Outcome::SystemInfo { info },
            error: None,
            before_paths: vec![],
            after_paths: vec![],
            verification: Some(Verification::ok()),
            message_user: None,
        })
    }
}

impl_tool_dyn!(
    GetSystemInfoTool,
    "get_system_info",
    "Report basic information about the host operating system.",
    json!({"type": "object", "properties": {}})
);

#[derive(Deserialize)]
struct ShellInput {
    command: String,
    #[serde(default)]
    timeout_secs: Option<u64>,
}

/// Runs a shell command with a bounded timeout. Exempt from the path
/// guard (it isn't given a path at all) but gated by its own enabled
/// flag in the registry, and never auto-planned by the intent planner.
pub struct RunShellCommandTool {
    /// Timeout applied when a call omits an explicit one.
    pub default_timeout: Duration,
}

impl RunShellCommandTool {
    async fn execute(&self, input: serde_json::Value) -> Result<ToolResult, DomainError> {
        let parsed: ShellInput = serde_json::from_value(input)
            .map_err(|e| DomainError::InvalidArgument(e.to_string()))?;
        let timeout = parsed
            .timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(self.default_timeout);

        let child = tokio::process::Command::new("sh")
            .arg("-c")
            .arg(&parsed.command)
            .output();

        match tokio::time::timeout(timeout, child).await {
            Ok(Ok(output)) => Ok(ToolResult {
                status: Status::Success,
                action: ToolAction::Shell,
                output: Outcome::Shell {
                    stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                    exit_code: output.status.code().unwrap_or(-1),
                },
                error: None,
                before_paths: vec![],
                after_paths: vec![],
                verification: Some(Verification::ok()),
                message_user: None,
            }),
            Ok(Err(e)) => Err(DomainError::PermissionDenied(e.to_string())),
            Err(_) => Err(DomainError::Timeout(format!(
                "command timed out after {:.0}s",
                timeout.as_secs_f64()
            ))),
        }
    }
}

impl_tool_dyn!(
    RunShellCommandTool,
    "run_shell_command",
    "Run a shell command and capture its output, bounded by a timeout.",
    json!({"type": "object", "required": ["command"], "properties": {"command": {"type": "string"}, "timeout_secs": {"type": "integer"}}})
);

/// Register every built-in tool — all nine filesystem operations plus the
/// `organize_files`/`get_system_info`/`run_shell_command` supplements —
/// into `registry`, all enabled by default.
pub fn register_default_tools(
    registry: &mut crate::registry::ToolRegistry,
    guard: Arc<PathGuard>,
    shell_timeout: Duration,
) {
    registry.register(Arc::new(ReadFileTool { guard: guard.clone() }));
    registry.register(Arc::new(ListDirectoryTool { guard: guard.clone() }));
    registry.register(Arc::new(WriteFileTool { guard: guard.clone() }));
    registry.register(Arc::new(AppendFileTool { guard: guard.clone() }));
    registry.register(Arc::new(MoveFileTool { guard: guard.clone() }));
    registry.register(Arc::new(CopyFileTool { guard: guard.clone() }));
    registry.register(Arc::new(DeleteFileTool { guard: guard.clone() }));
    registry.register(Arc::new(DeleteByPatternTool { guard: guard.clone() }));
    registry.register(Arc::new(CreateDirectoryTool { guard: guard.clone() }));
    registry.register(Arc::new(SearchFilesTool { guard: guard.clone() }));
    registry.register(Arc::new(OrganizeFilesTool { guard }));
    registry.register(Arc::new(GetSystemInfoTool));
    registry.register(Arc::new(RunShellCommandTool {
        default_timeout: shell_timeout,
    }));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guard::PathGuard;

    fn guard_for(dir: &Path) -> Arc<PathGuard> {
        Arc::new(PathGuard::new(vec![dir.to_path_buf()]))
    }

    #[tokio::test]
    async fn write_then_read_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let guard = guard_for(dir.path());
        let path = dir.path().join("foo.txt");

        let write = WriteFileTool { guard: guard.clone() };
        let r = write
            .execute(json!({"path": path.to_string_lossy(), "content": "hi"}))
            .await
            .unwrap();
        assert_eq!(r.status, Status::Success);

        let read = ReadFileTool { guard };
        let r = read.execute(json!({"path": path.to_string_lossy()})).await.unwrap();
        match r.output {
            Outcome::Read { lines, .. } => assert_eq!(lines, vec!["hi".to_string()]),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn delete_verifies_absence() {
        let dir = tempfile::tempdir().unwrap();
        let guard = guard_for(dir.path());
        let path = dir.path().join("bye.txt");
        tokio::fs::write(&path, b"x").await.unwrap();

        let delete = DeleteFileTool { guard };
        let r = delete.execute(json!({"path": path.to_string_lossy()})).await.unwrap();
        assert_eq!(r.status, Status::Success);
        assert!(!tokio::fs::try_exists(&path).await.unwrap());
    }

    #[tokio::test]
    async fn guard_rejects_path_outside_roots() {
        let dir = tempfile::tempdir().unwrap();
        let other = tempfile::tempdir().unwrap();
        let guard = guard_for(dir.path());
        let read = ReadFileTool { guard };
        let outside = other.path().join("secret.txt");
        tokio::fs::write(&outside, b"x").await.unwrap();
        let err = read.execute(json!({"path": outside.to_string_lossy()})).await;
        assert!(matches!(err, Err(DomainError::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn organize_groups_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("a.txt"), b"x").await.unwrap();
        tokio::fs::write(dir.path().join("b.pdf"), b"x").await.unwrap();
        let guard = guard_for(dir.path());
        let organize = OrganizeFilesTool { guard };
        let r = organize.execute(json!({"directory": dir.path().to_string_lossy()})).await.unwrap();
        assert_eq!(r.status, Status::Success);
        assert!(tokio::fs::try_exists(dir.path().join("txt/a.txt")).await.unwrap());
        assert!(tokio::fs::try_exists(dir.path().join("pdf/b.pdf")).await.unwrap());
    }

    #[tokio::test]
    async fn search_matches_glob_pattern_recursively() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::create_dir(dir.path().join("sub")).await.unwrap();
        tokio::fs::write(dir.path().join("a.py"), b"x").await.unwrap();
        tokio::fs::write(dir.path().join("sub/b.py"), b"x").await.unwrap();
        tokio::fs::write(dir.path().join("c.txt"), b"x").await.unwrap();

        let guard = guard_for(dir.path());
        let search = SearchFilesTool { guard };
        let r = search
            .execute(json!({"directory": dir.path().to_string_lossy(), "pattern": "**/*.py"}))
            .await
            .unwrap();
        match r.output {
            Outcome::Search { matches, truncated } => {
                assert!(!truncated);
                assert_eq!(matches.len(), 2);
                assert!(matches.iter().all(|m| m.name.ends_with(".py")));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn search_respects_max_results() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..5 {
            tokio::fs::write(dir.path().join(format!("f{i}.log")), b"x").await.unwrap();
        }
        let guard = guard_for(dir.path());
        let search = SearchFilesTool { guard };
        let r = search
            .execute(json!({"directory": dir.path().to_string_lossy(), "pattern": "*.log", "max_results": 2}))
            .await
            .unwrap();
        match r.output {
            Outcome::Search { matches, truncated } => {
                assert_eq!(matches.len(), 2);
                assert!(truncated);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn shell_times_out() {
        let tool = RunShellCommandTool {
            default_timeout: Duration::from_millis(50),
        };
        let err = tool.execute(json!({"command": "sleep 5"})).await;
        assert!(matches!(err, Err(DomainError::Timeout(_))));
    }
}
