//! Pattern-based intent detection.
//!
//! The orchestrator is the only place tool decisions get made — the
//! worker model never sees tool syntax and is never asked to decide
//! whether to call one. [`detect_tool_action`] runs an ordered cascade
//! of regexes over the user's message and returns, at most, one
//! [`PlannedAction`].

use latchkey_core::entity::EntityKind;
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

/// Known folder-name aliases (English + Italian) to their real name
/// under the user's home directory. An empty string means "home itself".
pub const FOLDER_MAP: &[(&str, &str)] = &[
    ("downloads", "Downloads"),
    ("download", "Downloads"),
    ("scaricati", "Downloads"),
    ("documents", "Documents"),
    ("docs", "Documents"),
    ("documenti", "Documents"),
    ("desktop", "Desktop"),
    ("scrivania", "Desktop"),
    ("images", "Images"),
    ("immagini", "Images"),
    ("home", ""),
];

/// The last directory a `list_directory` call reported, kept so a
/// bare filename in a follow-up message can be resolved against it.
#[derive(Debug, Clone, Default)]
pub struct DirectoryContext {
    /// Absolute path of the directory.
    pub path: String,
    /// Entry names last seen in it.
    pub items: Vec<String>,
}

impl DirectoryContext {
    fn resolve_subpath(&self, name: &str) -> Option<String> {
        self.items
            .iter()
            .find(|item| item.eq_ignore_ascii_case(name))
            .map(|item| format!("{}/{}", self.path.trim_end_matches('/'), item))
    }

    fn resolve_filename(&self, name: &str) -> Option<String> {
        let lowered = name.to_lowercase();
        if let Some(exact) = self.items.iter().find(|i| i.to_lowercase() == lowered) {
            return Some(exact.clone());
        }
        let stem_matches: Vec<&String> = self
            .items
            .iter()
            .filter(|i| stem_of(i).to_lowercase() == lowered)
            .collect();
        if stem_matches.len() == 1 {
            return Some(stem_matches[0].clone());
        }
        None
    }
}

fn stem_of(name: &str) -> &str {
    name.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(name)
}

/// A tool call the orchestrator decided to make, plus the context needed
/// to judge whether it requires confirmation.
#[derive(Debug, Clone)]
pub struct PlannedAction {
    /// Tool registry name, e.g. `"delete_file"`.
    pub tool_name: String,
    /// Parameters to pass to the tool.
    pub params: Map<String, Value>,
    /// True when the message itself named an absolute/home-relative path.
    pub explicit_path: bool,
    /// True when the target came from resolving a prior selection
    /// (ordinal reply, pronoun, recency) rather than being typed fresh.
    pub selection_resolved: bool,
    /// Destination path, for move/rename actions.
    pub destination_path: Option<String>,
}

impl PlannedAction {
    fn new(tool_name: &str, params: Map<String, Value>, explicit_path: bool) -> Self {
        Self { tool_name: tool_name.to_string(), params, explicit_path, selection_resolved: false, destination_path: None }
    }
}

static RE_ABS_PATH_WITH_EXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"["']?(/[^\s"']+\.[a-zA-Z0-9]+)["']?"#).unwrap());
static RE_ABS_PATH: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"["']?(/[^\s"']+)["']?"#).unwrap());
static RE_HOME_PATH: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"["']?(~/[^\s"']+)["']?"#).unwrap());

static RE_DELETE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(delete|elimina|rimuovi|remove|cancella)\b").unwrap());
static RE_LIST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(list|show|elenc|mostra|dimmi)\b.{0,20}\b(file|folder|cartell|content)|\b(what|which|quali|che)\b.{0,20}\b(file|folder|cartell)").unwrap()
});
static RE_ORGANIZE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(organiz|organizza|riorganizza|reorganiz|ordina|riordina|tidy|sort)\b").unwrap());
static RE_MOVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(move|sposta|rename|rinomina|spostare)\b").unwrap());
static RE_CREATE_FILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(create|crea|nuovo|new|scrivi|write)\b.{0,20}\bfile\b").unwrap());
static RE_CREATE_FOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(create|crea|nuovo|new)\b.{0,20}\b(folder|cartella|directory)\b").unwrap());
static RE_READ: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(read|leggi|open|apri|show|mostra)\b.{0,20}\bfile\b").unwrap());
static RE_SYSTEM_INFO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(system|sistema)\s+(info|informazion)|\b(how much|quanta)\s+(memory|ram|memoria)\b|\b(cpu|processor|disk)\s+(info|usage|space)\b").unwrap()
});
static RE_SEARCH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(find|search|cerca|trova)\b").unwrap());
static RE_SEARCH_GLOB: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"["']?([\w*?\[\]{}!,.-]*\.[\w*]+)["']?"#).unwrap());
static RE_DELETE_FOLDER_BARE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bdelete (the )?folder\b").unwrap());
static RE_MOVE_DIRECT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\b(?:move|rename|sposta|rinomina)\s+["']?(/[^"\s]+)["']?\s+(?:to|into|in)\s+["']?(/[^"\s]+)["']?"#).unwrap()
});
static RE_RENAME_NAMES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\b(?:rename|rinomina|move|sposta)\s+(?:the\s+)?(?:file\s+)?["']?([\w.-]+\.[\w]+)["']?\s+(?:to|as|into|in)\s+(?:just\s+)?["']?([\w.-]+\.[\w]+)["']?"#).unwrap()
});

fn matches_delete(msg: &str) -> bool {
    RE_DELETE.is_match(msg)
}
fn matches_list(msg: &str) -> bool {
    RE_LIST.is_match(msg)
}
fn matches_organize(msg: &str) -> bool {
    RE_ORGANIZE.is_match(msg)
}
fn matches_move(msg: &str) -> bool {
    RE_MOVE.is_match(msg)
}
fn matches_create_file(msg: &str) -> bool {
    RE_CREATE_FILE.is_match(msg)
}
fn matches_create_folder(msg: &str) -> bool {
    RE_CREATE_FOLDER.is_match(msg)
}
fn matches_read(msg: &str) -> bool {
    RE_READ.is_match(msg)
}
fn matches_system_info(msg: &str) -> bool {
    RE_SYSTEM_INFO.is_match(msg)
}
fn matches_search(msg: &str) -> bool {
    RE_SEARCH.is_match(msg)
}

const EXTENSION_KEYWORDS: &[(&str, &str)] = &[
    ("python", "*.py"),
    ("pdf", "*.pdf"),
    ("text", "*.txt"),
    ("image", "*.png"),
    ("immagin", "*.png"),
    ("photo", "*.jpg"),
    ("foto", "*.jpg"),
    ("video", "*.mp4"),
    ("word", "*.docx"),
    ("spreadsheet", "*.xlsx"),
];

/// Extract the glob pattern a search request names: a literal token with
/// an extension (`"*.py"`, `report.pdf`), otherwise a recognized file-kind
/// keyword (`"python files"` → `*.py`), otherwise the catch-all `*`.
fn extract_search_pattern(message: &str) -> String {
    if let Some(c) = RE_SEARCH_GLOB.captures(message) {
        return c[1].to_string();
    }
    let msg = message.to_lowercase();
    for (keyword, pattern) in EXTENSION_KEYWORDS {
        if msg.contains(keyword) {
            return pattern.to_string();
        }
    }
    "*".to_string()
}

/// Does the message itself name an absolute or home-relative path?
pub fn message_has_explicit_path(message: &str) -> bool {
    RE_ABS_PATH.is_match(message) || RE_HOME_PATH.is_match(message)
}

fn extract_path(message: &str) -> Option<String> {
    if let Some(c) = RE_ABS_PATH_WITH_EXT.captures(message) {
        return Some(c[1].to_string());
    }
    if let Some(c) = RE_HOME_PATH.captures(message) {
        return Some(expand_home(&c[1]));
    }
    None
}

fn expand_home(path: &str) -> String {
    path.to_string()
}

fn extract_folder(message: &str, home: &str, context: Option<&DirectoryContext>) -> Option<String> {
    let msg = message.to_lowercase();

    if let Some(ctx) = context {
        for (keyword, _) in FOLDER_MAP {
            if msg.contains(keyword) {
                if let Some(resolved) = ctx.resolve_subpath(keyword) {
                    return Some(resolved);
                }
            }
        }
    }

    if let Some(c) = RE_ABS_PATH.captures(message) {
        return Some(c[1].to_string());
    }
    if let Some(c) = RE_HOME_PATH.captures(message) {
        return Some(expand_home(&c[1]));
    }

    for (keyword, folder) in FOLDER_MAP {
        if msg.contains(keyword) {
            if let Some(ctx) = context {
                if let Some(resolved) = ctx.resolve_subpath(if folder.is_empty() { keyword } else { folder }) {
                    return Some(resolved);
                }
            }
            return Some(if folder.is_empty() { home.to_string() } else { format!("{home}/{folder}") });
        }
    }
    None
}

fn extract_folder_to_delete(message: &str, home: &str, context: Option<&DirectoryContext>) -> Option<String> {
    let msg = message.to_lowercase();
    let re = Regex::new(r"(?i)\b(?:delete|elimina|rimuovi)\s+(?:the\s+)?(?:folder|cartella)\s+['\x22]?(\w+)['\x22]?").unwrap();
    let re_suffix = Regex::new(r"(?i)\b(?:delete|elimina|rimuovi)\s+(?:the\s+)?['\x22]?(\w+)['\x22]?\s+(?:folder|cartella)").unwrap();

    for re in [&re, &re_suffix] {
        if let Some(c) = re.captures(&msg) {
            let folder_name = &c[1];
            if let Some(ctx) = context {
                let base = ctx.path.rsplit('/').next().unwrap_or("");
                if base.eq_ignore_ascii_case(folder_name) {
                    return Some(ctx.path.clone());
                }
                if let Some(resolved) = ctx.resolve_subpath(folder_name) {
                    return Some(resolved);
                }
            }
            if let Some((_, canonical)) = FOLDER_MAP.iter().find(|(k, _)| *k == folder_name) {
                return Some(format!("{home}/{canonical}"));
            }
        }
    }

    if let Some(ctx) = context {
        if RE_DELETE_FOLDER_BARE.is_match(&msg) {
            return Some(ctx.path.clone());
        }
    }
    None
}

/// Extracts (source, destination, source_named_in_message). The third
/// field is true only when the source path was literally written out in
/// the message (two absolute paths) — not when it was synthesized by
/// resolving a bare filename against the last directory context, which
/// still needs confirmation even though the resulting path looks absolute.
fn extract_move_paths(message: &str, context: Option<&DirectoryContext>) -> Option<(String, String, bool)> {
    if let Some(c) = RE_MOVE_DIRECT.captures(message) {
        return Some((c[1].to_string(), c[2].to_string(), true));
    }

    let base = context.map(|c| c.path.as_str());

    if let Some(c) = RE_RENAME_NAMES.captures(message) {
        let (src_name, dst_name) = (&c[1], &c[2]);
        if let Some(base) = base {
            return Some((format!("{base}/{src_name}"), format!("{base}/{dst_name}"), false));
        }
    }

    let re_no_ext = Regex::new(
        r#"(?i)\b(?:rename|rinomina|move|sposta)\s+(?:the\s+)?(?:file\s+)?["']?([\w.-]+)["']?\s+(?:to|as|into|in)\s+(?:just\s+)?["']?([\w.-]+)["']?"#,
    )
    .unwrap();
    if let (Some(c), Some(ctx)) = (re_no_ext.captures(message), context) {
        let (src_token, dst_token) = (&c[1], &c[2]);
        if let Some(src_name) = ctx.resolve_filename(src_token) {
            let mut dst_name = dst_token.to_string();
            if !dst_name.contains('.') && src_name.contains('.') {
                if let Some((_, ext)) = src_name.rsplit_once('.') {
                    dst_name.push('.');
                    dst_name.push_str(ext);
                }
            }
            return Some((format!("{}/{src_name}", ctx.path), format!("{}/{dst_name}", ctx.path), false));
        }
    }

    None
}

fn extract_filename(message: &str) -> Option<String> {
    let re = Regex::new(r"\b([\w.-]+\.[a-zA-Z0-9]{1,8})\b").unwrap();
    re.captures(message).map(|c| c[1].to_string())
}

fn extract_foldername(message: &str) -> Option<String> {
    let re = Regex::new(r"(?i)\b(?:folder|cartella|directory)\s+(?:called|named|chiamata)?\s*['\x22]?([\w.-]+)['\x22]?").unwrap();
    re.captures(message).map(|c| c[1].to_string())
}

fn extract_content(message: &str) -> String {
    let re = Regex::new(r#"(?i)(?:with|containing|content|contenuto)\s*[:=]?\s*["'](.+)["']"#).unwrap();
    re.captures(message).map(|c| c[1].to_string()).unwrap_or_default()
}

/// Detect what tool call, if any, a user message asks for. Returns
/// `None` when the message doesn't look like a filesystem request at
/// all — the orchestrator then routes it straight to the worker model.
pub fn detect_tool_action(message: &str, home: &str, context: Option<&DirectoryContext>) -> Option<PlannedAction> {
    let planned = detect_tool_action_inner(message, home, context);
    match &planned {
        Some(p) => tracing::debug!(tool = %p.tool_name, explicit_path = p.explicit_path, "detected tool action"),
        None => tracing::debug!("no tool action detected for message"),
    }
    planned
}

fn detect_tool_action_inner(message: &str, home: &str, context: Option<&DirectoryContext>) -> Option<PlannedAction> {
    let msg = message.to_lowercase();
    let explicit_path = message_has_explicit_path(message);
    let folder_path = extract_folder(message, home, context);

    if matches_delete(&msg) {
        if let Some(ctx) = context {
            if RE_DELETE_FOLDER_BARE.is_match(&msg) {
                let mut p = Map::new();
                p.insert("path".into(), Value::String(ctx.path.clone()));
                return Some(PlannedAction::new("delete_file", p, explicit_path));
            }
        }
        if let Some(path) = extract_path(message) {
            let mut p = Map::new();
            p.insert("path".into(), Value::String(path));
            return Some(PlannedAction::new("delete_file", p, true));
        }
        if let Some(folder) = extract_folder_to_delete(message, home, context) {
            let mut p = Map::new();
            p.insert("path".into(), Value::String(folder));
            return Some(PlannedAction::new("delete_file", p, explicit_path));
        }
        if msg.contains("screenshot") {
            let target = folder_path.clone().unwrap_or_else(|| format!("{home}/Desktop"));
            let mut p = Map::new();
            p.insert("directory".into(), Value::String(target));
            p.insert("pattern".into(), Value::String("Screenshot*.png".into()));
            return Some(PlannedAction::new("delete_by_pattern", p, explicit_path));
        }
        if ["image", "immagin", "photo", "foto", "picture"].iter().any(|w| msg.contains(w)) {
            let target = folder_path.clone().unwrap_or_else(|| format!("{home}/Desktop"));
            let mut p = Map::new();
            p.insert("directory".into(), Value::String(target));
            p.insert("pattern".into(), Value::String("*.png".into()));
            return Some(PlannedAction::new("delete_by_pattern", p, explicit_path));
        }
        if let Some(folder) = folder_path.clone() {
            let mut p = Map::new();
            p.insert("path".into(), Value::String(folder));
            return Some(PlannedAction::new("list_directory", p, explicit_path));
        }
    }

    if matches_list(&msg) {
        let target = folder_path
            .clone()
            .or_else(|| context.map(|c| c.path.clone()))
            .unwrap_or_else(|| format!("{home}/Desktop"));
        let mut p = Map::new();
        p.insert("path".into(), Value::String(target));
        return Some(PlannedAction::new("list_directory", p, explicit_path));
    }

    if matches_organize(&msg) {
        let target = folder_path.clone().unwrap_or_else(|| format!("{home}/Desktop"));
        let mut p = Map::new();
        p.insert("directory".into(), Value::String(target));
        return Some(PlannedAction::new("organize_files", p, explicit_path));
    }

    if matches_create_file(&msg) {
        if let Some(filename) = extract_filename(message) {
            let target = folder_path.clone().unwrap_or_else(|| format!("{home}/Desktop"));
            let mut p = Map::new();
            p.insert("path".into(), Value::String(format!("{target}/{filename}")));
            p.insert("content".into(), Value::String(extract_content(message)));
            return Some(PlannedAction::new("write_file", p, explicit_path));
        }
    }

    if matches_move(&msg) {
        if let Some((source, destination, source_named_in_message)) = extract_move_paths(message, context) {
            let path_explicit = explicit_path || source_named_in_message;
            let mut p = Map::new();
            p.insert("source".into(), Value::String(source));
            p.insert("destination".into(), Value::String(destination.clone()));
            let mut planned = PlannedAction::new("move_file", p, path_explicit);
            planned.destination_path = Some(destination);
            return Some(planned);
        }
    }

    if matches_create_folder(&msg) {
        if let Some(foldername) = extract_foldername(message) {
            let target = folder_path.clone().unwrap_or_else(|| format!("{home}/Desktop"));
            let mut p = Map::new();
            p.insert("path".into(), Value::String(format!("{target}/{foldername}")));
            return Some(PlannedAction::new("create_directory", p, explicit_path));
        }
    }

    if matches_read(&msg) {
        if let Some(path) = extract_path(message) {
            let mut p = Map::new();
            p.insert("path".into(), Value::String(path));
            return Some(PlannedAction::new("read_file", p, true));
        }
    }

    if matches_search(&msg) {
        let target = folder_path
            .clone()
            .or_else(|| context.map(|c| c.path.clone()))
            .unwrap_or_else(|| home.to_string());
        let mut p = Map::new();
        p.insert("directory".into(), Value::String(target));
        p.insert("pattern".into(), Value::String(extract_search_pattern(message)));
        return Some(PlannedAction::new("search_files", p, explicit_path));
    }

    if matches_system_info(&msg) {
        return Some(PlannedAction::new("get_system_info", Map::new(), false));
    }

    None
}

/// Parse an ordinal selection reply ("2", "the second one", "ultimo")
/// into a zero-based index, `-1` meaning "last".
pub fn parse_ordinal_selection(message: &str) -> Option<i64> {
    let msg = message.trim().to_lowercase();

    if let Ok(n) = msg.parse::<i64>() {
        return Some(n - 1);
    }

    const ORDINALS: &[(&str, i64)] = &[
        ("first", 0), ("1st", 0), ("primo", 0),
        ("second", 1), ("2nd", 1), ("secondo", 1),
        ("third", 2), ("3rd", 2), ("terzo", 2),
        ("fourth", 3), ("4th", 3), ("quarto", 3),
        ("fifth", 4), ("5th", 4), ("quinto", 4),
        ("last", -1), ("ultimo", -1),
    ];
    ORDINALS.iter().find(|(w, _)| msg.contains(w)).map(|(_, i)| *i)
}

/// Does a planned action require explicit user confirmation before it
/// runs? Destructive tools need it unless the target came from an
/// explicit path or a selection resolved this same turn;
/// `delete_by_pattern` always needs it since it can touch many files.
pub fn needs_confirmation(planned: &PlannedAction) -> bool {
    const DESTRUCTIVE: &[&str] = &["delete_file", "delete_by_pattern", "move_file"];
    if !DESTRUCTIVE.contains(&planned.tool_name.as_str()) {
        return false;
    }
    if planned.tool_name == "delete_by_pattern" {
        return true;
    }
    if planned.explicit_path || planned.selection_resolved {
        return false;
    }
    true
}

/// Extract an action verb from a message, for disambiguation prompts.
pub fn extract_action_verb(message: &str) -> &'static str {
    let msg = message.to_lowercase();
    if msg.contains("delete") || msg.contains("elimina") || msg.contains("rimuovi") {
        "delete"
    } else if msg.contains("rename") || msg.contains("rinomina") {
        "rename"
    } else if msg.contains("move") || msg.contains("sposta") {
        "move"
    } else if msg.contains("read") || msg.contains("leggi") || msg.contains("open") || msg.contains("apri") {
        "read"
    } else {
        "operate on"
    }
}

/// Map a user-facing action verb to a tool registry name.
pub fn map_action_to_tool(action: &str) -> &'static str {
    match action {
        "delete" => "delete_file",
        "rename" | "move" => "move_file",
        "read" => "read_file",
        _ => "list_directory",
    }
}

const FILE_KIND_WORDS: &[&str] = &["file", "document", "documento"];
const FOLDER_KIND_WORDS: &[&str] = &["folder", "directory", "cartella", "dir"];

/// Whether a message names a file or folder kind explicitly, so a
/// follow-on pronoun ("it") can be resolved against the right kind of
/// last-active entity instead of just the most recent one of either.
/// Folder wins ties, since "the folder file.txt is in" still mentions
/// "file" but is asking about the folder.
pub fn infer_entity_kind_hint(message: &str) -> Option<EntityKind> {
    let msg = message.to_lowercase();
    let mentions_folder = FOLDER_KIND_WORDS.iter().any(|w| msg.contains(w));
    let mentions_file = FILE_KIND_WORDS.iter().any(|w| msg.contains(w));
    if mentions_folder {
        Some(EntityKind::Folder)
    } else if mentions_file {
        Some(EntityKind::File)
    } else {
        None
    }
}

/// Does the message look like a filesystem request at all, even if
/// parameter extraction later fails? Used to decide whether a failed
/// parse should prompt for detail instead of falling through to chat.
pub fn looks_like_filesystem_intent(message: &str) -> bool {
    let msg = message.to_lowercase();
    matches_delete(&msg)
        || matches_list(&msg)
        || matches_organize(&msg)
        || matches_create_file(&msg)
        || matches_create_folder(&msg)
        || matches_read(&msg)
        || matches_move(&msg)
        || matches_search(&msg)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOME: &str = "/home/leo";

    #[test]
    fn detects_list_desktop() {
        let planned = detect_tool_action("show me what's on the desktop", HOME, None).unwrap();
        assert_eq!(planned.tool_name, "list_directory");
        assert_eq!(planned.params["path"], format!("{HOME}/Desktop"));
    }

    #[test]
    fn detects_delete_with_explicit_path_skips_confirmation() {
        let planned = detect_tool_action("delete /home/leo/Desktop/foo.txt", HOME, None).unwrap();
        assert_eq!(planned.tool_name, "delete_file");
        assert!(!needs_confirmation(&planned));
    }

    #[test]
    fn delete_by_pattern_always_needs_confirmation() {
        let planned = detect_tool_action("delete all screenshots", HOME, None).unwrap();
        assert_eq!(planned.tool_name, "delete_by_pattern");
        assert!(needs_confirmation(&planned));
    }

    #[test]
    fn bare_rename_needs_context_and_confirmation() {
        let ctx = DirectoryContext { path: "/home/leo/Desktop".into(), items: vec!["foo.txt".into()] };
        let planned = detect_tool_action("rename foo.txt to bar.txt", HOME, Some(&ctx)).unwrap();
        assert_eq!(planned.tool_name, "move_file");
        assert!(needs_confirmation(&planned));
    }

    #[test]
    fn rename_with_two_explicit_paths_skips_confirmation() {
        let planned =
            detect_tool_action("rename /home/leo/Desktop/foo.txt to /home/leo/Desktop/bar.txt", HOME, None).unwrap();
        assert_eq!(planned.tool_name, "move_file");
        assert!(!needs_confirmation(&planned));
    }

    #[test]
    fn detects_search_with_glob_pattern() {
        let planned = detect_tool_action("find *.py files in /home/leo/projects", HOME, None).unwrap();
        assert_eq!(planned.tool_name, "search_files");
        assert_eq!(planned.params["pattern"], "*.py");
        assert_eq!(planned.params["directory"], "/home/leo/projects");
    }

    #[test]
    fn detects_search_from_file_kind_keyword() {
        let planned = detect_tool_action("search for python files on the desktop", HOME, None).unwrap();
        assert_eq!(planned.tool_name, "search_files");
        assert_eq!(planned.params["pattern"], "*.py");
        assert_eq!(planned.params["directory"], format!("{HOME}/Desktop"));
    }

    #[test]
    fn ordinal_selection_parses_words_and_digits() {
        assert_eq!(parse_ordinal_selection("2"), Some(1));
        assert_eq!(parse_ordinal_selection("the second one"), Some(1));
        assert_eq!(parse_ordinal_selection("ultimo"), Some(-1));
        assert_eq!(parse_ordinal_selection("banana"), None);
    }

    #[test]
    fn unrelated_chat_message_detects_nothing() {
        assert!(detect_tool_action("how's the weather today", HOME, None).is_none());
    }
}
