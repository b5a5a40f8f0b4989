#![deny(missing_docs)]
//! Filesystem-backed implementation of `latchkey_core`'s `StateStore` trait.
//!
//! Each scope maps to a readable subdirectory under the root rather than
//! an opaque hash, so a user can find a conversation's state on disk
//! just by its id. Keys are percent-encoded and stored as `.json` files
//! within that directory. This is the entity database and pending-action
//! backing store for the daemon's persisted state — it survives process
//! restarts.

use async_trait::async_trait;
use latchkey_core::error::StateError;
use latchkey_core::state::{Scope, StateStore};
use std::path::{Path, PathBuf};

/// Filesystem-backed state store.
///
/// Directory layout:
/// ```text
/// root/
///   global/
///     <percent-encoded-key>.json
///   conversation/
///     <percent-encoded-conversation-id>/
///       <percent-encoded-key>.json
/// ```
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    /// Create a new filesystem store rooted at the given directory.
    ///
    /// The directory is created lazily on first write.
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }
}

/// Percent-encode arbitrary text for use as a path segment.
fn encode_segment(text: &str) -> String {
    let mut encoded = String::new();
    for ch in text.chars() {
        match ch {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' | '.' => encoded.push(ch),
            _ => {
                for byte in ch.to_string().as_bytes() {
                    encoded.push_str(&format!("%{byte:02X}"));
                }
            }
        }
    }
    encoded
}

/// Decode a path segment produced by [`encode_segment`].
fn decode_segment(segment: &str) -> Option<String> {
    let mut result = Vec::new();
    let bytes = segment.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).ok()?;
            let byte = u8::from_str_radix(hex, 16).ok()?;
            result.push(byte);
            i += 3;
        } else {
            result.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(result).ok()
}

/// Directory holding a scope's keys, relative to the store root.
fn scope_dir(scope: &Scope) -> PathBuf {
    match scope {
        Scope::Global => PathBuf::from("global"),
        Scope::Conversation(id) => PathBuf::from("conversation").join(encode_segment(id.as_str())),
    }
}

fn key_to_filename(key: &str) -> String {
    format!("{}.json", encode_segment(key))
}

fn filename_to_key(filename: &str) -> Option<String> {
    decode_segment(filename.strip_suffix(".json")?)
}

#[async_trait]
impl StateStore for FsStore {
    async fn read(
        &self,
        scope: &Scope,
        key: &str,
    ) -> Result<Option<serde_json::Value>, StateError> {
        let path = self.root.join(scope_dir(scope)).join(key_to_filename(key));
        match tokio::fs::read_to_string(&path).await {
            Ok(contents) => {
                let value: serde_json::Value = serde_json::from_str(&contents)
                    .map_err(|e| StateError::Serialization(e.to_string()))?;
                Ok(Some(value))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StateError::WriteFailed(e.to_string())),
        }
    }

    async fn write(
        &self,
        scope: &Scope,
        key: &str,
        value: serde_json::Value,
    ) -> Result<(), StateError> {
        let dir = self.root.join(scope_dir(scope));
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| StateError::WriteFailed(e.to_string()))?;

        let path = dir.join(key_to_filename(key));
        let contents = serde_json::to_string_pretty(&value)
            .map_err(|e| StateError::Serialization(e.to_string()))?;
        tokio::fs::write(&path, contents)
            .await
            .map_err(|e| StateError::WriteFailed(e.to_string()))?;
        Ok(())
    }

    async fn delete(&self, scope: &Scope, key: &str) -> Result<(), StateError> {
        let path = self.root.join(scope_dir(scope)).join(key_to_filename(key));
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StateError::WriteFailed(e.to_string())),
        }
    }

    async fn list(&self, scope: &Scope, prefix: &str) -> Result<Vec<String>, StateError> {
        let dir = self.root.join(scope_dir(scope));
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => return Err(StateError::WriteFailed(e.to_string())),
        };

        let mut keys = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StateError::WriteFailed(e.to_string()))?
        {
            if let Some(filename) = entry.file_name().to_str() {
                if let Some(key) = filename_to_key(filename) {
                    if key.starts_with(prefix) {
                        keys.push(key);
                    }
                }
            }
        }
        Ok(keys)
    }

    async fn clear_scope(&self, scope: &Scope) -> Result<(), StateError> {
        let dir = self.root.join(scope_dir(scope));
        match tokio::fs::remove_dir_all(&dir).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StateError::WriteFailed(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use latchkey_core::id::ConversationId;
    use serde_json::json;

    fn convo(id: &str) -> Scope {
        Scope::Conversation(ConversationId::new(id))
    }

    #[test]
    fn key_encoding_roundtrip() {
        let keys = ["simple", "user:name", "path/to/key", "has spaces", "emoji🎉"];
        for key in &keys {
            let filename = key_to_filename(key);
            let decoded = filename_to_key(&filename).unwrap();
            assert_eq!(*key, decoded, "roundtrip failed for {key}");
        }
    }

    #[test]
    fn global_scope_dir_is_readable() {
        assert_eq!(scope_dir(&Scope::Global), PathBuf::from("global"));
    }

    #[test]
    fn conversation_scope_dir_contains_its_id() {
        let dir = scope_dir(&convo("c1"));
        assert_eq!(dir, PathBuf::from("conversation").join("c1"));
    }

    #[test]
    fn conversation_ids_needing_encoding_stay_within_one_segment() {
        let dir = scope_dir(&convo("weird/id with spaces"));
        assert_eq!(dir.components().count(), 2, "encoded id must not introduce extra path segments");
    }

    #[test]
    fn different_scopes_get_different_dirs() {
        let global = scope_dir(&Scope::Global);
        let conversation = scope_dir(&convo("c1"));
        assert_ne!(global, conversation);
    }

    #[test]
    fn key_to_filename_produces_json_extension() {
        assert!(key_to_filename("test").ends_with(".json"));
    }

    #[test]
    fn filename_to_key_rejects_non_json() {
        assert!(filename_to_key("test.txt").is_none());
    }

    #[tokio::test]
    async fn write_and_read_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStore::new(dir.path());
        let scope = Scope::Global;

        store.write(&scope, "key1", json!("hello")).await.unwrap();
        let val = store.read(&scope, "key1").await.unwrap();
        assert_eq!(val, Some(json!("hello")));
    }

    #[tokio::test]
    async fn read_nonexistent_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStore::new(dir.path());
        let val = store.read(&Scope::Global, "missing").await.unwrap();
        assert_eq!(val, None);
    }

    #[tokio::test]
    async fn delete_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStore::new(dir.path());
        let scope = Scope::Global;

        store.write(&scope, "key1", json!("hello")).await.unwrap();
        store.delete(&scope, "key1").await.unwrap();
        assert_eq!(store.read(&scope, "key1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn delete_nonexistent_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStore::new(dir.path());
        assert!(store.delete(&Scope::Global, "missing").await.is_ok());
    }

    #[tokio::test]
    async fn list_keys_with_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStore::new(dir.path());
        let scope = Scope::Global;

        store.write(&scope, "user:name", json!("Alice")).await.unwrap();
        store.write(&scope, "user:age", json!(30)).await.unwrap();
        store.write(&scope, "system:version", json!("1.0")).await.unwrap();

        let mut keys = store.list(&scope, "user:").await.unwrap();
        keys.sort();
        assert_eq!(keys, vec!["user:age", "user:name"]);
    }

    #[tokio::test]
    async fn list_nonexistent_dir_returns_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStore::new(dir.path());
        assert!(store.list(&Scope::Global, "").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn scopes_are_isolated() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStore::new(dir.path());
        let global = Scope::Global;
        let conversation = convo("c1");

        store.write(&global, "key", json!("global_val")).await.unwrap();
        store.write(&conversation, "key", json!("conv_val")).await.unwrap();

        assert_eq!(store.read(&global, "key").await.unwrap(), Some(json!("global_val")));
        assert_eq!(store.read(&conversation, "key").await.unwrap(), Some(json!("conv_val")));
    }

    #[tokio::test]
    async fn clear_scope_removes_only_that_scope() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStore::new(dir.path());
        let c1 = convo("c1");
        let c2 = convo("c2");

        store.write(&c1, "key", json!(1)).await.unwrap();
        store.write(&c2, "key", json!(1)).await.unwrap();

        store.clear_scope(&c1).await.unwrap();

        assert_eq!(store.read(&c1, "key").await.unwrap(), None);
        assert_eq!(store.read(&c2, "key").await.unwrap(), Some(json!(1)));
    }

    #[test]
    fn fs_store_implements_state_store() {
        fn _assert_state_store<T: StateStore>() {}
        _assert_state_store::<FsStore>();
    }
}
