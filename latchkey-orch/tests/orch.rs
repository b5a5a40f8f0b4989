use latchkey_core::id::ConversationId;
use latchkey_format::CLARIFICATION_PROMPT;
use latchkey_orch::TurnOrchestrator;
use latchkey_router::{InferenceBackend, MockBackend, ModelRouter};
use latchkey_state_memory::MemoryStore;
use latchkey_tool::guard::PathGuard;
use latchkey_tool::ops::{DeleteByPatternTool, DeleteFileTool, ListDirectoryTool, MoveFileTool, ReadFileTool, WriteFileTool};
use latchkey_tool::ToolRegistry;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::tempdir;

fn orchestrator(root: PathBuf, default_reply: &str) -> TurnOrchestrator {
    let guard = Arc::new(PathGuard::new(vec![root]));
    let mut tools = ToolRegistry::new();
    tools.register(Arc::new(WriteFileTool { guard: Arc::clone(&guard) }));
    tools.register(Arc::new(ReadFileTool { guard: Arc::clone(&guard) }));
    tools.register(Arc::new(ListDirectoryTool { guard: Arc::clone(&guard) }));
    tools.register(Arc::new(MoveFileTool { guard: Arc::clone(&guard) }));
    tools.register(Arc::new(DeleteFileTool { guard: Arc::clone(&guard) }));
    tools.register(Arc::new(DeleteByPatternTool { guard }));

    let backend = Arc::new(MockBackend::with_default(default_reply));
    let router = ModelRouter::new(Arc::clone(&backend) as Arc<dyn InferenceBackend>, vec![]);
    TurnOrchestrator::new(Arc::new(MemoryStore::new()), tools, backend, router, "/home/leo")
}

#[tokio::test]
async fn write_reply_names_the_file() {
    let dir = tempdir().unwrap();
    let orch = orchestrator(dir.path().to_path_buf(), "");
    let conv = ConversationId::new("s1");

    let reply = orch.handle_turn(&conv, "create a new file called foo.txt with content 'hello'").await;
    assert!(reply.contains("Wrote 'foo.txt'"), "unexpected: {reply}");
}

#[tokio::test]
async fn rename_with_explicit_paths_applies_without_confirmation() {
    let dir = tempdir().unwrap();
    let orch = orchestrator(dir.path().to_path_buf(), "");
    let conv = ConversationId::new("s2");

    let foo = dir.path().join("foo.txt");
    std::fs::write(&foo, b"hi").unwrap();
    let bar = dir.path().join("bar.txt");

    let reply = orch.handle_turn(&conv, &format!("rename {} to {}", foo.display(), bar.display())).await;
    assert_eq!(reply, format!("Renamed 'foo.txt' \u{2192} 'bar.txt' in {}.", dir.path().display()));
    assert!(bar.exists());
    assert!(!foo.exists());
}

#[tokio::test]
async fn delete_with_explicit_path_applies_without_confirmation() {
    let dir = tempdir().unwrap();
    let orch = orchestrator(dir.path().to_path_buf(), "");
    let conv = ConversationId::new("s3");

    let bar = dir.path().join("bar.txt");
    std::fs::write(&bar, b"hi").unwrap();

    let reply = orch.handle_turn(&conv, &format!("delete {}", bar.display())).await;
    assert_eq!(reply, "Deleted 'bar.txt'.");
    assert!(!bar.exists());
}

#[tokio::test]
async fn delete_by_pattern_always_asks_for_confirmation_first() {
    let dir = tempdir().unwrap();
    let orch = orchestrator(dir.path().to_path_buf(), "");
    let conv = ConversationId::new("s3b");

    let reply = orch.handle_turn(&conv, "delete all screenshots").await;
    assert!(reply.starts_with("Delete"), "unexpected: {reply}");
    assert!(reply.ends_with("(yes/no)"), "pattern deletes must always confirm first: {reply}");
}

#[tokio::test]
async fn model_cannot_claim_an_action_it_never_ran() {
    let dir = tempdir().unwrap();
    let orch = orchestrator(dir.path().to_path_buf(), "I've deleted old_file.txt.");
    let conv = ConversationId::new("s4");

    let reply = orch.handle_turn(&conv, "can you tidy up my downloads folder for me?").await;
    assert_eq!(reply, CLARIFICATION_PROMPT);
    assert!(!reply.to_lowercase().contains("deleted"));
}

#[tokio::test]
async fn path_guard_blocks_paths_outside_the_allow_list() {
    let dir = tempdir().unwrap();
    let orch = orchestrator(dir.path().to_path_buf(), "");
    let conv = ConversationId::new("s5");

    let reply = orch.handle_turn(&conv, "delete /etc/shadow.bak").await;
    assert!(reply.contains("couldn't complete"), "unexpected: {reply}");
    assert!(!std::path::Path::new("/etc/shadow.bak").exists(), "must not actually create or touch real system files");
}

#[tokio::test]
async fn pronoun_rename_then_delete_chain_confirms_each_step() {
    let dir = tempdir().unwrap();
    let orch = orchestrator(dir.path().to_path_buf(), "");
    let conv = ConversationId::new("s6");

    let write_reply = orch
        .handle_turn(&conv, &format!("create a new file called foo.txt in {} with content 'hi'", dir.path().display()))
        .await;
    assert!(write_reply.contains("Wrote 'foo.txt'"), "unexpected: {write_reply}");

    let bar = dir.path().join("bar.txt");
    let confirm1 = orch.handle_turn(&conv, &format!("rename it to {}", bar.display())).await;
    assert!(confirm1.ends_with("(yes/no)"), "rename by pronoun must confirm first: {confirm1}");
    assert!(confirm1.contains("foo.txt") && confirm1.contains("bar.txt"), "unexpected: {confirm1}");

    let foo = dir.path().join("foo.txt");
    assert!(foo.exists(), "rename must not apply before confirmation");

    let rename_reply = orch.handle_turn(&conv, "yes").await;
    assert_eq!(rename_reply, format!("Renamed 'foo.txt' \u{2192} 'bar.txt' in {}.", dir.path().display()));
    assert!(bar.exists() && !foo.exists());

    let confirm2 = orch.handle_turn(&conv, "delete it").await;
    assert!(confirm2.ends_with("(yes/no)"), "delete by pronoun must confirm first: {confirm2}");
    assert!(confirm2.contains("bar.txt"), "pronoun must still resolve to the renamed file: {confirm2}");

    let delete_reply = orch.handle_turn(&conv, "yes").await;
    assert_eq!(delete_reply, "Deleted 'bar.txt'.");
    assert!(!bar.exists());
}

#[tokio::test]
async fn list_then_ordinal_delete_confirms_the_picked_item() {
    let dir = tempdir().unwrap();
    let orch = orchestrator(dir.path().to_path_buf(), "");
    let conv = ConversationId::new("s7");

    for name in ["alpha.txt", "beta.txt", "gamma.txt"] {
        std::fs::write(dir.path().join(name), b"x").unwrap();
    }

    let names = ["alpha.txt", "beta.txt", "gamma.txt"];
    let listing = orch.handle_turn(&conv, &format!("list the files in {}", dir.path().display())).await;
    assert!(names.iter().all(|n| listing.contains(n)), "unexpected: {listing}");

    let confirm = orch.handle_turn(&conv, "delete the second one").await;
    assert!(confirm.ends_with("(yes/no)"), "unexpected: {confirm}");
    let named: Vec<&str> = names.iter().copied().filter(|n| confirm.contains(n)).collect();
    assert_eq!(named.len(), 1, "the ordinal must name exactly one of the three files: {confirm}");
    let picked = named[0];

    let reply = orch.handle_turn(&conv, "yes").await;
    assert_eq!(reply, format!("Deleted '{picked}'."));
    for name in names {
        assert_eq!(!dir.path().join(name).exists(), name == picked);
    }
}

#[tokio::test]
async fn ambiguous_name_disambiguates_then_ordinal_reply_picks_one() {
    let dir = tempdir().unwrap();
    let orch = orchestrator(dir.path().to_path_buf(), "");
    let conv = ConversationId::new("s8");

    let names = ["report_q1.pdf", "report_q2.pdf", "report_q3.pdf"];
    for name in names {
        std::fs::write(dir.path().join(name), b"x").unwrap();
    }
    orch.handle_turn(&conv, &format!("list the files in {}", dir.path().display())).await;

    let disambiguation = orch.handle_turn(&conv, "delete 'report'").await;
    assert!(names.iter().all(|n| disambiguation.contains(n)), "unexpected: {disambiguation}");
    assert!(disambiguation.contains("Reply with the number"), "unexpected: {disambiguation}");

    let pick = orch.handle_turn(&conv, "2").await;
    assert!(pick.ends_with("(yes/no)"), "unexpected: {pick}");
    let named: Vec<&str> = names.iter().copied().filter(|n| pick.contains(n)).collect();
    assert_eq!(named.len(), 1, "the ordinal reply must resolve to exactly one of the three reports: {pick}");
    let picked = named[0];

    let reply = orch.handle_turn(&conv, "yes").await;
    assert_eq!(reply, format!("Deleted '{picked}'."));
    for name in names {
        assert_eq!(!dir.path().join(name).exists(), name == picked);
    }
}

#[tokio::test]
async fn entity_tracking_is_isolated_per_conversation() {
    let dir = tempdir().unwrap();
    let orch = orchestrator(dir.path().to_path_buf(), "");

    let c1_file = dir.path().join("c1.txt");
    let c2_file = dir.path().join("c2.txt");
    std::fs::write(&c1_file, b"a").unwrap();
    std::fs::write(&c2_file, b"b").unwrap();

    let c1 = ConversationId::new("conv-1");
    let c2 = ConversationId::new("conv-2");

    orch.handle_turn(&c1, &format!("read {}", c1_file.display())).await;
    orch.handle_turn(&c2, &format!("read {}", c2_file.display())).await;

    let prompt1 = orch.handle_turn(&c1, "delete it").await;
    assert!(prompt1.contains("c1.txt"), "conversation 1 should resolve 'it' to its own file: {prompt1}");

    let prompt2 = orch.handle_turn(&c2, "delete it").await;
    assert!(prompt2.contains("c2.txt"), "conversation 2 should resolve 'it' to its own file: {prompt2}");

    let reply1 = orch.handle_turn(&c1, "yes").await;
    assert_eq!(reply1, "Deleted 'c1.txt'.");
    assert!(c2_file.exists(), "deleting in conversation 1 must not touch conversation 2's file");
}
