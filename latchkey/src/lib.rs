#![deny(missing_docs)]
//! Configuration and wiring for the `latchkey` CLI harness: turns a
//! `DaemonConfig` into a fully assembled [`latchkey_orch::TurnOrchestrator`].

use latchkey_core::routing::Capability;
use latchkey_core::state::StateStore;
use latchkey_orch::TurnOrchestrator;
use latchkey_router::{InferenceBackend, ModelRouter, OllamaBackend, WorkerModel};
use latchkey_state_fs::FsStore;
use latchkey_state_memory::MemoryStore;
use latchkey_tool::guard::PathGuard;
use latchkey_tool::ops::{
    AppendFileTool, CopyFileTool, CreateDirectoryTool, DeleteByPatternTool, DeleteFileTool, GetSystemInfoTool,
    ListDirectoryTool, MoveFileTool, OrganizeFilesTool, ReadFileTool, RunShellCommandTool, SearchFilesTool,
    WriteFileTool,
};
use latchkey_tool::ToolRegistry;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors loading or applying a [`DaemonConfig`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// The config file couldn't be read.
    #[error("could not read config file: {0}")]
    Read(#[from] std::io::Error),
    /// The config file wasn't valid JSON, or didn't match the expected shape.
    #[error("could not parse config file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Which backend stores conversation entity state.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum StateBackendConfig {
    /// In-process, non-durable. Fine for a single CLI invocation.
    Memory,
    /// Durable, one JSON file per conversation scope, under `root`.
    Fs {
        /// Root directory for persisted conversation state.
        root: PathBuf,
    },
}

impl Default for StateBackendConfig {
    fn default() -> Self {
        StateBackendConfig::Memory
    }
}

/// One worker model the router can pick between.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkerModelConfig {
    /// Registry id passed to the inference backend, e.g. `"llama3.2:8b"`.
    pub id: String,
    /// Human-readable name shown in routing rationale.
    pub name: String,
    /// General-purpose capability score, 0.0-1.0.
    #[serde(default = "default_general_score")]
    pub general_score: f64,
}

fn default_general_score() -> f64 {
    0.7
}

/// Daemon-wide configuration, loaded from an optional JSON file with
/// field-level defaults applied to anything the file omits.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    /// Filesystem roots the tool layer is allowed to touch.
    pub allowed_roots: Vec<PathBuf>,
    /// Where and how conversation entity state is stored.
    pub state_backend: StateBackendConfig,
    /// Worker models available to the router. Empty means every message
    /// is handled by the router model itself.
    pub worker_models: Vec<WorkerModelConfig>,
    /// Base URL of the Ollama-compatible inference server.
    pub ollama_base_url: Option<String>,
    /// Default timeout, in seconds, for the shell tool.
    pub shell_timeout_secs: u64,
    /// Whether the (not yet built) document-index reference kind is enabled.
    pub rag_enabled: bool,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/root".to_string());
        Self {
            allowed_roots: vec![PathBuf::from(&home), PathBuf::from("/tmp")],
            state_backend: StateBackendConfig::default(),
            worker_models: Vec::new(),
            ollama_base_url: None,
            shell_timeout_secs: 30,
            rag_enabled: false,
        }
    }
}

impl DaemonConfig {
    /// Load configuration from a JSON file, falling back to field
    /// defaults for anything unset.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let config: DaemonConfig = serde_json::from_str(&raw)?;
        Ok(config)
    }

    fn state_store(&self) -> std::io::Result<Arc<dyn StateStore>> {
        match &self.state_backend {
            StateBackendConfig::Memory => Ok(Arc::new(MemoryStore::new())),
            StateBackendConfig::Fs { root } => {
                std::fs::create_dir_all(root)?;
                Ok(Arc::new(FsStore::new(root)))
            }
        }
    }

    fn tool_registry(&self) -> ToolRegistry {
        let guard = Arc::new(PathGuard::new(self.allowed_roots.clone()));
        let mut tools = ToolRegistry::new();
        tools.register(Arc::new(ReadFileTool { guard: Arc::clone(&guard) }));
        tools.register(Arc::new(ListDirectoryTool { guard: Arc::clone(&guard) }));
        tools.register(Arc::new(WriteFileTool { guard: Arc::clone(&guard) }));
        tools.register(Arc::new(AppendFileTool { guard: Arc::clone(&guard) }));
        tools.register(Arc::new(MoveFileTool { guard: Arc::clone(&guard) }));
        tools.register(Arc::new(CopyFileTool { guard: Arc::clone(&guard) }));
        tools.register(Arc::new(DeleteFileTool { guard: Arc::clone(&guard) }));
        tools.register(Arc::new(DeleteByPatternTool { guard: Arc::clone(&guard) }));
        tools.register(Arc::new(CreateDirectoryTool { guard: Arc::clone(&guard) }));
        tools.register(Arc::new(SearchFilesTool { guard: Arc::clone(&guard) }));
        tools.register(Arc::new(OrganizeFilesTool { guard: Arc::clone(&guard) }));
        tools.register(Arc::new(GetSystemInfoTool));
        tools.register(Arc::new(RunShellCommandTool {
            default_timeout: Duration::from_secs(self.shell_timeout_secs),
        }));
        tools
    }

    /// Assemble a fully wired orchestrator from this configuration.
    pub fn build_orchestrator(&self) -> std::io::Result<TurnOrchestrator> {
        let state = self.state_store()?;
        let tools = self.tool_registry();

        let backend: Arc<dyn InferenceBackend> = match &self.ollama_base_url {
            Some(url) => Arc::new(OllamaBackend::with_base_url(url.clone())),
            None => Arc::new(OllamaBackend::new()),
        };

        let workers: Vec<WorkerModel> = self
            .worker_models
            .iter()
            .map(|w| WorkerModel {
                id: w.id.clone(),
                name: w.name.clone(),
                capabilities: vec![(Capability::General, w.general_score)],
            })
            .collect();
        let router = ModelRouter::new(Arc::clone(&backend), workers);

        let home = std::env::var("HOME").unwrap_or_else(|_| "/root".to_string());
        Ok(TurnOrchestrator::new(state, tools, backend, router, home))
    }
}
