//! Tool registry.
//!
//! Holds every tool the daemon knows about, keyed by name, each with an
//! independent enabled/disabled flag. A disabled tool is never dispatched
//! by the planner or the orchestrator — looking it up reports
//! [`latchkey_core::DomainError::ToolDisabled`] rather than silently
//! vanishing from the registry.

use latchkey_core::DomainError;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Object-safe tool implementation.
///
/// Every filesystem operation in `latchkey-tool::ops` implements this; any
/// future tool source (an MCP server, an HTTP endpoint) would too.
pub trait ToolDyn: Send + Sync {
    /// The tool's unique name, as used in planner output and the registry.
    fn name(&self) -> &str;

    /// Human-readable description, surfaced in `--help` and tool listings.
    fn description(&self) -> &str;

    /// JSON Schema for the tool's input parameters.
    fn input_schema(&self) -> serde_json::Value;

    /// Execute the tool, returning a serialized `latchkey_core::ToolResult`.
    fn call(
        &self,
        input: serde_json::Value,
    ) -> Pin<Box<dyn Future<Output = Result<serde_json::Value, DomainError>> + Send + '_>>;
}

struct Entry {
    tool: Arc<dyn ToolDyn>,
    enabled: bool,
}

/// Registry of tools available to the orchestrator.
pub struct ToolRegistry {
    tools: HashMap<String, Entry>,
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a tool, enabled by default. Overwrites any existing tool
    /// with the same name.
    pub fn register(&mut self, tool: Arc<dyn ToolDyn>) {
        let name = tool.name().to_string();
        self.tools.insert(name, Entry { tool, enabled: true });
    }

    /// Enable or disable a registered tool by name. No-op if unregistered.
    pub fn set_enabled(&mut self, name: &str, enabled: bool) {
        if let Some(entry) = self.tools.get_mut(name) {
            entry.enabled = enabled;
        }
    }

    /// Look up an enabled tool by name.
    ///
    /// Returns `Ok(None)` if the tool was never registered, and
    /// `Err(ToolDisabled)` if it's registered but turned off — the caller
    /// can tell the two apart to produce the right error message.
    pub fn get(&self, name: &str) -> Result<Option<&Arc<dyn ToolDyn>>, DomainError> {
        match self.tools.get(name) {
            Some(entry) if entry.enabled => Ok(Some(&entry.tool)),
            Some(_) => Err(DomainError::ToolDisabled(name.to_string())),
            None => Ok(None),
        }
    }

    /// Iterate over every enabled tool.
    pub fn iter_enabled(&self) -> impl Iterator<Item = &Arc<dyn ToolDyn>> {
        self.tools.values().filter(|e| e.enabled).map(|e| &e.tool)
    }

    /// Number of registered tools, enabled or not.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the registry holds no tools at all.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct EchoTool;

    impl ToolDyn for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }
        fn description(&self) -> &str {
            "Echoes input back"
        }
        fn input_schema(&self) -> serde_json::Value {
            json!({"type": "object"})
        }
        fn call(
            &self,
            input: serde_json::Value,
        ) -> Pin<Box<dyn Future<Output = Result<serde_json::Value, DomainError>> + Send + '_>>
        {
            Box::pin(async move { Ok(json!({"echoed": input})) })
        }
    }

    #[test]
    fn register_and_get() {
        let mut reg = ToolRegistry::new();
        assert!(reg.is_empty());
        reg.register(Arc::new(EchoTool));
        assert_eq!(reg.len(), 1);
        assert!(reg.get("echo").unwrap().is_some());
        assert!(reg.get("missing").unwrap().is_none());
    }

    #[test]
    fn disabled_tool_errors_instead_of_vanishing() {
        let mut reg = ToolRegistry::new();
        reg.register(Arc::new(EchoTool));
        reg.set_enabled("echo", false);
        match reg.get("echo") {
            Err(DomainError::ToolDisabled(name)) => assert_eq!(name, "echo"),
            Ok(Some(_)) => panic!("expected ToolDisabled, got Ok(Some(_))"),
            Ok(None) => panic!("expected ToolDisabled, got Ok(None)"),
            Err(other) => panic!("expected ToolDisabled, got Err({other:?})"),
        }
    }

    #[tokio::test]
    async fn call_through_registry() {
        let mut reg = ToolRegistry::new();
        reg.register(Arc::new(EchoTool));
        let tool = reg.get("echo").unwrap().unwrap();
        let out = tool.call(json!({"msg": "hi"})).await.unwrap();
        assert_eq!(out, json!({"echoed": {"msg": "hi"}}));
    }
}
