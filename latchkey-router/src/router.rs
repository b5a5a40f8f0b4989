//! A small always-warm model decides which worker model should handle
//! each message.

use crate::backend::{ChatMessage, InferenceBackend};
use crate::error::RouterError;
use latchkey_core::routing::{Capability, RoutingDecision};
use std::sync::Arc;

/// A worker model the router can pick from.
#[derive(Debug, Clone)]
pub struct WorkerModel {
    /// Registry id, e.g. `"llama3.2:8b"`.
    pub id: String,
    /// Human-readable name shown in routing rationale.
    pub name: String,
    /// 0.0-1.0 scores per capability this model is registered for.
    pub capabilities: Vec<(Capability, f64)>,
}

impl WorkerModel {
    fn general_score(&self) -> f64 {
        self.capabilities.iter().find(|(c, _)| *c == Capability::General).map(|(_, s)| *s).unwrap_or(0.0)
    }
}

const ROUTER_MODEL_ID: &str = "latchkey-router";

/// Routes a message to the best available worker model using a small,
/// always-warm router model plus a deterministic fallback when that
/// model is unavailable or its response can't be parsed.
pub struct ModelRouter {
    backend: Arc<dyn InferenceBackend>,
    workers: Vec<WorkerModel>,
    router_warm: std::sync::atomic::AtomicBool,
}

impl ModelRouter {
    /// Build a router over `workers`, using `backend` for both the
    /// router model and every worker's completions.
    pub fn new(backend: Arc<dyn InferenceBackend>, workers: Vec<WorkerModel>) -> Self {
        Self { backend, workers, router_warm: std::sync::atomic::AtomicBool::new(false) }
    }

    async fn ensure_router_ready(&self) -> Result<(), RouterError> {
        if self.router_warm.load(std::sync::atomic::Ordering::Relaxed) {
            return Ok(());
        }
        self.backend.start(ROUTER_MODEL_ID).await?;
        self.router_warm.store(true, std::sync::atomic::Ordering::Relaxed);
        Ok(())
    }

    /// Decide which worker should handle `user_message`.
    pub async fn route(&self, user_message: &str) -> RoutingDecision {
        if self.workers.is_empty() {
            return RoutingDecision {
                model_id: ROUTER_MODEL_ID.to_string(),
                model_name: "router".to_string(),
                capability: Capability::General,
                reason: "no other models available".to_string(),
                confidence: 0.5,
            };
        }

        if self.ensure_router_ready().await.is_err() {
            tracing::warn!("router model unavailable, falling back to best general worker");
            return self.fallback();
        }

        let prompt = self.build_routing_prompt(user_message);
        let response = self.backend.chat(ROUTER_MODEL_ID, &[ChatMessage::user(prompt)]).await;

        let decision = match response {
            Ok(r) => self.parse_routing_response(&r.content).unwrap_or_else(|| self.fallback()),
            Err(ref e) => {
                tracing::warn!(error = %e, "router chat call failed, falling back");
                self.fallback()
            }
        };
        tracing::debug!(model = %decision.model_id, confidence = decision.confidence, "routed message");
        decision
    }

    /// Skip routing and use a specific worker directly.
    pub fn direct_route(&self, model_id: &str) -> Option<RoutingDecision> {
        let worker = self.workers.iter().find(|w| w.id == model_id)?;
        Some(RoutingDecision {
            model_id: worker.id.clone(),
            model_name: worker.name.clone(),
            capability: Capability::General,
            reason: "user selected this model".to_string(),
            confidence: 1.0,
        })
    }

    fn fallback(&self) -> RoutingDecision {
        let best = self
            .workers
            .iter()
            .max_by(|a, b| a.general_score().partial_cmp(&b.general_score()).unwrap())
            .expect("workers checked non-empty by caller");
        RoutingDecision {
            model_id: best.id.clone(),
            model_name: best.name.clone(),
            capability: Capability::General,
            reason: "fallback to best general model".to_string(),
            confidence: 0.5,
        }
    }

    fn build_routing_prompt(&self, user_message: &str) -> String {
        let models_desc: String = self
            .workers
            .iter()
            .map(|m| {
                let caps: Vec<String> =
                    m.capabilities.iter().map(|(c, s)| format!("{c:?}: {s:.1}", c = c, s = s)).collect();
                format!("- {}: {} (capabilities: {})", m.id, m.name, caps.join(", "))
            })
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "You are a routing assistant. Analyze the user's message and decide which model should handle it.\n\n\
             Available models:\n{models_desc}\n\n\
             User message: {user_message}\n\n\
             Respond with a JSON object: {{\"model_id\": \"...\", \"capability\": \"general|coding|reasoning|creative|math|analysis\", \
             \"reason\": \"...\", \"confidence\": 0.0}}\n\
             Respond ONLY with the JSON object."
        )
    }

    fn parse_routing_response(&self, response: &str) -> Option<RoutingDecision> {
        let cleaned = strip_code_fence(response);
        let value: serde_json::Value = serde_json::from_str(cleaned).ok()?;

        let raw_id = value.get("model_id")?.as_str()?;
        let (model_id, model_name) = self
            .workers
            .iter()
            .find(|w| w.id == raw_id)
            .map(|w| (w.id.clone(), w.name.clone()))
            .or_else(|| {
                self.workers
                    .iter()
                    .find(|w| w.name.to_lowercase().contains(&raw_id.to_lowercase()) || raw_id.to_lowercase().contains(&w.name.to_lowercase()))
                    .map(|w| (w.id.clone(), w.name.clone()))
            })
            .or_else(|| self.workers.first().map(|w| (w.id.clone(), w.name.clone())))?;

        let capability = value
            .get("capability")
            .and_then(|c| c.as_str())
            .and_then(parse_capability)
            .unwrap_or(Capability::General);

        let reason = value.get("reason").and_then(|r| r.as_str()).unwrap_or("selected by router").to_string();
        let confidence = value.get("confidence").and_then(|c| c.as_f64()).unwrap_or(0.7);

        Some(RoutingDecision { model_id, model_name, capability, reason, confidence })
    }
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    if let Some(rest) = trimmed.strip_prefix("```") {
        let rest = rest.strip_prefix("json").unwrap_or(rest);
        rest.trim_end_matches("```").trim()
    } else {
        trimmed
    }
}

fn parse_capability(s: &str) -> Option<Capability> {
    match s {
        "general" => Some(Capability::General),
        "coding" => Some(Capability::Coding),
        "reasoning" => Some(Capability::Reasoning),
        "creative" => Some(Capability::Creative),
        "math" => Some(Capability::Math),
        "analysis" => Some(Capability::Analysis),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MockBackend;

    fn workers() -> Vec<WorkerModel> {
        vec![
            WorkerModel { id: "llama3.2:8b".into(), name: "Llama General".into(), capabilities: vec![(Capability::General, 0.9)] },
            WorkerModel { id: "codellama:7b".into(), name: "CodeLlama".into(), capabilities: vec![(Capability::Coding, 0.95), (Capability::General, 0.5)] },
        ]
    }

    #[tokio::test]
    async fn no_workers_falls_back_with_fixed_confidence() {
        let backend = Arc::new(MockBackend::with_default(""));
        let router = ModelRouter::new(backend, vec![]);
        let decision = router.route("hello").await;
        assert_eq!(decision.confidence, 0.5);
        assert_eq!(decision.reason, "no other models available");
    }

    #[tokio::test]
    async fn unparseable_response_falls_back_to_best_general() {
        let backend = Arc::new(MockBackend::with_default("not json at all"));
        let router = ModelRouter::new(backend, workers());
        let decision = router.route("write me a poem").await;
        assert_eq!(decision.model_id, "llama3.2:8b");
        assert_eq!(decision.reason, "fallback to best general model");
    }

    #[tokio::test]
    async fn valid_json_response_is_parsed() {
        let backend = Arc::new(MockBackend::with_default(
            r#"{"model_id": "codellama:7b", "capability": "coding", "reason": "it's a coding task", "confidence": 0.95}"#,
        ));
        let router = ModelRouter::new(backend, workers());
        let decision = router.route("write a rust function").await;
        assert_eq!(decision.model_id, "codellama:7b");
        assert_eq!(decision.capability, Capability::Coding);
        assert_eq!(decision.confidence, 0.95);
    }

    #[tokio::test]
    async fn response_wrapped_in_code_fence_is_still_parsed() {
        let backend = Arc::new(MockBackend::with_default(
            "```json\n{\"model_id\": \"llama3.2:8b\", \"capability\": \"general\", \"reason\": \"default\", \"confidence\": 0.6}\n```",
        ));
        let router = ModelRouter::new(backend, workers());
        let decision = router.route("hi").await;
        assert_eq!(decision.model_id, "llama3.2:8b");
    }

    #[test]
    fn direct_route_selects_exact_model() {
        let backend = Arc::new(MockBackend::with_default(""));
        let router = ModelRouter::new(backend, workers());
        let decision = router.direct_route("codellama:7b").unwrap();
        assert_eq!(decision.confidence, 1.0);
        assert_eq!(decision.reason, "user selected this model");
    }

    #[test]
    fn direct_route_returns_none_for_unknown_model() {
        let backend = Arc::new(MockBackend::with_default(""));
        let router = ModelRouter::new(backend, workers());
        assert!(router.direct_route("nonexistent").is_none());
    }
}
