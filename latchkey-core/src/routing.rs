//! The model router's decision record.

use serde::{Deserialize, Serialize};

/// The kind of work a worker model is best suited for.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// No particular specialization.
    General,
    /// Writing or editing code.
    Coding,
    /// Step-by-step or logical reasoning.
    Reasoning,
    /// Open-ended or creative writing.
    Creative,
    /// Mathematical computation.
    Math,
    /// Analytical or evaluative tasks.
    Analysis,
}

/// The router's choice of worker model for one turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingDecision {
    /// The backend-specific model identifier (e.g. an Ollama tag).
    pub model_id: String,
    /// A human-readable name for logging.
    pub model_name: String,
    /// Which capability class the router matched the turn to.
    pub capability: Capability,
    /// Why this model was chosen, for logging.
    pub reason: String,
    /// The router's confidence in this choice, 0.0-1.0.
    pub confidence: f64,
}
