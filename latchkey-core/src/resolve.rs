//! Output of the reference resolution pipeline.

use crate::entity::Entity;
use serde::{Deserialize, Serialize};

/// Graded confidence in a resolved reference, derived from a numeric score.
///
/// Thresholds: `score >= 0.9` is High, `>= 0.6` Medium, `>= 0.3` Low,
/// otherwise None. Ambiguous is assigned separately, when two or more
/// candidates score within 0.1 of each other and the runner-up exceeds 0.7.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    /// `score >= 0.9`.
    High,
    /// `score >= 0.6`.
    Medium,
    /// `score >= 0.3`.
    Low,
    /// Two or more candidates scored within 0.1 of each other.
    Ambiguous,
    /// No candidate scored high enough to resolve.
    None,
}

impl Confidence {
    /// Confidence bucket for a bare numeric score, ignoring ambiguity.
    pub fn from_score(score: f64) -> Self {
        if score >= 0.9 {
            Confidence::High
        } else if score >= 0.6 {
            Confidence::Medium
        } else if score >= 0.3 {
            Confidence::Low
        } else {
            Confidence::None
        }
    }
}

/// The result of resolving a natural-language reference ("it", "the second
/// one", "report.pdf") against the conversation's entity store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedReference {
    /// The entity the reference resolved to, if any.
    pub entity: Option<Entity>,
    /// How confident the resolution is.
    pub confidence: Confidence,
    /// The raw numeric score that produced `confidence`.
    pub score: f64,
    /// Which resolution stage fired and why (for logging and for the
    /// action guard's pronoun-downgrade check).
    pub reason: String,
    /// Other candidates considered, highest-scoring first. Populated for
    /// `Ambiguous` and out-of-range ordinal results.
    pub alternatives: Vec<Entity>,
}

impl ResolvedReference {
    /// A resolution that found nothing at all.
    pub fn none(reason: impl Into<String>) -> Self {
        Self {
            entity: None,
            confidence: Confidence::None,
            score: 0.0,
            reason: reason.into(),
            alternatives: Vec::new(),
        }
    }

    /// Whether this resolution is strong enough to act on without asking
    /// the user to disambiguate first.
    pub fn is_confident(&self) -> bool {
        self.entity.is_some() && self.confidence == Confidence::High
    }

    /// Whether the resolver found more than one plausible candidate and
    /// neither stood out.
    pub fn is_ambiguous(&self) -> bool {
        self.confidence == Confidence::Ambiguous || !self.alternatives.is_empty()
    }

    /// Whether this resolution was reached via a pronoun ("it", "that
    /// file") rather than an explicit path, name, or ordinal. Destructive
    /// actions downgrade pronoun-resolved High confidence to Medium so
    /// they still prompt for confirmation.
    pub fn is_pronoun_resolved(&self) -> bool {
        self.reason.contains("pronoun")
    }
}
