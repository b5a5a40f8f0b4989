//! Turns a natural-language reference ("it", "the second one",
//! "report.pdf") into a [`ResolvedReference`] against a candidate set of
//! entities.
//!
//! Five stages run in order, the first that fires wins: explicit path,
//! ordinal, pronoun, recency, then fuzzy name match. Nothing matching any
//! stage falls through to [`ResolvedReference::none`].

use latchkey_core::entity::{ConversationState, Entity, EntityKind};
use latchkey_core::resolve::{Confidence, ResolvedReference};
use regex::Regex;
use std::sync::OnceLock;

fn explicit_path_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(~?/[^\s]+)").unwrap())
}

const ORDINAL_WORDS: &[(&str, i64)] = &[
    ("first", 0),
    ("primo", 0),
    ("prima", 0),
    ("second", 1),
    ("secondo", 1),
    ("seconda", 1),
    ("third", 2),
    ("terzo", 2),
    ("terza", 2),
    ("fourth", 3),
    ("quarto", 3),
    ("fifth", 4),
    ("quinto", 4),
    ("last", -1),
    ("ultimo", -1),
    ("ultima", -1),
];

const FILE_PRONOUNS: &[&str] = &["it", "this file", "that file", "this one", "that one"];
const FOLDER_PRONOUNS: &[&str] = &["it", "this folder", "that folder", "this directory"];
const RECENT_PHRASES: &[&str] = &[
    "just created",
    "just made",
    "i just",
    "the new file",
    "the new folder",
    "recently",
];

/// Resolves natural-language references against a set of candidate
/// entities known to the current conversation.
pub struct ReferenceResolver;

impl ReferenceResolver {
    /// Resolve `text` against `entities`, using `conversation` for
    /// pronoun/recency fallbacks. `kind_hint` narrows pronoun resolution
    /// to files or folders when the calling operation implies one.
    /// `is_destructive` triggers the confirmation-preserving downgrade:
    /// a pronoun-resolved High confidence becomes Medium so destructive
    /// actions still prompt, even when the pronoun was unambiguous.
    pub fn resolve(
        &self,
        text: &str,
        kind_hint: Option<EntityKind>,
        entities: &[Entity],
        conversation: &ConversationState,
        is_destructive: bool,
    ) -> ResolvedReference {
        let lower = text.to_lowercase();

        if let Some(r) = self.resolve_explicit_path(text, entities) {
            return r;
        }
        if let Some(r) = self.resolve_ordinal(&lower, entities) {
            return r;
        }
        if let Some(mut r) = self.resolve_pronoun(&lower, kind_hint, entities, conversation) {
            if is_destructive && r.is_pronoun_resolved() && r.confidence == Confidence::High {
                r.confidence = Confidence::Medium;
                r.score *= 0.9;
            }
            return r;
        }
        if let Some(r) = self.resolve_recent(&lower, entities) {
            return r;
        }
        if let Some(r) = self.resolve_by_name(text, entities) {
            tracing::debug!(reason = %r.reason, confidence = ?r.confidence, "resolved reference by name");
            return r;
        }
        tracing::debug!("no reference resolution stage matched");
        ResolvedReference::none("no stage matched")
    }

    fn resolve_explicit_path(&self, text: &str, entities: &[Entity]) -> Option<ResolvedReference> {
        let caps = explicit_path_re().captures(text)?;
        let path = caps.get(1)?.as_str();
        let entity = entities.iter().find(|e| e.absolute_path == path).cloned();
        Some(ResolvedReference {
            entity,
            confidence: Confidence::High,
            score: 1.0,
            reason: "explicit_path".to_string(),
            alternatives: vec![],
        })
    }

    fn resolve_ordinal(&self, lower: &str, entities: &[Entity]) -> Option<ResolvedReference> {
        let selection = entities.iter().find(|e| e.kind == EntityKind::Selection)?;
        let items: Vec<&Entity> = selection
            .selection_ids
            .iter()
            .filter_map(|id| entities.iter().find(|e| &e.id == id))
            .collect();
        if items.is_empty() {
            return None;
        }

        let index = if let Some((_, idx)) = ORDINAL_WORDS.iter().find(|(w, _)| lower.contains(w)) {
            *idx
        } else {
            let digit_re = {
                static RE: OnceLock<Regex> = OnceLock::new();
                RE.get_or_init(|| Regex::new(r"(?:number|#|item)\s*(\d+)|(\d+)(?:st|nd|rd|th)").unwrap())
            };
            let caps = digit_re.captures(lower)?;
            let n: i64 = caps
                .get(1)
                .or_else(|| caps.get(2))?
                .as_str()
                .parse()
                .ok()?;
            n - 1
        };

        let resolved_index = if index < 0 {
            items.len() as i64 + index
        } else {
            index
        };

        if resolved_index < 0 || resolved_index as usize >= items.len() {
            return Some(ResolvedReference {
                entity: None,
                confidence: Confidence::Low,
                score: 0.3,
                reason: "ordinal_out_of_range".to_string(),
                alternatives: items.into_iter().cloned().collect(),
            });
        }

        Some(ResolvedReference {
            entity: Some(items[resolved_index as usize].clone()),
            confidence: Confidence::High,
            score: 0.95,
            reason: "ordinal".to_string(),
            alternatives: vec![],
        })
    }

    fn resolve_pronoun(
        &self,
        lower: &str,
        kind_hint: Option<EntityKind>,
        entities: &[Entity],
        conversation: &ConversationState,
    ) -> Option<ResolvedReference> {
        let mentions_file = FILE_PRONOUNS.iter().any(|p| lower.contains(p));
        let mentions_folder = FOLDER_PRONOUNS.iter().any(|p| lower.contains(p));
        if !mentions_file && !mentions_folder {
            return None;
        }

        let lookup = |id: &latchkey_core::id::EntityId| entities.iter().find(|e| &e.id == id).cloned();

        match kind_hint {
            Some(EntityKind::File) => {
                if let Some(id) = &conversation.last_active_file_id {
                    if let Some(entity) = lookup(id) {
                        return Some(ResolvedReference {
                            entity: Some(entity),
                            confidence: Confidence::High,
                            score: 0.9,
                            reason: "pronoun_file_kind_hint".to_string(),
                            alternatives: vec![],
                        });
                    }
                }
            }
            Some(EntityKind::Folder) => {
                if let Some(id) = &conversation.last_active_folder_id {
                    if let Some(entity) = lookup(id) {
                        return Some(ResolvedReference {
                            entity: Some(entity),
                            confidence: Confidence::High,
                            score: 0.9,
                            reason: "pronoun_folder_kind_hint".to_string(),
                            alternatives: vec![],
                        });
                    }
                }
            }
            _ => {}
        }

        if let Some(id) = &conversation.last_active_file_id {
            if let Some(entity) = lookup(id) {
                return Some(ResolvedReference {
                    entity: Some(entity),
                    confidence: Confidence::Medium,
                    score: 0.7,
                    reason: "pronoun_last_active_file".to_string(),
                    alternatives: vec![],
                });
            }
        }
        if let Some(id) = &conversation.last_active_folder_id {
            if let Some(entity) = lookup(id) {
                return Some(ResolvedReference {
                    entity: Some(entity),
                    confidence: Confidence::Medium,
                    score: 0.6,
                    reason: "pronoun_last_active_folder".to_string(),
                    alternatives: vec![],
                });
            }
        }

        if let Some(id) = &conversation.current_selection_id {
            if let Some(selection) = lookup(id) {
                let items: Vec<Entity> = selection
                    .selection_ids
                    .iter()
                    .filter_map(|id| lookup(id))
                    .collect();
                if items.len() == 1 {
                    return Some(ResolvedReference {
                        entity: Some(items[0].clone()),
                        confidence: Confidence::Medium,
                        score: 0.6,
                        reason: "pronoun_single_selection".to_string(),
                        alternatives: vec![],
                    });
                } else if items.len() > 1 {
                    return Some(ResolvedReference {
                        entity: None,
                        confidence: Confidence::Ambiguous,
                        score: 0.4,
                        reason: "pronoun_multi_selection".to_string(),
                        alternatives: items,
                    });
                }
            }
        }

        None
    }

    fn resolve_recent(&self, lower: &str, entities: &[Entity]) -> Option<ResolvedReference> {
        if !RECENT_PHRASES.iter().any(|p| lower.contains(p)) {
            return None;
        }
        let most_recent = entities
            .iter()
            .filter(|e| e.kind == EntityKind::File || e.kind == EntityKind::Folder)
            .max_by_key(|e| e.timestamp)?;
        Some(ResolvedReference {
            entity: Some(most_recent.clone()),
            confidence: Confidence::High,
            score: 0.9,
            reason: "recent".to_string(),
            alternatives: vec![],
        })
    }

    fn resolve_by_name(&self, text: &str, entities: &[Entity]) -> Option<ResolvedReference> {
        let names = extract_names(text);
        if names.is_empty() {
            return None;
        }

        let mut scored: Vec<(f64, &Entity)> = entities
            .iter()
            .filter(|e| e.kind == EntityKind::File || e.kind == EntityKind::Folder)
            .filter_map(|e| {
                names
                    .iter()
                    .map(|n| name_match_score(e, n))
                    .fold(None, |acc: Option<f64>, s| {
                        Some(acc.map_or(s, |a| a.max(s)))
                    })
                    .filter(|s| *s > 0.0)
                    .map(|s| (s, e))
            })
            .collect();

        if scored.is_empty() {
            return None;
        }
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap());

        let (best_score, best_entity) = scored[0];
        let ambiguous = scored.len() > 1 && scored[1].0 > 0.7 && (best_score - scored[1].0) < 0.1;

        if ambiguous {
            return Some(ResolvedReference {
                entity: None,
                confidence: Confidence::Ambiguous,
                score: best_score,
                reason: "name_match_ambiguous".to_string(),
                alternatives: scored.into_iter().map(|(_, e)| e.clone()).collect(),
            });
        }

        Some(ResolvedReference {
            entity: Some(best_entity.clone()),
            confidence: Confidence::from_score(best_score),
            score: best_score,
            reason: "name_match".to_string(),
            alternatives: vec![],
        })
    }
}

/// Extract candidate filenames/folder names from free text: quoted
/// strings, bare tokens with a file extension, and "the/file/folder X"
/// noun-phrase patterns.
fn extract_names(text: &str) -> Vec<String> {
    let mut names = Vec::new();

    static QUOTED: OnceLock<Regex> = OnceLock::new();
    let quoted = QUOTED.get_or_init(|| Regex::new(r#"['"]([^'"]+)['"]"#).unwrap());
    for cap in quoted.captures_iter(text) {
        names.push(cap[1].to_string());
    }

    static WITH_EXT: OnceLock<Regex> = OnceLock::new();
    let with_ext = WITH_EXT.get_or_init(|| Regex::new(r"\b([\w.\-]+\.[A-Za-z0-9]{1,8})\b").unwrap());
    for cap in with_ext.captures_iter(text) {
        names.push(cap[1].to_string());
    }

    static NOUN_PHRASE: OnceLock<Regex> = OnceLock::new();
    let noun_phrase = NOUN_PHRASE.get_or_init(|| {
        Regex::new(r"(?i)\b(?:the|il|la)\s+(?:file|folder|directory|cartella)\s+([\w.\-]+)").unwrap()
    });
    for cap in noun_phrase.captures_iter(text) {
        names.push(cap[1].to_string());
    }

    names.sort();
    names.dedup();
    names
}

fn name_match_score(entity: &Entity, query: &str) -> f64 {
    let name = entity.display_name.to_lowercase();
    let query = query.to_lowercase();

    if name == query {
        return 1.0;
    }
    if entity.stem() == query {
        return 0.95;
    }
    if name.starts_with(&query) {
        return 0.85;
    }
    if name.contains(&query) {
        return 0.7;
    }

    let name_words: Vec<&str> = name.split(|c: char| !c.is_alphanumeric()).filter(|s| !s.is_empty()).collect();
    let query_words: Vec<&str> = query.split(|c: char| !c.is_alphanumeric()).filter(|s| !s.is_empty()).collect();
    if query_words.is_empty() {
        return 0.0;
    }
    let overlap = query_words.iter().filter(|w| name_words.contains(w)).count();
    if overlap == 0 {
        return 0.0;
    }
    0.5 + (overlap as f64 / query_words.len() as f64) * 0.3
}
