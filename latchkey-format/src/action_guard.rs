//! Blocks the model from claiming it did something the tool layer never
//! reported. A response is trusted unconditionally when a tool actually
//! ran this turn; otherwise it is scanned for past-tense claims of
//! filesystem mutation and rewritten into an honest request for detail.

use regex::Regex;
use std::sync::LazyLock;

static HALLUCINATION_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)\bi(?:'ve| have)\s+(?:deleted|removed|renamed|moved|copied|created|written|saved|organized)\b",
        r"(?i)\b(?:deleted|removed|renamed|moved|copied|created|written|saved)\s+(?:the|your|that|this)\b",
        r"(?i)\bthe\s+file\s+(?:has been|was)\s+(?:deleted|removed|renamed|moved|copied|created|written)\b",
        r"(?i)\bdone[.!]?\s*$",
        r"(?i)\ball set[.!]?\s*$",
        r"(?i)\bsuccessfully\s+(?:deleted|removed|renamed|moved|copied|created|written|saved)\b",
        r"(?i)\bnow (?:deleted|renamed|moved|copied|gone)\b",
        r"(?i)\bi(?:'ve| have)\s+gone ahead and\b",
        r"[✓✅]",
        r"(?i)\bho\s+(?:eliminato|cancellato|creato|rinominato|spostato|copiato|salvato)\b",
        r"(?i)\bfile\s+(?:eliminato|creato|rinominato|spostato|copiato|salvato)\b",
        r"(?i)\bfatto[.!]?\s*$",
        r"(?i)\bcompletato\b",
        r"(?i)\boperazione\s+(?:completata|riuscita)\b",
        r"(?i)\bit(?:'s| is) (?:deleted|renamed|moved|copied|gone)\b",
        r"(?i)\bthat(?:'s| is) (?:done|handled|taken care of)\b",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("static hallucination pattern"))
    .collect()
});

static SAFE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)\b(?:can't|cannot|unable to|couldn't)\b",
        r"(?i)\bi(?:'d| would) need\b",
        r"(?i)\bneed\s+(?:the|a|more)?\s*(?:path|file name|information|details)\b",
        r"(?i)\bwhich\s+(?:file|folder|one)\b",
        r"(?i)\bwhat\s+(?:file|folder|path)\b",
        r"(?i)\bcould you\s+(?:specify|confirm|clarify|provide)\b",
        r"(?i)\bnon posso\b",
        r"(?i)\bho bisogno\b",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("static safe pattern"))
    .collect()
});

static CONTRASTING_CLAIM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bbut\s+i(?:'ve| have)\s+(?:deleted|removed|renamed|moved|copied|created|written|saved)\b")
        .expect("static contrasting-claim pattern")
});

/// The fixed clarification shown in place of any unverified action claim.
pub const CLARIFICATION_PROMPT: &str =
    "I need more information to complete that action. Could you specify the exact file path or which file you mean?";

/// Does `text` contain a hallucinated claim of having performed a
/// filesystem mutation? Returns the matched pattern's source for logging.
pub fn contains_hallucination(text: &str) -> Option<&'static str> {
    let hit = HALLUCINATION_PATTERNS.iter().find_map(|p| p.find(text).map(|m| (p.as_str(), m.start())))?;
    if has_contrasting_claim(text) {
        return Some(hit.0);
    }
    // A safe clause only neutralizes a hallucination claim that comes
    // after it — "I can't find it, but I deleted the other one" isn't
    // safe just because "can't" appears somewhere in the sentence.
    let neutralized = SAFE_PATTERNS
        .iter()
        .filter_map(|p| p.find(text))
        .any(|m| m.start() < hit.1);
    if neutralized {
        return None;
    }
    Some(hit.0)
}

/// True when a response hedges ("I can't...") but then contradicts
/// itself with a claim of having acted anyway ("...but I've deleted it").
/// A safe prefix never forgives this.
pub fn has_contrasting_claim(text: &str) -> bool {
    CONTRASTING_CLAIM.is_match(text)
}

/// Guards a model's natural-language reply against unverified action
/// claims.
///
/// When `tool_was_executed` is true this turn, the response already
/// describes a verified post-condition — it is returned unchanged. When
/// no tool ran, any hallucinated completion claim is replaced with the
/// fixed clarification prompt. Returns `(response, was_blocked)`.
pub fn validate_model_response(response: &str, tool_was_executed: bool) -> (String, bool) {
    if tool_was_executed {
        return (response.to_string(), false);
    }
    match contains_hallucination(response) {
        Some(_) => (CLARIFICATION_PROMPT.to_string(), true),
        None => (response.to_string(), false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocks_past_tense_completion_claim_without_a_tool_call() {
        let (msg, blocked) = validate_model_response("I've deleted the file you asked about.", false);
        assert!(blocked);
        assert_eq!(msg, CLARIFICATION_PROMPT);
    }

    #[test]
    fn trusts_response_when_a_tool_actually_ran() {
        let (msg, blocked) = validate_model_response("I've deleted the file you asked about.", true);
        assert!(!blocked);
        assert_eq!(msg, "I've deleted the file you asked about.");
    }

    #[test]
    fn lets_genuine_clarifying_questions_through() {
        let (msg, blocked) = validate_model_response("Which file did you mean, report.txt or report2.txt?", false);
        assert!(!blocked);
        assert_eq!(msg, "Which file did you mean, report.txt or report2.txt?");
    }

    #[test]
    fn contrasting_claim_overrides_a_safe_prefix() {
        let text = "I can't see the folder, but I've deleted the file anyway.";
        assert!(contains_hallucination(text).is_some());
    }

    #[test]
    fn italian_completion_claim_is_caught() {
        let (_, blocked) = validate_model_response("Ho eliminato il file richiesto.", false);
        assert!(blocked);
    }
}
