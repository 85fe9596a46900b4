//! Fallback reasoning detection.
//!
//! Used only when the gateway gives no explicit reasoning field. Content
//! counts as reasoning when it contains one of the lead-in markers, or one
//! of the intent phrases ("let me check", ...) ignoring case. Everything
//! else is treated as an answer. This is a keyword heuristic and will
//! misclassify some responses, so the lists come from configuration.

use sysreact_config::ReasoningConfig;

#[derive(Debug, Clone, PartialEq)]
pub struct ReasoningExtractor {
    markers: Vec<String>,
    intent_phrases: Vec<String>,
}

impl Default for ReasoningExtractor {
    fn default() -> Self {
        Self::from_config(&ReasoningConfig::default())
    }
}

impl ReasoningExtractor {
    pub fn new(markers: Vec<String>, intent_phrases: Vec<String>) -> Self {
        Self {
            markers,
            intent_phrases: intent_phrases.into_iter().map(|p| p.to_lowercase()).collect(),
        }
    }

    pub fn from_config(config: &ReasoningConfig) -> Self {
        Self::new(config.markers.clone(), config.intent_phrases.clone())
    }

    /// The trimmed content if it reads as intermediate reasoning.
    pub fn extract(&self, content: &str) -> Option<String> {
        let content = content.trim();
        if content.is_empty() {
            return None;
        }

        if self.markers.iter().any(|m| !m.is_empty() && content.contains(m.as_str())) {
            return Some(content.to_string());
        }

        let lower = content.to_lowercase();
        if self
            .intent_phrases
            .iter()
            .any(|p| !p.is_empty() && lower.contains(p.as_str()))
        {
            return Some(content.to_string());
        }

        None
    }
}

/// Prefer the gateway's reasoning field; fall back to the heuristic.
pub fn select_reasoning(
    explicit: Option<&str>,
    content: &str,
    extractor: &ReasoningExtractor,
) -> Option<String> {
    match explicit.map(str::trim).filter(|r| !r.is_empty()) {
        Some(reasoning) => Some(reasoning.to_string()),
        None => extractor.extract(content),
    }
}
