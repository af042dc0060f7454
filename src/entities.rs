use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::knowledge::KnowledgeBase;

static NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+(?:[.,]\d+)*").expect("valid regex"));

/// What an extracted value refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Number,
    Budget,
    FacilitySize,
    Timeline,
}

/// A value pulled out of a single utterance.
///
/// ```
/// use ecochat::{EntityKind, KnowledgeBase, extract_entities};
///
/// let found = extract_entities("budget sekitar 500 juta", KnowledgeBase::builtin());
/// assert_eq!(found[0].kind, EntityKind::Budget);
/// assert_eq!(found[0].value, "500");
/// assert_eq!(found[0].unit.as_deref(), Some("juta"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub kind: EntityKind,
    /// Text as it appeared in the utterance (number and unit).
    pub raw: String,
    /// Normalized value: the digits for numeric kinds, the matched word for
    /// [`EntityKind::Timeline`].
    pub value: String,
    pub unit: Option<String>,
}

impl Entity {
    /// Value and unit joined for display, e.g. `"500 juta"`.
    pub fn display(&self) -> String {
        match &self.unit {
            Some(unit) => format!("{} {}", self.value, unit),
            None => self.value.clone(),
        }
    }
}

/// Extract numbers, budgets, facility sizes and urgency from `text`.
///
/// Each kind is reported at most once: the first match wins. A number
/// directly followed by a unit word takes that unit; otherwise any unit word
/// elsewhere in the utterance is used. Budget units are checked before area
/// units at each step, and numbers followed by a consumption unit (kWh, m3)
/// are never budgets or sizes.
pub fn extract_entities(text: &str, kb: &KnowledgeBase) -> Vec<Entity> {
    let lowered = text.to_lowercase();
    let words: Vec<&str> = lowered
        .split(|c: char| !is_word_char(c))
        .filter(|w| !w.is_empty())
        .collect();
    let mut found: Vec<Entity> = Vec::new();

    for m in NUMBER_RE.find_iter(&lowered) {
        // digits glued to letters belong to a word ("m2"), unless the
        // letters are a currency prefix ("rp500")
        let prefix = attached_prefix(&lowered[..m.start()]);
        if !prefix.is_empty() && !is_unit(prefix, kb.budget_units) {
            continue;
        }
        let next = next_word(&lowered[m.end()..]);
        let (kind, unit) = if is_unit(next, kb.usage_units) {
            (EntityKind::Number, None)
        } else if is_unit(next, kb.budget_units) {
            (EntityKind::Budget, Some(next))
        } else if !prefix.is_empty() {
            (EntityKind::Budget, Some(prefix))
        } else if is_unit(next, kb.area_units) {
            (EntityKind::FacilitySize, Some(next))
        } else if let Some(unit) = mentioned(&words, kb.budget_units) {
            (EntityKind::Budget, Some(unit))
        } else if let Some(unit) = mentioned(&words, kb.area_units) {
            (EntityKind::FacilitySize, Some(unit))
        } else {
            (EntityKind::Number, None)
        };
        if found.iter().any(|e| e.kind == kind) {
            continue;
        }
        let raw = match unit {
            Some(u) if u == next => format!("{} {}", m.as_str(), u),
            Some(u) if u == prefix => format!("{}{}", u, m.as_str()),
            _ => m.as_str().to_string(),
        };
        trace!(?kind, %raw, "entity extracted");
        found.push(Entity {
            kind,
            raw,
            value: m.as_str().to_string(),
            unit: unit.map(str::to_string),
        });
    }

    if let Some(word) = kb.urgency_words.iter().find(|w| lowered.contains(*w)) {
        trace!(%word, "urgency detected");
        found.push(Entity {
            kind: EntityKind::Timeline,
            raw: word.to_string(),
            value: word.to_string(),
            unit: None,
        });
    }

    found
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric()
}

fn next_word(rest: &str) -> &str {
    let rest = rest.trim_start();
    let end = rest
        .char_indices()
        .find(|(_, c)| !is_word_char(*c))
        .map(|(i, _)| i)
        .unwrap_or(rest.len());
    &rest[..end]
}

/// Letters directly in front of a number, e.g. `"rp"` in `"rp500"`.
fn attached_prefix(before: &str) -> &str {
    let start = before.trim_end_matches(char::is_alphabetic).len();
    &before[start..]
}

fn is_unit(word: &str, units: &[&str]) -> bool {
    units.iter().any(|u| *u == word)
}

/// First unit word found anywhere in the utterance.
fn mentioned<'a>(words: &[&'a str], units: &[&str]) -> Option<&'a str> {
    units.iter().find_map(|u| words.iter().copied().find(|w| w == u))
}
