use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::entities::{Entity, EntityKind, extract_entities};
use crate::knowledge::KnowledgeBase;

/// Intent name used when nothing in the intent table matches.
pub const GENERAL_INQUIRY: &str = "general_inquiry";

const ACT_CONFIDENCE: f32 = 1.0;
const TOPIC_CONFIDENCE: f32 = 0.9;
const INDUSTRY_CONFIDENCE: f32 = 0.85;
const BASE_CONFIDENCE: f32 = 0.5;
const CONFIDENCE_PER_HIT: f32 = 0.15;
const MAX_INTENT_CONFIDENCE: f32 = 0.95;

/// Which stage of the classifier produced a [`Classification`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationKind {
    Greeting,
    Farewell,
    Thanks,
    Topic,
    Industry,
    Intent,
}

impl ClassificationKind {
    fn from_act(key: &str) -> Option<Self> {
        match key {
            "greeting" => Some(Self::Greeting),
            "farewell" => Some(Self::Farewell),
            "thanks" => Some(Self::Thanks),
            _ => None,
        }
    }

    /// Whether this is a greeting, farewell or thanks.
    pub fn is_act(self) -> bool {
        matches!(self, Self::Greeting | Self::Farewell | Self::Thanks)
    }
}

/// Result of analyzing one utterance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub kind: ClassificationKind,
    /// Act, topic, industry or intent key.
    pub name: String,
    /// Always within `[0, 1]`.
    pub confidence: f32,
    /// Only populated for [`ClassificationKind::Intent`].
    pub entities: Vec<Entity>,
    /// Human readable tag, e.g. `"Harga (manufacturing)"`.
    pub context: String,
}

impl Classification {
    fn new(
        kind: ClassificationKind,
        name: impl Into<String>,
        confidence: f32,
        tag: &str,
        industry: &str,
    ) -> Self {
        let scope = match industry.trim() {
            "" => "general",
            other => other,
        };
        Self {
            kind,
            name: name.into(),
            confidence: confidence.clamp(0.0, 1.0),
            entities: Vec::new(),
            context: format!("{tag} ({scope})"),
        }
    }

    /// The fallback classification for unmatched or empty input.
    pub fn general_inquiry(industry: &str) -> Self {
        Self::new(
            ClassificationKind::Intent,
            GENERAL_INQUIRY,
            BASE_CONFIDENCE,
            "general",
            industry,
        )
    }

    /// First entity of `kind`, if any.
    pub fn entity(&self, kind: EntityKind) -> Option<&Entity> {
        self.entities.iter().find(|e| e.kind == kind)
    }
}

/// Rule-based utterance classifier.
///
/// Stages run in a fixed order and the first one that matches decides the
/// result:
///
/// 1. greeting, farewell or thanks phrases
/// 2. product topics, then industries, by key or display name
/// 3. the intent table, where the first category with any keyword hit wins
///
/// All matching is case-insensitive substring containment.
///
/// ```
/// use ecochat::{Classifier, ClassificationKind};
///
/// let c = Classifier::default().classify("Selamat pagi, ada info?", "retail");
/// assert_eq!(c.kind, ClassificationKind::Greeting);
/// assert_eq!(c.confidence, 1.0);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Classifier {
    kb: &'static KnowledgeBase,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(KnowledgeBase::builtin())
    }
}

impl Classifier {
    pub fn new(kb: &'static KnowledgeBase) -> Self {
        Self { kb }
    }

    /// Classify `utterance` for a session focused on `industry`.
    pub fn classify(&self, utterance: &str, industry: &str) -> Classification {
        let lowered = utterance.trim().to_lowercase();
        if lowered.is_empty() {
            trace!("empty utterance");
            return Classification::general_inquiry(industry);
        }

        let entities = extract_entities(&lowered, self.kb);
        trace!(count = entities.len(), "entities extracted");

        let result = self
            .detect_act(&lowered, industry)
            .or_else(|| self.detect_topic(&lowered, industry))
            .unwrap_or_else(|| {
                let mut intent = self.detect_intent(&lowered, industry);
                intent.entities = entities;
                intent
            });
        debug!(
            kind = ?result.kind,
            name = %result.name,
            confidence = result.confidence,
            "utterance classified"
        );
        result
    }

    fn detect_act(&self, lowered: &str, industry: &str) -> Option<Classification> {
        self.kb.acts.iter().find_map(|act| {
            let kind = ClassificationKind::from_act(act.key)?;
            if act.hits(lowered) == 0 {
                return None;
            }
            trace!(act = act.key, "conversational act");
            Some(Classification::new(
                kind,
                act.key,
                ACT_CONFIDENCE,
                "small talk",
                industry,
            ))
        })
    }

    fn detect_topic(&self, lowered: &str, industry: &str) -> Option<Classification> {
        if let Some(topic) = self.kb.topics.iter().find(|t| t.is_named_in(lowered)) {
            trace!(topic = topic.key, "topic mentioned");
            return Some(Classification::new(
                ClassificationKind::Topic,
                topic.key,
                TOPIC_CONFIDENCE,
                "product overview",
                industry,
            ));
        }
        let profile = self.kb.industries.iter().find(|p| p.is_named_in(lowered))?;
        trace!(industry = profile.key, "industry mentioned");
        Some(Classification::new(
            ClassificationKind::Industry,
            profile.key,
            INDUSTRY_CONFIDENCE,
            "industry focus",
            industry,
        ))
    }

    fn detect_intent(&self, lowered: &str, industry: &str) -> Classification {
        let Some(entry) = self.kb.find_by_keyword(lowered) else {
            trace!("no intent keywords");
            return Classification::general_inquiry(industry);
        };
        let hits = entry.hits(lowered);
        let confidence =
            (BASE_CONFIDENCE + CONFIDENCE_PER_HIT * hits as f32).min(MAX_INTENT_CONFIDENCE);
        trace!(intent = entry.key, hits, "intent matched");
        Classification::new(
            ClassificationKind::Intent,
            entry.key,
            confidence,
            entry.display_name,
            industry,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(text: &str) -> Classification {
        Classifier::default().classify(text, "manufacturing")
    }

    #[test]
    fn acts_take_priority_in_list_order() {
        assert_eq!(classify("Halo kak").kind, ClassificationKind::Greeting);
        assert_eq!(classify("oke, sampai jumpa").kind, ClassificationKind::Farewell);
        assert_eq!(classify("Terima kasih banyak").kind, ClassificationKind::Thanks);
        // farewell is listed before thanks
        let c = classify("terima kasih, sampai jumpa");
        assert_eq!(c.kind, ClassificationKind::Farewell);
        assert!(c.kind.is_act());
    }

    #[test]
    fn topic_beats_industry_and_intent() {
        let c = classify("berapa harga EcoSense untuk perhotelan?");
        assert_eq!(c.kind, ClassificationKind::Topic);
        assert_eq!(c.name, "ecosense");
        assert!((c.confidence - 0.9).abs() < f32::EPSILON);
        assert!(c.entities.is_empty());
    }

    #[test]
    fn industry_by_display_name() {
        let c = classify("Kami bergerak di bidang Ritel");
        assert_eq!(c.kind, ClassificationKind::Industry);
        assert_eq!(c.name, "retail");
        assert!((c.confidence - 0.85).abs() < f32::EPSILON);
    }

    #[test]
    fn intent_confidence_grows_with_hits_and_caps() {
        let one = classify("kenapa?");
        assert_eq!(one.name, "why_inquiry");
        assert!((one.confidence - 0.65).abs() < 1e-6);

        let many = classify("harga biaya tarif paket budget anggaran");
        assert_eq!(many.name, "price_inquiry");
        assert!((many.confidence - 0.95).abs() < 1e-6);
    }

    #[test]
    fn unmatched_text_is_general_inquiry() {
        let c = classify("qwerty");
        assert_eq!(c.kind, ClassificationKind::Intent);
        assert_eq!(c.name, GENERAL_INQUIRY);
        assert_eq!(c.confidence, 0.5);
    }

    #[test]
    fn blank_input_has_no_entities() {
        let c = classify("   \t ");
        assert_eq!(c.name, GENERAL_INQUIRY);
        assert!(c.entities.is_empty());
    }

    #[test]
    fn context_names_the_scope() {
        assert_eq!(classify("kenapa?").context, "Alasan (manufacturing)");
        let c = Classifier::default().classify("kenapa?", "");
        assert_eq!(c.context, "Alasan (general)");
    }
}
