use chrono::Utc;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::classifier::{Classification, Classifier};
use crate::config::EngineConfig;
use crate::entities::extract_entities;
use crate::knowledge::KnowledgeBase;
use crate::session::{ChatSession, SessionSummary, Stage, UserProfile};
use crate::synthesizer::{CLARIFICATION, RenderContext, Synthesizer};

/// What [`ChatEngine::generate_response`] hands back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reply {
    pub text: String,
    pub classification: Classification,
}

/// Entry point for one conversation.
///
/// Each engine owns exactly one [`ChatSession`]; hosts serving several users
/// construct one engine per user.
///
/// ```
/// use ecochat::{ChatEngine, ClassificationKind};
///
/// let mut engine = ChatEngine::new("retail");
/// let reply = engine.generate_response("Selamat pagi!");
/// assert_eq!(reply.classification.kind, ClassificationKind::Greeting);
/// assert_eq!(engine.session().messages().len(), 3);
/// ```
pub struct ChatEngine<R = StdRng> {
    kb: &'static KnowledgeBase,
    classifier: Classifier,
    synthesizer: Synthesizer,
    session: ChatSession,
    rng: R,
}

impl ChatEngine<StdRng> {
    /// Start a conversation for `industry` with an entropy-seeded RNG.
    pub fn new(industry: impl Into<String>) -> Self {
        Self::with_rng(industry, StdRng::from_entropy())
    }

    /// Start a conversation as described by `config`.
    pub fn from_config(config: &EngineConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let engine = Self::with_rng(config.industry.clone(), rng);
        match &config.user_name {
            Some(name) => engine.with_user(UserProfile::named(name.clone())),
            None => engine,
        }
    }
}

impl<R: Rng> ChatEngine<R> {
    /// Start a conversation drawing template choices from `rng`.
    pub fn with_rng(industry: impl Into<String>, rng: R) -> Self {
        let kb = KnowledgeBase::builtin();
        Self {
            kb,
            classifier: Classifier::new(kb),
            synthesizer: Synthesizer::new(kb),
            session: ChatSession::start(industry, kb),
            rng,
        }
    }

    /// Attach the signed-in user for personalized replies.
    pub fn with_user(mut self, user: UserProfile) -> Self {
        self.session = self.session.with_user(user);
        self
    }

    pub fn session(&self) -> &ChatSession {
        &self.session
    }

    pub fn summarize(&self) -> SessionSummary {
        self.session.summarize()
    }

    /// Classify `utterance`, synthesize a reply and record both turns.
    ///
    /// Never fails: blank input gets a clarification prompt and is not
    /// recorded, and unmatched input gets a generic reply.
    pub fn generate_response(&mut self, utterance: &str) -> Reply {
        let industry = self.session.industry().to_string();
        if utterance.trim().is_empty() {
            debug!("blank utterance ignored");
            return Reply {
                text: CLARIFICATION.to_string(),
                classification: Classification::general_inquiry(&industry),
            };
        }

        let classification = self.classifier.classify(utterance, &industry);
        let stage = Stage::from_user_messages(self.session.user_message_count() + 1);
        let ctx = RenderContext {
            user_name: self.session.user_name(),
            industry: self.session.industry_profile(self.kb),
            stage,
        };
        let text = self.synthesizer.render(&classification, &ctx, &mut self.rng);

        self.session
            .append_user_turn(utterance, Some(classification.clone()));
        self.session
            .append_assistant_turn(text.clone(), Some(classification.clone()));

        let previous = self.session.context().stage;
        let stage = self.session.recompute_stage();
        if stage != previous {
            info!(from = ?previous, to = ?stage, "conversation stage changed");
        }

        let user_messages = self.session.user_message_count();
        let assistant_messages = self.session.messages().len() - user_messages;
        let kb = self.kb;
        let context = self.session.context_mut();
        // slots see every entity, whatever the turn was classified as
        let entities = extract_entities(utterance, kb);
        context.slots.absorb(utterance, &entities, kb);
        context.remember("last_interaction", Utc::now().to_rfc3339());
        context.remember("user_messages", user_messages);
        context.remember("assistant_messages", assistant_messages);
        context.remember("last_topic", classification.name.clone());

        debug!(
            name = %classification.name,
            confidence = classification.confidence,
            ?stage,
            "turn recorded"
        );
        Reply {
            text,
            classification,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::ClassificationKind;
    use crate::session::Role;
    use rand::rngs::mock::StepRng;
    use serde_json::json;

    fn engine(industry: &str) -> ChatEngine<StepRng> {
        ChatEngine::with_rng(industry, StepRng::new(0, 0))
    }

    #[test]
    fn blank_input_is_not_recorded() {
        let mut e = engine("retail");
        let reply = e.generate_response("   ");
        assert_eq!(reply.text, CLARIFICATION);
        assert_eq!(reply.classification.confidence, 0.5);
        assert_eq!(e.session().messages().len(), 1);
    }

    #[test]
    fn both_turns_carry_the_classification() {
        let mut e = engine("retail");
        let reply = e.generate_response("berapa harganya?");
        let msgs = e.session().messages();
        assert_eq!(msgs[1].role, Role::User);
        assert_eq!(msgs[1].content, "berapa harganya?");
        assert_eq!(msgs[2].role, Role::Assistant);
        assert_eq!(msgs[2].content, reply.text);
        assert_eq!(msgs[1].classification.as_ref(), Some(&reply.classification));
        assert_eq!(msgs[2].classification.as_ref(), Some(&reply.classification));
    }

    #[test]
    fn memory_tracks_counters() {
        let mut e = engine("retail");
        e.generate_response("halo");
        e.generate_response("apa manfaatnya?");
        let memory = &e.session().context().memory;
        assert_eq!(memory["user_messages"], json!(2));
        assert_eq!(memory["assistant_messages"], json!(3));
        assert_eq!(memory["last_topic"], json!("benefits_inquiry"));
        assert!(memory.contains_key("last_interaction"));
    }

    #[test]
    fn slots_fill_from_intent_entities() {
        let mut e = engine("manufacturing");
        let reply = e.generate_response("budget sekitar 500 juta, butuh segera");
        assert_eq!(reply.classification.kind, ClassificationKind::Intent);
        let slots = &e.session().context().slots;
        assert_eq!(slots.budget_range.as_deref(), Some("500 juta"));
        assert_eq!(slots.timeline.as_deref(), Some("segera"));
    }

    #[test]
    fn user_name_personalizes_replies() {
        let mut e = engine("").with_user(UserProfile::named("Sari"));
        let reply = e.generate_response("halo");
        assert!(reply.text.starts_with("Hai Sari!"));
    }

    #[test]
    fn config_seed_and_name_apply() {
        let cfg = EngineConfig {
            industry: "education".into(),
            seed: Some(7),
            user_name: Some("Andi".into()),
            ..EngineConfig::default()
        };
        let mut e = ChatEngine::from_config(&cfg);
        assert_eq!(e.session().industry(), "education");
        assert!(e.generate_response("halo").text.starts_with("Hai Andi!"));
    }
}
