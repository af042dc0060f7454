use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::classifier::Classification;
use crate::entities::{Entity, EntityKind};
use crate::knowledge::{IndustryProfile, KnowledgeBase};
use crate::synthesizer::welcome_message;

static ENERGY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+(?:[.,]\d+)*)\s*kwh").expect("valid regex"));

static WATER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+(?:[.,]\d+)*)\s*(m3|m³|liter)").expect("valid regex"));

/// Who produced a [`Message`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// One turn of the conversation. Never modified after it is appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    /// The classification of the user utterance this turn belongs to.
    /// `None` for the welcome message.
    pub classification: Option<Classification>,
}

/// Coarse conversation progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    #[default]
    Opening,
    Discovery,
    Qualification,
}

impl Stage {
    /// Stage reached after `count` user messages.
    ///
    /// ```
    /// use ecochat::Stage;
    ///
    /// assert_eq!(Stage::from_user_messages(1), Stage::Opening);
    /// assert_eq!(Stage::from_user_messages(3), Stage::Discovery);
    /// assert_eq!(Stage::from_user_messages(4), Stage::Qualification);
    /// ```
    pub fn from_user_messages(count: usize) -> Self {
        match count {
            0 | 1 => Stage::Opening,
            2 | 3 => Stage::Discovery,
            _ => Stage::Qualification,
        }
    }
}

/// Facts about the prospect inferred from the conversation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slots {
    pub pain_points: Vec<String>,
    pub budget_range: Option<String>,
    pub timeline: Option<String>,
    pub facility_size: Option<String>,
    pub decision_maker: bool,
    pub energy_usage: Option<String>,
    pub water_usage: Option<String>,
}

impl Slots {
    /// Fold one utterance and its entities into the slots. Later mentions
    /// replace earlier ones; pain points accumulate without duplicates.
    pub fn absorb(&mut self, utterance: &str, entities: &[Entity], kb: &KnowledgeBase) {
        for entity in entities {
            let slot = match entity.kind {
                EntityKind::Budget => &mut self.budget_range,
                EntityKind::FacilitySize => &mut self.facility_size,
                EntityKind::Timeline => &mut self.timeline,
                EntityKind::Number => continue,
            };
            *slot = Some(entity.display());
        }

        let lowered = utterance.to_lowercase();
        for (trigger, pain) in kb.pain_points {
            if lowered.contains(trigger) && !self.pain_points.iter().any(|p| p == pain) {
                self.pain_points.push(pain.to_string());
            }
        }
        if kb.decision_roles.iter().any(|r| lowered.contains(r)) {
            self.decision_maker = true;
        }
        if let Some(caps) = ENERGY_RE.captures(&lowered) {
            self.energy_usage = Some(format!("{} kWh", &caps[1]));
        }
        if let Some(caps) = WATER_RE.captures(&lowered) {
            self.water_usage = Some(format!("{} {}", &caps[1], &caps[2]));
        }
    }
}

/// Session-scoped mutable state. Only the engine writes to it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationContext {
    pub stage: Stage,
    pub slots: Slots,
    /// Auxiliary bookkeeping such as `last_interaction` and message counters.
    pub memory: BTreeMap<String, Value>,
}

impl ConversationContext {
    pub(crate) fn remember(&mut self, key: &str, value: impl Into<Value>) {
        self.memory.insert(key.to_string(), value.into());
    }
}

/// Signed-in user details supplied by the host application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl UserProfile {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            display_name: Some(name.into()),
            ..Self::default()
        }
    }
}

/// Snapshot of a session for hand-off to notification channels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: Uuid,
    pub industry: String,
    pub stage: Stage,
    pub slots: Slots,
    pub message_count: usize,
    pub elapsed_minutes: i64,
    pub started_at: DateTime<Utc>,
    pub user: Option<UserProfile>,
}

/// One user's conversation with the assistant.
///
/// Messages are append-only and alternate assistant/user starting with the
/// welcome message.
#[derive(Debug, Clone)]
pub struct ChatSession {
    id: Uuid,
    industry: String,
    messages: Vec<Message>,
    context: ConversationContext,
    started_at: DateTime<Utc>,
    user: Option<UserProfile>,
}

impl ChatSession {
    /// Open a session for `industry` and post the welcome message.
    ///
    /// Unknown industry keys get the generic welcome.
    ///
    /// ```
    /// use ecochat::{ChatSession, KnowledgeBase, Role, Stage};
    ///
    /// let session = ChatSession::start("aerospace", KnowledgeBase::builtin());
    /// assert_eq!(session.messages().len(), 1);
    /// assert_eq!(session.messages()[0].role, Role::Assistant);
    /// assert_eq!(session.context().stage, Stage::Opening);
    /// ```
    pub fn start(industry: impl Into<String>, kb: &KnowledgeBase) -> Self {
        let industry = industry.into();
        let welcome = welcome_message(kb.industry_profile(&industry));
        let started_at = Utc::now();
        let mut session = Self {
            id: Uuid::new_v4(),
            industry,
            messages: Vec::new(),
            context: ConversationContext::default(),
            started_at,
            user: None,
        };
        session.append_assistant_turn(welcome, None);
        session
    }

    /// Attach the signed-in user.
    pub fn with_user(mut self, user: UserProfile) -> Self {
        self.user = Some(user);
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn industry(&self) -> &str {
        &self.industry
    }

    pub fn industry_profile(&self, kb: &KnowledgeBase) -> Option<&'static IndustryProfile> {
        kb.industry_profile(&self.industry)
    }

    pub fn user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }

    pub fn user_name(&self) -> Option<&str> {
        self.user.as_ref()?.display_name.as_deref()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn context(&self) -> &ConversationContext {
        &self.context
    }

    pub(crate) fn context_mut(&mut self) -> &mut ConversationContext {
        &mut self.context
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn user_message_count(&self) -> usize {
        self.messages.iter().filter(|m| m.role == Role::User).count()
    }

    /// Store a user message.
    pub fn append_user_turn(
        &mut self,
        text: impl Into<String>,
        classification: Option<Classification>,
    ) {
        self.push(Role::User, text.into(), classification);
    }

    /// Store an assistant message.
    pub fn append_assistant_turn(
        &mut self,
        text: impl Into<String>,
        classification: Option<Classification>,
    ) {
        self.push(Role::Assistant, text.into(), classification);
    }

    fn push(&mut self, role: Role, content: String, classification: Option<Classification>) {
        self.messages.push(Message {
            role,
            content,
            timestamp: Utc::now(),
            classification,
        });
    }

    /// Derive the stage from the number of user messages and store it.
    pub fn recompute_stage(&mut self) -> Stage {
        self.context.stage = Stage::from_user_messages(self.user_message_count());
        self.context.stage
    }

    pub fn summarize(&self) -> SessionSummary {
        self.summarize_at(Utc::now())
    }

    /// Summary as seen at `now`. Elapsed time never goes negative.
    pub fn summarize_at(&self, now: DateTime<Utc>) -> SessionSummary {
        SessionSummary {
            session_id: self.id,
            industry: self.industry.clone(),
            stage: self.context.stage,
            slots: self.context.slots.clone(),
            message_count: self.messages.len(),
            elapsed_minutes: (now - self.started_at).num_minutes().max(0),
            started_at: self.started_at,
            user: self.user.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::Classifier;
    use chrono::Duration;

    fn kb() -> &'static KnowledgeBase {
        KnowledgeBase::builtin()
    }

    #[test]
    fn stage_follows_user_message_count() {
        let mut s = ChatSession::start("retail", kb());
        let expected = [
            Stage::Opening,
            Stage::Discovery,
            Stage::Discovery,
            Stage::Qualification,
            Stage::Qualification,
        ];
        for stage in expected {
            s.append_user_turn("hi", None);
            s.append_assistant_turn("ok", None);
            assert_eq!(s.recompute_stage(), stage);
        }
    }

    #[test]
    fn known_industry_welcome_mentions_it() {
        let s = ChatSession::start("Manufacturing", kb());
        assert!(s.messages()[0].content.contains("Manufaktur"));
        assert!(s.industry_profile(kb()).is_some());
    }

    #[test]
    fn slots_collect_entities_and_keywords() {
        let text = "Saya direktur, tagihan listrik boros, pakai 12.000 kWh dan 300 m3 air, budget 2 miliar segera";
        let c = Classifier::default().classify(text, "retail");
        let mut slots = Slots::default();
        slots.absorb(text, &c.entities, kb());
        assert_eq!(slots.budget_range.as_deref(), Some("2 miliar"));
        assert_eq!(slots.timeline.as_deref(), Some("segera"));
        assert_eq!(slots.energy_usage.as_deref(), Some("12.000 kWh"));
        assert_eq!(slots.water_usage.as_deref(), Some("300 m3"));
        assert!(slots.decision_maker);
        assert_eq!(slots.pain_points, vec!["high_energy_bill", "energy_waste"]);

        slots.absorb("tagihan naik lagi", &[], kb());
        assert_eq!(slots.pain_points.len(), 2);
    }

    #[test]
    fn summary_clamps_elapsed_minutes() {
        let s = ChatSession::start("education", kb()).with_user(UserProfile::named("Sari"));
        let summary = s.summarize_at(s.started_at() - Duration::minutes(5));
        assert_eq!(summary.elapsed_minutes, 0);
        let later = s.summarize_at(s.started_at() + Duration::minutes(7));
        assert_eq!(later.elapsed_minutes, 7);
        assert_eq!(later.message_count, 1);
        assert_eq!(later.user.unwrap().display_name.as_deref(), Some("Sari"));
    }
}
