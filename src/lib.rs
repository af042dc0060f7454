//! Rule-based chat engine for the EcoSense marketing site.
//!
//! A [`ChatEngine`] classifies each visitor utterance against a static
//! [`KnowledgeBase`], renders a templated reply and keeps the conversation in
//! a [`ChatSession`]. Qualified conversations can be passed to people through
//! [`HandOff`].

mod classifier;
pub mod config;
mod engine;
mod entities;
pub mod error;
pub mod handoff;
pub mod knowledge;
pub mod repl;
mod session;
mod synthesizer;
mod template;

pub use classifier::{Classification, ClassificationKind, Classifier, GENERAL_INQUIRY};
pub use config::{EngineConfig, HandoffConfig};
pub use engine::{ChatEngine, Reply};
pub use entities::{Entity, EntityKind, extract_entities};
pub use error::HandoffError;
pub use handoff::{
    HandOff, HandoffReceipt, InMemoryLeadStore, LeadForm, LeadRecord, LeadStore, LogNotifier,
    Notifier, whatsapp_link,
};
pub use knowledge::{IndustryProfile, KnowledgeBase, KnowledgeEntry, PRODUCT_NAME};
pub use session::{
    ChatSession, ConversationContext, Message, Role, SessionSummary, Slots, Stage, UserProfile,
};
pub use synthesizer::{CLARIFICATION, RenderContext, SIGNATURE, Synthesizer, welcome_message};
pub use template::render_template;
