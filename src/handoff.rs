//! Passing qualified conversations on to people.
//!
//! The chat core never talks to the outside world. Once a host decides a
//! conversation should be followed up, [`HandOff::submit`] stores a lead
//! record, notifies the sales team and prepares a WhatsApp deep link. Any of
//! these may fail; failures are logged and compensated, never surfaced.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::HandoffConfig;
use crate::error::HandoffError;
use crate::session::SessionSummary;

/// Contact details captured by the lead form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadForm {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub message: Option<String>,
}

/// A flat record handed to a [`LeadStore`].
#[derive(Debug, Clone, PartialEq)]
pub struct LeadRecord {
    pub fields: Map<String, Value>,
    /// Ask the store to stamp the record with its own clock.
    pub server_timestamp: bool,
}

/// Append-only store for lead records.
#[async_trait]
pub trait LeadStore: Send + Sync {
    /// Store `record` and return its generated id.
    async fn append(&self, record: LeadRecord) -> Result<String, HandoffError>;
}

/// Outbound notification service (e.g. transactional email).
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(
        &self,
        template_id: &str,
        params: &BTreeMap<String, String>,
    ) -> Result<(), HandoffError>;
}

/// [`LeadStore`] keeping records in memory.
#[derive(Debug, Default)]
pub struct InMemoryLeadStore {
    records: Mutex<Vec<(String, LeadRecord)>>,
}

impl InMemoryLeadStore {
    /// Stored records with their ids, oldest first.
    pub async fn records(&self) -> Vec<(String, LeadRecord)> {
        self.records.lock().await.clone()
    }
}

#[async_trait]
impl LeadStore for InMemoryLeadStore {
    async fn append(&self, mut record: LeadRecord) -> Result<String, HandoffError> {
        let id = Uuid::new_v4().simple().to_string();
        if record.server_timestamp {
            record
                .fields
                .insert("created_at".into(), Value::String(Utc::now().to_rfc3339()));
        }
        self.records.lock().await.push((id.clone(), record));
        Ok(id)
    }
}

/// [`Notifier`] that only writes the notification to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(
        &self,
        template_id: &str,
        params: &BTreeMap<String, String>,
    ) -> Result<(), HandoffError> {
        info!(template = template_id, ?params, "lead notification");
        Ok(())
    }
}

/// Build a `wa.me` deep link with the lines as a pre-filled message.
///
/// ```
/// use ecochat::whatsapp_link;
///
/// let link = whatsapp_link("6281234567890", &["Halo".into(), "Nama: Budi".into()]);
/// assert_eq!(link, "https://wa.me/6281234567890?text=Halo%0ANama%3A%20Budi");
/// ```
pub fn whatsapp_link(number: &str, lines: &[String]) -> String {
    let digits: String = number.chars().filter(char::is_ascii_digit).collect();
    format!(
        "https://wa.me/{}?text={}",
        digits,
        urlencoding::encode(&lines.join("\n"))
    )
}

/// What happened during [`HandOff::submit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandoffReceipt {
    pub record_id: Option<String>,
    pub notified: bool,
    pub backup_path: Option<PathBuf>,
    pub whatsapp_link: Option<String>,
    /// Text to show the user.
    pub confirmation: String,
}

/// Coordinates the lead store, the notifier and the WhatsApp fallback.
pub struct HandOff {
    store: Arc<dyn LeadStore>,
    notifier: Arc<dyn Notifier>,
    config: HandoffConfig,
}

impl HandOff {
    pub fn new(
        store: Arc<dyn LeadStore>,
        notifier: Arc<dyn Notifier>,
        config: HandoffConfig,
    ) -> Self {
        Self {
            store,
            notifier,
            config,
        }
    }

    /// Record and announce a lead. Never fails; see [`HandoffReceipt`].
    pub async fn submit(&self, summary: &SessionSummary, lead: &LeadForm) -> HandoffReceipt {
        let fields = lead_fields(summary, lead);
        let record = LeadRecord {
            fields: fields.clone(),
            server_timestamp: true,
        };

        let mut backup_path = None;
        let record_id = match self.store.append(record).await {
            Ok(id) => {
                info!(record = %id, session = %summary.session_id, "lead stored");
                Some(id)
            }
            Err(e) => {
                warn!(error = %e, session = %summary.session_id, "lead store unavailable");
                backup_path = self.backup(summary, &fields).await;
                None
            }
        };

        let mut params = flatten(&fields);
        if let Some(id) = &record_id {
            params.insert("record_id".into(), id.clone());
        }
        let notified = match self.notifier.send(&self.config.template_id, &params).await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, template = %self.config.template_id, "lead notification failed");
                false
            }
        };

        let whatsapp_link = self
            .config
            .whatsapp_number
            .as_deref()
            .map(|n| whatsapp_link(n, &whatsapp_lines(summary, lead)));
        let confirmation = confirmation(
            lead,
            record_id.as_deref(),
            notified,
            backup_path.is_some(),
            whatsapp_link.is_some(),
        );
        HandoffReceipt {
            record_id,
            notified,
            backup_path,
            whatsapp_link,
            confirmation,
        }
    }

    async fn backup(&self, summary: &SessionSummary, fields: &Map<String, Value>) -> Option<PathBuf> {
        let dir = self.config.backup_dir.as_ref()?;
        let path = dir.join(format!("lead-{}.json", summary.session_id));
        match write_backup(&path, fields).await {
            Ok(()) => {
                info!(path = %path.display(), "lead backed up locally");
                Some(path)
            }
            Err(e) => {
                warn!(error = %e, path = %path.display(), "lead backup failed");
                None
            }
        }
    }
}

async fn write_backup(path: &std::path::Path, fields: &Map<String, Value>) -> Result<(), HandoffError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let bytes = serde_json::to_vec_pretty(fields)?;
    tokio::fs::write(path, bytes).await?;
    Ok(())
}

fn lead_fields(summary: &SessionSummary, lead: &LeadForm) -> Map<String, Value> {
    let mut fields = Map::new();
    let mut put = |key: &str, value: Value| {
        if !value.is_null() {
            fields.insert(key.to_string(), value);
        }
    };
    put("name", lead.name.clone().into());
    put("email", lead.email.clone().into());
    put("phone", lead.phone.clone().into());
    put("company", lead.company.clone().into());
    put("message", lead.message.clone().into());
    put("source", "chat_widget".into());
    put("session_id", summary.session_id.to_string().into());
    put("industry", summary.industry.clone().into());
    put("stage", serde_json::to_value(summary.stage).unwrap_or(Value::Null));
    put("message_count", summary.message_count.into());
    put("elapsed_minutes", summary.elapsed_minutes.into());
    let slots = &summary.slots;
    put("budget_range", slots.budget_range.clone().into());
    put("timeline", slots.timeline.clone().into());
    put("facility_size", slots.facility_size.clone().into());
    put("energy_usage", slots.energy_usage.clone().into());
    put("water_usage", slots.water_usage.clone().into());
    put("decision_maker", slots.decision_maker.into());
    if !slots.pain_points.is_empty() {
        put("pain_points", slots.pain_points.join(", ").into());
    }
    fields
}

fn flatten(fields: &Map<String, Value>) -> BTreeMap<String, String> {
    fields
        .iter()
        .map(|(k, v)| {
            let v = match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (k.clone(), v)
        })
        .collect()
}

fn whatsapp_lines(summary: &SessionSummary, lead: &LeadForm) -> Vec<String> {
    let mut lines = vec![format!("Halo EcoSense, saya {}.", lead.name)];
    let optional = [
        ("Perusahaan", lead.company.as_deref()),
        ("Email", lead.email.as_deref()),
        ("Telepon", lead.phone.as_deref()),
        ("Industri", Some(summary.industry.as_str()).filter(|i| !i.is_empty())),
        ("Budget", summary.slots.budget_range.as_deref()),
        ("Timeline", summary.slots.timeline.as_deref()),
        ("Pesan", lead.message.as_deref()),
    ];
    for (label, value) in optional {
        if let Some(value) = value {
            lines.push(format!("{label}: {value}"));
        }
    }
    lines
}

fn confirmation(
    lead: &LeadForm,
    record_id: Option<&str>,
    notified: bool,
    backed_up: bool,
    has_link: bool,
) -> String {
    let name = &lead.name;
    match record_id {
        Some(id) => {
            let short: String = id.chars().take(8).collect();
            let follow_up = if notified {
                "Tim kami akan menghubungi Anda melalui email dalam 1x24 jam."
            } else if has_link {
                "Tim kami akan menghubungi Anda melalui WhatsApp."
            } else {
                "Tim kami akan segera menghubungi Anda."
            };
            format!(
                "✅ Terima kasih {name}! Permintaan Anda tercatat dengan nomor #{short}. {follow_up}"
            )
        }
        None => {
            let saved = if backed_up {
                "Data Anda kami simpan sementara."
            } else {
                "Data Anda belum berhasil kami simpan."
            };
            let next = if has_link {
                "Silakan lanjutkan lewat WhatsApp agar tim kami bisa segera membantu."
            } else {
                "Silakan coba lagi beberapa saat lagi."
            };
            format!("⚠️ Terima kasih {name}! {saved} {next}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_strips_formatting_from_number() {
        let link = whatsapp_link("+62 812-3456", &["Hai".into()]);
        assert_eq!(link, "https://wa.me/628123456?text=Hai");
    }

    #[test]
    fn confirmation_truncates_record_id() {
        let lead = LeadForm {
            name: "Budi".into(),
            ..LeadForm::default()
        };
        let text = confirmation(&lead, Some("abcdef0123456789"), true, false, true);
        assert!(text.contains("#abcdef01."));
        assert!(text.contains("email"));
    }

    #[test]
    fn confirmation_mentions_only_available_channels() {
        let lead = LeadForm {
            name: "Budi".into(),
            ..LeadForm::default()
        };
        assert!(confirmation(&lead, Some("abc"), false, false, true).contains("WhatsApp"));
        let no_link = confirmation(&lead, Some("abc"), false, false, false);
        assert!(!no_link.contains("WhatsApp"));
        assert!(no_link.contains("segera menghubungi"));

        let saved = confirmation(&lead, None, true, true, true);
        assert!(saved.contains("simpan sementara"));
        let lost = confirmation(&lead, None, true, false, false);
        assert!(!lost.contains("simpan sementara"));
        assert!(lost.contains("belum berhasil"));
        assert!(!lost.contains("WhatsApp"));
    }

    #[test]
    fn flatten_keeps_strings_unquoted() {
        let mut fields = Map::new();
        fields.insert("name".into(), "Budi".into());
        fields.insert("count".into(), 3.into());
        let flat = flatten(&fields);
        assert_eq!(flat["name"], "Budi");
        assert_eq!(flat["count"], "3");
    }

    #[tokio::test]
    async fn in_memory_store_stamps_records() {
        let store = InMemoryLeadStore::default();
        let id = store
            .append(LeadRecord {
                fields: Map::new(),
                server_timestamp: true,
            })
            .await
            .unwrap();
        let records = store.records().await;
        assert_eq!(records[0].0, id);
        assert!(records[0].1.fields.contains_key("created_at"));
    }
}
