use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Where and how leads are handed off once a conversation qualifies.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HandoffConfig {
    /// WhatsApp number in international format without `+`.
    #[serde(default)]
    pub whatsapp_number: Option<String>,
    /// Notification template id passed to the notifier.
    #[serde(default = "default_template_id")]
    pub template_id: String,
    /// Directory for local JSON backups when the lead store fails.
    #[serde(default)]
    pub backup_dir: Option<PathBuf>,
}

fn default_template_id() -> String {
    "lead_notification".into()
}

impl Default for HandoffConfig {
    fn default() -> Self {
        Self {
            whatsapp_number: None,
            template_id: default_template_id(),
            backup_dir: None,
        }
    }
}

/// Engine settings read from the `[ecochat]` table of a TOML file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EngineConfig {
    /// Industry key for new sessions. Empty means generic content.
    #[serde(default)]
    pub industry: String,
    /// Seed for deterministic template selection.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub handoff: HandoffConfig,
}

impl EngineConfig {
    /// Load configuration from a TOML file containing an `[ecochat]` table.
    pub async fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let text = tokio::fs::read_to_string(path).await?;
        Self::parse(&text)
    }

    /// Parse TOML text. A missing `[ecochat]` table yields the defaults.
    pub fn parse(text: &str) -> anyhow::Result<Self> {
        #[derive(Deserialize)]
        struct Root {
            #[serde(default)]
            ecochat: EngineConfig,
        }
        let root: Root = toml::from_str(text)?;
        Ok(root.ecochat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn parses_full_table() {
        let cfg = EngineConfig::parse(
            r#"
[ecochat]
industry = "property"
seed = 42
user_name = "Budi"

[ecochat.handoff]
whatsapp_number = "6281234567890"
backup_dir = "/tmp/leads"
"#,
        )
        .unwrap();
        assert_eq!(cfg.industry, "property");
        assert_eq!(cfg.seed, Some(42));
        assert_eq!(cfg.user_name.as_deref(), Some("Budi"));
        assert_eq!(cfg.handoff.whatsapp_number.as_deref(), Some("6281234567890"));
        assert_eq!(cfg.handoff.template_id, "lead_notification");
        assert_eq!(cfg.handoff.backup_dir, Some(PathBuf::from("/tmp/leads")));
    }

    #[test]
    fn missing_table_uses_defaults() {
        let cfg = EngineConfig::parse("[other]\nx = 1\n").unwrap();
        assert_eq!(cfg, EngineConfig::default());
        assert_eq!(cfg.handoff.template_id, "lead_notification");
    }

    #[test]
    fn rejects_wrong_types() {
        assert!(EngineConfig::parse("[ecochat]\nseed = \"soon\"\n").is_err());
    }

    #[tokio::test]
    async fn loads_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ecochat.toml");
        tokio::fs::write(&path, "[ecochat]\nindustry = \"retail\"\n")
            .await
            .unwrap();
        let cfg = EngineConfig::load(&path).await.unwrap();
        assert_eq!(cfg.industry, "retail");
    }
}
