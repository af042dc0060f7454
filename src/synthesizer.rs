use rand::Rng;
use serde::Serialize;
use tracing::{trace, warn};

use crate::classifier::{Classification, ClassificationKind};
use crate::entities::EntityKind;
use crate::knowledge::{IndustryProfile, KnowledgeBase, KnowledgeEntry, PRODUCT_NAME, random_template};
use crate::session::Stage;
use crate::template::render_template;

/// Footer appended to every synthesized reply.
pub const SIGNATURE: &str = "\n\n---\n🌱 *EcoSense Assistant* | Hemat energi, bisnis lebih hijau";

/// Reply to empty input.
pub const CLARIFICATION: &str = "Sepertinya pesan Anda masih kosong 🙂 Coba tanyakan soal harga, ROI, atau cara kerja EcoSense.";

const TOPIC_TEMPLATE: &str = "📌 **{title}**\n\n{summary}\n\n✨ **Fitur utama:**\n{features}\n\n📈 **Manfaat:**\n{benefits}";

const INDUSTRY_TEMPLATES: &[(&str, &str)] = &[
    (
        "manufacturing",
        "🏭 **EcoSense untuk {name}**\n\n🎯 **Nilai utama:** pantau konsumsi setiap lini produksi dan temukan mesin idle yang diam-diam menguras listrik.\n\n💰 **Dampak finansial:**\n• Penghematan energi {savings}\n• Estimasi hemat {monthly} per bulan\n• Balik modal dalam {roi}\n\n📊 **Studi kasus:** {case_study}\n\n🔧 **Rekomendasi:** mulai dengan {sensors}. Instalasi {install} tanpa menghentikan produksi. Dipercaya oleh {clients}.",
    ),
    (
        "property",
        "🏢 **EcoSense untuk {name}**\n\n🎯 **Nilai utama:** satu dashboard untuk seluruh gedung, lengkap dengan tagihan per tenant yang transparan.\n\n💰 **Dampak finansial:**\n• Biaya operasional gedung turun {savings}\n• Potensi hemat {monthly} per bulan\n• ROI {roi}\n\n📊 **Studi kasus:** {case_study}\n\n🔧 **Rekomendasi:** pasang {sensors} di zona dengan beban tertinggi. Implementasi {install}. Referensi: {clients}.",
    ),
    (
        "retail",
        "🛒 **EcoSense untuk {name}**\n\n🎯 **Nilai utama:** bandingkan performa energi antar gerai dan dapatkan peringatan saat chiller bermasalah sebelum stok rusak.\n\n💰 **Dampak finansial:**\n• Hemat {savings} biaya energi\n• Sekitar {monthly}\n• Balik modal {roi}\n\n📊 **Studi kasus:** {case_study}\n\n🔧 **Rekomendasi:** gunakan {sensors}. Pemasangan {install}. Sudah dipakai {clients}.",
    ),
    (
        "hospitality",
        "🏨 **EcoSense untuk {name}**\n\n🎯 **Nilai utama:** kenyamanan tamu tetap terjaga sementara listrik dan air di kamar kosong otomatis terkontrol.\n\n💰 **Dampak finansial:**\n• Penghematan {savings}\n• Estimasi {monthly} per bulan\n• ROI {roi}\n\n📊 **Studi kasus:** {case_study}\n\n🔧 **Rekomendasi:** kombinasikan {sensors}. Instalasi {install} di luar jam sibuk. Mitra kami: {clients}.",
    ),
    (
        "education",
        "🎓 **EcoSense untuk {name}**\n\n🎯 **Nilai utama:** kampus lebih hemat sekaligus menjadi laboratorium hidup untuk edukasi keberlanjutan.\n\n💰 **Dampak finansial:**\n• Hemat energi {savings}\n• Sekitar {monthly} per bulan\n• Balik modal {roi}\n\n📊 **Studi kasus:** {case_study}\n\n🔧 **Rekomendasi:** mulai dari {sensors}. Instalasi {install}, bisa saat libur semester. Institusi pengguna: {clients}.",
    ),
];

/// Values available to the dedicated industry templates.
#[derive(Serialize)]
struct IndustryParams<'a> {
    name: &'a str,
    savings: &'a str,
    roi: &'a str,
    monthly: &'a str,
    case_study: &'a str,
    sensors: String,
    install: &'a str,
    clients: String,
}

impl<'a> From<&'a IndustryProfile> for IndustryParams<'a> {
    fn from(p: &'a IndustryProfile) -> Self {
        Self {
            name: p.display_name,
            savings: p.savings_range,
            roi: p.roi_range,
            monthly: p.monthly_savings,
            case_study: p.case_study,
            sensors: p.sensor_types.join(", "),
            install: p.install_duration,
            clients: p.reference_clients.join(", "),
        }
    }
}

/// Values for the generic topic layout.
#[derive(Serialize)]
struct TopicParams<'a> {
    title: &'a str,
    summary: &'a str,
    features: String,
    benefits: String,
}

/// Values for intent templates.
#[derive(Serialize)]
struct IntentParams<'a> {
    product: &'a str,
    industry_name: &'a str,
}

/// Per-turn inputs the synthesizer needs besides the classification.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderContext<'a> {
    pub user_name: Option<&'a str>,
    /// Profile of the session's industry, if the key is known.
    pub industry: Option<&'static IndustryProfile>,
    /// Stage the conversation will be in once this turn is stored.
    pub stage: Stage,
}

/// Turns a [`Classification`] into reply text.
#[derive(Debug, Clone, Copy)]
pub struct Synthesizer {
    kb: &'static KnowledgeBase,
}

impl Default for Synthesizer {
    fn default() -> Self {
        Self::new(KnowledgeBase::builtin())
    }
}

impl Synthesizer {
    pub fn new(kb: &'static KnowledgeBase) -> Self {
        Self { kb }
    }

    /// Render the reply for `classification`, personalized and signed.
    pub fn render<R: Rng + ?Sized>(
        &self,
        classification: &Classification,
        ctx: &RenderContext<'_>,
        rng: &mut R,
    ) -> String {
        let body = match classification.kind {
            ClassificationKind::Greeting
            | ClassificationKind::Farewell
            | ClassificationKind::Thanks => self.render_act(&classification.name, rng),
            ClassificationKind::Topic => self.render_topic(&classification.name, rng),
            ClassificationKind::Industry => self.render_industry(&classification.name, rng),
            ClassificationKind::Intent => self.render_intent(classification, ctx, rng),
        };
        finish(body, ctx.user_name)
    }

    /// One of the generic replies, unsigned.
    pub fn fallback<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        random_template(rng, self.kb.fallbacks)
            .unwrap_or(CLARIFICATION)
            .to_string()
    }

    fn render_act<R: Rng + ?Sized>(&self, name: &str, rng: &mut R) -> String {
        match self.kb.act(name).and_then(|a| random_template(rng, a.templates)) {
            Some(text) => text.to_string(),
            None => self.fallback(rng),
        }
    }

    fn render_topic<R: Rng + ?Sized>(&self, key: &str, rng: &mut R) -> String {
        let Some(entry) = self.kb.topic(key) else {
            return self.fallback(rng);
        };
        let summary = random_template(rng, entry.templates).unwrap_or_default();
        let params = TopicParams {
            title: entry.display_name,
            summary,
            features: bullets(entry.features.iter().map(|f| f.to_string())),
            benefits: bullets(entry.benefits.iter().map(|b| b.to_string())),
        };
        let body = self.render_or_fallback(entry.key, TOPIC_TEMPLATE, &params, rng);
        with_follow_up(body, entry, rng)
    }

    fn render_industry<R: Rng + ?Sized>(&self, key: &str, rng: &mut R) -> String {
        let Some(profile) = self.kb.industry_profile(key) else {
            return self.fallback(rng);
        };
        let dedicated: Vec<&'static str> = INDUSTRY_TEMPLATES
            .iter()
            .filter(|(k, _)| *k == profile.key)
            .map(|(_, t)| *t)
            .collect();
        match random_template(rng, &dedicated) {
            Some(template) => {
                let params = IndustryParams::from(profile);
                self.render_or_fallback(profile.key, template, &params, rng)
            }
            None => {
                trace!(industry = profile.key, "no dedicated template, using topic layout");
                let params = TopicParams {
                    title: profile.display_name,
                    summary: profile.case_study,
                    features: bullets(profile.sensor_types.iter().map(|s| s.to_string())),
                    benefits: bullets(
                        [
                            format!("Potensi penghematan {}", profile.savings_range),
                            format!("Estimasi hemat {} per bulan", profile.monthly_savings),
                            format!("ROI {}", profile.roi_range),
                        ]
                        .into_iter(),
                    ),
                };
                self.render_or_fallback(profile.key, TOPIC_TEMPLATE, &params, rng)
            }
        }
    }

    fn render_intent<R: Rng + ?Sized>(
        &self,
        classification: &Classification,
        ctx: &RenderContext<'_>,
        rng: &mut R,
    ) -> String {
        let entry = self.kb.intent(&classification.name);
        let template = entry.and_then(|e| random_template(rng, e.templates));
        let (Some(entry), Some(template)) = (entry, template) else {
            return self.fallback(rng);
        };
        let params = IntentParams {
            product: PRODUCT_NAME,
            industry_name: ctx.industry.map_or("bisnis Anda", |p| p.display_name),
        };
        let mut body = self.render_or_fallback(entry.key, template, &params, rng);

        if entry.key == "price_inquiry" {
            if let Some(budget) = classification.entity(EntityKind::Budget) {
                body.push_str(&format!(
                    "\n\n💼 Dengan budget sekitar {}, tim kami bisa menyusun paket yang pas untuk Anda.",
                    budget.display()
                ));
            }
        }
        if let Some(profile) = ctx.industry {
            body.push_str(&format!(
                "\n\n🏭 Untuk industri {}: potensi hemat {} dengan ROI {}.",
                profile.display_name, profile.savings_range, profile.roi_range
            ));
            match ctx.stage {
                Stage::Opening => {}
                Stage::Discovery => push_paragraph(&mut body, profile.script.middle),
                Stage::Qualification => push_paragraph(&mut body, profile.script.closing),
            }
        }
        with_follow_up(body, entry, rng)
    }

    fn render_or_fallback<T: Serialize, R: Rng + ?Sized>(
        &self,
        key: &str,
        template: &str,
        params: &T,
        rng: &mut R,
    ) -> String {
        match render_template(template, params) {
            Ok(text) => text,
            Err(e) => {
                warn!(?e, template = key, "reply template failed to render");
                self.fallback(rng)
            }
        }
    }
}

/// Greeting shown when a session opens.
pub fn welcome_message(profile: Option<&IndustryProfile>) -> String {
    match profile {
        Some(p) => format!(
            "Halo! 👋 Saya asisten virtual {PRODUCT_NAME} untuk industri **{}**.\n\n{}\n\nSilakan tanyakan soal harga, ROI, atau studi kasus. 🌱",
            p.display_name, p.script.opening
        ),
        None => format!(
            "Halo! 👋 Saya asisten virtual {PRODUCT_NAME}. Saya bisa membantu menjelaskan cara memantau dan menghemat energi serta air di bisnis Anda.\n\nSilakan tanyakan soal harga, ROI, atau studi kasus. 🌱"
        ),
    }
}

fn finish(body: String, user_name: Option<&str>) -> String {
    let mut out = String::new();
    if let Some(name) = user_name.map(str::trim).filter(|n| !n.is_empty()) {
        out.push_str(&format!("Hai {name}! 👋\n\n"));
    }
    out.push_str(&body);
    out.push_str(SIGNATURE);
    out
}

fn bullets(items: impl Iterator<Item = String>) -> String {
    items.map(|i| format!("• {i}")).collect::<Vec<_>>().join("\n")
}

fn push_paragraph(body: &mut String, text: &str) {
    body.push_str("\n\n");
    body.push_str(text);
}

fn with_follow_up<R: Rng + ?Sized>(
    mut body: String,
    entry: &KnowledgeEntry,
    rng: &mut R,
) -> String {
    if let Some(question) = random_template(rng, entry.follow_ups) {
        body.push_str(&format!("\n\n💬 {question}"));
    }
    body
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::Classifier;
    use rand::rngs::mock::StepRng;

    fn rng() -> StepRng {
        StepRng::new(0, 0)
    }

    fn render(text: &str, ctx: &RenderContext<'_>) -> String {
        let c = Classifier::default().classify(text, "");
        Synthesizer::default().render(&c, ctx, &mut rng())
    }

    #[test]
    fn greeting_uses_first_template_with_zero_rng() {
        let out = render("halo", &RenderContext::default());
        let first = KnowledgeBase::builtin().act("greeting").unwrap().templates[0];
        assert_eq!(out, format!("{first}{SIGNATURE}"));
    }

    #[test]
    fn personalization_prefixes_name() {
        let ctx = RenderContext {
            user_name: Some("Budi"),
            ..RenderContext::default()
        };
        let out = render("terima kasih", &ctx);
        assert!(out.starts_with("Hai Budi! 👋\n\n"));
        assert!(out.ends_with(SIGNATURE));
    }

    #[test]
    fn blank_name_is_ignored() {
        let ctx = RenderContext {
            user_name: Some("  "),
            ..RenderContext::default()
        };
        assert!(!render("halo", &ctx).starts_with("Hai"));
    }

    #[test]
    fn topic_lists_features_and_benefits() {
        let out = render("ceritakan tentang EcoSense", &RenderContext::default());
        assert!(out.starts_with("📌 **EcoSense**"));
        assert!(out.contains("• Dashboard real-time di web dan aplikasi mobile"));
        assert!(out.contains("• ROI rata-rata di bawah 18 bulan"));
        assert!(out.contains("💬 Mau saya jelaskan paket harganya?"));
    }

    #[test]
    fn dedicated_industry_template_fills_profile() {
        let out = render("kami di perhotelan", &RenderContext::default());
        assert!(out.starts_with("🏨 **EcoSense untuk Perhotelan**"));
        assert!(out.contains("Penghematan 18-30%"));
        assert!(out.contains("Samudra Resort, Hotel Cendana"));
        assert!(out.contains("📊 **Studi kasus:**"));
    }

    #[test]
    fn industry_without_template_uses_topic_layout() {
        let out = render("rumah sakit, sektor kesehatan", &RenderContext::default());
        assert!(out.starts_with("📌 **Kesehatan**"));
        assert!(out.contains("• sensor suhu cold chain"));
        assert!(out.contains("• ROI 16-24 bulan"));
    }

    #[test]
    fn price_reply_mentions_budget_and_industry() {
        let kb = KnowledgeBase::builtin();
        let ctx = RenderContext {
            industry: kb.industry_profile("manufacturing"),
            stage: Stage::Qualification,
            ..RenderContext::default()
        };
        let out = render("budget sekitar 500 juta", &ctx);
        assert!(out.starts_with("💰 **Paket Harga EcoSense**"));
        assert!(out.contains("dukungan teknis untuk Manufaktur."));
        assert!(out.contains("Dengan budget sekitar 500 juta"));
        assert!(out.contains("potensi hemat 20-35% dengan ROI 12-18 bulan"));
        assert!(out.contains(kb.industry_profile("manufacturing").unwrap().script.closing));
    }

    #[test]
    fn opening_stage_adds_no_script_line() {
        let kb = KnowledgeBase::builtin();
        let profile = kb.industry_profile("retail").unwrap();
        let ctx = RenderContext {
            industry: Some(profile),
            ..RenderContext::default()
        };
        let out = render("kenapa harus pakai ini?", &ctx);
        assert!(!out.contains(profile.script.middle));
        assert!(!out.contains(profile.script.closing));
    }

    #[test]
    fn unknown_intent_falls_back() {
        let out = render("qwerty", &RenderContext::default());
        let first = KnowledgeBase::builtin().fallbacks[0];
        assert_eq!(out, format!("{first}{SIGNATURE}"));
    }

    #[test]
    fn welcome_for_unknown_industry_is_generic() {
        let text = welcome_message(None);
        assert!(text.contains("asisten virtual EcoSense."));
    }
}
