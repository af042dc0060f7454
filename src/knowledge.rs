//! Static knowledge consulted by the classifier and the synthesizer.
//!
//! Everything here is constant data. The tables are built at compile time and
//! shared through [`KnowledgeBase::builtin`]; nothing in the crate mutates
//! them.

use rand::Rng;
use rand::seq::SliceRandom;

/// Product name used in rendered replies.
pub const PRODUCT_NAME: &str = "EcoSense";

/// A keyword-triggered entry mapping to response templates.
#[derive(Debug, PartialEq, Eq)]
pub struct KnowledgeEntry {
    /// Stable identifier, e.g. `"price_inquiry"` or `"ecosense"`.
    pub key: &'static str,
    /// Human readable name. Topic detection matches on it too.
    pub display_name: &'static str,
    /// Lowercase trigger phrases, matched as substrings.
    pub keywords: &'static [&'static str],
    /// Template pool. One is picked at random per reply.
    pub templates: &'static [&'static str],
    /// Feature bullet points (topics only).
    pub features: &'static [&'static str],
    /// Benefit bullet points (topics only).
    pub benefits: &'static [&'static str],
    /// Optional follow-up questions appended to a reply.
    pub follow_ups: &'static [&'static str],
}

impl KnowledgeEntry {
    /// Number of trigger keywords contained in `lowered`.
    ///
    /// `lowered` must already be lowercase.
    pub fn hits(&self, lowered: &str) -> usize {
        self.keywords.iter().filter(|k| lowered.contains(*k)).count()
    }

    /// Whether `lowered` mentions this entry by key or display name.
    pub fn is_named_in(&self, lowered: &str) -> bool {
        names_in(self.key, self.display_name, lowered)
    }
}

/// Opening, middle and closing sales lines for one industry.
#[derive(Debug, PartialEq, Eq)]
pub struct ScriptFragments {
    pub opening: &'static str,
    pub middle: &'static str,
    pub closing: &'static str,
}

/// Facts about one target industry.
#[derive(Debug, PartialEq, Eq)]
pub struct IndustryProfile {
    pub key: &'static str,
    pub display_name: &'static str,
    pub savings_range: &'static str,
    pub roi_range: &'static str,
    pub monthly_savings: &'static str,
    pub case_study: &'static str,
    pub sensor_types: &'static [&'static str],
    pub install_duration: &'static str,
    pub reference_clients: &'static [&'static str],
    pub script: ScriptFragments,
}

impl IndustryProfile {
    /// Whether `lowered` mentions this industry by key or display name.
    pub fn is_named_in(&self, lowered: &str) -> bool {
        names_in(self.key, self.display_name, lowered)
    }
}

fn names_in(key: &str, display_name: &str, lowered: &str) -> bool {
    lowered.contains(key) || lowered.contains(&display_name.to_lowercase())
}

/// All static tables in one place.
#[derive(Debug)]
pub struct KnowledgeBase {
    /// Conversational acts in priority order: greeting, farewell, thanks.
    pub acts: &'static [KnowledgeEntry],
    /// General product topics, scanned before industries.
    pub topics: &'static [KnowledgeEntry],
    /// Intent categories. Order matters: the first category with a hit wins.
    pub intents: &'static [KnowledgeEntry],
    pub industries: &'static [IndustryProfile],
    /// Replies used when nothing more specific applies.
    pub fallbacks: &'static [&'static str],
    /// Words that turn a number into a budget mention.
    pub budget_units: &'static [&'static str],
    /// Words that turn a number into a facility size mention.
    pub area_units: &'static [&'static str],
    /// Consumption units. A number followed by one of these stays a plain
    /// number even when budget or area words appear elsewhere.
    pub usage_units: &'static [&'static str],
    pub urgency_words: &'static [&'static str],
    /// `(trigger, pain point)` pairs.
    pub pain_points: &'static [(&'static str, &'static str)],
    pub decision_roles: &'static [&'static str],
}

impl KnowledgeBase {
    /// The tables compiled into the crate.
    pub fn builtin() -> &'static KnowledgeBase {
        &BUILTIN
    }

    /// First intent entry with at least one keyword in `text`.
    ///
    /// ```
    /// use ecochat::KnowledgeBase;
    ///
    /// let kb = KnowledgeBase::builtin();
    /// assert_eq!(kb.find_by_keyword("Berapa HARGA paketnya?").unwrap().key, "price_inquiry");
    /// assert!(kb.find_by_keyword("zzz").is_none());
    /// ```
    pub fn find_by_keyword(&self, text: &str) -> Option<&'static KnowledgeEntry> {
        let lowered = text.to_lowercase();
        self.intents.iter().find(|entry| entry.hits(&lowered) > 0)
    }

    /// Profile for `key`, ignoring case and surrounding whitespace.
    pub fn industry_profile(&self, key: &str) -> Option<&'static IndustryProfile> {
        let key = key.trim().to_lowercase();
        self.industries.iter().find(|p| p.key == key)
    }

    pub fn topic(&self, key: &str) -> Option<&'static KnowledgeEntry> {
        self.topics.iter().find(|e| e.key == key)
    }

    pub fn intent(&self, key: &str) -> Option<&'static KnowledgeEntry> {
        self.intents.iter().find(|e| e.key == key)
    }

    pub fn act(&self, key: &str) -> Option<&'static KnowledgeEntry> {
        self.acts.iter().find(|e| e.key == key)
    }
}

/// Pick one template uniformly at random.
///
/// Returns `None` for an empty pool.
///
/// ```
/// use ecochat::knowledge::random_template;
/// use rand::rngs::mock::StepRng;
///
/// let mut rng = StepRng::new(0, 0);
/// assert_eq!(random_template(&mut rng, &["a", "b", "c"]), Some("a"));
/// assert_eq!(random_template(&mut rng, &[]), None);
/// ```
pub fn random_template<R: Rng + ?Sized>(
    rng: &mut R,
    pool: &[&'static str],
) -> Option<&'static str> {
    pool.choose(rng).copied()
}

static BUILTIN: KnowledgeBase = KnowledgeBase {
    acts: ACTS,
    topics: TOPICS,
    intents: INTENTS,
    industries: INDUSTRIES,
    fallbacks: &[
        "Saya bisa membantu soal harga, ROI, teknologi sensor, dan studi kasus per industri. Apa yang ingin Anda ketahui? 🌱",
        "Pertanyaan menarik! Agar jawabannya tepat, boleh ceritakan sedikit tentang bisnis Anda? Saya bisa menjelaskan harga, manfaat, atau proses instalasi EcoSense.",
        "Saya belum menangkap maksudnya 😅 Coba tanyakan misalnya: \"berapa harganya?\", \"apa manfaatnya?\", atau \"bagaimana cara pasangnya?\"",
    ],
    budget_units: &[
        "juta", "jt", "miliar", "milyar", "triliun", "ribu", "rb", "rp", "rupiah", "idr",
        "million", "billion",
    ],
    area_units: &["m2", "m²", "meter", "sqm", "hektar", "ha"],
    usage_units: &["kwh", "mwh", "m3", "m³", "liter"],
    urgency_words: &[
        "segera",
        "secepatnya",
        "urgent",
        "asap",
        "minggu ini",
        "bulan ini",
        "bulan depan",
        "deadline",
    ],
    pain_points: &[
        ("tagihan", "high_energy_bill"),
        ("boros", "energy_waste"),
        ("bocor", "water_leak"),
        ("downtime", "downtime"),
        ("mati listrik", "power_outage"),
        ("laporan esg", "esg_reporting"),
        ("manual", "manual_monitoring"),
    ],
    decision_roles: &[
        "direktur", "director", "owner", "pemilik", "ceo", "manajer", "manager", "kepala",
    ],
};

const ACTS: &[KnowledgeEntry] = &[
    KnowledgeEntry {
        key: "greeting",
        display_name: "Sapaan",
        keywords: &[
            "selamat pagi",
            "selamat siang",
            "selamat sore",
            "selamat malam",
            "assalamualaikum",
            "halo",
            "hallo",
            "hello",
            "hai",
            "hey",
        ],
        templates: &[
            "Halo! 👋 Senang bertemu Anda. Ada yang ingin Anda ketahui tentang penghematan energi dengan EcoSense?",
            "Hai! 🌱 Saya siap membantu. Mau mulai dari harga, manfaat, atau studi kasus?",
            "Selamat datang! ⚡ Ceritakan kebutuhan energi bisnis Anda, saya bantu carikan solusinya.",
        ],
        features: &[],
        benefits: &[],
        follow_ups: &[],
    },
    KnowledgeEntry {
        key: "farewell",
        display_name: "Perpisahan",
        keywords: &[
            "sampai jumpa",
            "selamat tinggal",
            "bye",
            "dadah",
            "see you",
            "permisi dulu",
        ],
        templates: &[
            "Sampai jumpa! 👋 Kalau ada pertanyaan lagi, saya selalu di sini.",
            "Terima kasih sudah mampir! 🌿 Semoga harimu hemat energi.",
            "Sampai bertemu lagi! Tim kami siap dihubungi kapan saja lewat WhatsApp. 📱",
        ],
        features: &[],
        benefits: &[],
        follow_ups: &[],
    },
    KnowledgeEntry {
        key: "thanks",
        display_name: "Terima kasih",
        keywords: &["terima kasih", "makasih", "thanks", "thank you", "thx"],
        templates: &[
            "Sama-sama! 😊 Ada lagi yang bisa saya bantu?",
            "Dengan senang hati! 🌱 Jangan ragu bertanya lagi.",
            "Senang bisa membantu! ⚡ Mau saya jadwalkan konsultasi gratis?",
        ],
        features: &[],
        benefits: &[],
        follow_ups: &[],
    },
];

const TOPICS: &[KnowledgeEntry] = &[
    KnowledgeEntry {
        key: "ecosense",
        display_name: "EcoSense",
        keywords: &[],
        templates: &[
            "EcoSense adalah platform monitoring energi dan air berbasis IoT untuk bisnis di Indonesia.",
            "EcoSense membantu bisnis melihat pemakaian energi secara real-time dan memangkas pemborosan.",
        ],
        features: &[
            "Sensor IoT plug-and-play untuk listrik, air, dan gas",
            "Dashboard real-time di web dan aplikasi mobile",
            "Deteksi anomali dengan peringatan otomatis",
            "Laporan ESG siap audit",
        ],
        benefits: &[
            "Penghematan energi 15-35%",
            "ROI rata-rata di bawah 18 bulan",
            "Jejak karbon terukur per lokasi",
        ],
        follow_ups: &[
            "Mau saya jelaskan paket harganya?",
            "Bisnis Anda bergerak di industri apa?",
        ],
    },
    KnowledgeEntry {
        key: "dashboard",
        display_name: "Dashboard",
        keywords: &[],
        templates: &[
            "Dashboard EcoSense menampilkan konsumsi energi per mesin, per lantai, atau per gerai dalam hitungan detik.",
        ],
        features: &[
            "Grafik konsumsi per menit",
            "Perbandingan antar lokasi",
            "Target penghematan dan notifikasi WhatsApp",
            "Ekspor CSV dan PDF",
        ],
        benefits: &[
            "Keputusan berbasis data, bukan tebakan",
            "Tim operasional tahu masalah sebelum tagihan datang",
        ],
        follow_ups: &["Mau lihat demo dashboard langsung?"],
    },
    KnowledgeEntry {
        key: "audit_energi",
        display_name: "Audit Energi",
        keywords: &[],
        templates: &[
            "Audit energi EcoSense memetakan titik boros energi di fasilitas Anda sebelum sensor dipasang.",
        ],
        features: &[
            "Survei lokasi oleh engineer bersertifikat",
            "Pengukuran baseline 7 hari",
            "Rekomendasi prioritas penghematan",
        ],
        benefits: &[
            "Gratis untuk fasilitas di atas 1.000 m²",
            "Estimasi ROI sebelum Anda berinvestasi",
        ],
        follow_ups: &["Kapan waktu yang cocok untuk survei lokasi?"],
    },
];

const INTENTS: &[KnowledgeEntry] = &[
    KnowledgeEntry {
        key: "price_inquiry",
        display_name: "Harga",
        keywords: &[
            "harga",
            "biaya",
            "berapa",
            "price",
            "cost",
            "tarif",
            "paket",
            "budget",
            "anggaran",
            "investasi",
        ],
        templates: &["💰 **Paket Harga {product}**\n\n• **Starter**: mulai Rp 2,5 juta/bulan, hingga 25 titik sensor\n• **Business**: mulai Rp 7,5 juta/bulan, hingga 100 titik sensor plus integrasi BMS\n• **Enterprise**: harga khusus untuk multi-lokasi\n\nSemua paket sudah termasuk instalasi, dashboard, dan dukungan teknis untuk {industry_name}."],
        features: &[],
        benefits: &[],
        follow_ups: &[
            "Berapa kira-kira luas fasilitas Anda?",
            "Mau saya hitungkan estimasi ROI-nya?",
        ],
    },
    KnowledgeEntry {
        key: "benefits_inquiry",
        display_name: "Manfaat",
        keywords: &[
            "manfaat",
            "keuntungan",
            "benefit",
            "hemat",
            "untung",
            "roi",
            "penghematan",
        ],
        templates: &["✅ **Manfaat {product} untuk {industry_name}**\n\n• Tagihan listrik dan air turun 15-35%\n• Kerusakan peralatan terdeteksi lebih awal\n• Laporan keberlanjutan otomatis untuk investor dan regulator\n• Balik modal rata-rata dalam 12-18 bulan"],
        features: &[],
        benefits: &[],
        follow_ups: &["Apa tantangan energi terbesar Anda saat ini?"],
    },
    KnowledgeEntry {
        key: "technology_inquiry",
        display_name: "Teknologi",
        keywords: &[
            "teknologi",
            "technology",
            "sensor",
            "iot",
            "machine learning",
            "algoritma",
            "cloud",
            "integrasi",
        ],
        templates: &["🔧 **Teknologi di Balik {product}**\n\n• Sensor IoT nirkabel (LoRaWAN dan 4G) dengan akurasi kelas 0,5\n• Gateway edge yang tetap merekam saat internet putus\n• Machine learning untuk deteksi anomali dan prediksi beban\n• Cloud di data center Indonesia, terenkripsi end-to-end\n• API terbuka untuk integrasi BMS dan ERP"],
        features: &[],
        benefits: &[],
        follow_ups: &["Sistem apa yang saat ini Anda gunakan untuk memantau energi?"],
    },
    KnowledgeEntry {
        key: "implementation_inquiry",
        display_name: "Implementasi",
        keywords: &[
            "implementasi",
            "instalasi",
            "install",
            "pasang",
            "pemasangan",
            "onboarding",
            "jadwal",
        ],
        templates: &["📅 **Tahapan Implementasi {product}**\n\n1. **Audit energi** (minggu 1): survei lokasi dan baseline\n2. **Instalasi sensor** (minggu 2-3): tanpa mematikan operasional\n3. **Kalibrasi dan onboarding** (minggu 4): pelatihan tim {industry_name}\n4. **Optimasi berkelanjutan**: review bulanan bersama engineer kami"],
        features: &[],
        benefits: &[],
        follow_ups: &["Kapan target Anda ingin sistem mulai berjalan?"],
    },
    KnowledgeEntry {
        key: "comparison_inquiry",
        display_name: "Perbandingan",
        keywords: &[
            "banding",
            "compare",
            "kompetitor",
            "competitor",
            "versus",
            "beda",
            "alternatif",
        ],
        templates: &["⚖️ **Apa yang Membedakan {product}?**\n\n• Satu platform untuk listrik, air, dan gas, bukan tiga aplikasi terpisah\n• Tim teknisi lokal di 12 kota\n• Garansi penghematan: jika target tidak tercapai, biaya langganan dikembalikan\n• Tanpa biaya hardware di muka untuk paket Business"],
        features: &[],
        benefits: &[],
        follow_ups: &["Solusi apa yang sedang Anda bandingkan?"],
    },
    KnowledgeEntry {
        key: "support_inquiry",
        display_name: "Dukungan",
        keywords: &[
            "support",
            "bantuan",
            "garansi",
            "maintenance",
            "perawatan",
            "teknisi",
            "layanan",
        ],
        templates: &["🛠️ **Dukungan {product}**\n\n• Helpdesk 24/7 via WhatsApp dan telepon\n• Teknisi on-site maksimal 48 jam di kota besar\n• Garansi hardware 3 tahun\n• Pemeliharaan preventif setiap 6 bulan"],
        features: &[],
        benefits: &[],
        follow_ups: &["Di kota mana lokasi fasilitas Anda?"],
    },
    KnowledgeEntry {
        key: "sustainability_inquiry",
        display_name: "Keberlanjutan",
        keywords: &[
            "sustainability",
            "keberlanjutan",
            "karbon",
            "carbon",
            "emisi",
            "esg",
            "lingkungan",
            "green",
        ],
        templates: &["🌍 **Dampak Keberlanjutan {product}**\n\n• Rata-rata pelanggan memangkas 120 ton CO₂e per tahun\n• Perhitungan emisi Scope 2 otomatis sesuai GHG Protocol\n• Laporan ESG siap dilampirkan ke sustainability report {industry_name}"],
        features: &[],
        benefits: &[],
        follow_ups: &["Apakah perusahaan Anda sudah punya target net zero?"],
    },
    KnowledgeEntry {
        key: "what_is_inquiry",
        display_name: "Penjelasan",
        keywords: &[
            "apa itu",
            "what is",
            "pengertian",
            "jelaskan",
            "maksudnya",
        ],
        templates: &["💡 **Sederhananya**\n\n{product} adalah sistem pemantau energi. Sensor kecil dipasang di panel listrik dan pipa air, datanya dikirim ke cloud, lalu Anda bisa melihat di mana energi terbuang dan berapa rupiah yang bisa dihemat."],
        features: &[],
        benefits: &[],
        follow_ups: &["Bagian mana yang ingin Anda dalami?"],
    },
    KnowledgeEntry {
        key: "how_to_inquiry",
        display_name: "Cara",
        keywords: &["bagaimana", "how to", "how do", "caranya", "langkah"],
        templates: &["📋 **Cara Memulai dengan {product}**\n\n1. Isi formulir konsultasi atau chat WhatsApp kami\n2. Jadwalkan audit energi gratis\n3. Terima proposal dan estimasi ROI untuk {industry_name}\n4. Sensor terpasang dan dashboard aktif dalam hitungan minggu"],
        features: &[],
        benefits: &[],
        follow_ups: &["Mau saya bantu jadwalkan audit energinya?"],
    },
    KnowledgeEntry {
        key: "why_inquiry",
        display_name: "Alasan",
        keywords: &["kenapa", "mengapa", "why", "alasan"],
        templates: &["🎯 **Mengapa {product}?**\n\n• Energi adalah biaya operasional terbesar kedua bagi banyak bisnis\n• Tanpa data real-time, pemborosan baru terlihat saat tagihan datang\n• Regulasi dan investor makin menuntut laporan emisi\n• Penghematan langsung terasa di arus kas {industry_name}"],
        features: &[],
        benefits: &[],
        follow_ups: &["Apa yang paling penting bagi Anda: hemat biaya atau laporan ESG?"],
    },
];

const INDUSTRIES: &[IndustryProfile] = &[
    IndustryProfile {
        key: "manufacturing",
        display_name: "Manufaktur",
        savings_range: "20-35%",
        roi_range: "12-18 bulan",
        monthly_savings: "Rp 45-120 juta",
        case_study: "Pabrik tekstil di Bandung memangkas tagihan listrik 28% dalam 6 bulan setelah memasang 120 titik sensor.",
        sensor_types: &[
            "smart meter 3 fasa",
            "sensor suhu mesin",
            "flow meter air proses",
        ],
        install_duration: "3-6 minggu",
        reference_clients: &["PT Tekstil Nusantara", "PT Baja Prima"],
        script: ScriptFragments {
            opening: "Banyak pabrik kehilangan hingga 20% energinya dari mesin idle tanpa disadari.",
            middle: "Boleh saya tahu, berapa kira-kira tagihan listrik pabrik Anda per bulan?",
            closing: "Tim engineer kami bisa menjadwalkan audit energi gratis di pabrik Anda minggu ini.",
        },
    },
    IndustryProfile {
        key: "property",
        display_name: "Properti",
        savings_range: "15-25%",
        roi_range: "18-24 bulan",
        monthly_savings: "Rp 30-80 juta",
        case_study: "Gedung perkantoran 22 lantai di Jakarta menghemat Rp 1,2 miliar per tahun lewat optimasi HVAC.",
        sensor_types: &["sensor HVAC", "smart meter per tenant", "sensor okupansi"],
        install_duration: "4-8 minggu",
        reference_clients: &["Graha Sentosa Tower", "Residence Bintaro"],
        script: ScriptFragments {
            opening: "HVAC biasanya menyedot lebih dari separuh energi sebuah gedung.",
            middle: "Berapa jumlah lantai atau luas gedung yang Anda kelola?",
            closing: "Kami bisa menyiapkan simulasi penghematan khusus untuk gedung Anda.",
        },
    },
    IndustryProfile {
        key: "retail",
        display_name: "Ritel",
        savings_range: "12-20%",
        roi_range: "10-14 bulan",
        monthly_savings: "Rp 8-25 juta per gerai",
        case_study: "Jaringan minimarket dengan 40 gerai menurunkan biaya pendinginan 18% dalam satu kuartal.",
        sensor_types: &["sensor chiller", "smart plug", "sensor pintu freezer"],
        install_duration: "1-2 minggu per gerai",
        reference_clients: &["MartJaya", "FreshKita"],
        script: ScriptFragments {
            opening: "Chiller dan pencahayaan adalah dua sumber boros terbesar di gerai ritel.",
            middle: "Berapa banyak gerai yang Anda operasikan saat ini?",
            closing: "Kami bisa mulai dengan pilot di 3 gerai agar Anda melihat hasilnya sendiri.",
        },
    },
    IndustryProfile {
        key: "hospitality",
        display_name: "Perhotelan",
        savings_range: "18-30%",
        roi_range: "12-20 bulan",
        monthly_savings: "Rp 20-60 juta",
        case_study: "Resort bintang empat di Bali memangkas konsumsi air 32% dan listrik 21% tanpa mengurangi kenyamanan tamu.",
        sensor_types: &[
            "smart meter kamar",
            "flow meter air",
            "sensor boiler dan kolam",
        ],
        install_duration: "3-5 minggu",
        reference_clients: &["Samudra Resort", "Hotel Cendana"],
        script: ScriptFragments {
            opening: "Kamar kosong yang AC-nya tetap menyala adalah kebocoran biaya yang paling sering kami temukan di hotel.",
            middle: "Berapa jumlah kamar dan rata-rata okupansi hotel Anda?",
            closing: "Kami bisa mengirim proposal penghematan lengkap sebelum musim ramai berikutnya.",
        },
    },
    IndustryProfile {
        key: "education",
        display_name: "Pendidikan",
        savings_range: "15-25%",
        roi_range: "14-20 bulan",
        monthly_savings: "Rp 10-35 juta",
        case_study: "Universitas swasta di Yogyakarta menghemat 24% energi kampus dan memakai dashboard EcoSense sebagai bahan ajar.",
        sensor_types: &[
            "smart meter gedung",
            "sensor kualitas udara",
            "sensor okupansi kelas",
        ],
        install_duration: "2-4 minggu",
        reference_clients: &["Universitas Harapan Bangsa", "SMA Global Cendekia"],
        script: ScriptFragments {
            opening: "Gedung sekolah dan kampus sering menyala penuh bahkan saat libur semester.",
            middle: "Berapa gedung atau ruang kelas yang ada di kampus Anda?",
            closing: "Kami punya program khusus institusi pendidikan, mau saya kirimkan detailnya?",
        },
    },
    IndustryProfile {
        key: "healthcare",
        display_name: "Kesehatan",
        savings_range: "10-20%",
        roi_range: "16-24 bulan",
        monthly_savings: "Rp 25-70 juta",
        case_study: "Rumah sakit tipe B di Surabaya menstabilkan suhu ruang farmasi sambil menghemat 14% listrik.",
        sensor_types: &[
            "sensor suhu cold chain",
            "smart meter genset",
            "sensor kualitas udara",
        ],
        install_duration: "4-6 minggu",
        reference_clients: &["RS Medika Utama"],
        script: ScriptFragments {
            opening: "Fasilitas kesehatan butuh listrik yang andal sekaligus efisien.",
            middle: "Berapa jumlah tempat tidur di fasilitas Anda?",
            closing: "Tim kami bisa berdiskusi langsung dengan bagian teknik rumah sakit Anda.",
        },
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;

    #[test]
    fn lookups_are_idempotent() {
        let kb = KnowledgeBase::builtin();
        let a = kb.find_by_keyword("apa manfaat sensor ini?");
        let b = kb.find_by_keyword("apa manfaat sensor ini?");
        assert_eq!(a, b);
        assert_eq!(a.unwrap().key, "benefits_inquiry");
    }

    #[test]
    fn industry_profile_ignores_case() {
        let kb = KnowledgeBase::builtin();
        assert_eq!(
            kb.industry_profile("  Retail ").unwrap().display_name,
            "Ritel"
        );
        assert!(kb.industry_profile("aerospace").is_none());
    }

    #[test]
    fn every_act_has_three_templates() {
        let kb = KnowledgeBase::builtin();
        for act in kb.acts {
            assert_eq!(act.templates.len(), 3, "{}", act.key);
        }
        assert_eq!(kb.fallbacks.len(), 3);
    }

    #[test]
    fn intent_table_order_is_fixed() {
        let keys: Vec<_> = KnowledgeBase::builtin().intents.iter().map(|e| e.key).collect();
        assert_eq!(
            keys,
            vec![
                "price_inquiry",
                "benefits_inquiry",
                "technology_inquiry",
                "implementation_inquiry",
                "comparison_inquiry",
                "support_inquiry",
                "sustainability_inquiry",
                "what_is_inquiry",
                "how_to_inquiry",
                "why_inquiry",
            ]
        );
    }

    #[test]
    fn named_in_matches_display_name() {
        let kb = KnowledgeBase::builtin();
        let hotel = kb.industry_profile("hospitality").unwrap();
        assert!(hotel.is_named_in("solusi untuk perhotelan"));
        assert!(!hotel.is_named_in("solusi untuk pabrik"));
    }

    #[test]
    fn step_rng_picks_first_template() {
        let mut rng = StepRng::new(0, 0);
        let pool = KnowledgeBase::builtin().act("greeting").unwrap().templates;
        assert_eq!(random_template(&mut rng, pool), Some(pool[0]));
    }
}
