//! Static table of the languages offered in the language selector.

/// Metadata for one selectable language.
#[derive(Debug, Clone)]
pub struct LanguageConfig {
    /// ISO 639-1 code (e.g., "en", "hi")
    pub code: &'static str,

    /// English name (e.g., "Hindi"), shown on the header badge
    pub name: &'static str,

    /// Name in the language itself (e.g., "हिन्दी")
    pub native_name: &'static str,

    /// Whether UI strings are authored in this language. Exactly one entry
    /// has this set.
    pub is_canonical: bool,

    pub enabled: bool,
}

impl LanguageConfig {
    const fn translated(code: &'static str, name: &'static str, native_name: &'static str) -> Self {
        Self {
            code,
            name,
            native_name,
            is_canonical: false,
            enabled: true,
        }
    }
}

const LANGUAGES: [LanguageConfig; 5] = [
    LanguageConfig {
        code: "en",
        name: "English",
        native_name: "English",
        is_canonical: true,
        enabled: true,
    },
    LanguageConfig::translated("hi", "Hindi", "हिन्दी"),
    LanguageConfig::translated("bn", "Bengali", "বাংলা"),
    LanguageConfig::translated("ta", "Tamil", "தமிழ்"),
    LanguageConfig::translated("te", "Telugu", "తెలుగు"),
];

pub struct LanguageRegistry {
    languages: &'static [LanguageConfig],
}

static REGISTRY: LanguageRegistry = LanguageRegistry {
    languages: &LANGUAGES,
};

impl LanguageRegistry {
    pub fn get() -> &'static LanguageRegistry {
        &REGISTRY
    }

    /// Case-insensitive lookup by code
    pub fn get_by_code(&self, code: &str) -> Option<&'static LanguageConfig> {
        self.languages
            .iter()
            .find(|lang| lang.code.eq_ignore_ascii_case(code))
    }

    /// Languages shown in the selector, in selector order
    pub fn list_enabled(&self) -> impl Iterator<Item = &'static LanguageConfig> {
        self.languages.iter().filter(|lang| lang.enabled)
    }

    /// The language UI strings are written in
    pub fn canonical(&self) -> Option<&'static LanguageConfig> {
        self.languages.iter().find(|lang| lang.is_canonical)
    }
}
