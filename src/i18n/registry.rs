//! Language catalog: single source of truth for selectable languages.
//!
//! Maps the human-readable names offered to the host (e.g. "English") to the
//! backend-neutral codes passed on to translation backends (e.g. "en"). The
//! catalog is built once on first access and never mutated afterwards, so it can
//! be read from any number of concurrent translations without locking.

use std::sync::OnceLock;

/// Display name and code of the source-language detection sentinel.
pub const AUTO: &str = "auto";

/// Error returned when a display name is not in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("Unknown language: '{0}'")]
    UnknownLanguage(String),
}

/// A single catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguageEntry {
    /// Human-readable name shown to the host (e.g. "Chinese (Simplified)")
    pub name: &'static str,

    /// Backend-neutral code (e.g. "zh"). Not guaranteed to be unique.
    pub code: &'static str,
}

/// Global language catalog singleton.
pub struct LanguageCatalog {
    entries: Vec<LanguageEntry>,
}

/// Global catalog instance (initialized lazily)
static CATALOG: OnceLock<LanguageCatalog> = OnceLock::new();

impl LanguageCatalog {
    /// Get the global language catalog instance.
    pub fn get() -> &'static LanguageCatalog {
        CATALOG.get_or_init(|| LanguageCatalog {
            entries: default_languages(),
        })
    }

    /// Resolve a display name to its backend-neutral code.
    ///
    /// # Errors
    /// Returns `CatalogError::UnknownLanguage` when `display_name` is not a key.
    pub fn resolve(&self, display_name: &str) -> Result<&'static str, CatalogError> {
        self.get_by_name(display_name)
            .map(|entry| entry.code)
            .ok_or_else(|| CatalogError::UnknownLanguage(display_name.to_string()))
    }

    /// Look up an entry by its exact display name.
    pub fn get_by_name(&self, display_name: &str) -> Option<&LanguageEntry> {
        self.entries.iter().find(|entry| entry.name == display_name)
    }

    /// All display names in catalog order, "auto" first.
    pub fn list_display_names(&self) -> Vec<&'static str> {
        self.entries.iter().map(|entry| entry.name).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

const fn entry(name: &'static str, code: &'static str) -> LanguageEntry {
    LanguageEntry { name, code }
}

fn default_languages() -> Vec<LanguageEntry> {
    vec![
        entry(AUTO, AUTO),
        entry("English", "en"),
        entry("Spanish", "es"),
        entry("French", "fr"),
        entry("German", "de"),
        entry("Italian", "it"),
        entry("Portuguese", "pt"),
        entry("Russian", "ru"),
        entry("Japanese", "ja"),
        entry("Korean", "ko"),
        entry("Chinese (Simplified)", "zh"),
        entry("Chinese (Traditional)", "zh-TW"),
        entry("Arabic", "ar"),
        entry("Hindi", "hi"),
        entry("Turkish", "tr"),
        entry("Dutch", "nl"),
        entry("Polish", "pl"),
        entry("Swedish", "sv"),
        entry("Danish", "da"),
        entry("Finnish", "fi"),
        entry("Norwegian", "no"),
        entry("Czech", "cs"),
        entry("Greek", "el"),
        entry("Hebrew", "he"),
        entry("Thai", "th"),
        entry("Vietnamese", "vi"),
        entry("Indonesian", "id"),
        entry("Malay", "ms"),
        entry("Filipino", "fil"),
        entry("Ukrainian", "uk"),
        entry("Romanian", "ro"),
        entry("Hungarian", "hu"),
        entry("Bulgarian", "bg"),
        entry("Croatian", "hr"),
        entry("Slovak", "sk"),
        entry("Lithuanian", "lt"),
        entry("Latvian", "lv"),
        entry("Estonian", "et"),
        entry("Slovenian", "sl"),
        entry("Serbian", "sr"),
        entry("Catalan", "ca"),
        entry("Bengali", "bn"),
        entry("Tamil", "ta"),
        entry("Telugu", "te"),
        entry("Urdu", "ur"),
        entry("Persian", "fa"),
        entry("Swahili", "sw"),
    ]
}
