use std::time::Duration;

use anyhow::{Context, Result};

use crate::backend::{
    DEFAULT_BING_URL, DEFAULT_BING_WEB_URL, DEFAULT_DEEPL_URL, DEFAULT_GOOGLE_URL,
    DEFAULT_LIBRETRANSLATE_URL, DEFAULT_MYMEMORY_URL, DEFAULT_WARMUP_TIMEOUT,
};

#[derive(Debug, Clone)]
pub struct Config {
    // Google (keyless gtx endpoint)
    pub google_translate_url: String,

    // Bing (Microsoft Translator API with a key, public web endpoint without)
    pub bing_translator_url: String,
    pub bing_web_url: String,
    pub bing_translator_key: Option<String>,
    pub bing_translator_region: Option<String>,

    // DeepL
    pub deepl_api_url: String,
    pub deepl_api_key: Option<String>,

    // MyMemory
    pub mymemory_api_url: String,
    pub mymemory_email: Option<String>,

    // Argos (LibreTranslate)
    pub libretranslate_url: String,
    pub libretranslate_api_key: Option<String>,

    // Dispatch
    pub warmup_timeout: Duration,
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            google_translate_url: DEFAULT_GOOGLE_URL.to_string(),
            bing_translator_url: DEFAULT_BING_URL.to_string(),
            bing_web_url: DEFAULT_BING_WEB_URL.to_string(),
            bing_translator_key: None,
            bing_translator_region: None,
            deepl_api_url: DEFAULT_DEEPL_URL.to_string(),
            deepl_api_key: None,
            mymemory_api_url: DEFAULT_MYMEMORY_URL.to_string(),
            mymemory_email: None,
            libretranslate_url: DEFAULT_LIBRETRANSLATE_URL.to_string(),
            libretranslate_api_key: None,
            warmup_timeout: DEFAULT_WARMUP_TIMEOUT,
            user_agent: default_user_agent(),
        }
    }
}

fn default_user_agent() -> String {
    format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}

/// Unset and empty variables both read as `None`.
fn optional_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn url_var(name: &str, default: &str) -> Result<String> {
    let value = optional_var(name).unwrap_or_else(|| default.to_string());
    reqwest::Url::parse(&value).with_context(|| format!("{} is not a valid URL: {}", name, value))?;
    Ok(value)
}

impl Config {
    /// Load configuration from the environment (and `.env`, when present).
    pub fn from_env() -> Result<Self> {
        // Missing .env is normal outside local development
        let _ = dotenvy::dotenv();

        Ok(Self {
            // Google
            google_translate_url: url_var("GOOGLE_TRANSLATE_URL", DEFAULT_GOOGLE_URL)?,

            // Bing
            bing_translator_url: url_var("BING_TRANSLATOR_URL", DEFAULT_BING_URL)?,
            bing_web_url: url_var("BING_WEB_URL", DEFAULT_BING_WEB_URL)?,
            bing_translator_key: optional_var("BING_TRANSLATOR_KEY"),
            bing_translator_region: optional_var("BING_TRANSLATOR_REGION"),

            // DeepL
            deepl_api_url: url_var("DEEPL_API_URL", DEFAULT_DEEPL_URL)?,
            deepl_api_key: optional_var("DEEPL_API_KEY"),

            // MyMemory
            mymemory_api_url: url_var("MYMEMORY_API_URL", DEFAULT_MYMEMORY_URL)?,
            mymemory_email: optional_var("MYMEMORY_EMAIL"),

            // Argos
            libretranslate_url: url_var("LIBRETRANSLATE_URL", DEFAULT_LIBRETRANSLATE_URL)?,
            libretranslate_api_key: optional_var("LIBRETRANSLATE_API_KEY"),

            // Dispatch
            warmup_timeout: optional_var("TRANSLATOR_WARMUP_TIMEOUT_SECS")
                .and_then(|v| v.parse::<f64>().ok())
                .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
                .filter(|d| !d.is_zero())
                .unwrap_or(DEFAULT_WARMUP_TIMEOUT),
            user_agent: optional_var("TRANSLATOR_USER_AGENT").unwrap_or_else(default_user_agent),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: [&str; 13] = [
        "GOOGLE_TRANSLATE_URL",
        "BING_TRANSLATOR_URL",
        "BING_WEB_URL",
        "BING_TRANSLATOR_KEY",
        "BING_TRANSLATOR_REGION",
        "DEEPL_API_URL",
        "DEEPL_API_KEY",
        "MYMEMORY_API_URL",
        "MYMEMORY_EMAIL",
        "LIBRETRANSLATE_URL",
        "LIBRETRANSLATE_API_KEY",
        "TRANSLATOR_WARMUP_TIMEOUT_SECS",
        "TRANSLATOR_USER_AGENT",
    ];

    fn clear_env() {
        for var in VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        clear_env();
        let config = Config::from_env().expect("Should load");

        assert_eq!(config.google_translate_url, DEFAULT_GOOGLE_URL);
        assert_eq!(config.bing_web_url, DEFAULT_BING_WEB_URL);
        assert_eq!(config.deepl_api_url, DEFAULT_DEEPL_URL);
        assert_eq!(config.mymemory_api_url, DEFAULT_MYMEMORY_URL);
        assert_eq!(config.libretranslate_url, DEFAULT_LIBRETRANSLATE_URL);
        assert!(config.bing_translator_key.is_none());
        assert!(config.deepl_api_key.is_none());
        assert_eq!(config.warmup_timeout, Duration::from_secs(5));
        assert!(config.user_agent.starts_with("text-translator-node/"));
    }

    #[test]
    #[serial]
    fn test_from_env_overrides() {
        clear_env();
        std::env::set_var("DEEPL_API_KEY", "deepl-secret");
        std::env::set_var("BING_TRANSLATOR_KEY", "bing-secret");
        std::env::set_var("BING_TRANSLATOR_REGION", "eastus");
        std::env::set_var("LIBRETRANSLATE_URL", "http://localhost:5000");
        std::env::set_var("TRANSLATOR_WARMUP_TIMEOUT_SECS", "2.5");

        let config = Config::from_env().expect("Should load");
        clear_env();

        assert_eq!(config.deepl_api_key.as_deref(), Some("deepl-secret"));
        assert_eq!(config.bing_translator_key.as_deref(), Some("bing-secret"));
        assert_eq!(config.bing_translator_region.as_deref(), Some("eastus"));
        assert_eq!(config.libretranslate_url, "http://localhost:5000");
        assert_eq!(config.warmup_timeout, Duration::from_millis(2500));
    }

    #[test]
    #[serial]
    fn test_empty_key_counts_as_unset() {
        clear_env();
        std::env::set_var("DEEPL_API_KEY", "   ");

        let config = Config::from_env().expect("Should load");
        clear_env();

        assert!(config.deepl_api_key.is_none());
    }

    #[test]
    #[serial]
    fn test_invalid_warmup_timeout_falls_back() {
        clear_env();
        for bad in ["soon", "-1", "0"] {
            std::env::set_var("TRANSLATOR_WARMUP_TIMEOUT_SECS", bad);
            let config = Config::from_env().expect("Should load");
            assert_eq!(config.warmup_timeout, DEFAULT_WARMUP_TIMEOUT, "input {}", bad);
        }
        clear_env();
    }

    #[test]
    #[serial]
    fn test_invalid_url_is_rejected() {
        clear_env();
        std::env::set_var("GOOGLE_TRANSLATE_URL", "not a url");

        let result = Config::from_env();
        clear_env();

        let err = result.unwrap_err().to_string();
        assert!(err.contains("GOOGLE_TRANSLATE_URL"), "{}", err);
    }

    #[test]
    fn test_default_matches_env_defaults() {
        let config = Config::default();
        assert_eq!(config.bing_translator_url, DEFAULT_BING_URL);
        assert_eq!(config.warmup_timeout, DEFAULT_WARMUP_TIMEOUT);
    }
}
