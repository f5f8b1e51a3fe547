//! Translation backends: the catalog of provider ids, the handler trait, and
//! the built-in HTTP handlers.
//!
//! A backend is anything implementing [`TranslationBackend`]. Handlers are kept
//! in a [`BackendRegistry`] keyed by [`BackendId`]; adding a provider means
//! registering another handler, never branching on strings.

mod bing;
mod bing_web;
mod deepl;
mod google;
mod http;
mod libre;
mod mymemory;
mod registry;

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;

pub use bing::{BingTranslator, DEFAULT_BING_URL};
pub use bing_web::{BingWebTranslator, DEFAULT_BING_WEB_URL};
pub use deepl::{DeepLTranslator, DEFAULT_DEEPL_URL};
pub use google::{GoogleTranslator, DEFAULT_GOOGLE_URL};
pub use libre::{LibreTranslator, DEFAULT_LIBRETRANSLATE_URL};
pub use mymemory::{MyMemoryTranslator, DEFAULT_MYMEMORY_URL};
pub use registry::{BackendRegistry, WarmupReport, WarmupWarning, DEFAULT_WARMUP_TIMEOUT};

/// Identifier of a pluggable translation provider.
///
/// The set is closed; the string forms are the exact names accepted from the
/// host, matched case-sensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BackendId {
    Bing,
    Google,
    Yandex,
    Baidu,
    Sogou,
    Tencent,
    DeepL,
    Alibaba,
    Iciba,
    Iflytek,
    Reverso,
    Itranslate,
    Caiyun,
    Argos,
    Papago,
    Youdao,
    Mglip,
    Niutrans,
    VolcEngine,
    TranslateCom,
    MyMemory,
    Utibet,
}

impl BackendId {
    /// Every backend, in the order offered to the host.
    pub const ALL: [BackendId; 22] = [
        BackendId::Bing,
        BackendId::Google,
        BackendId::Yandex,
        BackendId::Baidu,
        BackendId::Sogou,
        BackendId::Tencent,
        BackendId::DeepL,
        BackendId::Alibaba,
        BackendId::Iciba,
        BackendId::Iflytek,
        BackendId::Reverso,
        BackendId::Itranslate,
        BackendId::Caiyun,
        BackendId::Argos,
        BackendId::Papago,
        BackendId::Youdao,
        BackendId::Mglip,
        BackendId::Niutrans,
        BackendId::VolcEngine,
        BackendId::TranslateCom,
        BackendId::MyMemory,
        BackendId::Utibet,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BackendId::Bing => "bing",
            BackendId::Google => "google",
            BackendId::Yandex => "yandex",
            BackendId::Baidu => "baidu",
            BackendId::Sogou => "sogou",
            BackendId::Tencent => "tencent",
            BackendId::DeepL => "deepl",
            BackendId::Alibaba => "alibaba",
            BackendId::Iciba => "iciba",
            BackendId::Iflytek => "iflytek",
            BackendId::Reverso => "reverso",
            BackendId::Itranslate => "itranslate",
            BackendId::Caiyun => "caiyun",
            BackendId::Argos => "argos",
            BackendId::Papago => "papago",
            BackendId::Youdao => "youdao",
            BackendId::Mglip => "mglip",
            BackendId::Niutrans => "niutrans",
            BackendId::VolcEngine => "volcEngine",
            BackendId::TranslateCom => "translateCom",
            BackendId::MyMemory => "myMemory",
            BackendId::Utibet => "utibet",
        }
    }

    /// Backend names in host order.
    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(BackendId::as_str).collect()
    }
}

impl fmt::Display for BackendId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for a backend name outside the catalog.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown translator: '{0}'")]
pub struct UnknownBackend(pub String);

impl FromStr for BackendId {
    type Err = UnknownBackend;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BackendId::ALL
            .iter()
            .copied()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| UnknownBackend(s.to_string()))
    }
}

/// One translation call as seen by a handler.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendQuery {
    pub text: String,
    /// Backend-neutral source code, possibly "auto"
    pub from_code: String,
    /// Backend-neutral target code
    pub to_code: String,
    /// Upper bound for the remote call
    pub timeout: Duration,
    /// Echo empty or whitespace-only text instead of calling the service
    pub ignore_empty_query: bool,
}

impl BackendQuery {
    pub fn new(text: impl Into<String>, from_code: &str, to_code: &str, timeout: Duration) -> Self {
        Self {
            text: text.into(),
            from_code: from_code.to_string(),
            to_code: to_code.to_string(),
            timeout,
            ignore_empty_query: true,
        }
    }

    pub fn is_auto_detect(&self) -> bool {
        self.from_code == crate::i18n::AUTO
    }

    /// True when the handler should return the text as-is without a request.
    pub fn skips_request(&self) -> bool {
        self.ignore_empty_query && self.text.trim().is_empty()
    }
}

/// Failures raised by a backend invocation.
///
/// Network failures, timeouts, rate limits and malformed payloads are all
/// reported through this one type; callers do not branch on the provider.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("No handler registered for translator '{0}'")]
    NotRegistered(BackendId),

    #[error("{backend} request failed: {source}")]
    Network {
        backend: BackendId,
        #[source]
        source: reqwest::Error,
    },

    #[error("{backend} did not respond within {after:?}")]
    Timeout { backend: BackendId, after: Duration },

    #[error("{backend} rate limit exceeded")]
    RateLimited { backend: BackendId },

    #[error("{backend} API error ({status}): {body}")]
    Api {
        backend: BackendId,
        status: u16,
        body: String,
    },

    #[error("Failed to parse {backend} response: {details}")]
    MalformedResponse { backend: BackendId, details: String },
}

/// A pluggable translation provider.
#[async_trait]
pub trait TranslationBackend: Send + Sync {
    /// The catalog id this handler serves.
    fn id(&self) -> BackendId;

    /// Translate `query.text`, returning the provider's text unmodified.
    async fn translate(&self, query: &BackendQuery) -> Result<String, BackendError>;

    /// Open a connection to the provider and report how long it took.
    ///
    /// Handlers without anything to prepare report zero.
    async fn warmup(&self, _timeout: Duration) -> Result<Duration, BackendError> {
        Ok(Duration::ZERO)
    }
}
