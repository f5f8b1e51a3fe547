//! Translation dispatch: validate a request, optionally warm up the backends,
//! run exactly one backend call under a timeout, and report a tagged result.
//!
//! Nothing here retries or falls back to another backend; one request is one
//! invocation and one outcome.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::backend::{BackendError, BackendId, BackendQuery, BackendRegistry, UnknownBackend};
use crate::i18n::{CatalogError, LanguageCatalog};

pub const MIN_TIMEOUT_SECS: f64 = 1.0;
pub const MAX_TIMEOUT_SECS: f64 = 60.0;
pub const DEFAULT_TIMEOUT_SECS: f64 = 10.0;

/// One translation as requested by the host.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationRequest {
    pub text: String,
    /// Backend name, e.g. "google"
    pub backend_id: String,
    /// Display name from the language catalog, e.g. "auto"
    pub from_language: String,
    /// Display name from the language catalog, e.g. "English"
    pub to_language: String,
    pub use_warmup: bool,
    pub timeout_seconds: f64,
}

impl TranslationRequest {
    pub fn new(
        text: impl Into<String>,
        backend_id: impl Into<String>,
        from_language: impl Into<String>,
        to_language: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            backend_id: backend_id.into(),
            from_language: from_language.into(),
            to_language: to_language.into(),
            use_warmup: false,
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn with_warmup(mut self, use_warmup: bool) -> Self {
        self.use_warmup = use_warmup;
        self
    }

    pub fn with_timeout(mut self, timeout_seconds: f64) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }
}

/// Coarse classification of a failed dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidLanguage,
    InvalidBackend,
    InvalidTimeout,
    Timeout,
    Backend,
}

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error(transparent)]
    InvalidLanguage(#[from] CatalogError),

    #[error(transparent)]
    InvalidBackend(#[from] UnknownBackend),

    #[error("Timeout must be between 1 and 60 seconds, got {0}")]
    InvalidTimeout(f64),

    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl DispatchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DispatchError::InvalidLanguage(_) => ErrorKind::InvalidLanguage,
            DispatchError::InvalidBackend(_) => ErrorKind::InvalidBackend,
            DispatchError::InvalidTimeout(_) => ErrorKind::InvalidTimeout,
            DispatchError::Backend(BackendError::Timeout { .. }) => ErrorKind::Timeout,
            DispatchError::Backend(_) => ErrorKind::Backend,
        }
    }
}

fn validate_timeout(seconds: f64) -> Result<Duration, DispatchError> {
    if seconds.is_finite() && (MIN_TIMEOUT_SECS..=MAX_TIMEOUT_SECS).contains(&seconds) {
        Ok(Duration::from_secs_f64(seconds))
    } else {
        Err(DispatchError::InvalidTimeout(seconds))
    }
}

/// Routes validated requests to the backend registry.
///
/// Cheap to clone; clones share the same registry.
#[derive(Clone)]
pub struct TranslationDispatcher {
    registry: Arc<BackendRegistry>,
}

impl TranslationDispatcher {
    pub fn new(registry: Arc<BackendRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &BackendRegistry {
        &self.registry
    }

    /// Translate `request.text`, returning the backend's text unmodified.
    ///
    /// Validation happens before any network traffic. Empty text is not
    /// rejected; it is handed to the backend with `ignore_empty_query` set.
    ///
    /// # Errors
    /// Every failure (unknown language or backend, out-of-range timeout,
    /// backend error, timeout) is returned as a `DispatchError`.
    pub async fn translate(&self, request: &TranslationRequest) -> Result<String, DispatchError> {
        let backend: BackendId = request.backend_id.parse()?;
        let catalog = LanguageCatalog::get();
        let from_code = catalog.resolve(&request.from_language)?;
        let to_code = catalog.resolve(&request.to_language)?;
        let timeout = validate_timeout(request.timeout_seconds)?;

        if request.use_warmup {
            self.warmup().await;
        }

        let query = BackendQuery::new(request.text.as_str(), from_code, to_code, timeout);
        info!(
            "Translating {} chars with {} ({} -> {})",
            query.text.chars().count(),
            backend,
            from_code,
            to_code
        );

        match tokio::time::timeout(timeout, self.registry.invoke(backend, &query)).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(BackendError::Timeout {
                backend,
                after: timeout,
            }
            .into()),
        }
    }

    /// Best-effort warm-up; failures are logged and never abort the request.
    async fn warmup(&self) {
        match self.registry.warmup().await {
            Ok(report) => debug!("Warm-up succeeded for {} backends", report.timings.len()),
            Err(warning) => warn!("{}", warning),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::TranslationBackend;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Echoes the query text and counts translations and warm-ups.
    struct Echo {
        id: BackendId,
        calls: Arc<AtomicU32>,
        warmups: Arc<AtomicU32>,
    }

    #[async_trait]
    impl TranslationBackend for Echo {
        fn id(&self) -> BackendId {
            self.id
        }

        async fn translate(&self, query: &BackendQuery) -> Result<String, BackendError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(query.text.clone())
        }

        async fn warmup(&self, _timeout: Duration) -> Result<Duration, BackendError> {
            self.warmups.fetch_add(1, Ordering::SeqCst);
            Ok(Duration::from_millis(1))
        }
    }

    fn dispatcher_with_echo(
        id: BackendId,
    ) -> (TranslationDispatcher, Arc<AtomicU32>, Arc<AtomicU32>) {
        let calls = Arc::new(AtomicU32::new(0));
        let warmups = Arc::new(AtomicU32::new(0));
        let registry = BackendRegistry::new().with_backend(Echo {
            id,
            calls: calls.clone(),
            warmups: warmups.clone(),
        });
        (TranslationDispatcher::new(Arc::new(registry)), calls, warmups)
    }

    // ==================== Request Tests ====================

    #[test]
    fn test_request_defaults() {
        let request = TranslationRequest::new("Hello", "bing", "auto", "English");
        assert!(!request.use_warmup);
        assert_eq!(request.timeout_seconds, 10.0);
    }

    // ==================== Timeout Validation Tests ====================

    #[test]
    fn test_validate_timeout_bounds() {
        assert_eq!(validate_timeout(1.0).ok(), Some(Duration::from_secs(1)));
        assert_eq!(validate_timeout(60.0).ok(), Some(Duration::from_secs(60)));
        assert_eq!(validate_timeout(2.5).ok(), Some(Duration::from_millis(2500)));
        assert!(validate_timeout(0.5).is_err());
        assert!(validate_timeout(60.5).is_err());
        assert!(validate_timeout(f64::NAN).is_err());
        assert!(validate_timeout(f64::INFINITY).is_err());
    }

    #[test]
    fn test_invalid_timeout_message() {
        let err = validate_timeout(0.0).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Timeout must be between 1 and 60 seconds, got 0"
        );
        assert_eq!(err.kind(), ErrorKind::InvalidTimeout);
    }

    // ==================== Dispatch Tests ====================

    #[tokio::test]
    async fn test_translate_passes_codes_through() {
        let (dispatcher, calls, _) = dispatcher_with_echo(BackendId::Google);
        let request = TranslationRequest::new("hello", "google", "auto", "English");

        let result = dispatcher.translate(&request).await.expect("Should succeed");

        assert_eq!(result, "hello");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unknown_language_never_calls_backend() {
        let (dispatcher, calls, _) = dispatcher_with_echo(BackendId::Google);
        let request = TranslationRequest::new("hello", "google", "auto", "Klingon");

        let err = dispatcher.translate(&request).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InvalidLanguage);
        assert_eq!(err.to_string(), "Unknown language: 'Klingon'");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unknown_backend() {
        let (dispatcher, calls, _) = dispatcher_with_echo(BackendId::Google);
        let request = TranslationRequest::new("hello", "babelfish", "auto", "English");

        let err = dispatcher.translate(&request).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InvalidBackend);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_catalogued_but_unregistered_backend() {
        let (dispatcher, _, _) = dispatcher_with_echo(BackendId::Google);
        let request = TranslationRequest::new("hello", "baidu", "auto", "English");

        let err = dispatcher.translate(&request).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Backend);
        assert!(err.to_string().contains("baidu"));
    }

    #[tokio::test]
    async fn test_out_of_range_timeout_never_calls_backend() {
        let (dispatcher, calls, _) = dispatcher_with_echo(BackendId::Google);
        let request =
            TranslationRequest::new("hello", "google", "auto", "English").with_timeout(120.0);

        let err = dispatcher.translate(&request).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InvalidTimeout);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_text_reaches_backend() {
        let (dispatcher, calls, _) = dispatcher_with_echo(BackendId::Bing);
        let request = TranslationRequest::new("", "bing", "French", "German");

        let result = dispatcher.translate(&request).await.expect("Should succeed");

        assert_eq!(result, "");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    // ==================== Warm-up Tests ====================

    #[tokio::test]
    async fn test_warmup_runs_once_when_requested() {
        let (dispatcher, calls, warmups) = dispatcher_with_echo(BackendId::Google);
        let request =
            TranslationRequest::new("hello", "google", "auto", "English").with_warmup(true);

        let result = dispatcher.translate(&request).await.expect("Should succeed");

        assert_eq!(result, "hello");
        assert_eq!(warmups.load(Ordering::SeqCst), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_warmup_skipped_by_default() {
        let (dispatcher, calls, warmups) = dispatcher_with_echo(BackendId::Google);
        let request = TranslationRequest::new("hello", "google", "auto", "English");

        dispatcher.translate(&request).await.expect("Should succeed");

        assert_eq!(warmups.load(Ordering::SeqCst), 0);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invalid_request_skips_warmup() {
        let (dispatcher, _, warmups) = dispatcher_with_echo(BackendId::Google);
        let request =
            TranslationRequest::new("hello", "google", "auto", "Klingon").with_warmup(true);

        assert!(dispatcher.translate(&request).await.is_err());
        assert_eq!(warmups.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_error_kind_for_backend_timeout() {
        let err: DispatchError = BackendError::Timeout {
            backend: BackendId::Google,
            after: Duration::from_secs(1),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::Timeout);
    }
}
