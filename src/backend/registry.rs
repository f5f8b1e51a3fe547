//! Backend registry: maps catalog ids to live handlers.
//!
//! The registry is built once and then shared read-only (`Arc<BackendRegistry>`)
//! between concurrent translations. Handlers own whatever connection state they
//! keep; the registry only routes calls to them.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use futures::future::join_all;
use tracing::{debug, info, warn};

use super::{
    BackendError, BackendId, BackendQuery, BingTranslator, BingWebTranslator, DeepLTranslator,
    GoogleTranslator, LibreTranslator, MyMemoryTranslator, TranslationBackend,
};
use crate::config::Config;

/// Default upper bound for a single warm-up probe.
pub const DEFAULT_WARMUP_TIMEOUT: Duration = Duration::from_secs(5);

/// Latency of each backend that answered its warm-up probe, fastest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WarmupReport {
    pub timings: Vec<(BackendId, Duration)>,
}

impl WarmupReport {
    pub fn fastest(&self) -> Option<BackendId> {
        self.timings.first().map(|(id, _)| *id)
    }
}

/// Non-fatal: one or more backends failed their warm-up probe.
#[derive(Debug, Clone, thiserror::Error)]
#[error("Preacceleration warning: {}", describe_failures(.failures))]
pub struct WarmupWarning {
    pub failures: Vec<(BackendId, String)>,
    /// Backends that did answer
    pub report: WarmupReport,
}

fn describe_failures(failures: &[(BackendId, String)]) -> String {
    failures
        .iter()
        .map(|(id, message)| format!("{}: {}", id, message))
        .collect::<Vec<_>>()
        .join("; ")
}

pub struct BackendRegistry {
    handlers: HashMap<BackendId, Arc<dyn TranslationBackend>>,
    warmup_timeout: Duration,
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl BackendRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
            warmup_timeout: DEFAULT_WARMUP_TIMEOUT,
        }
    }

    /// Build a registry holding the built-in handlers enabled by `config`.
    ///
    /// Google, MyMemory and Argos (LibreTranslate) need no credentials and are
    /// always registered. Bing uses the Translator API when a key is set and the
    /// public web endpoint otherwise. DeepL is registered only when a key is set.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .build()
            .context("Failed to build HTTP client")?;

        let mut registry = Self::new().with_warmup_timeout(config.warmup_timeout);

        registry.register(Arc::new(GoogleTranslator::new(
            client.clone(),
            config.google_translate_url.clone(),
        )));
        registry.register(Arc::new(
            MyMemoryTranslator::new(client.clone(), config.mymemory_api_url.clone())
                .with_email(config.mymemory_email.clone()),
        ));
        registry.register(Arc::new(
            LibreTranslator::new(client.clone(), config.libretranslate_url.clone())
                .with_api_key(config.libretranslate_api_key.clone()),
        ));

        match &config.bing_translator_key {
            Some(key) => registry.register(Arc::new(
                BingTranslator::new(client.clone(), config.bing_translator_url.clone(), key.clone())
                    .with_region(config.bing_translator_region.clone()),
            )),
            None => registry.register(Arc::new(BingWebTranslator::new(
                client.clone(),
                config.bing_web_url.clone(),
            ))),
        };
        if let Some(key) = &config.deepl_api_key {
            registry.register(Arc::new(DeepLTranslator::new(
                client,
                config.deepl_api_url.clone(),
                key.clone(),
            )));
        }

        info!(
            "Registered translation backends: {}",
            registry
                .registered()
                .iter()
                .map(BackendId::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        );

        Ok(registry)
    }

    /// Set the upper bound for each warm-up probe.
    pub fn with_warmup_timeout(mut self, timeout: Duration) -> Self {
        self.warmup_timeout = timeout;
        self
    }

    /// Add a handler, builder style.
    pub fn with_backend(mut self, handler: impl TranslationBackend + 'static) -> Self {
        self.register(Arc::new(handler));
        self
    }

    /// Add a handler under its own id, returning the one it replaces.
    pub fn register(
        &mut self,
        handler: Arc<dyn TranslationBackend>,
    ) -> Option<Arc<dyn TranslationBackend>> {
        self.handlers.insert(handler.id(), handler)
    }

    pub fn is_registered(&self, id: BackendId) -> bool {
        self.handlers.contains_key(&id)
    }

    /// Registered ids in catalog order.
    pub fn registered(&self) -> Vec<BackendId> {
        BackendId::ALL
            .iter()
            .copied()
            .filter(|id| self.handlers.contains_key(id))
            .collect()
    }

    pub fn warmup_timeout(&self) -> Duration {
        self.warmup_timeout
    }

    /// Run one translation on the handler registered for `id`.
    ///
    /// # Errors
    /// `BackendError::NotRegistered` when no handler serves `id`, otherwise
    /// whatever the handler reports.
    pub async fn invoke(&self, id: BackendId, query: &BackendQuery) -> Result<String, BackendError> {
        let handler = self
            .handlers
            .get(&id)
            .ok_or(BackendError::NotRegistered(id))?;

        debug!(
            "Invoking {} ({} -> {}, {} chars)",
            id,
            query.from_code,
            query.to_code,
            query.text.chars().count()
        );
        handler.translate(query).await
    }

    /// Probe every registered backend concurrently and rank them by latency.
    ///
    /// Each probe is bounded by the warm-up timeout. Returns `Err` when any
    /// probe failed; the warning still carries the timings that succeeded.
    pub async fn warmup(&self) -> Result<WarmupReport, WarmupWarning> {
        let timeout = self.warmup_timeout;
        let probes = self.registered().into_iter().filter_map(|id| {
            let handler = self.handlers.get(&id)?.clone();
            Some(async move {
                let outcome = match tokio::time::timeout(timeout, handler.warmup(timeout)).await {
                    Ok(result) => result,
                    Err(_) => Err(BackendError::Timeout {
                        backend: id,
                        after: timeout,
                    }),
                };
                (id, outcome)
            })
        });

        let mut report = WarmupReport::default();
        let mut failures = Vec::new();
        for (id, outcome) in join_all(probes).await {
            match outcome {
                Ok(elapsed) => {
                    debug!("{} warm-up took {:?}", id, elapsed);
                    report.timings.push((id, elapsed));
                }
                Err(e) => {
                    warn!("{} warm-up failed: {}", id, e);
                    failures.push((id, e.to_string()));
                }
            }
        }
        report.timings.sort_by_key(|(_, elapsed)| *elapsed);

        if let Some(fastest) = report.fastest() {
            info!("Warm-up complete, fastest backend: {}", fastest);
        }

        if failures.is_empty() {
            Ok(report)
        } else {
            Err(WarmupWarning { failures, report })
        }
    }
}
