use std::sync::OnceLock;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::debug;

use super::bing::bing_code;
use super::http::{check_status, read_json, transport_error};
use super::{BackendError, BackendId, BackendQuery, TranslationBackend};

pub const DEFAULT_BING_WEB_URL: &str = "https://www.bing.com";

/// Bing through the public translator page, used when no API key is configured.
///
/// The page embeds a short-lived session (IG, IID, key and token) that every
/// `ttranslatev3` call must carry. The session is fetched lazily, cached, and
/// dropped whenever a call fails so the next call starts a fresh one.
#[derive(Debug)]
pub struct BingWebTranslator {
    client: reqwest::Client,
    base_url: String,
    session: Mutex<Option<BingSession>>,
}

#[derive(Debug, Clone, PartialEq)]
struct BingSession {
    ig: String,
    iid: String,
    key: String,
    token: String,
}

static IG_REGEX: OnceLock<Regex> = OnceLock::new();
static IID_REGEX: OnceLock<Regex> = OnceLock::new();
static ABUSE_HELPER_REGEX: OnceLock<Regex> = OnceLock::new();

fn parse_session(page: &str) -> Option<BingSession> {
    let ig = IG_REGEX.get_or_init(|| Regex::new(r#"IG:"([^"]+)""#).unwrap());
    let iid = IID_REGEX.get_or_init(|| Regex::new(r#"data-iid="([^"]+)""#).unwrap());
    let helper = ABUSE_HELPER_REGEX.get_or_init(|| {
        Regex::new(r#"params_AbusePreventionHelper\s*=\s*\[\s*(\d+)\s*,\s*"([^"]+)""#).unwrap()
    });

    let helper = helper.captures(page)?;
    Some(BingSession {
        ig: ig.captures(page)?.get(1)?.as_str().to_string(),
        iid: iid.captures(page)?.get(1)?.as_str().to_string(),
        key: helper.get(1)?.as_str().to_string(),
        token: helper.get(2)?.as_str().to_string(),
    })
}

/// Success is `[{"translations":[{"text":..}]}]`; a rejected session comes
/// back as `{"statusCode":205}` with HTTP 200.
fn parse_translation(backend: BackendId, body: &Value) -> Result<String, BackendError> {
    if let Some(text) = body
        .get(0)
        .and_then(|item| item.get("translations"))
        .and_then(|translations| translations.get(0))
        .and_then(|translation| translation.get("text"))
        .and_then(Value::as_str)
    {
        return Ok(text.to_string());
    }

    match body.get("statusCode").and_then(Value::as_u64) {
        Some(status) => Err(BackendError::Api {
            backend,
            status: u16::try_from(status).unwrap_or(u16::MAX),
            body: body.to_string(),
        }),
        None => Err(BackendError::MalformedResponse {
            backend,
            details: "response contained no translations".to_string(),
        }),
    }
}

impl BingWebTranslator {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session: Mutex::new(None),
        }
    }

    async fn fetch_session(&self, timeout: Duration) -> Result<BingSession, BackendError> {
        let response = self
            .client
            .get(format!("{}/translator", self.base_url))
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| transport_error(self.id(), timeout, e))?;
        let page = check_status(self.id(), response)
            .await?
            .text()
            .await
            .map_err(|e| transport_error(self.id(), timeout, e))?;

        parse_session(&page).ok_or_else(|| BackendError::MalformedResponse {
            backend: self.id(),
            details: "translator page did not contain a session token".to_string(),
        })
    }

    async fn session(&self, timeout: Duration) -> Result<BingSession, BackendError> {
        let mut cached = self.session.lock().await;
        if let Some(session) = cached.as_ref() {
            return Ok(session.clone());
        }

        let session = self.fetch_session(timeout).await?;
        debug!("bing web: new session IG={}", session.ig);
        *cached = Some(session.clone());
        Ok(session)
    }

    async fn request_translation(
        &self,
        session: &BingSession,
        query: &BackendQuery,
    ) -> Result<String, BackendError> {
        let from = if query.is_auto_detect() {
            "auto-detect"
        } else {
            bing_code(&query.from_code)
        };

        let response = self
            .client
            .post(format!("{}/ttranslatev3", self.base_url))
            .query(&[
                ("isVertical", "1"),
                ("IG", session.ig.as_str()),
                ("IID", session.iid.as_str()),
            ])
            .form(&[
                ("fromLang", from),
                ("to", bing_code(&query.to_code)),
                ("text", query.text.as_str()),
                ("token", session.token.as_str()),
                ("key", session.key.as_str()),
            ])
            .timeout(query.timeout)
            .send()
            .await
            .map_err(|e| transport_error(self.id(), query.timeout, e))?;

        let response = check_status(self.id(), response).await?;
        let body: Value = read_json(self.id(), query.timeout, response).await?;
        parse_translation(self.id(), &body)
    }
}

#[async_trait]
impl TranslationBackend for BingWebTranslator {
    fn id(&self) -> BackendId {
        BackendId::Bing
    }

    async fn translate(&self, query: &BackendQuery) -> Result<String, BackendError> {
        if query.skips_request() {
            return Ok(query.text.clone());
        }

        let session = self.session(query.timeout).await?;
        let result = self.request_translation(&session, query).await;
        if result.is_err() {
            *self.session.lock().await = None;
        }
        result
    }

    /// Warm-up opens a fresh session, so the next translation skips the page fetch.
    async fn warmup(&self, timeout: Duration) -> Result<Duration, BackendError> {
        let started = Instant::now();
        let session = self.fetch_session(timeout).await?;
        *self.session.lock().await = Some(session);
        Ok(started.elapsed())
    }
}
