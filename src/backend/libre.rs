use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::http::{check_status, probe, read_json, transport_error};
use super::{BackendError, BackendId, BackendQuery, TranslationBackend};

pub const DEFAULT_LIBRETRANSLATE_URL: &str = "https://libretranslate.com";

/// Argos Translate models served by a LibreTranslate instance.
#[derive(Debug, Clone)]
pub struct LibreTranslator {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

#[derive(Debug, Serialize)]
struct LibreRequest<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    format: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LibreResponse {
    translated_text: String,
}

impl LibreTranslator {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: None,
        }
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    fn endpoint(&self, route: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), route)
    }
}

fn libre_code(code: &str) -> &str {
    match code {
        "zh-TW" => "zt",
        other => other,
    }
}

#[async_trait]
impl TranslationBackend for LibreTranslator {
    fn id(&self) -> BackendId {
        BackendId::Argos
    }

    async fn translate(&self, query: &BackendQuery) -> Result<String, BackendError> {
        if query.skips_request() {
            return Ok(query.text.clone());
        }

        let request = LibreRequest {
            q: &query.text,
            source: libre_code(&query.from_code),
            target: libre_code(&query.to_code),
            format: "text",
            api_key: self.api_key.as_deref(),
        };

        let response = self
            .client
            .post(self.endpoint("translate"))
            .json(&request)
            .timeout(query.timeout)
            .send()
            .await
            .map_err(|e| transport_error(self.id(), query.timeout, e))?;

        let response = check_status(self.id(), response).await?;
        let body: LibreResponse = read_json(self.id(), query.timeout, response).await?;
        Ok(body.translated_text)
    }

    async fn warmup(&self, timeout: Duration) -> Result<Duration, BackendError> {
        probe(&self.client, self.id(), &self.endpoint("languages"), timeout).await
    }
}
