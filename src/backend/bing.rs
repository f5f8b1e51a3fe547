use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::http::{check_status, probe, read_json, transport_error};
use super::{BackendError, BackendId, BackendQuery, TranslationBackend};

pub const DEFAULT_BING_URL: &str = "https://api.cognitive.microsofttranslator.com";

/// Bing through the Microsoft Translator v3 API.
#[derive(Debug, Clone)]
pub struct BingTranslator {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    region: Option<String>,
}

#[derive(Debug, Serialize)]
struct BingRequestItem<'a> {
    #[serde(rename = "Text")]
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct BingResult {
    translations: Vec<BingTranslation>,
}

#[derive(Debug, Deserialize)]
struct BingTranslation {
    text: String,
}

impl BingTranslator {
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            region: None,
        }
    }

    /// Region of a regional or multi-service resource.
    pub fn with_region(mut self, region: Option<String>) -> Self {
        self.region = region;
        self
    }

    fn translate_url(&self) -> String {
        format!("{}/translate", self.endpoint.trim_end_matches('/'))
    }
}

pub(super) fn bing_code(code: &str) -> &str {
    match code {
        "zh" => "zh-Hans",
        "zh-TW" => "zh-Hant",
        "no" => "nb",
        other => other,
    }
}

#[async_trait]
impl TranslationBackend for BingTranslator {
    fn id(&self) -> BackendId {
        BackendId::Bing
    }

    async fn translate(&self, query: &BackendQuery) -> Result<String, BackendError> {
        if query.skips_request() {
            return Ok(query.text.clone());
        }

        let mut params = vec![("api-version", "3.0"), ("to", bing_code(&query.to_code))];
        // Omitting `from` asks the service to detect the language
        if !query.is_auto_detect() {
            params.push(("from", bing_code(&query.from_code)));
        }

        debug!("bing: {:?}", params);

        let mut request = self
            .client
            .post(self.translate_url())
            .query(&params)
            .header("Ocp-Apim-Subscription-Key", &self.api_key)
            .json(&[BingRequestItem { text: &query.text }])
            .timeout(query.timeout);
        if let Some(region) = &self.region {
            request = request.header("Ocp-Apim-Subscription-Region", region);
        }

        let response = request
            .send()
            .await
            .map_err(|e| transport_error(self.id(), query.timeout, e))?;
        let response = check_status(self.id(), response).await?;
        let results: Vec<BingResult> = read_json(self.id(), query.timeout, response).await?;

        results
            .into_iter()
            .next()
            .and_then(|r| r.translations.into_iter().next())
            .map(|t| t.text)
            .ok_or_else(|| BackendError::MalformedResponse {
                backend: self.id(),
                details: "response contained no translations".to_string(),
            })
    }

    async fn warmup(&self, timeout: Duration) -> Result<Duration, BackendError> {
        probe(&self.client, self.id(), &self.endpoint, timeout).await
    }
}
