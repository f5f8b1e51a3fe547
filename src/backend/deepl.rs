use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::http::{check_status, probe, read_json, transport_error};
use super::{BackendError, BackendId, BackendQuery, TranslationBackend};

pub const DEFAULT_DEEPL_URL: &str = "https://api-free.deepl.com/v2/translate";

/// DeepL v2 API. Free-tier keys use the `api-free` host, paid keys `api`.
#[derive(Debug, Clone)]
pub struct DeepLTranslator {
    client: reqwest::Client,
    url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct DeepLResponse {
    translations: Vec<DeepLTranslation>,
}

#[derive(Debug, Deserialize)]
struct DeepLTranslation {
    text: String,
}

impl DeepLTranslator {
    pub fn new(client: reqwest::Client, url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
            api_key: api_key.into(),
        }
    }
}

/// Source languages take the bare language code.
fn deepl_source_code(code: &str) -> String {
    match code {
        "zh-TW" => "ZH".to_string(),
        other => other.to_uppercase(),
    }
}

/// Target languages need a regional variant where DeepL distinguishes them.
fn deepl_target_code(code: &str) -> String {
    match code {
        "en" => "EN-US".to_string(),
        "pt" => "PT-PT".to_string(),
        "zh" => "ZH-HANS".to_string(),
        "zh-TW" => "ZH-HANT".to_string(),
        other => other.to_uppercase(),
    }
}

#[async_trait]
impl TranslationBackend for DeepLTranslator {
    fn id(&self) -> BackendId {
        BackendId::DeepL
    }

    async fn translate(&self, query: &BackendQuery) -> Result<String, BackendError> {
        if query.skips_request() {
            return Ok(query.text.clone());
        }

        let mut params = vec![
            ("text", query.text.clone()),
            ("target_lang", deepl_target_code(&query.to_code)),
        ];
        if !query.is_auto_detect() {
            params.push(("source_lang", deepl_source_code(&query.from_code)));
        }

        let response = self
            .client
            .post(&self.url)
            .header("Authorization", format!("DeepL-Auth-Key {}", self.api_key))
            .form(&params)
            .timeout(query.timeout)
            .send()
            .await
            .map_err(|e| transport_error(self.id(), query.timeout, e))?;

        let response = check_status(self.id(), response).await?;
        let body: DeepLResponse = read_json(self.id(), query.timeout, response).await?;

        body.translations
            .into_iter()
            .next()
            .map(|t| t.text)
            .ok_or_else(|| BackendError::MalformedResponse {
                backend: self.id(),
                details: "response contained no translations".to_string(),
            })
    }

    async fn warmup(&self, timeout: Duration) -> Result<Duration, BackendError> {
        probe(&self.client, self.id(), &self.url, timeout).await
    }
}
