use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use super::http::{check_status, probe, read_json, transport_error};
use super::{BackendError, BackendId, BackendQuery, TranslationBackend};

pub const DEFAULT_MYMEMORY_URL: &str = "https://api.mymemory.translated.net/get";

/// MyMemory translation memory. Anonymous use is rate limited per IP; a
/// contact email raises the daily quota.
#[derive(Debug, Clone)]
pub struct MyMemoryTranslator {
    client: reqwest::Client,
    url: String,
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MyMemoryResponse {
    response_data: Option<ResponseData>,
    /// Sent as a number on success and sometimes as a string on failure
    #[serde(default)]
    response_status: Value,
    #[serde(default)]
    response_details: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponseData {
    translated_text: Option<String>,
}

impl MyMemoryTranslator {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
            email: None,
        }
    }

    pub fn with_email(mut self, email: Option<String>) -> Self {
        self.email = email;
        self
    }
}

fn mymemory_code(code: &str) -> &str {
    match code {
        "auto" => "autodetect",
        "zh" => "zh-CN",
        other => other,
    }
}

fn status_code(status: &Value) -> Option<u16> {
    match status {
        Value::Number(n) => n.as_u64().and_then(|n| u16::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn details_text(details: &Value) -> String {
    match details {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[async_trait]
impl TranslationBackend for MyMemoryTranslator {
    fn id(&self) -> BackendId {
        BackendId::MyMemory
    }

    async fn translate(&self, query: &BackendQuery) -> Result<String, BackendError> {
        if query.skips_request() {
            return Ok(query.text.clone());
        }

        let langpair = format!(
            "{}|{}",
            mymemory_code(&query.from_code),
            mymemory_code(&query.to_code)
        );
        let mut params = vec![("q", query.text.as_str()), ("langpair", langpair.as_str())];
        if let Some(email) = &self.email {
            params.push(("de", email.as_str()));
        }

        let response = self
            .client
            .get(&self.url)
            .query(&params)
            .timeout(query.timeout)
            .send()
            .await
            .map_err(|e| transport_error(self.id(), query.timeout, e))?;

        let response = check_status(self.id(), response).await?;
        let body: MyMemoryResponse = read_json(self.id(), query.timeout, response).await?;

        // Errors come back as HTTP 200 with the real status in the body
        match status_code(&body.response_status) {
            Some(200) => {}
            Some(429) => return Err(BackendError::RateLimited { backend: self.id() }),
            Some(status) => {
                return Err(BackendError::Api {
                    backend: self.id(),
                    status,
                    body: details_text(&body.response_details),
                })
            }
            None => {
                return Err(BackendError::MalformedResponse {
                    backend: self.id(),
                    details: format!("unexpected responseStatus {}", body.response_status),
                })
            }
        }

        body.response_data
            .and_then(|data| data.translated_text)
            .ok_or_else(|| BackendError::MalformedResponse {
                backend: self.id(),
                details: "responseData.translatedText missing".to_string(),
            })
    }

    async fn warmup(&self, timeout: Duration) -> Result<Duration, BackendError> {
        probe(&self.client, self.id(), &self.url, timeout).await
    }
}
