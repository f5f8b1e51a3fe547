use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::http::{check_status, probe, read_json, transport_error};
use super::{BackendError, BackendId, BackendQuery, TranslationBackend};

pub const DEFAULT_GOOGLE_URL: &str = "https://translate.googleapis.com/translate_a/single";

/// Google Translate through the public `client=gtx` endpoint (no key).
#[derive(Debug, Clone)]
pub struct GoogleTranslator {
    client: reqwest::Client,
    url: String,
}

impl GoogleTranslator {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

fn google_code(code: &str) -> &str {
    match code {
        "zh" => "zh-CN",
        "fil" => "tl",
        other => other,
    }
}

/// The endpoint answers `[[["Hola","Hello",..],["mundo","world",..]], null, "en", ..]`.
/// Long inputs come back split into segments that must be joined.
fn parse_segments(body: &Value) -> Option<String> {
    let segments = body.get(0)?.as_array()?;
    let mut translated = String::new();
    for segment in segments {
        if let Some(part) = segment.get(0).and_then(Value::as_str) {
            translated.push_str(part);
        }
    }
    if segments.is_empty() {
        None
    } else {
        Some(translated)
    }
}

#[async_trait]
impl TranslationBackend for GoogleTranslator {
    fn id(&self) -> BackendId {
        BackendId::Google
    }

    async fn translate(&self, query: &BackendQuery) -> Result<String, BackendError> {
        if query.skips_request() {
            return Ok(query.text.clone());
        }

        debug!("google: {} -> {}", query.from_code, query.to_code);

        let response = self
            .client
            .get(&self.url)
            .query(&[
                ("client", "gtx"),
                ("sl", google_code(&query.from_code)),
                ("tl", google_code(&query.to_code)),
                ("dt", "t"),
                ("q", query.text.as_str()),
            ])
            .timeout(query.timeout)
            .send()
            .await
            .map_err(|e| transport_error(self.id(), query.timeout, e))?;

        let response = check_status(self.id(), response).await?;
        let body: Value = read_json(self.id(), query.timeout, response).await?;

        parse_segments(&body).ok_or_else(|| BackendError::MalformedResponse {
            backend: self.id(),
            details: "response contained no translated segments".to_string(),
        })
    }

    async fn warmup(&self, timeout: Duration) -> Result<Duration, BackendError> {
        probe(&self.client, self.id(), &self.url, timeout).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{
        matchers::{method, path, query_param},
        Mock, MockServer, ResponseTemplate,
    };

    fn query(text: &str, from: &str, to: &str) -> BackendQuery {
        BackendQuery::new(text, from, to, Duration::from_secs(5))
    }

    // ==================== Parsing Tests ====================

    #[test]
    fn test_parse_single_segment() {
        let body = serde_json::json!([[["Hola", "Hello", null, null, 10]], null, "en"]);
        assert_eq!(parse_segments(&body), Some("Hola".to_string()));
    }

    #[test]
    fn test_parse_joins_segments() {
        let body = serde_json::json!([
            [["Hola. ", "Hello. ", null], ["Adiós.", "Goodbye.", null]],
            null,
            "en"
        ]);
        assert_eq!(parse_segments(&body), Some("Hola. Adiós.".to_string()));
    }

    #[test]
    fn test_parse_rejects_unexpected_shape() {
        assert_eq!(parse_segments(&serde_json::json!({"error": "nope"})), None);
        assert_eq!(parse_segments(&serde_json::json!([[], null])), None);
    }

    #[test]
    fn test_google_codes() {
        assert_eq!(google_code("zh"), "zh-CN");
        assert_eq!(google_code("zh-TW"), "zh-TW");
        assert_eq!(google_code("fil"), "tl");
        assert_eq!(google_code("auto"), "auto");
    }

    // ==================== HTTP Tests ====================

    #[tokio::test]
    async fn test_translate_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/translate_a/single"))
            .and(query_param("client", "gtx"))
            .and(query_param("sl", "auto"))
            .and(query_param("tl", "es"))
            .and(query_param("q", "Hello, world!"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!([[["¡Hola, mundo!", "Hello, world!"]], null, "en"])),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let translator = GoogleTranslator::new(
            reqwest::Client::new(),
            format!("{}/translate_a/single", mock_server.uri()),
        );
        let result = translator
            .translate(&query("Hello, world!", "auto", "es"))
            .await
            .expect("Should succeed");

        assert_eq!(result, "¡Hola, mundo!");
    }

    #[tokio::test]
    async fn test_translate_maps_chinese_code() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(query_param("tl", "zh-CN"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!([[["你好", "Hello"]]])),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let translator = GoogleTranslator::new(reqwest::Client::new(), mock_server.uri());
        let result = translator
            .translate(&query("Hello", "en", "zh"))
            .await
            .expect("Should succeed");

        assert_eq!(result, "你好");
    }

    #[tokio::test]
    async fn test_translate_rate_limited() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&mock_server)
            .await;

        let translator = GoogleTranslator::new(reqwest::Client::new(), mock_server.uri());
        let err = translator
            .translate(&query("Hello", "en", "de"))
            .await
            .unwrap_err();

        assert!(matches!(err, BackendError::RateLimited { backend: BackendId::Google }));
    }

    #[tokio::test]
    async fn test_translate_malformed_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>captcha</html>"))
            .mount(&mock_server)
            .await;

        let translator = GoogleTranslator::new(reqwest::Client::new(), mock_server.uri());
        let err = translator
            .translate(&query("Hello", "en", "de"))
            .await
            .unwrap_err();

        assert!(matches!(err, BackendError::MalformedResponse { .. }));
    }

    #[tokio::test]
    async fn test_empty_text_is_echoed_without_request() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&mock_server)
            .await;

        let translator = GoogleTranslator::new(reqwest::Client::new(), mock_server.uri());
        let result = translator
            .translate(&query("", "auto", "en"))
            .await
            .expect("Should succeed");

        assert_eq!(result, "");
    }

    #[tokio::test]
    async fn test_warmup_counts_any_response_as_reachable() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(400))
            .expect(1)
            .mount(&mock_server)
            .await;

        let translator = GoogleTranslator::new(reqwest::Client::new(), mock_server.uri());
        assert!(translator.warmup(Duration::from_secs(2)).await.is_ok());
    }
}
