//! HTTP client for the Gemini generateContent / countTokens endpoints.
//!
//! Thin transport layer: wire types and status handling live here, everything
//! about prompts, validation and cost lives in the engine. The base URL is
//! configurable so tests can point the client at a local mock server.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::engine::{GenerationRequest, GenerativeModel, ModelError};
use crate::config::GeminiConfig;
use async_trait::async_trait;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    system_instruction: Content,
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
    response_mime_type: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Serialize)]
struct CountTokensRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CountTokensResponse {
    total_tokens: i64,
}

/// Client for the Gemini REST API
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self, anyhow::Error> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self { http, config })
    }

    fn endpoint(&self, operation: &str) -> String {
        format!(
            "{}/v1beta/models/{}:{}?key={}",
            self.config.base_url.as_str().trim_end_matches('/'),
            self.config.model,
            operation,
            self.config.api_key
        )
    }

    async fn post<Req: Serialize, Resp: for<'de> Deserialize<'de>>(
        &self,
        operation: &str,
        body: &Req,
    ) -> Result<Resp, ModelError> {
        let response = self
            .http
            .post(self.endpoint(operation))
            .json(body)
            .send()
            .await
            .map_err(|e| ModelError::Transport { message: e.to_string() })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ModelError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| ModelError::Transport { message: e.to_string() })
    }
}

fn user_content(text: &str) -> Content {
    Content {
        parts: vec![Part { text: text.to_string() }],
    }
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    #[instrument(skip_all, fields(model = %self.config.model))]
    async fn generate(&self, request: &GenerationRequest) -> Result<String, ModelError> {
        let body = GenerateContentRequest {
            system_instruction: user_content(&request.system_instruction),
            contents: vec![user_content(&request.prompt)],
            generation_config: GenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_output_tokens,
                response_mime_type: "application/json".to_string(),
            },
        };

        let response: GenerateContentResponse = self.post("generateContent", &body).await?;

        // A reply with no candidates or no parts degrades to an empty string,
        // which the engine rejects as an empty response
        let text = response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| content.parts.into_iter().map(|p| p.text).collect::<Vec<_>>().join(""))
            .unwrap_or_default();

        Ok(text)
    }

    #[instrument(skip_all, fields(model = %self.config.model))]
    async fn count_tokens(&self, text: &str) -> Result<i64, ModelError> {
        let body = CountTokensRequest {
            contents: vec![user_content(text)],
        };
        let response: CountTokensResponse = self.post("countTokens", &body).await?;
        Ok(response.total_tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use url::Url;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn test_client(server: &MockServer) -> GeminiClient {
        let config = GeminiConfig {
            api_key: "test-key".to_string(),
            base_url: Url::parse(&server.uri()).unwrap(),
            ..GeminiConfig::default()
        };
        GeminiClient::new(config).unwrap()
    }

    fn generation_request() -> GenerationRequest {
        GenerationRequest {
            system_instruction: "Reply ONLY with valid JSON".to_string(),
            prompt: "Analyze this campaign".to_string(),
            temperature: 0.3,
            max_output_tokens: 8192,
        }
    }

    #[tokio::test]
    async fn test_generate_sends_json_only_config_and_returns_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.5-flash:generateContent"))
            .and(query_param("key", "test-key"))
            .and(body_partial_json(json!({
                "generationConfig": {
                    "temperature": 0.3,
                    "maxOutputTokens": 8192,
                    "responseMimeType": "application/json"
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"parts": [{"text": "{\"ok\":true}"}]}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server).await;
        let reply = client.generate(&generation_request()).await.unwrap();
        assert_eq!(reply, "{\"ok\":true}");
    }

    #[tokio::test]
    async fn test_generate_with_no_candidates_yields_empty_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let client = test_client(&server).await;
        let reply = client.generate(&generation_request()).await.unwrap();
        assert_eq!(reply, "");
    }

    #[tokio::test]
    async fn test_non_success_status_is_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
            .mount(&server)
            .await;

        let client = test_client(&server).await;
        let err = client.generate(&generation_request()).await.unwrap_err();
        match err {
            ModelError::Api { status, message } => {
                assert_eq!(status, 429);
                assert_eq!(message, "quota exceeded");
            }
            other => panic!("expected API error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_count_tokens_posts_text_and_reads_total() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.5-flash:countTokens"))
            .and(query_param("key", "test-key"))
            .and(body_partial_json(json!({
                "contents": [{"parts": [{"text": "some prompt text"}]}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"totalTokens": 42})))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server).await;
        assert_eq!(client.count_tokens("some prompt text").await.unwrap(), 42);
    }
}
